//! DOM Operations Adapter
//!
//! Small set of tree helpers over the `dom_query` crate, named the way the
//! transcript extractor talks about the page: find a container, list its
//! element children, read a tag name, read text.

pub use dom_query::{Document, Selection};

/// Parse HTML string into document
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// First element under `sel` matching a CSS selector, if any.
#[must_use]
pub fn query_selector<'a>(sel: &Selection<'a>, selector: &str) -> Option<Selection<'a>> {
    let found = sel.select(selector).first();
    found.exists().then_some(found)
}

/// First element in the document matching a CSS selector, if any.
#[must_use]
pub fn query_document<'a>(doc: &'a Document, selector: &str) -> Option<Selection<'a>> {
    let found = doc.select(selector).first();
    found.exists().then_some(found)
}

/// Direct element children, in document order. Text nodes are skipped.
#[must_use]
pub fn element_children<'a>(sel: &Selection<'a>) -> Vec<Selection<'a>> {
    sel.children().iter().collect()
}

/// Get tag name (lowercase)
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes()
        .first()
        .and_then(dom_query::NodeRef::node_name)
        .map(|t| t.to_string())
}

/// Whether the element's tag is `tag` (ASCII case-insensitive).
#[must_use]
pub fn is_tag(sel: &Selection, tag: &str) -> bool {
    tag_name(sel).is_some_and(|t| t.eq_ignore_ascii_case(tag))
}

/// All descendant text of the selection, entity references already decoded
/// by the parser.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> String {
    sel.text().to_string()
}
