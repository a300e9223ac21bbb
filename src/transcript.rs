//! Transcript extraction from CapEdge transcript pages.
//!
//! The transcript lives in the page's annotatable container, inside a grid
//! whose element children alternate between a speaker heading (`<h3>`) and
//! a block holding that speaker's paragraphs:
//!
//! ```html
//! <div class="r6o-annotatable">
//!   <div class="grid">
//!     <h3>Operator</h3>
//!     <div><p>Good afternoon...</p><p>...</p></div>
//!     <h3>Jane Doe -- CEO</h3>
//!     <div><p>Thanks, everyone.</p></div>
//!   </div>
//! </div>
//! ```
//!
//! Pages without that structure (no transcript published yet) give an
//! empty [`TranscriptBody`], not an error.

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::dom::{self, Selection};
use crate::models::Transcript;

/// Container holding the transcript markup.
pub const ANNOTATABLE_SELECTOR: &str = "div.r6o-annotatable";

/// Grid inside the annotatable container.
pub const GRID_SELECTOR: &str = "div.grid";

/// One speaker turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub speaker: String,
    pub paragraphs: Vec<String>,
}

/// Transcript text in document order.
///
/// A speaker who talks twice, non-consecutively, has two segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranscriptBody {
    pub segments: Vec<Segment>,
}

impl TranscriptBody {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Distinct speaker names, in order of first appearance.
    #[must_use]
    pub fn speakers(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if !seen.contains(&segment.speaker.as_str()) {
                seen.push(&segment.speaker);
            }
        }
        seen
    }

    /// Plain text rendering: `[Speaker]`, a blank line, then one paragraph
    /// per line. Segments are separated by a blank line.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TranscriptBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "[{}]", segment.speaker)?;
            writeln!(f)?;
            for paragraph in &segment.paragraphs {
                writeln!(f, "{paragraph}")?;
            }
        }
        Ok(())
    }
}

/// Cursor state while walking the grid's children.
enum State {
    /// Looking for the next speaker heading.
    ExpectHeading,
    /// Just read a heading; the very next child may be its body.
    ExpectBody(String),
}

/// Extract the speaker/paragraph structure from a transcript page.
///
/// # Example
///
/// ```rust
/// use capedge_client::extract_transcript;
///
/// let html = r#"<div class="r6o-annotatable"><div class="grid">
///     <h3>Alice</h3><div><p>Hi</p><p>There</p></div>
///     <h3>Bob</h3><div><p>Yo</p></div>
/// </div></div>"#;
///
/// let body = extract_transcript(html);
/// assert_eq!(body.len(), 2);
/// assert_eq!(body.segments[0].paragraphs, vec!["Hi", "There"]);
/// ```
#[must_use]
pub fn extract_transcript(html: &str) -> TranscriptBody {
    let doc = dom::parse(html);

    let Some(container) = dom::query_document(&doc, ANNOTATABLE_SELECTOR) else {
        debug!("No annotatable container; page carries no transcript");
        return TranscriptBody::default();
    };
    let Some(grid) = dom::query_selector(&container, GRID_SELECTOR) else {
        debug!("Annotatable container has no grid; page carries no transcript");
        return TranscriptBody::default();
    };

    let body = pair_segments(&dom::element_children(&grid));
    debug!("Extracted {} transcript segments", body.len());
    body
}

/// Pair each heading with the child that immediately follows it.
///
/// A heading always opens a segment. The next child is consumed as its body
/// when it is a `<div>`; anything else is left alone and the segment keeps
/// no paragraphs. Children that are neither are skipped.
fn pair_segments(children: &[Selection]) -> TranscriptBody {
    let mut segments = Vec::new();
    let mut state = State::ExpectHeading;

    for child in children {
        state = match state {
            State::ExpectBody(speaker) => {
                let paragraphs = if dom::is_tag(child, "div") {
                    paragraphs(child)
                } else {
                    Vec::new()
                };
                segments.push(Segment {
                    speaker,
                    paragraphs,
                });
                // The follower is consumed whatever it was, even a heading.
                State::ExpectHeading
            }
            State::ExpectHeading if dom::is_tag(child, "h3") => {
                State::ExpectBody(dom::text_content(child).trim().to_string())
            }
            State::ExpectHeading => State::ExpectHeading,
        };
    }

    // Trailing heading with nothing after it.
    if let State::ExpectBody(speaker) = state {
        segments.push(Segment {
            speaker,
            paragraphs: Vec::new(),
        });
    }

    TranscriptBody { segments }
}

fn paragraphs(block: &Selection) -> Vec<String> {
    block
        .select("p")
        .iter()
        .map(|p| unescape_entities(&dom::text_content(&p)))
        .collect()
}

/// Decode HTML character references left in already-parsed text.
///
/// Transcript text is sometimes double-escaped upstream, so after the
/// parser's own decoding a literal `&amp;eacute;` or `&#39;` can remain.
/// This runs one more single pass with the HTML5 rules browsers use:
/// numeric references may omit the `;`, Latin-1 names and the core
/// escapes (`&amp`, `&lt`, ...) do not need it either, and C1 code
/// points are read as Windows-1252. Unknown references are kept verbatim.
#[must_use]
pub fn unescape_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        match decode_reference(tail, &mut out) {
            Some(consumed) => rest = &tail[consumed..],
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Longest entity name worth looking up.
const MAX_NAME_LEN: usize = 32;

/// Decode the reference at the start of `tail` (just past the `&`) into
/// `out`. Returns how many bytes of `tail` it used.
fn decode_reference(tail: &str, out: &mut String) -> Option<usize> {
    if let Some(num) = tail.strip_prefix('#') {
        let (digits, radix, prefix) = match num.strip_prefix(['x', 'X']) {
            Some(hex) => (leading(hex, |b| b.is_ascii_hexdigit()), 16, 2),
            None => (leading(num, |b| b.is_ascii_digit()), 10, 1),
        };
        if digits.is_empty() {
            return None;
        }
        // All digits are valid, so a parse failure can only be overflow.
        let code = u32::from_str_radix(digits, radix).unwrap_or(u32::MAX);
        if let Some(c) = numeric_char(code) {
            out.push(c);
        }
        let semi = usize::from(tail[prefix + digits.len()..].starts_with(';'));
        return Some(prefix + digits.len() + semi);
    }

    let name = leading(tail, |b| b.is_ascii_alphanumeric());
    let name = &name[..name.len().min(MAX_NAME_LEN)];
    if name.is_empty() {
        return None;
    }
    if tail[name.len()..].starts_with(';') {
        if let Some(c) = named_char(name) {
            out.push(c);
            return Some(name.len() + 1);
        }
    }
    // Without a terminating `;`, only legacy names count, longest first.
    (2..=name.len()).rev().find_map(|len| {
        let c = legacy_char(&name[..len])?;
        out.push(c);
        Some(len)
    })
}

fn leading(s: &str, accept: impl Fn(u8) -> bool) -> &str {
    let end = s.bytes().position(|b| !accept(b)).unwrap_or(s.len());
    &s[..end]
}

/// Character for a numeric reference, or `None` when it is dropped.
fn numeric_char(code: u32) -> Option<char> {
    match code {
        0 | 0xD800..=0xDFFF | 0x11_0000.. => Some(char::REPLACEMENT_CHARACTER),
        0x0D => Some('\r'),
        0x80..=0x9F => char::from_u32(WINDOWS_1252_C1[(code - 0x80) as usize]),
        0x01..=0x08 | 0x0B | 0x0E..=0x1F | 0x7F | 0xFDD0..=0xFDEF => None,
        c if (c & 0xFFFE) == 0xFFFE => None,
        c => char::from_u32(c),
    }
}

/// Windows-1252 reading of 0x80..=0x9F. Undefined slots stay as-is.
const WINDOWS_1252_C1: [u32; 32] = [
    0x20AC, 0x81, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, //
    0x02C6, 0x2030, 0x0160, 0x2039, 0x0152, 0x8D, 0x017D, 0x8F, //
    0x90, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014, //
    0x02DC, 0x2122, 0x0161, 0x203A, 0x0153, 0x9D, 0x017E, 0x0178, //
];

/// Latin-1 supplement names, U+00A0 onwards.
const LATIN1: [&str; 96] = [
    "nbsp", "iexcl", "cent", "pound", "curren", "yen", "brvbar", "sect", //
    "uml", "copy", "ordf", "laquo", "not", "shy", "reg", "macr", //
    "deg", "plusmn", "sup2", "sup3", "acute", "micro", "para", "middot", //
    "cedil", "sup1", "ordm", "raquo", "frac14", "frac12", "frac34", "iquest", //
    "Agrave", "Aacute", "Acirc", "Atilde", "Auml", "Aring", "AElig", "Ccedil", //
    "Egrave", "Eacute", "Ecirc", "Euml", "Igrave", "Iacute", "Icirc", "Iuml", //
    "ETH", "Ntilde", "Ograve", "Oacute", "Ocirc", "Otilde", "Ouml", "times", //
    "Oslash", "Ugrave", "Uacute", "Ucirc", "Uuml", "Yacute", "THORN", "szlig", //
    "agrave", "aacute", "acirc", "atilde", "auml", "aring", "aelig", "ccedil", //
    "egrave", "eacute", "ecirc", "euml", "igrave", "iacute", "icirc", "iuml", //
    "eth", "ntilde", "ograve", "oacute", "ocirc", "otilde", "ouml", "divide", //
    "oslash", "ugrave", "uacute", "ucirc", "uuml", "yacute", "thorn", "yuml", //
];

/// Names that also decode without a trailing `;`.
fn legacy_char(name: &str) -> Option<char> {
    let c = match name {
        "amp" | "AMP" => '&',
        "lt" | "LT" => '<',
        "gt" | "GT" => '>',
        "quot" | "QUOT" => '"',
        "COPY" => '\u{a9}',
        "REG" => '\u{ae}',
        _ => {
            let index = LATIN1.iter().position(|&n| n == name)?;
            return char::from_u32(0xA0 + u32::try_from(index).ok()?);
        }
    };
    Some(c)
}

fn named_char(name: &str) -> Option<char> {
    if let Some(c) = legacy_char(name) {
        return Some(c);
    }
    let code = match name {
        "apos" => 0x27,
        "OElig" => 0x152,
        "oelig" => 0x153,
        "Scaron" => 0x160,
        "scaron" => 0x161,
        "Yuml" => 0x178,
        "fnof" => 0x192,
        "circ" => 0x2C6,
        "tilde" => 0x2DC,
        "ensp" => 0x2002,
        "emsp" => 0x2003,
        "thinsp" => 0x2009,
        "zwnj" => 0x200C,
        "zwj" => 0x200D,
        "lrm" => 0x200E,
        "rlm" => 0x200F,
        "ndash" => 0x2013,
        "mdash" => 0x2014,
        "lsquo" => 0x2018,
        "rsquo" => 0x2019,
        "sbquo" => 0x201A,
        "ldquo" => 0x201C,
        "rdquo" => 0x201D,
        "bdquo" => 0x201E,
        "dagger" => 0x2020,
        "Dagger" => 0x2021,
        "bull" => 0x2022,
        "hellip" => 0x2026,
        "permil" => 0x2030,
        "prime" => 0x2032,
        "Prime" => 0x2033,
        "lsaquo" => 0x2039,
        "rsaquo" => 0x203A,
        "oline" => 0x203E,
        "frasl" => 0x2044,
        "euro" => 0x20AC,
        "trade" => 0x2122,
        "larr" => 0x2190,
        "uarr" => 0x2191,
        "rarr" => 0x2192,
        "darr" => 0x2193,
        "harr" => 0x2194,
        "minus" => 0x2212,
        "radic" => 0x221A,
        "infin" => 0x221E,
        "asymp" => 0x2248,
        "ne" => 0x2260,
        "le" => 0x2264,
        "ge" => 0x2265,
        "sdot" => 0x22C5,
        "loz" => 0x25CA,
        _ => greek_char(name)?,
    };
    char::from_u32(code)
}

/// Greek letter names. Capitals run from U+0391 with U+03A2 unassigned,
/// lower case from U+03B1.
fn greek_char(name: &str) -> Option<u32> {
    const LETTERS: [&str; 25] = [
        "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", //
        "iota", "kappa", "lambda", "mu", "nu", "xi", "omicron", "pi", //
        "rho", "sigmaf", "sigma", "tau", "upsilon", "phi", "chi", "psi", //
        "omega",
    ];
    let mut chars = name.chars();
    let first = chars.next()?;
    let lower = format!("{}{}", first.to_ascii_lowercase(), chars.as_str());
    let index = u32::try_from(LETTERS.iter().position(|&n| n == lower)?).ok()?;
    if first.is_ascii_lowercase() {
        Some(0x3B1 + index)
    } else if lower == "sigmaf" {
        None
    } else {
        Some(0x391 + index)
    }
}

/// Render a transcript as saved to disk: a metadata header, a rule, then
/// the body text.
#[must_use]
pub fn render_transcript_file(transcript: &Transcript, body: &TranscriptBody) -> String {
    format!(
        "{} ({})\n{}\nDate: {}\nQuarter: Q{} {}\n{}\n\n{}",
        transcript.company_name,
        transcript.ticker,
        transcript.title,
        transcript.day(),
        transcript.quarter,
        transcript.year,
        "=".repeat(60),
        body
    )
}
