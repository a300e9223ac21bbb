#![allow(clippy::expect_used)] // expect() is appropriate in tests for clear panic messages

use capedge_client::{extract_transcript, Segment, TranscriptBody};

const PAGE: &str = include_str!("fixtures/transcript_page.html");

#[test]
fn extracts_speakers_in_document_order() {
    let body = extract_transcript(PAGE);
    let speakers: Vec<&str> = body.segments.iter().map(|s| s.speaker.as_str()).collect();
    assert_eq!(
        speakers,
        vec![
            "Operator",
            "Colin Canfield -- Vice President, Investor Relations",
            "Peter Beck -- Founder and Chief Executive Officer",
            "Operator",
        ]
    );
}

#[test]
fn headings_outside_the_grid_are_ignored() {
    let body = extract_transcript(PAGE);
    assert!(body.segments.iter().all(|s| s.speaker != "Menu"));
    assert!(!body.to_text().contains("Not part of the transcript"));
}

#[test]
fn segment_count_matches_grid_headings() {
    let body = extract_transcript(PAGE);
    let headings_in_grid = PAGE
        .split("<div class=\"grid")
        .nth(1)
        .map(|grid| grid.matches("<h3").count())
        .unwrap_or_default();
    assert_eq!(body.len(), headings_in_grid);
}

#[test]
fn paragraphs_are_decoded() {
    let body = extract_transcript(PAGE);
    let ceo = &body.segments[2];
    assert_eq!(ceo.paragraphs.len(), 3);
    assert!(ceo.paragraphs[0].contains("record quarter & we delivered"));
    assert_eq!(ceo.paragraphs[2], "We're excited about what comes next.");
}

#[test]
fn double_escaped_named_and_numeric_references_are_decoded() {
    let html = r#"<div class="r6o-annotatable"><div class="grid"><h3>CFO</h3><div><p>Caf&amp;eacute; &amp;copy;2024 &amp;euro;5 &amp;amp</p><p>Q3&amp;#150;Q4 &amp;#0;</p></div></div></div>"#;
    let body = extract_transcript(html);
    assert_eq!(
        body.segments[0].paragraphs,
        vec!["Caf\u{e9} \u{a9}2024 \u{20ac}5 &", "Q3\u{2013}Q4 \u{fffd}"]
    );
}

#[test]
fn extraction_is_deterministic() {
    assert_eq!(extract_transcript(PAGE), extract_transcript(PAGE));
}

#[test]
fn grid_example_from_two_speakers() {
    let html = r#"<div class="r6o-annotatable"><div class="grid"><h3>Alice</h3><div><p>Hi</p><p>There</p></div><h3>Bob</h3><div><p>Yo</p></div></div></div>"#;
    let expected = TranscriptBody {
        segments: vec![
            Segment {
                speaker: "Alice".to_string(),
                paragraphs: vec!["Hi".to_string(), "There".to_string()],
            },
            Segment {
                speaker: "Bob".to_string(),
                paragraphs: vec!["Yo".to_string()],
            },
        ],
    };
    assert_eq!(extract_transcript(html), expected);
}

#[test]
fn pages_without_transcript_markup_are_empty() {
    for html in [
        "",
        "<html><body><p>Transcript coming soon</p></body></html>",
        r#"<div class="r6o-annotatable"><p>No grid yet</p></div>"#,
        r#"<div class="r6o-annotatable"><div class="grid"></div></div>"#,
        "<p>text<div>more",
    ] {
        assert!(extract_transcript(html).is_empty(), "expected empty for {html:?}");
    }
}

#[test]
fn rendered_text_has_bracketed_speakers() {
    let text = extract_transcript(PAGE).to_text();
    assert!(text.starts_with("[Operator]\n\nGood afternoon"));
    assert!(text.contains("\n\n[Colin Canfield -- Vice President, Investor Relations]\n\n"));
    assert!(text.ends_with("Erik Rasmussen with Stifel.\n"));
}
