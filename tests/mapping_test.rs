#![allow(clippy::expect_used)] // expect() is appropriate in tests for clear panic messages

use capedge_client::mapper::{check_body, map_ipo_filings, map_transcripts, transcript_query};
use capedge_client::Error;
use serde_json::json;

fn transcript_item(id: u64, ticker: Option<&str>) -> serde_json::Value {
    let mut item = json!({
        "id": id,
        "company": {"name": "Apple Inc.", "cik": 320_193},
        "year": 2024,
        "quarter": 4,
        "title": "Q4 2024 Earnings Call",
        "date": "2024-10-31T21:00:00.000Z",
        "transcriptUrl": format!("https://capedge.com/transcript/{id}"),
        "exchange": "NASDAQ",
        "marketCap": 3.4e12
    });
    if let Some(t) = ticker {
        item["ticker"] = json!(t);
    }
    item
}

#[test]
fn transcript_listing_maps_every_field() {
    let payload = json!({"total": 812, "data": [transcript_item(1, Some("AAPL"))]});
    let page = map_transcripts(payload).expect("mapping");
    assert_eq!(page.total, 812);
    let t = &page.data[0];
    assert_eq!(t.id, "1");
    assert_eq!(t.company_name, "Apple Inc.");
    assert_eq!(t.cik, 320_193);
    assert_eq!(t.ticker, "AAPL");
    assert_eq!((t.year, t.quarter), (2024, 4));
    assert_eq!(t.transcript_url, "https://capedge.com/transcript/1");
    assert_eq!(t.exchange.as_deref(), Some("NASDAQ"));
    assert_eq!(t.market_cap, Some(3.4e12));
}

#[test]
fn absent_ticker_and_optionals_default() {
    let mut item = transcript_item(2, None);
    item.as_object_mut().expect("object").remove("exchange");
    item.as_object_mut().expect("object").remove("marketCap");
    let page = map_transcripts(json!({"total": 1, "data": [item]})).expect("mapping");
    assert_eq!(page.data[0].ticker, "");
    assert_eq!(page.data[0].exchange, None);
    assert_eq!(page.data[0].market_cap, None);
}

#[test]
fn every_required_transcript_field_is_enforced() {
    for field in ["id", "year", "quarter", "title", "date", "transcriptUrl", "company"] {
        let mut item = transcript_item(3, Some("AAPL"));
        item.as_object_mut().expect("object").remove(field);
        let result = map_transcripts(json!({"total": 1, "data": [item]}));
        assert!(
            matches!(result, Err(Error::Mapping { .. })),
            "removing {field} should be a mapping error, got {result:?}"
        );
    }
    for field in ["name", "cik"] {
        let mut item = transcript_item(3, Some("AAPL"));
        item["company"].as_object_mut().expect("object").remove(field);
        let result = map_transcripts(json!({"total": 1, "data": [item]}));
        assert!(matches!(result, Err(Error::Mapping { .. })), "company.{field}");
    }
}

#[test]
fn total_covers_partial_pages() {
    let payload = json!({"total": 45, "data": [transcript_item(1, Some("A")), transcript_item(2, Some("B"))]});
    let page = map_transcripts(payload).expect("mapping");
    assert!(page.total >= page.data.len() as u64);
    assert_eq!(page.data.len(), 2);
}

#[test]
fn mapping_the_same_payload_twice_is_identical() {
    let payload = json!({"total": 3, "data": [transcript_item(9, Some("X")), transcript_item(8, None)]});
    let first = map_transcripts(payload.clone()).expect("mapping");
    let second = map_transcripts(payload).expect("mapping");
    assert_eq!(first, second);
    assert_eq!(first.data[0].id, "9");
    assert_eq!(first.data[1].id, "8");
}

#[test]
fn doctype_body_is_session_expired_not_decode_error() {
    let result = check_body("<!DOCTYPE html>\n<html><head><title>Sign in</title></head></html>");
    assert!(matches!(result, Err(Error::SessionExpired)));
}

#[test]
fn truncated_json_is_decode_error() {
    assert!(matches!(check_body(r#"{"total": 1, "data": ["#), Err(Error::Decode(_))));
}

#[test]
fn company_filter_quirk_zero_means_unfiltered() {
    let unfiltered = transcript_query(1, None);
    assert_eq!(transcript_query(1, Some(0)), unfiltered);
    assert!(transcript_query(1, Some(1_819_994))
        .iter()
        .any(|(k, v)| *k == "companyId" && v == "1819994"));
}

#[test]
fn ipo_listing_flattens_filer() {
    let payload = json!({"total": 120, "data": [
        {"id": "0001193125-24-123456", "type": "S-1", "filename": "d123456ds1.htm",
         "date": "2024-11-01T00:00:00.000Z", "filer": {"cik": 2_012_345, "name": "Acme Robotics, Inc."},
         "isFollowOn": false},
        {"id": "0001193125-24-654321", "type": "S-1/A", "filename": "d654321ds1a.htm",
         "date": "2024-11-02T00:00:00.000Z", "filer": {"cik": "1045810", "name": "NVIDIA CORP"},
         "isFollowOn": true}
    ]});
    let page = map_ipo_filings(payload).expect("mapping");
    assert_eq!(page.total, 120);
    assert_eq!(page.data[0].form_type, "S-1");
    assert_eq!(page.data[0].company_name, "Acme Robotics, Inc.");
    assert_eq!(page.data[0].registration_kind(), "IPO");
    assert_eq!(page.data[1].cik, 1_045_810);
    assert!(page.data[1].is_follow_on);
}
