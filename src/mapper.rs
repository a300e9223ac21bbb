//! Response mapping: raw API payloads in, typed records out.
//!
//! Every JSON body goes through [`check_body`] first, which is the only
//! place a dead session is detected. Payloads are then decoded into the
//! wire structs below, which spell out which fields are required. A missing
//! required field is a [`Error::Mapping`], never a silent default.

use log::{debug, warn};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{Company, CompanyProfile, IpoFiling, Paged, Transcript};

/// Company search endpoint, relative to the API base.
pub const SEARCH_ENDPOINT: &str = "search/company";

/// Transcript listing endpoint, relative to the API base.
pub const TRANSCRIPTS_ENDPOINT: &str = "transcripts";

/// IPO filing listing endpoint, relative to the API base.
pub const IPOS_ENDPOINT: &str = "ipos/latest";

/// Ordered query parameters for one request.
pub type Query = Vec<(&'static str, String)>;

// === Body validation ===

/// Validate a raw response body and decode it as JSON.
///
/// A body that starts with an HTML document marker means the session
/// cookies are no longer accepted; that is reported as
/// [`Error::SessionExpired`] and never as a decode error.
pub fn check_body(body: &str) -> Result<Value> {
    if looks_like_html(body) {
        warn!("Received HTML where JSON was expected; session cookies are likely expired");
        return Err(Error::SessionExpired);
    }
    serde_json::from_str(body).map_err(Error::Decode)
}

/// Whether `body` begins with `<!DOCTYPE html` or `<html`.
///
/// Case-insensitive; leading whitespace and a byte-order mark are ignored.
#[must_use]
pub fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start_matches('\u{feff}').trim_start();
    starts_with_ignore_case(head, "<!doctype html") || starts_with_ignore_case(head, "<html")
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}

// === Query construction ===

#[must_use]
pub fn search_query(query: &str) -> Query {
    vec![("q", query.to_string())]
}

/// Query for the transcript listing.
///
/// `company_id` of `None` *and* `Some(0)` both mean "no filter": the
/// parameter is left out entirely. Upstream treats a falsy id that way and
/// CIK 0 is not a real company, so this mirrors what the site does.
#[must_use]
pub fn transcript_query(page: u32, company_id: Option<u64>) -> Query {
    let mut query = vec![("page", page.to_string())];
    if let Some(id) = company_id.filter(|&id| id != 0) {
        query.push(("companyId", id.to_string()));
    }
    query
}

#[must_use]
pub fn ipo_query(page: u32, limit: usize) -> Query {
    vec![("page", page.to_string()), ("limit", limit.to_string())]
}

// === Wire format ===

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    total: Option<u64>,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

impl<T> Envelope<T> {
    fn into_paged<R>(self, f: impl FnMut(T) -> R) -> Paged<R> {
        Paged {
            total: self.total.unwrap_or(0),
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(u64),
    Text(String),
}

/// Identifier that may arrive as a JSON string or number.
fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<String, D::Error> {
    match Scalar::deserialize(de)? {
        Scalar::Int(n) => Ok(n.to_string()),
        Scalar::Text(s) => Ok(s),
    }
}

/// Numeric identifier that may arrive quoted.
fn number_or_string<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<u64, D::Error> {
    match Scalar::deserialize(de)? {
        Scalar::Int(n) => Ok(n),
        Scalar::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected a numeric CIK, got {s:?}"))),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompany {
    #[serde(deserialize_with = "string_or_number")]
    value: String,
    label: String,
    #[serde(default)]
    trading_symbol: Option<String>,
}

#[derive(Deserialize)]
struct RawCompanyRef {
    name: String,
    #[serde(deserialize_with = "number_or_string")]
    cik: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTranscript {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    company: RawCompanyRef,
    #[serde(default)]
    ticker: Option<String>,
    year: i32,
    quarter: u8,
    title: String,
    date: String,
    transcript_url: String,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(default)]
    market_cap: Option<f64>,
}

#[derive(Deserialize)]
struct RawFiler {
    #[serde(deserialize_with = "number_or_string")]
    cik: u64,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIpoFiling {
    #[serde(default, deserialize_with = "string_or_number")]
    id: String,
    #[serde(default, rename = "type")]
    form_type: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    date: Option<String>,
    filer: RawFiler,
    #[serde(default)]
    is_follow_on: Option<bool>,
}

#[derive(Deserialize)]
struct Section<T> {
    #[serde(default)]
    data: Option<T>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct RawQuote {
    market_cap: Option<f64>,
    latest_price: Option<f64>,
    pe_ratio: Option<f64>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawStats {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Description")]
    description: Option<String>,
    #[serde(rename = "Exchange")]
    exchange: Option<String>,
    #[serde(rename = "Sector")]
    sector: Option<String>,
    #[serde(rename = "Industry")]
    industry: Option<String>,
    #[serde(rename = "Country")]
    country: Option<String>,
    #[serde(rename = "Address")]
    address: Option<String>,
    #[serde(rename = "OfficialSite")]
    official_site: Option<String>,
    #[serde(rename = "week52High")]
    week_52_high: Option<f64>,
    #[serde(rename = "week52Low")]
    week_52_low: Option<f64>,
    #[serde(rename = "sharesOutstanding")]
    shares_outstanding: Option<f64>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawRealtime {
    quote: Option<Section<RawQuote>>,
    stats: Option<Section<RawStats>>,
}

fn decode<T: DeserializeOwned>(endpoint: &str, payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|source| Error::Mapping {
        endpoint: endpoint.to_string(),
        source,
    })
}

// === Mapping ===

/// Map a company search payload, preserving upstream order.
pub fn map_companies(payload: Value) -> Result<Vec<Company>> {
    let envelope: Envelope<RawCompany> = decode(SEARCH_ENDPOINT, payload)?;
    let companies: Vec<Company> = envelope
        .data
        .into_iter()
        .map(|raw| Company {
            cik: raw.value,
            name: raw.label,
            ticker: raw.trading_symbol,
        })
        .collect();
    debug!("Mapped {} company search results", companies.len());
    Ok(companies)
}

/// Map a transcript listing payload.
pub fn map_transcripts(payload: Value) -> Result<Paged<Transcript>> {
    let envelope: Envelope<RawTranscript> = decode(TRANSCRIPTS_ENDPOINT, payload)?;
    let page = envelope.into_paged(|raw| Transcript {
        id: raw.id,
        company_name: raw.company.name,
        cik: raw.company.cik,
        ticker: raw.ticker.unwrap_or_default(),
        year: raw.year,
        quarter: raw.quarter,
        title: raw.title,
        date: raw.date,
        transcript_url: raw.transcript_url,
        exchange: raw.exchange,
        market_cap: raw.market_cap,
    });
    debug!("Mapped {} of {} transcripts", page.data.len(), page.total);
    Ok(page)
}

/// Map an IPO filing listing payload.
///
/// Only `filer.cik` is required; descriptive strings default to empty and
/// `isFollowOn` to `false`.
pub fn map_ipo_filings(payload: Value) -> Result<Paged<IpoFiling>> {
    let envelope: Envelope<RawIpoFiling> = decode(IPOS_ENDPOINT, payload)?;
    let page = envelope.into_paged(|raw| IpoFiling {
        id: raw.id,
        form_type: raw.form_type.unwrap_or_default(),
        filename: raw.filename.unwrap_or_default(),
        date: raw.date.unwrap_or_default(),
        cik: raw.filer.cik,
        company_name: raw.filer.name.unwrap_or_default(),
        is_follow_on: raw.is_follow_on.unwrap_or(false),
    });
    debug!("Mapped {} of {} IPO filings", page.data.len(), page.total);
    Ok(page)
}

/// Map a realtime company data payload.
///
/// Returns `None` when the payload names no company and carries no
/// description, which is what the site sends for unknown tickers.
pub fn map_company_profile(
    cik: u64,
    ticker: &str,
    endpoint: &str,
    payload: Value,
) -> Result<Option<CompanyProfile>> {
    let raw: RawRealtime = decode(endpoint, payload)?;
    let quote = raw.quote.and_then(|s| s.data).unwrap_or_default();
    let stats = raw.stats.and_then(|s| s.data).unwrap_or_default();

    let name = stats.name.unwrap_or_default();
    let description = stats.description.unwrap_or_default();
    if name.is_empty() && description.is_empty() {
        return Ok(None);
    }

    Ok(Some(CompanyProfile {
        cik,
        ticker: ticker.to_string(),
        name,
        description,
        exchange: stats.exchange,
        sector: stats.sector,
        industry: stats.industry,
        country: stats.country,
        address: stats.address,
        website: stats.official_site,
        market_cap: quote.market_cap,
        price: quote.latest_price,
        pe_ratio: quote.pe_ratio,
        week_52_high: stats.week_52_high,
        week_52_low: stats.week_52_low,
        shares_outstanding: stats.shares_outstanding,
    }))
}
