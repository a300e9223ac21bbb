//! Blocking CapEdge API client.
//!
//! Each operation issues exactly one GET and returns before the caller
//! continues. There is no caching and no retrying: every call re-fetches,
//! and every failure goes straight back to the caller.

use chrono::{DateTime, Utc};
use log::debug;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE};
use serde_json::Value;
use url::Url;

use crate::cookies::CookieJar;
use crate::error::{Error, Result};
use crate::mapper::{self, Query, IPOS_ENDPOINT, SEARCH_ENDPOINT, TRANSCRIPTS_ENDPOINT};
use crate::models::{Company, CompanyProfile, IpoFiling, Paged, Transcript};
use crate::options::{cookies_from_env, with_trailing_slash, ClientOptions};
use crate::transcript::{extract_transcript, TranscriptBody};

const ACCEPT_JSON: &str = "application/json";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml";

/// Client for the CapEdge API.
///
/// Owns one HTTP transport (connection pool plus the session cookies) for
/// its whole lifetime. It is meant to be driven from one thread; build one
/// client per thread or task rather than sharing one.
///
/// # Example
///
/// ```rust,no_run
/// use capedge_client::CapEdgeClient;
///
/// let client = CapEdgeClient::from_cookie_string("sessionId=...; __Secure-authjs.session-token=...")?;
/// if let Some(cik) = client.find_company_cik("AAPL")? {
///     let page = client.list_transcripts_for_company(cik, 1)?;
///     println!("{} transcripts", page.total);
/// }
/// # Ok::<(), capedge_client::Error>(())
/// ```
#[derive(Debug)]
pub struct CapEdgeClient {
    http: Client,
    api_base: Url,
    site_base: Url,
}

impl CapEdgeClient {
    /// Client with default options.
    pub fn new(cookies: &CookieJar) -> Result<Self> {
        Self::with_options(cookies, &ClientOptions::default())
    }

    /// Client with custom options.
    pub fn with_options(cookies: &CookieJar, options: &ClientOptions) -> Result<Self> {
        let api_base = Url::parse(&with_trailing_slash(&options.api_base))?;
        let site_base = Url::parse(&with_trailing_slash(&options.site_base))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
        if let Some(cookie) = cookies.header_value() {
            let mut value = HeaderValue::from_str(&cookie)
                .map_err(|e| Error::Config(format!("Cookie value is not a valid header: {e}")))?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let http = Client::builder()
            .user_agent(options.user_agent.as_str())
            .default_headers(headers)
            .timeout(options.timeout)
            .build()?;

        debug!(
            "CapEdge client ready (api: {api_base}, {} cookies)",
            cookies.len()
        );
        Ok(Self {
            http,
            api_base,
            site_base,
        })
    }

    /// Client from a `Cookie` header string copied out of a browser.
    pub fn from_cookie_string(cookie_string: &str) -> Result<Self> {
        Self::new(&CookieJar::parse(cookie_string))
    }

    /// Client configured from `CAPEDGE_COOKIES` and the optional
    /// `CAPEDGE_*` overrides.
    pub fn from_env() -> Result<Self> {
        let cookies = cookies_from_env()?;
        Self::with_options(&cookies, &ClientOptions::from_env()?)
    }

    // === Transport ===

    fn send(&self, url: Url, query: &Query, accept: &'static str) -> Result<Response> {
        debug!("GET {url} {query:?}");
        let response = self
            .http
            .get(url)
            .query(query)
            .header(ACCEPT, accept)
            .send()?
            .error_for_status()?;
        Ok(response)
    }

    fn get_json(&self, url: Url, query: &Query) -> Result<Value> {
        let body = self.send(url, query, ACCEPT_JSON)?.text()?;
        mapper::check_body(&body)
    }

    fn api_get(&self, endpoint: &str, query: &Query) -> Result<Value> {
        let url = self.api_base.join(endpoint)?;
        self.get_json(url, query)
    }

    // === Company search ===

    /// Search companies by name or ticker. Upstream order is preserved.
    ///
    /// An empty query is sent as-is.
    pub fn search_company(&self, query: &str) -> Result<Vec<Company>> {
        let payload = self.api_get(SEARCH_ENDPOINT, &mapper::search_query(query))?;
        mapper::map_companies(payload)
    }

    /// CIK of the first search result, or `None` when nothing matches.
    ///
    /// First result wins; there is no exact-ticker disambiguation.
    pub fn find_company_cik(&self, name_or_ticker: &str) -> Result<Option<u64>> {
        let Some(first) = self.search_company(name_or_ticker)?.into_iter().next() else {
            return Ok(None);
        };
        first.cik_number().map(Some).ok_or_else(|| Error::Mapping {
            endpoint: SEARCH_ENDPOINT.to_string(),
            source: serde::de::Error::custom(format!("non-numeric CIK {:?}", first.cik)),
        })
    }

    /// Ticker for a company, looked up by name.
    ///
    /// Prefers the result whose CIK matches `cik`; otherwise the first
    /// result that has a ticker at all.
    pub fn find_ticker(&self, cik: u64, name: &str) -> Result<Option<String>> {
        let companies = self.search_company(name)?;
        let exact = companies
            .iter()
            .find(|c| c.cik_number() == Some(cik) && c.ticker.is_some());
        Ok(exact
            .or_else(|| companies.iter().find(|c| c.ticker.is_some()))
            .and_then(|c| c.ticker.clone()))
    }

    // === Transcripts ===

    /// One page of earnings call transcripts, newest first.
    ///
    /// `company_id` of `None` or `Some(0)` lists all companies.
    pub fn list_transcripts(&self, page: u32, company_id: Option<u64>) -> Result<Paged<Transcript>> {
        let query = mapper::transcript_query(page, company_id);
        let payload = self.api_get(TRANSCRIPTS_ENDPOINT, &query)?;
        mapper::map_transcripts(payload)
    }

    pub fn list_transcripts_for_company(&self, cik: u64, page: u32) -> Result<Paged<Transcript>> {
        self.list_transcripts(page, Some(cik))
    }

    /// At most `limit` transcripts from the first page.
    ///
    /// Never fetches a second page, even when `limit` exceeds the page size.
    pub fn latest_transcripts(&self, limit: usize) -> Result<Vec<Transcript>> {
        let mut page = self.list_transcripts(1, None)?;
        page.data.truncate(limit);
        Ok(page.data)
    }

    /// First-page transcripts published at or after `since`.
    ///
    /// Listings whose date does not parse are left out.
    pub fn recent_transcripts(&self, since: DateTime<Utc>) -> Result<Vec<Transcript>> {
        let page = self.list_transcripts(1, None)?;
        Ok(page
            .data
            .into_iter()
            .filter(|t| t.published_at().is_some_and(|at| at >= since))
            .collect())
    }

    /// GET an arbitrary page and return its body text.
    ///
    /// Relative URLs are resolved against the site root.
    pub fn fetch_html(&self, url: &str) -> Result<String> {
        let url = self.site_base.join(url)?;
        Ok(self.send(url, &Query::new(), ACCEPT_HTML)?.text()?)
    }

    /// Fetch a transcript's page and extract its body.
    ///
    /// An empty body means the page has no transcript markup yet.
    pub fn fetch_transcript(&self, transcript: &Transcript) -> Result<TranscriptBody> {
        let html = self.fetch_html(&transcript.transcript_url)?;
        Ok(extract_transcript(&html))
    }

    // === IPO filings ===

    /// One page of the latest IPO and follow-on registration filings.
    pub fn list_ipo_filings(&self, page: u32, limit: usize) -> Result<Paged<IpoFiling>> {
        let payload = self.api_get(IPOS_ENDPOINT, &mapper::ipo_query(page, limit))?;
        let mut filings = mapper::map_ipo_filings(payload)?;
        filings.data.truncate(limit);
        Ok(filings)
    }

    // === Company profiles ===

    /// Realtime quote and key stats for a listed company.
    ///
    /// `None` when the site has no data for that ticker. The ticker is
    /// percent-encoded as a single path segment.
    pub fn company_profile(&self, cik: u64, ticker: &str) -> Result<Option<CompanyProfile>> {
        let cik_segment = cik.to_string();
        let mut url = self.site_base.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("site base {} cannot take a path", self.site_base)))?
            .pop_if_empty()
            .extend(["company", cik_segment.as_str(), ticker, "data", "realtime"]);
        let payload = self.get_json(url, &Query::new())?;
        let endpoint = format!("company/{cik}/{ticker}/data/realtime");
        mapper::map_company_profile(cik, ticker, &endpoint, payload)
    }
}
