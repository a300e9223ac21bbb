//! Record types returned by the client.
//!
//! All records are plain values: built once by the mapper and never
//! mutated afterwards.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Company search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Company {
    /// SEC Central Index Key, as sent upstream (string form).
    pub cik: String,

    /// Company name.
    pub name: String,

    /// Trading symbol, when the company has one.
    pub ticker: Option<String>,
}

impl Company {
    /// CIK as a number, if it is numeric.
    #[must_use]
    pub fn cik_number(&self) -> Option<u64> {
        self.cik.trim().parse().ok()
    }
}

/// Earnings call transcript metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    pub id: String,
    pub company_name: String,
    pub cik: u64,

    /// Empty when upstream has no ticker for the listing.
    pub ticker: String,

    pub year: i32,

    /// Fiscal quarter, 1-4. Trusted as sent.
    pub quarter: u8,

    pub title: String,

    /// ISO-8601 timestamp, kept verbatim.
    pub date: String,

    /// Absolute URL of the HTML transcript page.
    pub transcript_url: String,

    pub exchange: Option<String>,
    pub market_cap: Option<f64>,
}

impl Transcript {
    /// Parse `date` as an RFC 3339 timestamp.
    #[must_use]
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }

    /// The `YYYY-MM-DD` prefix of `date`.
    #[must_use]
    pub fn day(&self) -> &str {
        self.date.get(..10).unwrap_or(&self.date)
    }

    /// File name used when saving this transcript, e.g. `AAPL_2024_Q3.txt`.
    #[must_use]
    pub fn file_name(&self) -> String {
        let ticker = if self.ticker.is_empty() {
            self.cik.to_string()
        } else {
            self.ticker.clone()
        };
        format!("{ticker}_{}_Q{}.txt", self.year, self.quarter)
    }
}

/// IPO or follow-on registration filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpoFiling {
    pub id: String,

    /// SEC form type, e.g. `S-1` or `F-1/A`.
    pub form_type: String,

    pub filename: String,
    pub date: String,

    /// CIK of the filer.
    pub cik: u64,

    /// Name of the filer.
    pub company_name: String,

    /// Offering by an already-public company.
    pub is_follow_on: bool,
}

impl IpoFiling {
    #[must_use]
    pub fn registration_kind(&self) -> &'static str {
        if self.is_follow_on {
            "Follow-On"
        } else {
            "IPO"
        }
    }
}

/// One page of a paginated listing.
///
/// `total` counts every matching item upstream and is authoritative even
/// when `data` holds a partial page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paged<T> {
    pub total: u64,
    pub data: Vec<T>,
}

/// Company profile from the realtime quote page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyProfile {
    pub cik: u64,
    pub ticker: String,
    pub name: String,
    pub description: String,
    pub exchange: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub market_cap: Option<f64>,
    pub price: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub week_52_high: Option<f64>,
    pub week_52_low: Option<f64>,
    pub shares_outstanding: Option<f64>,
}
