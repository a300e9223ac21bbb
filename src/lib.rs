//! # capedge-client
//!
//! Blocking client for the CapEdge API: SEC company search, earnings call
//! transcripts and IPO filings.
//!
//! The API authenticates with browser session cookies. This crate does not
//! log in or refresh them; when the cookies stop working the API answers
//! with an HTML login page and every call fails with
//! [`Error::SessionExpired`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use capedge_client::CapEdgeClient;
//!
//! let client = CapEdgeClient::from_cookie_string("sessionId=...; __Secure-authjs.session-token=...")?;
//!
//! let page = client.list_transcripts(1, None)?;
//! println!("Total transcripts: {}", page.total);
//!
//! if let Some(latest) = page.data.first() {
//!     let body = client.fetch_transcript(latest)?;
//!     print!("{body}");
//! }
//! # Ok::<(), capedge_client::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Company search**: name or ticker to CIK and trading symbol
//! - **Transcripts**: paginated listings, per company or across the market
//! - **Transcript text**: speaker-by-speaker extraction from transcript pages
//! - **IPO filings**: latest IPO and follow-on registrations
//! - **Company profiles**: realtime quote and key stats

mod client;
mod cookies;
mod error;
mod models;
mod options;

/// DOM helpers used by the transcript extractor.
pub mod dom;

/// Payload validation, query construction and record mapping.
pub mod mapper;

/// Transcript page extraction and rendering.
pub mod transcript;

// Public API - re-exports
pub use client::CapEdgeClient;
pub use cookies::CookieJar;
pub use error::{Error, Result};
pub use models::{Company, CompanyProfile, IpoFiling, Paged, Transcript};
pub use options::{cookies_from_env, ClientOptions, COOKIES_ENV, DEFAULT_API_BASE, DEFAULT_SITE_BASE};
pub use transcript::{extract_transcript, render_transcript_file, Segment, TranscriptBody};
