//! Configuration options for the CapEdge client.
//!
//! The `ClientOptions` struct controls where requests go and how the
//! underlying transport is configured. Session cookies are kept separate
//! (see [`crate::CookieJar`]) because they are credentials, not settings.

use std::env;
use std::time::Duration;

use crate::cookies::CookieJar;
use crate::error::{Error, Result};

/// Default JSON API root. Endpoints are joined relative to it.
pub const DEFAULT_API_BASE: &str = "https://capedge.com/v1/api/";

/// Default site root, used for company profile pages.
pub const DEFAULT_SITE_BASE: &str = "https://capedge.com/";

/// Browser-like user agent; the site serves login pages to unknown agents.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Environment variable holding the session cookie string.
pub const COOKIES_ENV: &str = "CAPEDGE_COOKIES";

/// Configuration options for [`crate::CapEdgeClient`].
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use capedge_client::ClientOptions;
///
/// let options = ClientOptions {
///     timeout: Some(Duration::from_secs(10)),
///     ..ClientOptions::default()
/// };
/// assert_eq!(options.api_base, "https://capedge.com/v1/api/");
/// ```
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Root of the JSON API. Must end with `/` for relative joins to work;
    /// a missing trailing slash is added when the client is built.
    ///
    /// Default: `https://capedge.com/v1/api/`
    pub api_base: String,

    /// Root of the public site (company profile pages).
    ///
    /// Default: `https://capedge.com/`
    pub site_base: String,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Per-request timeout applied by the transport.
    ///
    /// Default: `None` (no timeout)
    pub timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            site_base: DEFAULT_SITE_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

impl ClientOptions {
    /// Defaults, overridden by `CAPEDGE_API_BASE`, `CAPEDGE_SITE_BASE` and
    /// `CAPEDGE_TIMEOUT_SECS` when set.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();
        if let Some(base) = non_empty_var("CAPEDGE_API_BASE") {
            options.api_base = base;
        }
        if let Some(base) = non_empty_var("CAPEDGE_SITE_BASE") {
            options.site_base = base;
        }
        if let Some(secs) = non_empty_var("CAPEDGE_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Config(format!("CAPEDGE_TIMEOUT_SECS must be whole seconds, got {secs:?}"))
            })?;
            options.timeout = Some(Duration::from_secs(secs));
        }
        Ok(options)
    }
}

/// Read the session cookies from `CAPEDGE_COOKIES`.
pub fn cookies_from_env() -> Result<CookieJar> {
    non_empty_var(COOKIES_ENV)
        .map(|s| CookieJar::parse(s.trim()))
        .ok_or_else(|| {
            Error::Config(format!(
                "{COOKIES_ENV} not found in environment; copy the Cookie header from a logged-in browser session"
            ))
        })
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Make sure a base URL ends with `/` so `Url::join` keeps its last segment.
pub(crate) fn with_trailing_slash(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    }
}
