//! Session cookies supplied by the caller.
//!
//! CapEdge authenticates with opaque browser session cookies. They are
//! obtained out of band (usually copied from DevTools) and handed to the
//! client either as a map or as a `Cookie` header string.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::str::FromStr;

/// Name → value mapping of session cookies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: BTreeMap<String, String>,
}

impl CookieJar {
    /// Create an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `name=value; name=value` string.
    ///
    /// Segments are split on `"; "` and each one on its first `=` only, so
    /// values may themselves contain `=`. Segments without `=` are dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use capedge_client::CookieJar;
    ///
    /// let jar = CookieJar::parse("a=1; b=2; malformed; c=3");
    /// assert_eq!(jar.len(), 3);
    /// assert_eq!(jar.get("b"), Some("2"));
    /// assert_eq!(jar.get("malformed"), None);
    /// ```
    #[must_use]
    pub fn parse(cookie_string: &str) -> Self {
        let cookies = cookie_string
            .split("; ")
            .filter_map(|item| item.split_once('='))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Self { cookies }
    }

    /// Add or replace a cookie.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Iterate cookies in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render the jar as a `Cookie` request header value.
    ///
    /// Returns `None` for an empty jar so no header is sent at all.
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self.iter().map(|(k, v)| format!("{k}={v}")).collect();
        Some(pairs.join("; "))
    }
}

impl FromStr for CookieJar {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CookieJar {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let cookies = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { cookies }
    }
}
