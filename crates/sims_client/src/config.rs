use std::time::Duration;

use sims_core::{Error, Result};
use url::Url;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the upstream API lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout,
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(DEFAULT_API_URL, DEFAULT_TIMEOUT)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|e| Error::InvalidUrl(format!("{}: {}", trimmed, e)))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::InvalidUrl(format!(
                "{}: unsupported scheme {}",
                trimmed, other
            )))
        }
    }
    if url.cannot_be_a_base() {
        return Err(Error::InvalidUrl(format!("{}: not a base URL", trimmed)));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_urls() {
        let config = ClientConfig::new("http://localhost:5000/", Duration::from_secs(5)).unwrap();
        assert_eq!(config.base_url.host_str(), Some("localhost"));
        assert_eq!(config.base_url.port(), Some(5000));
        assert_eq!(config.timeout, Duration::from_secs(5));

        let defaults = ClientConfig::with_defaults().unwrap();
        assert_eq!(defaults.base_url.as_str(), "http://127.0.0.1:5000/");
        assert_eq!(defaults.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_rejects_bad_urls() {
        for raw in ["not a url", "ftp://example.com", "mailto:news@example.com", ""] {
            let err = ClientConfig::new(raw, DEFAULT_TIMEOUT).unwrap_err();
            assert!(matches!(err, Error::InvalidUrl(_)), "{}", raw);
        }
    }
}
