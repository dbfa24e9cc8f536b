use thiserror::Error;

/// Messages shown to end users when a fetch fails.
pub const DASHBOARD_FAILED: &str = "Failed to fetch dashboard data.";
pub const ARTICLE_FAILED: &str = "Failed to load article.";
pub const ARTICLE_NOT_FOUND: &str = "Article not found.";

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// True when the failure came from talking to the upstream API rather
    /// than from the caller's own input.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Upstream { .. } | Error::Serialization(_) | Error::External(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
