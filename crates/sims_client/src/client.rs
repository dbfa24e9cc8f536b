use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use sims_core::{
    ArticleDetail, ArticleId, ArticleList, ArticleQuery, DashboardData, DashboardSource,
    DateRange, Error, Result,
};
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;

/// `DashboardSource` backed by the upstream HTTP API.
pub struct ApiClient {
    http: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Appends path segments to the base URL, keeping any path prefix the
    /// base already has. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(self.config.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&'static str, String)],
    ) -> Result<T> {
        debug!("GET {} {:?}", url, params);
        let response = self.http.get(url.clone()).query(params).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(url.path().to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            warn!("Upstream {} answered {}: {}", url, status, message);
            return Err(Error::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Pulls `error` out of a JSON error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("http", &"<reqwest::Client>")
            .field("base_url", &self.config.base_url.as_str())
            .field("timeout", &self.config.timeout)
            .finish()
    }
}

#[async_trait]
impl DashboardSource for ApiClient {
    async fn dashboard(&self, range: &DateRange) -> Result<DashboardData> {
        let url = self.endpoint(&["api", "dashboard"])?;
        let data: DashboardData = self.get_json(url, &range.to_params()).await?;
        debug!(
            "Dashboard returned {} news items",
            data.latest_indian_news.len()
        );
        Ok(data)
    }

    async fn article(&self, id: &ArticleId) -> Result<ArticleDetail> {
        let url = self.endpoint(&["api", "articles", id.as_str()])?;
        self.get_json(url, &[]).await
    }

    async fn articles(&self, query: &ArticleQuery) -> Result<ArticleList> {
        let url = self.endpoint(&["api", "articles"])?;
        self.get_json(url, &query.to_params()).await
    }

    fn name(&self) -> &str {
        "api"
    }
}
