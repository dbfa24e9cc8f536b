use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::detail::{ArticleDetail, ArticleList};
use crate::types::{ArticleId, ArticleQuery, DashboardData, DateRange};
use crate::{Error, Result};

/// Where dashboard data comes from. The production implementation talks to
/// the upstream HTTP API; tests and offline runs use [`MemorySource`].
#[async_trait]
pub trait DashboardSource: Send + Sync {
    /// Dashboard aggregates, optionally narrowed to a date range
    async fn dashboard(&self, range: &DateRange) -> Result<DashboardData>;

    /// Full record for one article
    async fn article(&self, id: &ArticleId) -> Result<ArticleDetail>;

    /// Paged article listing
    async fn articles(&self, query: &ArticleQuery) -> Result<ArticleList>;

    fn name(&self) -> &str;
}

/// Snapshot file layout accepted by [`MemorySource::from_json_file`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub dashboard: DashboardData,
    pub articles: Vec<ArticleDetail>,
}

struct MemoryStore {
    dashboard: DashboardData,
    articles: Vec<ArticleDetail>,
}

impl MemoryStore {
    fn dashboard(&self, range: &DateRange) -> DashboardData {
        let mut data = self.dashboard.clone();
        data.latest_indian_news.retain(|a| range.contains(a.date));
        data.timeline_events.retain(|e| range.contains(e.date));
        data
    }

    fn article(&self, id: &ArticleId) -> Result<ArticleDetail> {
        self.articles
            .iter()
            .find(|a| &a.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("article {}", id)))
    }

    fn articles(&self, query: &ArticleQuery) -> ArticleList {
        let search = query.search.as_deref().map(str::to_lowercase);
        let mut matching: Vec<&ArticleDetail> = self
            .articles
            .iter()
            .filter(|a| query.source.as_deref().map_or(true, |s| a.source == s))
            .filter(|a| query.sentiment.map_or(true, |s| a.sentiment == Some(s)))
            .filter(|a| query.range.contains(a.published_date))
            .filter(|a| {
                search.as_deref().map_or(true, |needle| {
                    a.title.to_lowercase().contains(needle)
                        || a.text.as_deref().map_or(false, |t| t.to_lowercase().contains(needle))
                })
            })
            .collect();
        matching.sort_by(|a, b| b.published_date.cmp(&a.published_date));

        let total = matching.len() as u64;
        let results: Vec<ArticleDetail> = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect();
        ArticleList {
            total,
            count: results.len() as u64,
            results,
        }
    }
}

/// In-process source backed by a fixed snapshot.
pub struct MemorySource {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemorySource {
    pub fn new(dashboard: DashboardData, articles: Vec<ArticleDetail>) -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore { dashboard, articles })),
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self::new(snapshot.dashboard, snapshot.articles)
    }

    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        debug!(
            "Loaded snapshot {} ({} news items, {} articles)",
            path.display(),
            snapshot.dashboard.latest_indian_news.len(),
            snapshot.articles.len()
        );
        Ok(Self::from_snapshot(snapshot))
    }
}

#[async_trait]
impl DashboardSource for MemorySource {
    async fn dashboard(&self, range: &DateRange) -> Result<DashboardData> {
        Ok(self.store.read().await.dashboard(range))
    }

    async fn article(&self, id: &ArticleId) -> Result<ArticleDetail> {
        self.store.read().await.article(id)
    }

    async fn articles(&self, query: &ArticleQuery) -> Result<ArticleList> {
        Ok(self.store.read().await.articles(query))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
