use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::{de, ArticleId, ArticleSummary, FactCheck, Sentiment};

pub const DEFAULT_CATEGORY: &str = "General";
pub const NOT_COVERED: &str = "Not covered";
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// An article from a comparison outlet used to fact-check the main story.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaMatch {
    #[serde(default, deserialize_with = "de::text")]
    pub title: String,
    #[serde(default, deserialize_with = "de::text")]
    pub source: String,
    #[serde(default, deserialize_with = "de::non_empty")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comparison {
    #[serde(deserialize_with = "de::non_empty")]
    pub bangladeshi_media: Option<String>,
    #[serde(deserialize_with = "de::non_empty")]
    pub international_media: Option<String>,
}

/// The structured summary produced upstream for one article. It arrives
/// either as an object or as a one-element list, with snake_case or
/// camelCase keys depending on which prompt produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleAnalysis {
    #[serde(deserialize_with = "de::non_empty")]
    pub category: Option<String>,
    #[serde(deserialize_with = "de::label")]
    pub sentiment: Option<Sentiment>,
    #[serde(alias = "factCheck", deserialize_with = "de::label")]
    pub fact_check: Option<FactCheck>,
    pub comparison: Option<Comparison>,
    #[serde(alias = "bangladeshiMedia", deserialize_with = "de::non_empty")]
    pub bangladeshi_media: Option<String>,
    #[serde(alias = "internationalMedia", deserialize_with = "de::non_empty")]
    pub international_media: Option<String>,
    #[serde(alias = "bangladeshiMatches")]
    pub bangladeshi_matches: Option<Vec<MediaMatch>>,
    #[serde(alias = "internationalMatches")]
    pub international_matches: Option<Vec<MediaMatch>>,
}

impl ArticleAnalysis {
    fn bangladeshi_summary(&self) -> Option<&str> {
        self.comparison
            .as_ref()
            .and_then(|c| c.bangladeshi_media.as_deref())
            .or(self.bangladeshi_media.as_deref())
    }

    fn international_summary(&self) -> Option<&str> {
        self.comparison
            .as_ref()
            .and_then(|c| c.international_media.as_deref())
            .or(self.international_media.as_deref())
    }
}

fn analysis<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ArticleAnalysis>, D::Error> {
    let value = match Option::<Value>::deserialize(d)? {
        Some(Value::Array(items)) => items.into_iter().next(),
        other => other,
    };
    Ok(match value {
        Some(v @ Value::Object(_)) => serde_json::from_value(v).ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extras {
    #[serde(default, deserialize_with = "de::strings")]
    pub links: Vec<String>,
}

/// Compact card for "related" and "more from this source" lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedArticle {
    #[serde(default)]
    pub id: ArticleId,
    #[serde(default, deserialize_with = "de::text")]
    pub title: String,
    #[serde(default, deserialize_with = "de::text")]
    pub source: String,
    #[serde(default, deserialize_with = "de::non_empty")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "de::label")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, deserialize_with = "de::timestamp")]
    pub published_date: Option<DateTime<Utc>>,
}

/// Full record behind `/api/articles/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDetail {
    #[serde(default)]
    pub id: ArticleId,
    #[serde(default, deserialize_with = "de::text")]
    pub title: String,
    #[serde(default, deserialize_with = "de::non_empty")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "de::timestamp")]
    pub published_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::non_empty")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "de::number")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "de::non_empty")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "analysis")]
    pub summary: Option<ArticleAnalysis>,
    #[serde(default, deserialize_with = "de::non_empty")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "de::non_empty")]
    pub favicon: Option<String>,
    #[serde(default)]
    pub extras: Option<Extras>,
    #[serde(default, deserialize_with = "de::text")]
    pub source: String,
    #[serde(default, deserialize_with = "de::label")]
    pub sentiment: Option<Sentiment>,
    #[serde(rename = "fact_check", default, deserialize_with = "de::label")]
    pub fact_check: Option<FactCheck>,
    #[serde(rename = "bangladeshi_summary", default, deserialize_with = "de::non_empty")]
    pub bangladeshi_summary: Option<String>,
    #[serde(rename = "international_summary", default, deserialize_with = "de::non_empty")]
    pub international_summary: Option<String>,
    #[serde(rename = "bangladeshi_matches", default)]
    pub bangladeshi_matches: Option<Vec<MediaMatch>>,
    #[serde(rename = "international_matches", default)]
    pub international_matches: Option<Vec<MediaMatch>>,
    #[serde(default)]
    pub related_articles: Vec<RelatedArticle>,
    #[serde(default)]
    pub more_from_source: Vec<RelatedArticle>,
}

/// Response of the `/api/articles` listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleList {
    pub total: u64,
    pub count: u64,
    pub results: Vec<ArticleDetail>,
}

/// Coverage of the story by one group of comparison outlets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coverage {
    pub summary: String,
    pub matches: Vec<MediaMatch>,
}

/// An article detail with every display fallback already resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
    pub id: ArticleId,
    pub title: String,
    pub url: Option<String>,
    pub source: String,
    pub author: String,
    pub published_date: Option<DateTime<Utc>>,
    pub category: String,
    pub sentiment: Sentiment,
    pub fact_check: FactCheck,
    pub text: Option<String>,
    pub image: Option<String>,
    pub favicon: Option<String>,
    pub links: Vec<String>,
    pub score: Option<f64>,
    pub bangladeshi: Coverage,
    pub international: Coverage,
    /// Only offered when the analysis assigned a category.
    pub related_articles: Option<Vec<RelatedArticle>>,
    pub more_from_source: Vec<RelatedArticle>,
}

impl ArticleDetail {
    pub fn view(&self) -> DetailView {
        let analysis = self.summary.clone().unwrap_or_default();

        let bangladeshi = Coverage {
            summary: self
                .bangladeshi_summary
                .as_deref()
                .or(analysis.bangladeshi_summary())
                .unwrap_or(NOT_COVERED)
                .to_string(),
            matches: self
                .bangladeshi_matches
                .clone()
                .or_else(|| analysis.bangladeshi_matches.clone())
                .unwrap_or_default(),
        };
        let international = Coverage {
            summary: self
                .international_summary
                .as_deref()
                .or(analysis.international_summary())
                .unwrap_or(NOT_COVERED)
                .to_string(),
            matches: self
                .international_matches
                .clone()
                .or_else(|| analysis.international_matches.clone())
                .unwrap_or_default(),
        };

        DetailView {
            id: self.id.clone(),
            title: self.title.clone(),
            url: self.url.clone(),
            source: self.source.clone(),
            author: self.author.clone().unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            published_date: self.published_date,
            category: analysis
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            sentiment: self.sentiment.unwrap_or(Sentiment::Neutral),
            fact_check: self.fact_check.unwrap_or(FactCheck::Unverified),
            text: self.text.clone(),
            image: self.image.clone(),
            favicon: self.favicon.clone(),
            links: self.extras.as_ref().map(|e| e.links.clone()).unwrap_or_default(),
            score: self.score,
            bangladeshi,
            international,
            related_articles: analysis
                .category
                .as_ref()
                .map(|_| self.related_articles.clone()),
            more_from_source: self.more_from_source.clone(),
        }
    }
}

impl From<&ArticleDetail> for ArticleSummary {
    fn from(detail: &ArticleDetail) -> Self {
        ArticleSummary {
            id: detail.id.clone(),
            date: detail.published_date,
            headline: detail.title.clone(),
            source: detail.source.clone(),
            category: detail.summary.as_ref().and_then(|s| s.category.clone()),
            sentiment: detail.sentiment,
            fact_check: detail.fact_check,
            details_url: detail.url.clone(),
        }
    }
}
