use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sims_core::types::parse_timestamp;
use sims_core::{
    ArticleDetail, ArticleId, ArticleList, ArticleQuery, ArticleSummary, DashboardData,
    DashboardSource, DateRange, Error, MemorySource, Result, Sentiment,
};
use sims_web::{create_app, AppState};
use tower::ServiceExt;

fn summary(id: i64, date: &str, headline: &str, category: &str, sentiment: Sentiment) -> ArticleSummary {
    ArticleSummary {
        id: ArticleId::from(id),
        date: parse_timestamp(date),
        headline: headline.to_string(),
        source: "ndtv.com".to_string(),
        category: Some(category.to_string()),
        sentiment: Some(sentiment),
        ..ArticleSummary::default()
    }
}

fn memory_app() -> Router {
    let mut news = vec![
        summary(1, "2024-06-01", "Flood warning in Dhaka", "Environment", Sentiment::Negative),
        summary(2, "2024-06-03", "Markets rally amid reforms", "Economy", Sentiment::Positive),
        summary(3, "2024-06-02", "Flood relief reaches Sylhet", "Environment", Sentiment::Positive),
    ];
    for i in 0..12 {
        news.push(summary(
            100 + i,
            "2024-05-01",
            &format!("Cricket update {}", i),
            "Sports",
            Sentiment::Neutral,
        ));
    }

    let article: ArticleDetail = serde_json::from_value(json!({
        "id": 2,
        "title": "Markets rally amid reforms",
        "source": "livemint.com",
        "summary": [{"category": "Economy"}],
        "bangladeshi_summary": "",
        "international_matches": []
    }))
    .expect("article fixture");

    let dashboard = DashboardData {
        latest_indian_news: news,
        ..DashboardData::default()
    };
    create_app(AppState::new(Arc::new(MemorySource::new(dashboard, vec![article]))))
}

struct FailingSource;

#[async_trait]
impl DashboardSource for FailingSource {
    async fn dashboard(&self, _range: &DateRange) -> Result<DashboardData> {
        Err(Error::Upstream {
            status: 500,
            message: "database unavailable".into(),
        })
    }

    async fn article(&self, _id: &ArticleId) -> Result<ArticleDetail> {
        Err(Error::Upstream {
            status: 503,
            message: "maintenance".into(),
        })
    }

    async fn articles(&self, _query: &ArticleQuery) -> Result<ArticleList> {
        Ok(ArticleList::default())
    }

    fn name(&self) -> &str {
        "failing"
    }
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn ids(body: &Value) -> Vec<String> {
    body["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_answers_ok() {
    let response = memory_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn news_defaults_to_newest_first() {
    let (status, body) = get(memory_app(), "/api/news").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["total"], 15);
    assert_eq!(&ids(&body)[..3], ["2", "3", "1"]);
    assert_eq!(body["rows"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn news_applies_filters_sort_and_page() {
    let (_, body) = get(
        memory_app(),
        "/api/news?category=Environment&sort=headline&dir=asc",
    )
    .await;
    assert_eq!(ids(&body), ["3", "1"]);
    assert_eq!(body["total"], 2);

    let (_, body) = get(memory_app(), "/api/news?keyword=FLOOD&sentiment=positive").await;
    assert_eq!(ids(&body), ["3"]);

    let (_, body) = get(memory_app(), "/api/news?page=2").await;
    assert_eq!(body["currentPage"], 2);
    assert_eq!(body["rows"].as_array().unwrap().len(), 5);

    let (_, body) = get(memory_app(), "/api/news?page=9").await;
    assert_eq!(body["rows"].as_array().unwrap().len(), 0);
    assert_eq!(body["totalPages"], 2);
}

#[tokio::test]
async fn news_honours_date_range() {
    let (_, body) = get(memory_app(), "/api/news?start=2024-06-02&end=2024-06-30").await;
    assert_eq!(ids(&body), ["2", "3"]);
}

#[tokio::test]
async fn bad_query_values_are_rejected() {
    for uri in [
        "/api/news?sort=popularity",
        "/api/news?sentiment=angry",
        "/api/news?page=two",
        "/api/news?start=June",
        "/api/news/keywords?limit=many",
    ] {
        let (status, body) = get(memory_app(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["error"].is_string(), "{}", uri);
    }
}

#[tokio::test]
async fn keywords_categories_and_tone() {
    let (status, body) = get(memory_app(), "/api/news/keywords?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"word": "cricket", "count": 12}, {"word": "update", "count": 12}])
    );

    let (_, body) = get(memory_app(), "/api/news/categories").await;
    assert_eq!(body, json!(["Economy", "Environment", "Sports"]));

    let (_, body) = get(memory_app(), "/api/news/tone?start=2024-06-01").await;
    assert_eq!(body, json!({"Positive": 2, "Negative": 1}));
}

#[tokio::test]
async fn article_detail_resolves_fallbacks() {
    let (status, body) = get(memory_app(), "/api/articles/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Markets rally amid reforms");
    assert_eq!(body["category"], "Economy");
    assert_eq!(body["sentiment"], "Neutral");
    assert_eq!(body["factCheck"], "Unverified");
    assert_eq!(body["author"], "Unknown");
    assert_eq!(body["bangladeshi"]["summary"], "Not covered");
    assert_eq!(body["international"]["matches"], json!([]));
}

#[tokio::test]
async fn missing_article_is_404() {
    let (status, body) = get(memory_app(), "/api/articles/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Article not found."}));
}

#[tokio::test]
async fn upstream_failures_are_502() {
    let app = || create_app(AppState::new(Arc::new(FailingSource)));

    for uri in ["/api/news", "/api/news/keywords", "/api/news/categories", "/api/news/tone"] {
        let (status, body) = get(app(), uri).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY, "{}", uri);
        assert_eq!(body, json!({"error": "Failed to fetch dashboard data."}));
    }

    let (status, body) = get(app(), "/api/articles/1").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "Failed to load article."}));
}
