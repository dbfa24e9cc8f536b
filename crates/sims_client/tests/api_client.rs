use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::json;
use sims_client::{ApiClient, ClientConfig};
use sims_core::{
    ArticleId, ArticleQuery, DashboardSource, DateRange, Error, Sentiment,
};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
struct Upstream {
    last_query: Arc<Mutex<HashMap<String, String>>>,
}

async fn dashboard(
    State(state): State<Upstream>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    *state.last_query.lock().await = query;
    Json(json!({
        "latestIndianNews": [
            {"id": 7, "date": "2024-06-03", "headline": "Markets rally amid reforms",
             "source": "livemint.com", "category": "Economy", "sentiment": "Positive",
             "fact_check": "True", "detailsUrl": "/article/7"},
            {"id": "8", "date": null, "headline": "Flood warning in Dhaka",
             "source": "ndtv.com", "sentiment": "Alarmed"}
        ],
        "languageDistribution": {"English": 12, "Bengali": 5},
        "factChecking": {"bangladeshiAgreement": 0.8, "internationalAgreement": 0.6,
                         "verificationStatus": "verified"},
        "keySources": ["ndtv.com", null, "thehindu.com"]
    }))
}

async fn article(Path(id): Path<String>) -> impl IntoResponse {
    match id.as_str() {
        "7" => Json(json!({
            "id": 7,
            "title": "Markets rally amid reforms",
            "source": "livemint.com",
            "sentiment": "Positive",
            "summary": {"category": "Economy"}
        }))
        .into_response(),
        "boom" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "database unavailable"})),
        )
            .into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({"error": "Article not found"}))).into_response(),
    }
}

async fn articles(
    State(state): State<Upstream>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    *state.last_query.lock().await = query;
    Json(json!({
        "total": 41,
        "count": 1,
        "results": [{"id": 3, "title": "Dhaka metro expands", "source": "ndtv.com"}]
    }))
}

async fn garbage() -> impl IntoResponse {
    "this is not json"
}

async fn spawn_upstream(prefix: &str) -> (String, Upstream) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = Upstream::default();
    let api = Router::new()
        .route("/api/dashboard", get(dashboard))
        .route("/api/articles", get(articles))
        .route("/api/articles/:id", get(article))
        .with_state(state.clone());
    let app = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(prefix, api)
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}{prefix}"), state)
}

fn client(base: &str) -> ApiClient {
    ApiClient::new(ClientConfig::new(base, Duration::from_secs(5)).expect("config")).expect("client")
}

#[tokio::test]
async fn dashboard_sends_range_and_decodes_loose_records() {
    let (base, upstream) = spawn_upstream("").await;
    let api = client(&base);

    let range = DateRange::new(NaiveDate::from_ymd_opt(2024, 6, 1), NaiveDate::from_ymd_opt(2024, 6, 30));
    let data = api.dashboard(&range).await.expect("dashboard");

    let query = upstream.last_query.lock().await.clone();
    assert_eq!(query.get("start").map(String::as_str), Some("2024-06-01"));
    assert_eq!(query.get("end").map(String::as_str), Some("2024-06-30"));

    assert_eq!(data.latest_indian_news.len(), 2);
    let first = &data.latest_indian_news[0];
    assert_eq!(first.id, ArticleId::from(7));
    assert_eq!(first.sentiment, Some(Sentiment::Positive));
    let second = &data.latest_indian_news[1];
    assert_eq!(second.id, ArticleId::from("8"));
    assert_eq!(second.date, None);
    assert_eq!(second.sentiment, None);
    assert_eq!(second.category, None);

    assert_eq!(data.language_distribution.total(), 17);
    assert!(data.fact_checking.has_data());
    assert_eq!(data.key_sources, vec!["ndtv.com", "thehindu.com"]);
}

#[tokio::test]
async fn unbounded_range_sends_no_dates() {
    let (base, upstream) = spawn_upstream("").await;
    client(&base)
        .dashboard(&DateRange::default())
        .await
        .expect("dashboard");
    assert!(upstream.last_query.lock().await.is_empty());
}

#[tokio::test]
async fn article_lookup_maps_status_codes() {
    let (base, _) = spawn_upstream("").await;
    let api = client(&base);

    let found = api.article(&ArticleId::from(7)).await.expect("article");
    assert_eq!(found.title, "Markets rally amid reforms");
    assert_eq!(found.view().category, "Economy");

    let missing = api.article(&ArticleId::from(404)).await.unwrap_err();
    assert!(matches!(missing, Error::NotFound(_)), "{missing:?}");
    assert!(!missing.is_upstream());

    let failed = api.article(&ArticleId::from("boom")).await.unwrap_err();
    match failed {
        Error::Upstream { status, ref message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn article_listing_sends_query_parameters() {
    let (base, upstream) = spawn_upstream("").await;
    let query = ArticleQuery {
        limit: 5,
        offset: 10,
        source: Some("ndtv.com".into()),
        sentiment: Some(Sentiment::Negative),
        search: Some("flood relief".into()),
        ..ArticleQuery::default()
    };
    let list = client(&base).articles(&query).await.expect("articles");
    assert_eq!(list.total, 41);
    assert_eq!(list.results[0].id, ArticleId::from(3));

    let sent = upstream.last_query.lock().await.clone();
    assert_eq!(sent.get("limit").map(String::as_str), Some("5"));
    assert_eq!(sent.get("offset").map(String::as_str), Some("10"));
    assert_eq!(sent.get("source").map(String::as_str), Some("ndtv.com"));
    assert_eq!(sent.get("sentiment").map(String::as_str), Some("Negative"));
    assert_eq!(sent.get("search").map(String::as_str), Some("flood relief"));
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let (base, _) = spawn_upstream("/sims").await;
    let found = client(&base).article(&ArticleId::from(7)).await.expect("article");
    assert_eq!(found.id, ArticleId::from(7));
}

#[tokio::test]
async fn malformed_body_is_an_upstream_failure() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new().route("/api/dashboard", get(garbage));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let err = client(&format!("http://{addr}"))
        .dashboard(&DateRange::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Serialization(_)), "{err:?}");
    assert!(err.is_upstream());
}

#[tokio::test]
async fn unreachable_upstream_is_an_http_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let err = client(&format!("http://{addr}"))
        .dashboard(&DateRange::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)), "{err:?}");
    assert!(err.is_upstream());
}
