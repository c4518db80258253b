//! Integration tests for the HTTP recommendation client.
//!
//! Each test starts a small axum server on an ephemeral port standing in for
//! the recommendation service.

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;
use researchhub_core::config::ServiceConfig;
use researchhub_core::{
    FetchError, HttpRecommendationClient, PersistenceBridge, RecommendRequest,
    RecommendationClient, SearchController, SearchOutcome,
};
use serde_json::{Value, json};
use std::time::Duration;

async fn recommend(Json(request): Json<RecommendRequest>) -> Json<Value> {
    let papers: Vec<Value> = (0..request.top_n.max(0))
        .map(|i| {
            json!({
                "title": format!("{} #{}", request.query, i + 1),
                "authors": "A. Author",
                "summary": "Abstract text.",
                "terms": "cs.IR, cs.LG",
                "year": 2020 + i,
                "url": format!("https://example.org/{}", i + 1),
            })
        })
        .collect();
    Json(json!({ "recommendations": papers }))
}

async fn broken() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn garbage() -> &'static str {
    "<html>not json</html>"
}

async fn sleepy() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({ "recommendations": [] }))
}

/// Spawn the fake service and return its base URL.
async fn spawn_service() -> String {
    let app = Router::new()
        .route("/recommend/", post(recommend))
        .route("/broken/", post(broken))
        .route("/garbage/", post(garbage))
        .route("/sleepy/", post(sleepy));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client_for(endpoint: String, timeout_secs: u64) -> HttpRecommendationClient {
    let config = ServiceConfig {
        endpoint,
        timeout_secs,
        connect_timeout_secs: 2,
    };
    HttpRecommendationClient::new(&config).unwrap()
}

fn request(query: &str, top_n: i64) -> RecommendRequest {
    RecommendRequest {
        query: query.to_string(),
        top_n,
    }
}

#[tokio::test]
async fn test_recommend_returns_ranked_papers() {
    let base = spawn_service().await;
    let client = client_for(format!("{}/recommend/", base), 10);

    let papers = client.recommend(&request("graph neural networks", 3)).await.unwrap();
    assert_eq!(papers.len(), 3);
    assert_eq!(papers[0].title, "graph neural networks #1");
    assert_eq!(papers[2].title, "graph neural networks #3");
    assert_eq!(papers[1].term_tags(), vec!["cs.IR", "cs.LG"]);
    assert_eq!(papers[0].year.as_ref().map(ToString::to_string).as_deref(), Some("2020"));
}

#[tokio::test]
async fn test_non_success_status_is_fetch_error() {
    let base = spawn_service().await;
    let client = client_for(format!("{}/broken/", base), 10);

    let err = client.recommend(&request("q", 5)).await.unwrap_err();
    assert_eq!(err, FetchError::Status { status: 500 });
}

#[tokio::test]
async fn test_unparsable_body_is_fetch_error() {
    let base = spawn_service().await;
    let client = client_for(format!("{}/garbage/", base), 10);

    let err = client.recommend(&request("q", 5)).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }));
}

#[tokio::test]
async fn test_timeout_is_fetch_error() {
    let base = spawn_service().await;
    let client = client_for(format!("{}/sleepy/", base), 1);

    let err = client.recommend(&request("q", 5)).await.unwrap_err();
    assert_eq!(err, FetchError::Timeout { timeout_secs: 1 });
}

#[tokio::test]
async fn test_unreachable_service_is_fetch_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(format!("http://{}/recommend/", addr), 5);
    let err = client.recommend(&request("q", 5)).await.unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }));
}

#[tokio::test]
async fn test_controller_against_live_service() {
    let base = spawn_service().await;
    let client = client_for(format!("{}/recommend/", base), 10);
    let mut ctl = SearchController::new(PersistenceBridge::in_memory(), 5);

    ctl.set_query("quantum computing");
    let outcome = ctl.execute_search(&client).await.unwrap();
    assert_eq!(outcome, SearchOutcome::Applied { count: 5 });
    assert_eq!(ctl.history().entries(), ["quantum computing"]);

    let broken = client_for(format!("{}/broken/", base), 10);
    ctl.set_query("topology");
    let outcome = ctl.execute_search(&broken).await.unwrap();
    assert!(matches!(outcome, SearchOutcome::Failed(_)));
    assert_eq!(ctl.results().len(), 5);
    assert!(ctl.error().is_some());
}
