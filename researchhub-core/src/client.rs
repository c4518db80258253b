//! Recommendation service client: request/response shapes, the HTTP
//! implementation, and a scripted mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::ServiceConfig;
use crate::error::FetchError;
use crate::paper::Paper;

const USER_AGENT: &str = concat!("ResearchHub/", env!("CARGO_PKG_VERSION"));

/// Body of a recommendation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
    pub top_n: i64,
}

/// Body of a successful recommendation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub recommendations: Vec<Paper>,
}

/// Anything that can turn a query into a ranked list of papers.
#[async_trait]
pub trait RecommendationClient: Send + Sync {
    async fn recommend(&self, request: &RecommendRequest) -> Result<Vec<Paper>, FetchError>;
}

/// Client for the HTTP recommendation endpoint.
pub struct HttpRecommendationClient {
    client: reqwest::Client,
    endpoint: String,
    timeout_secs: u64,
}

impl HttpRecommendationClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::ClientBuild {
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_send_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            FetchError::Transport {
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl RecommendationClient for HttpRecommendationClient {
    async fn recommend(&self, request: &RecommendRequest) -> Result<Vec<Paper>, FetchError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            query = %request.query,
            top_n = request.top_n,
            "Requesting recommendations"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        parse_response(&body)
    }
}

/// Decode a response body into the ranked paper list.
pub fn parse_response(body: &str) -> Result<Vec<Paper>, FetchError> {
    serde_json::from_str::<RecommendResponse>(body)
        .map(|r| r.recommendations)
        .map_err(|e| FetchError::Decode {
            message: e.to_string(),
        })
}

/// Scripted client for tests and offline sessions.
///
/// Queued responses are returned in order; once the queue is empty the
/// fallback is returned for every call.
pub struct MockRecommendationClient {
    queued: Mutex<VecDeque<Result<Vec<Paper>, FetchError>>>,
    fallback: Result<Vec<Paper>, FetchError>,
    requests: Mutex<Vec<RecommendRequest>>,
    delay: Option<Duration>,
}

impl Default for MockRecommendationClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRecommendationClient {
    /// A client that returns no papers.
    pub fn new() -> Self {
        Self::with_papers(Vec::new())
    }

    /// A client that always returns `papers`.
    pub fn with_papers(papers: Vec<Paper>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback: Ok(papers),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// A client that always fails with `error`.
    pub fn failing(error: FetchError) -> Self {
        Self {
            fallback: Err(error),
            ..Self::new()
        }
    }

    /// Wait this long before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a response for the next unanswered call.
    pub fn queue_response(&self, response: Result<Vec<Paper>, FetchError>) {
        self.queued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecommendRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl RecommendationClient for MockRecommendationClient {
    async fn recommend(&self, request: &RecommendRequest) -> Result<Vec<Paper>, FetchError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        let next = self
            .queued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        next.unwrap_or_else(|| self.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_serializes_with_top_n() {
        let request = RecommendRequest {
            query: "quantum computing".into(),
            top_n: 5,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"query":"quantum computing","top_n":5}"#);
    }

    #[test]
    fn test_parse_response_preserves_order() {
        let body = r#"{"recommendations":[
            {"title":"First","summary":"s1","terms":"cs.AI"},
            {"title":"Second","year":2019},
            {"title":"Third","url":"https://example.org/3"}
        ]}"#;
        let papers = parse_response(body).unwrap();
        let titles: Vec<&str> = papers.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_parse_response_rejects_malformed() {
        assert!(matches!(
            parse_response("<html>oops</html>"),
            Err(FetchError::Decode { .. })
        ));
        assert!(matches!(
            parse_response(r#"{"results":[]}"#),
            Err(FetchError::Decode { .. })
        ));
        assert!(matches!(
            parse_response(r#"{"recommendations":[{"summary":"no title"}]}"#),
            Err(FetchError::Decode { .. })
        ));
    }

    #[test]
    fn test_http_client_builds_from_config() {
        let config = ServiceConfig::default();
        let client = HttpRecommendationClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:8000/recommend/");
    }

    #[tokio::test]
    async fn test_mock_queue_then_fallback() {
        let mock = MockRecommendationClient::with_papers(vec![Paper::new("fallback")]);
        mock.queue_response(Err(FetchError::Status { status: 502 }));
        let request = RecommendRequest {
            query: "q".into(),
            top_n: 3,
        };

        assert_eq!(
            mock.recommend(&request).await,
            Err(FetchError::Status { status: 502 })
        );
        let papers = mock.recommend(&request).await.unwrap();
        assert_eq!(papers[0].title, "fallback");
        assert_eq!(mock.requests().len(), 2);
    }

    #[test]
    fn test_mock_failing() {
        let mock = MockRecommendationClient::failing(FetchError::Transport {
            message: "down".into(),
        });
        let request = RecommendRequest {
            query: "q".into(),
            top_n: 1,
        };
        assert!(tokio_test::block_on(mock.recommend(&request)).is_err());
        assert_eq!(mock.requests(), vec![request]);
    }
}
