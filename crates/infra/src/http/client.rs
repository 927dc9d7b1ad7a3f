//! Catalogue HTTP client.
//!
//! Lookups are idempotent GETs, so each attempt rebuilds the request from
//! the URL and query string. A 404 is the catalogue's "no matches" and ends
//! the lookup with `None`. Rate limiting (429), server errors, timeouts and
//! refused connections are retried with exponential backoff; any other
//! failure is returned at once.

use std::time::Duration;

use medminder_domain::MedMinderError;
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::InfraError;

/// GET-only JSON client with bounded retries.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: u32,
    base_backoff: Duration,
}

/// One failed attempt and whether another is worth making.
struct AttemptError {
    error: MedMinderError,
    retryable: bool,
}

impl AttemptError {
    fn from_http(err: reqwest::Error, retryable: bool) -> Self {
        Self { error: MedMinderError::from(InfraError::from(err)), retryable }
    }
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// GET `url` with `query` and decode the JSON body.
    ///
    /// # Errors
    /// - `InvalidInput` for a rejected query (4xx other than 404 and 429)
    /// - `Network` once retries are exhausted, the connection fails or the
    ///   body does not decode
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, MedMinderError> {
        let mut attempt = 1;
        loop {
            match self.get_once(url, query).await {
                Ok(body) => return Ok(body),
                Err(failed) if failed.retryable && attempt < self.max_attempts => {
                    debug!(attempt, url, error = %failed.error, "Catalogue request failed; retrying");
                    tokio::time::sleep(self.backoff(attempt)).await;
                    attempt += 1;
                }
                Err(failed) => return Err(failed.error),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, AttemptError> {
        let response = self.client.get(url).query(query).send().await.map_err(|err| {
            let retryable = err.is_timeout() || err.is_connect();
            AttemptError::from_http(err, retryable)
        })?;

        let status = response.status();
        debug!(url, %status, "Catalogue response");
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let retryable = status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS;
        let response =
            response.error_for_status().map_err(|err| AttemptError::from_http(err, retryable))?;
        let body =
            response.json::<T>().await.map_err(|err| AttemptError::from_http(err, false))?;
        Ok(Some(body))
    }

    /// Delay after the `attempt`-th failure: base, 2x base, 4x base, ...
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff.saturating_mul(1 << attempt.saturating_sub(1).min(8))
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: u32,
    base_backoff: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(medminder_domain::constants::DEFAULT_LOOKUP_TIMEOUT_SECS),
            max_attempts: 2,
            base_backoff: Duration::from_millis(200),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total attempts, the first one included.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// # Errors
    /// Returns `MedMinderError::Network` if the TLS backend cannot start.
    pub fn build(self) -> Result<HttpClient, MedMinderError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder.build().map_err(|err| MedMinderError::from(InfraError::from(err)))?;

        Ok(HttpClient { client, max_attempts: self.max_attempts, base_backoff: self.base_backoff })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde_json::{json, Value};
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client() -> HttpClient {
        HttpClient::builder()
            .base_backoff(Duration::from_millis(10))
            .max_attempts(3)
            .build()
            .expect("http client")
    }

    fn failing_then_ok(
        failures: usize,
        status: u16,
    ) -> impl Fn(&wiremock::Request) -> ResponseTemplate + Send + Sync + 'static {
        let calls = Arc::new(AtomicUsize::new(0));
        move |_req: &wiremock::Request| {
            if calls.fetch_add(1, Ordering::SeqCst) < failures {
                ResponseTemplate::new(status)
            } else {
                ResponseTemplate::new(200).set_body_json(json!({ "results": [] }))
            }
        }
    }

    #[tokio::test]
    async fn decodes_body_and_sends_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [1] })))
            .expect(1)
            .mount(&server)
            .await;

        let body: Option<Value> =
            client().get_json(&server.uri(), &[("limit", "5".to_string())]).await.unwrap();
        assert_eq!(body, Some(json!({ "results": [1] })));
    }

    #[tokio::test]
    async fn server_errors_and_rate_limits_are_retried() {
        for status in [500, 429] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(failing_then_ok(2, status))
                .expect(3)
                .mount(&server)
                .await;

            let body: Option<Value> = client().get_json(&server.uri(), &[]).await.unwrap();
            assert!(body.is_some(), "status {status} should be retried");
        }
    }

    #[tokio::test]
    async fn exhausted_retries_surface_a_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let result = client().get_json::<Value>(&server.uri(), &[]).await;
        assert!(matches!(result, Err(MedMinderError::Network(_))));
    }

    #[tokio::test]
    async fn not_found_means_no_matches_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let body: Option<Value> = client().get_json(&server.uri(), &[]).await.unwrap();
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn rejected_query_is_invalid_input_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let result = client().get_json::<Value>(&server.uri(), &[]).await;
        assert!(matches!(result, Err(MedMinderError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn refused_connection_is_a_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::builder()
            .base_backoff(Duration::from_millis(5))
            .max_attempts(2)
            .build()
            .expect("http client");

        let result = client.get_json::<Value>(&format!("http://{addr}"), &[]).await;
        assert!(matches!(result, Err(MedMinderError::Network(_))));
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let client = client();
        assert_eq!(client.backoff(1), Duration::from_millis(10));
        assert_eq!(client.backoff(3), Duration::from_millis(40));
    }
}
