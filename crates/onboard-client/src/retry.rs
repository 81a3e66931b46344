//! Retries for idempotent collaborator reads.
//!
//! A read is retried when it failed transiently: the connection could not
//! be made, the attempt timed out, or a gateway in front of the
//! collaborator answered 502, 503 or 504. Backoff doubles per attempt and
//! no retry starts once it would overrun the read budget, which is the
//! client's configured timeout.
//!
//! Requests with a non-idempotent method are sent exactly once, whatever
//! happens. A second OTP send or a duplicate application is worse than an
//! error.

use std::time::{Duration, Instant};

use reqwest::{Client, Request, Response, StatusCode};

use crate::error::ClientError;

const MAX_ATTEMPTS: u32 = 4;

const FIRST_BACKOFF: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy)]
pub(crate) struct ReadRetry {
    max_attempts: u32,
    first_backoff: Duration,
    budget: Duration,
}

fn is_gateway_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

fn is_transient(outcome: &Result<Response, reqwest::Error>) -> bool {
    match outcome {
        Ok(resp) => is_gateway_status(resp.status()),
        Err(e) => e.is_connect() || e.is_timeout(),
    }
}

impl ReadRetry {
    /// Retry reads for at most `budget` in total.
    pub(crate) fn within(budget: Duration) -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            first_backoff: FIRST_BACKOFF,
            budget,
        }
    }

    #[cfg(test)]
    fn with_backoff(mut self, first_backoff: Duration) -> Self {
        self.first_backoff = first_backoff;
        self
    }

    /// Execute `request`, retrying transient failures if its method is
    /// idempotent. Any response that is not retried goes back to the
    /// caller unchanged, error statuses included.
    pub(crate) async fn send(
        &self,
        http: &Client,
        request: Request,
        endpoint: &str,
    ) -> Result<Response, ClientError> {
        let into_error = |source| ClientError::Http {
            endpoint: endpoint.to_string(),
            source,
        };

        if !request.method().is_idempotent() {
            return http.execute(request).await.map_err(into_error);
        }

        let started = Instant::now();
        let mut backoff = self.first_backoff;
        let mut attempt = 1;
        let mut pending = request;
        loop {
            let next = pending.try_clone();
            let outcome = http.execute(pending).await;

            let retry = next.filter(|_| {
                is_transient(&outcome)
                    && attempt < self.max_attempts
                    && started.elapsed() + backoff <= self.budget
            });
            let Some(next) = retry else {
                return outcome.map_err(into_error);
            };

            match &outcome {
                Ok(resp) => tracing::warn!(
                    endpoint,
                    attempt,
                    status = resp.status().as_u16(),
                    "collaborator read answered by gateway error, retrying in {backoff:?}"
                ),
                Err(e) => tracing::warn!(
                    endpoint,
                    attempt,
                    "collaborator read failed in transport, retrying in {backoff:?}: {e}"
                ),
            }
            tokio::time::sleep(backoff).await;
            backoff *= 2;
            attempt += 1;
            pending = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast(budget: Duration) -> ReadRetry {
        ReadRetry::within(budget).with_backoff(Duration::from_millis(10))
    }

    fn get(server: &MockServer) -> Request {
        Client::new()
            .get(format!("{}/ifsc/api/v1/SBIN0005943", server.uri()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn read_recovers_after_gateway_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ifsc/api/v1/SBIN0005943"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .with_priority(1)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ifsc/api/v1/SBIN0005943"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let resp = fast(Duration::from_secs(5))
            .send(&Client::new(), get(&server), "GET /ifsc")
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn other_error_statuses_are_returned_at_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let resp = fast(Duration::from_secs(5))
            .send(&Client::new(), get(&server), "GET /ifsc")
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn writes_are_sent_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let request = Client::new()
            .post(format!("{}/seller/api/v1/applications", server.uri()))
            .build()
            .unwrap();
        let resp = fast(Duration::from_secs(5))
            .send(&Client::new(), request, "POST /applications")
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn budget_caps_the_number_of_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .expect(2)
            .mount(&server)
            .await;

        // 40ms fits the 60ms budget once; the following 80ms does not.
        let retry = ReadRetry::within(Duration::from_millis(60))
            .with_backoff(Duration::from_millis(40));
        let resp = retry
            .send(&Client::new(), get(&server), "GET /ifsc")
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn unreachable_collaborator_gives_up_within_budget() {
        let request = Client::new()
            .get("http://127.0.0.1:1/ifsc/api/v1/SBIN0005943")
            .build()
            .unwrap();
        let started = Instant::now();
        let err = fast(Duration::from_millis(100))
            .send(&Client::new(), request, "GET /ifsc")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Http { .. }));
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
