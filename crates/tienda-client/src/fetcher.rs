//! # Resilient Fetcher
//!
//! HTTP requests with a per-attempt timeout, bounded retries and caller
//! cancellation.
//!
//! ## Retry Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Request Lifecycle                                │
//! │                                                                         │
//! │   attempt 1 ──► send ──┬── 2xx ─────────────► decode ──► Ok(body)      │
//! │                        │                        └─ bad JSON → Decode    │
//! │                        ├── non-2xx ──► Http{status}  ─┐                 │
//! │                        ├── no reply in timeout ──► Timeout ─┤           │
//! │                        └── connection failed ──► Transport ─┤           │
//! │                                                             ▼           │
//! │                                         retries left? ──no──► Err(last) │
//! │                                               │ yes                     │
//! │                                      wait retry_delay                   │
//! │                                               │                         │
//! │   attempt n+1 (identical request) ◄───────────┘                         │
//! │                                                                         │
//! │   CancelSignal fired at any point ──► Err(Cancelled), never retried    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Backoff
//! ```text
//! Constant (default)         Exponential (opt-in)
//! ───────────────────        ─────────────────────
//! retry 1: 1000 ms           retry 1: 1000 ms
//! retry 2: 1000 ms           retry 2: 2000 ms
//! retry 3: 1000 ms           retry 3: 4000 ms (capped at max_delay)
//! ```
//! No jitter in either mode.
//!
//! Each call owns its own attempt counter and delay sequence; concurrent
//! calls share nothing but the transport.

use backoff::backoff::{Backoff, Constant};
use backoff::ExponentialBackoff;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult, FetchError};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

// =============================================================================
// Retry Policy
// =============================================================================

/// How delays grow between retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackoffStrategy {
    /// `retry_delay` before every retry.
    #[default]
    Constant,

    /// `retry_delay`, doubled after each retry, never above `max_delay`.
    Exponential { max_delay: Duration },
}

/// Retry bound, delay and per-attempt timeout for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    retry_delay: Duration,
    timeout: Duration,
    backoff: BackoffStrategy,
}

impl RetryPolicy {
    /// Creates a constant-delay policy.
    ///
    /// ## Errors
    /// `InvalidConfig` when `timeout` is zero; an attempt must be allowed to
    /// take some time.
    pub fn new(max_retries: u32, retry_delay: Duration, timeout: Duration) -> ClientResult<Self> {
        if timeout.is_zero() {
            return Err(ClientError::InvalidConfig(
                "timeout must be greater than 0".into(),
            ));
        }

        Ok(RetryPolicy {
            max_retries,
            retry_delay,
            timeout,
            backoff: BackoffStrategy::Constant,
        })
    }

    /// Same policy, single attempt.
    pub fn without_retries(mut self) -> Self {
        self.max_retries = 0;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn backoff(&self) -> BackoffStrategy {
        self.backoff
    }

    /// Fresh delay sequence for one request.
    fn delays(&self) -> Box<dyn Backoff + Send> {
        match self.backoff {
            BackoffStrategy::Constant => Box::new(Constant::new(self.retry_delay)),
            BackoffStrategy::Exponential { max_delay } => {
                let exponential: ExponentialBackoff = ExponentialBackoff {
                    current_interval: self.retry_delay,
                    initial_interval: self.retry_delay,
                    randomization_factor: 0.0,
                    multiplier: 2.0,
                    max_interval: max_delay,
                    max_elapsed_time: None,
                    ..ExponentialBackoff::default()
                };
                Box::new(exponential)
            }
        }
    }
}

/// 3 retries, 1 s apart, 10 s per attempt.
impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
            timeout: Duration::from_millis(10_000),
            backoff: BackoffStrategy::Constant,
        }
    }
}

// =============================================================================
// Cancellation
// =============================================================================

/// Creates a linked cancel handle and signal.
///
/// ## Usage
/// ```rust
/// use tienda_client::fetcher::cancel_pair;
///
/// let (handle, signal) = cancel_pair();
/// assert!(!signal.is_cancelled());
/// handle.cancel();
/// assert!(signal.is_cancelled());
/// ```
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

/// Fires the cancellation. Kept by whoever may abort the request.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes the cancellation. Passed into the fetcher.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled. Never resolves if the handle is dropped
    /// without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

async fn wait_cancelled(cancel: Option<&CancelSignal>) {
    match cancel {
        Some(signal) => signal.cancelled().await,
        None => std::future::pending::<()>().await,
    }
}

// =============================================================================
// Resilient Fetcher
// =============================================================================

/// Issues requests through a transport with timeout and retry.
#[derive(Debug, Clone)]
pub struct ResilientFetcher<T: HttpTransport> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: HttpTransport> ResilientFetcher<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        ResilientFetcher { transport, policy }
    }

    /// The policy used when none is given per call.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends with the default policy and decodes the JSON body.
    pub async fn request<R: DeserializeOwned>(&self, request: &HttpRequest) -> Result<R, FetchError> {
        self.request_with(request, &self.policy, None).await
    }

    /// Sends with the default policy and returns the body as untyped JSON.
    pub async fn request_json(&self, request: &HttpRequest) -> Result<serde_json::Value, FetchError> {
        self.request(request).await
    }

    /// Sends with an explicit policy and optional cancellation, then decodes
    /// the JSON body.
    ///
    /// A body that does not decode is a `Decode` error and is not retried.
    pub async fn request_with<R: DeserializeOwned>(
        &self,
        request: &HttpRequest,
        policy: &RetryPolicy,
        cancel: Option<&CancelSignal>,
    ) -> Result<R, FetchError> {
        let response = self.send_with(request, policy, cancel).await?;
        serde_json::from_str(&response.body).map_err(|e| {
            warn!(url = %request.url, error = %e, "Response body did not decode");
            FetchError::Decode(e.to_string())
        })
    }

    /// Sends with the default policy; returns the 2xx response undecoded.
    pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        self.send_with(request, &self.policy, None).await
    }

    /// The retry loop.
    ///
    /// At most `max_retries + 1` attempts. Only retryable errors (timeout,
    /// non-2xx, transport) lead to another attempt.
    pub async fn send_with(
        &self,
        request: &HttpRequest,
        policy: &RetryPolicy,
        cancel: Option<&CancelSignal>,
    ) -> Result<HttpResponse, FetchError> {
        let mut delays = policy.delays();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(method = %request.method, url = %request.url, attempt, "Sending request");

            let err = match self.attempt(request, policy.timeout, cancel).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            let remaining = policy.max_retries.saturating_sub(attempt - 1);
            if !err.is_retryable() || remaining == 0 {
                debug!(url = %request.url, attempt, error = %err, "Request failed");
                return Err(err);
            }

            let delay = delays.next_backoff().unwrap_or(policy.retry_delay);
            warn!(
                url = %request.url,
                attempt,
                remaining,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Request failed, retrying"
            );

            tokio::select! {
                biased;
                _ = wait_cancelled(cancel) => return Err(FetchError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// One attempt bounded by `timeout`. The losing side of the race is
    /// dropped.
    async fn attempt(
        &self,
        request: &HttpRequest,
        timeout: Duration,
        cancel: Option<&CancelSignal>,
    ) -> Result<HttpResponse, FetchError> {
        if cancel.is_some_and(CancelSignal::is_cancelled) {
            return Err(FetchError::Cancelled);
        }

        let outcome = tokio::select! {
            biased;
            _ = wait_cancelled(cancel) => return Err(FetchError::Cancelled),
            outcome = tokio::time::timeout(timeout, self.transport.send(request)) => outcome,
        };

        let response = match outcome {
            Ok(result) => result?,
            Err(_) => {
                return Err(FetchError::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        };

        if !response.is_success() {
            return Err(FetchError::Http {
                status: response.status,
                body: response.body,
            });
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, Step};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn policy(max_retries: u32, delay_ms: u64, timeout_ms: u64) -> RetryPolicy {
        RetryPolicy::new(
            max_retries,
            Duration::from_millis(delay_ms),
            Duration::from_millis(timeout_ms),
        )
        .unwrap()
    }

    fn fetcher(steps: Vec<Step>, policy: RetryPolicy) -> ResilientFetcher<Arc<ScriptedTransport>> {
        ResilientFetcher::new(Arc::new(ScriptedTransport::new(steps)), policy)
    }

    #[test]
    fn test_policy_rejects_zero_timeout() {
        let result = RetryPolicy::new(3, Duration::from_millis(10), Duration::ZERO);
        assert!(matches!(result, Err(ClientError::InvalidConfig(_))));

        let default = RetryPolicy::default();
        assert_eq!(default.max_retries(), 3);
        assert_eq!(default.retry_delay(), Duration::from_secs(1));
        assert_eq!(default.timeout(), Duration::from_secs(10));
        assert_eq!(default.backoff(), BackoffStrategy::Constant);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_every_attempt_exhausts_retries() {
        let fetcher = fetcher(vec![Step::Hang], policy(2, 1000, 10_000));

        let result: Result<serde_json::Value, _> =
            fetcher.request(&HttpRequest::get("http://shop/productos")).await;

        assert_eq!(result, Err(FetchError::Timeout { timeout_ms: 10_000 }));
        assert_eq!(fetcher.transport().attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_error_then_success() {
        let fetcher = fetcher(
            vec![
                Step::respond(500, "boom"),
                Step::respond(200, r#"[{"id": 1}]"#),
            ],
            policy(3, 1000, 10_000),
        );

        let body = fetcher
            .request_json(&HttpRequest::get("http://shop/productos"))
            .await
            .unwrap();

        assert_eq!(body[0]["id"], 1);
        assert_eq!(fetcher.transport().attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_reissue_identical_request() {
        let fetcher = fetcher(
            vec![Step::fail("connection refused"), Step::respond(200, "{}")],
            policy(1, 10, 1000),
        );
        let request = HttpRequest::post("http://shop/api/pedidos")
            .json(&serde_json::json!({"total": 5}))
            .unwrap();

        fetcher.send(&request).await.unwrap();

        let seen = fetcher.transport().requests();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|r| *r == request));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_http_error_surfaces() {
        let fetcher = fetcher(
            vec![Step::respond(502, "bad gateway"), Step::respond(503, "unavailable")],
            policy(1, 100, 1000),
        );

        let err = fetcher
            .send(&HttpRequest::get("http://shop/productos"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert_eq!(fetcher.transport().attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_is_single_attempt() {
        let fetcher = fetcher(vec![Step::fail("unreachable")], policy(0, 1000, 1000));

        let err = fetcher
            .send(&HttpRequest::get("http://shop/productos"))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport(_)));
        assert_eq!(fetcher.transport().attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_decode_error_is_not_retried() {
        let fetcher = fetcher(vec![Step::respond(200, "<html>")], policy(3, 1000, 1000));

        let result: Result<Vec<i64>, _> =
            fetcher.request(&HttpRequest::get("http://shop/productos")).await;

        assert!(matches!(result, Err(FetchError::Decode(_))));
        assert_eq!(fetcher.transport().attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_constant_delay_between_retries() {
        let fetcher = fetcher(vec![Step::respond(500, "")], policy(3, 1000, 10_000));
        let start = Instant::now();

        let _ = fetcher.send(&HttpRequest::get("http://shop/productos")).await;

        let elapsed = start.elapsed();
        assert_eq!(fetcher.transport().attempts(), 4);
        assert!(elapsed >= Duration::from_millis(3000), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(3100), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exponential_delay_between_retries() {
        let policy = policy(3, 100, 10_000).with_backoff(BackoffStrategy::Exponential {
            max_delay: Duration::from_millis(250),
        });
        let fetcher = fetcher(vec![Step::respond(500, "")], policy);
        let start = Instant::now();

        let _ = fetcher.send(&HttpRequest::get("http://shop/productos")).await;

        // 100 + 200 + 250 (capped)
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(549), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(600), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start() {
        let fetcher = fetcher(vec![Step::respond(200, "{}")], policy(3, 1000, 1000));
        let (handle, signal) = cancel_pair();
        handle.cancel();

        let result: Result<serde_json::Value, _> = fetcher
            .request_with(&HttpRequest::get("http://shop"), &RetryPolicy::default(), Some(&signal))
            .await;

        assert_eq!(result, Err(FetchError::Cancelled));
        assert_eq!(fetcher.transport().attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_aborts_in_flight_attempt() {
        let fetcher = fetcher(vec![Step::Hang], policy(3, 1000, 10_000));
        let (handle, signal) = cancel_pair();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.cancel();
        });

        let start = Instant::now();
        let err = fetcher
            .send_with(&HttpRequest::get("http://shop"), fetcher.policy(), Some(&signal))
            .await
            .unwrap_err();

        assert_eq!(err, FetchError::Cancelled);
        assert_eq!(fetcher.transport().attempts(), 1);
        assert!(start.elapsed() < Duration::from_millis(10_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_retry_wait() {
        let fetcher = fetcher(vec![Step::respond(500, "")], policy(3, 5000, 1000));
        let (handle, signal) = cancel_pair();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            handle.cancel();
        });

        let err = fetcher
            .send_with(&HttpRequest::get("http://shop"), fetcher.policy(), Some(&signal))
            .await
            .unwrap_err();

        assert_eq!(err, FetchError::Cancelled);
        assert_eq!(fetcher.transport().attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_does_not_cancel() {
        let fetcher = fetcher(
            vec![Step::respond(500, ""), Step::respond(200, "{}")],
            policy(1, 100, 1000),
        );
        let (handle, signal) = cancel_pair();
        drop(handle);

        let result = fetcher
            .send_with(&HttpRequest::get("http://shop"), fetcher.policy(), Some(&signal))
            .await;

        assert!(result.is_ok());
    }
}
