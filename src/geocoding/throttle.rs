//! Minimum spacing between outgoing geocoding requests
//!
//! [`RequestThrottle`] also runs as a `reqwest-middleware` layer, so every
//! attempt is spaced, including retries issued by an outer retry layer.

use async_trait::async_trait;
use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Serializes callers so that consecutive requests are at least `min_interval` apart
#[derive(Debug)]
pub struct RequestThrottle {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Time still to wait before a request may go out
    fn wait_time(&self, last: Option<Instant>) -> Duration {
        last.map_or(Duration::ZERO, |last| {
            self.min_interval.saturating_sub(last.elapsed())
        })
    }

    /// Wait for the next request slot and claim it
    pub async fn acquire(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        // Held across the sleep so waiting callers queue up in order
        let mut last = self.last_request.lock().await;
        let wait = self.wait_time(*last);
        if !wait.is_zero() {
            debug!("Throttling geocoding request for {:.3}s", wait.as_secs_f64());
            tokio::time::sleep(wait).await;
        }
        *last = Some(Instant::now());
    }
}

#[async_trait]
impl Middleware for RequestThrottle {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        self.acquire().await;
        next.run(req, extensions).await
    }
}
