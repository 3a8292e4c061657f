use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token-bucket admission control shared by every caller of an API client.
///
/// The bucket starts full with `max_requests` tokens and refills
/// continuously at `max_requests / per`. Callers that find it empty are
/// suspended until a token is available; nobody is ever rejected.
pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    max_tokens: f64,
    /// Tokens per millisecond.
    refill_rate: f64,
}

impl RateLimiter {
    /// Allows `max_requests` per `per` window. Zero values are raised to the
    /// smallest usable limit (one request, one millisecond).
    pub fn new(max_requests: u32, per: Duration) -> Self {
        let max_tokens = f64::from(max_requests.max(1));
        let per_ms = (per.as_secs_f64() * 1000.0).max(1.0);
        Self {
            bucket: Mutex::new(Bucket {
                tokens: max_tokens,
                last_refill: Instant::now(),
            }),
            max_tokens,
            refill_rate: max_tokens / per_ms,
        }
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(bucket.last_refill).as_secs_f64() * 1000.0;
        bucket.tokens = (bucket.tokens + elapsed_ms * self.refill_rate).min(self.max_tokens);
        bucket.last_refill = now;
    }

    /// Waits until a token is available and consumes it.
    ///
    /// The bucket lock is held across the wait, so concurrent callers are
    /// admitted one at a time in arrival order. Dropping the returned future
    /// before it completes consumes nothing.
    pub async fn wait_for_token(&self) {
        let mut bucket = self.bucket.lock().await;
        loop {
            self.refill(&mut bucket);
            if bucket.tokens >= 1.0 {
                bucket.tokens -= 1.0;
                return;
            }

            let wait_ms = (1.0 - bucket.tokens) / self.refill_rate;
            let wait = Duration::from_secs_f64(wait_ms / 1000.0).max(Duration::from_millis(1));
            debug!("Rate limit reached, waiting {:?} for a token", wait);
            tokio::time::sleep(wait).await;
        }
    }

    /// Tokens currently in the bucket, after accounting for refill.
    pub async fn available_tokens(&self) -> f64 {
        let mut bucket = self.bucket.lock().await;
        self.refill(&mut bucket);
        bucket.tokens
    }
}
