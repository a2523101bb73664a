use app_config::RateLimitingConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// The throttled routes. Each bucket has its own quota and window, and a
/// client's windows in different buckets are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteBucket {
    Register,
    Login,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Denied { retry_after: Duration },
}

#[derive(Debug, Clone)]
pub struct BucketPolicy {
    pub quota: usize,
    pub window: Duration,
}

#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    pub register: BucketPolicy,
    pub login: BucketPolicy,
    pub cleanup_interval: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            register: BucketPolicy {
                quota: 5,
                window: Duration::from_secs(3600),
            },
            login: BucketPolicy {
                quota: 10,
                window: Duration::from_secs(60),
            },
            cleanup_interval: Duration::from_secs(300),
        }
    }
}

impl RateLimiterConfig {
    pub fn from_config(config: &RateLimitingConfig) -> Self {
        Self {
            register: BucketPolicy {
                quota: config.register.quota,
                window: Duration::from_secs(config.register.window_secs),
            },
            login: BucketPolicy {
                quota: config.login.quota,
                window: Duration::from_secs(config.login.window_secs),
            },
            cleanup_interval: Duration::from_secs(config.cleanup_interval_secs),
        }
    }
}

/// One fixed window for one `(client, bucket)` key. The count keeps
/// incrementing past the quota so denials are observable; it never grants
/// anything.
#[derive(Debug)]
struct Window {
    count: usize,
    started: Instant,
}

/// Fixed-window request counter keyed by `(client_key, bucket)`.
///
/// The whole table sits behind one RwLock and every check takes the write
/// guard for its read-modify-write, so check-and-increment is atomic: two
/// concurrent requests can never both consume the last slot of a window.
#[derive(Debug, Clone)]
pub struct FixedWindowLimiter {
    windows: Arc<RwLock<HashMap<(String, RouteBucket), Window>>>,
    config: RateLimiterConfig,
    last_sweep: Arc<RwLock<Instant>>,
}

impl FixedWindowLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            windows: Arc::new(RwLock::new(HashMap::new())),
            config,
            last_sweep: Arc::new(RwLock::new(Instant::now())),
        }
    }

    fn policy(&self, bucket: RouteBucket) -> &BucketPolicy {
        match bucket {
            RouteBucket::Register => &self.config.register,
            RouteBucket::Login => &self.config.login,
        }
    }

    /// Record a request and decide whether it may proceed.
    pub async fn check_and_record(&self, client_key: &str, bucket: RouteBucket) -> RateDecision {
        self.check_and_record_at(client_key, bucket, Instant::now())
            .await
    }

    /// Same as `check_and_record` with an explicit clock, so window
    /// boundaries can be tested without sleeping.
    pub async fn check_and_record_at(
        &self,
        client_key: &str,
        bucket: RouteBucket,
        now: Instant,
    ) -> RateDecision {
        let policy = self.policy(bucket).clone();
        let mut windows = self.windows.write().await;

        self.maybe_sweep(&mut windows, now).await;

        let key = (client_key.to_string(), bucket);
        match windows.get_mut(&key) {
            Some(window) if now.duration_since(window.started) < policy.window => {
                window.count += 1;
                if window.count > policy.quota {
                    let retry_after = policy.window - now.duration_since(window.started);
                    RateDecision::Denied { retry_after }
                } else {
                    RateDecision::Allowed
                }
            }
            _ => {
                // No window yet, or the previous one has fully elapsed.
                windows.insert(
                    key,
                    Window {
                        count: 1,
                        started: now,
                    },
                );
                RateDecision::Allowed
            }
        }
    }

    /// Number of live window entries, for observability and tests.
    pub async fn tracked_keys(&self) -> usize {
        self.windows.read().await.len()
    }

    /// Drop windows that have fully elapsed. Runs at most once per
    /// cleanup interval, piggybacked on a regular check.
    async fn maybe_sweep(
        &self,
        windows: &mut HashMap<(String, RouteBucket), Window>,
        now: Instant,
    ) {
        let mut last_sweep = self.last_sweep.write().await;

        if now.duration_since(*last_sweep) >= self.config.cleanup_interval {
            windows.retain(|(_, bucket), window| {
                let policy = match bucket {
                    RouteBucket::Register => &self.config.register,
                    RouteBucket::Login => &self.config.login,
                };
                now.duration_since(window.started) < policy.window
            });

            *last_sweep = now;
        }
    }
}
