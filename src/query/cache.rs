//! Keyed result cache with in-flight request sharing.
//!
//! A [`QueryCache`] hands every caller asking for the same [`QueryKey`] the
//! same result: a finished success is returned from memory, a running request
//! is joined rather than duplicated. Failures are never cached, so asking
//! again after an error starts a fresh request.

use super::key::QueryKey;
use crate::domain::RemoteError;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Longest pause between two attempts.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// How a failed request is retried before its error is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Surface the first failure.
    Never,
    /// Retry up to `retries` times, waiting `base_delay * 2^attempt`
    /// (capped at 30 s) before each retry.
    Backoff { retries: u32, base_delay: Duration },
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::Backoff {
            retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// The default policy with a different base delay.
    #[must_use]
    pub fn with_base_delay(base_delay: Duration) -> Self {
        match Self::default() {
            Self::Backoff { retries, .. } => Self::Backoff { retries, base_delay },
            Self::Never => Self::Never,
        }
    }

    /// Delay before retry number `attempt` (0-based), or `None` once the
    /// policy is exhausted.
    ///
    /// # Examples
    ///
    /// ```
    /// use pokedex::query::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.delay_for(0), Some(Duration::from_secs(1)));
    /// assert_eq!(policy.delay_for(2), Some(Duration::from_secs(4)));
    /// assert_eq!(policy.delay_for(3), None);
    /// assert_eq!(RetryPolicy::Never.delay_for(0), None);
    /// ```
    #[must_use]
    pub fn delay_for(self, attempt: u32) -> Option<Duration> {
        match self {
            Self::Never => None,
            Self::Backoff { retries, base_delay } if attempt < retries => {
                let factor = 2u32.saturating_pow(attempt);
                Some(base_delay.saturating_mul(factor).min(MAX_RETRY_DELAY))
            }
            Self::Backoff { .. } => None,
        }
    }
}

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, RemoteError>>>;

enum Entry<V> {
    Ready(V),
    InFlight(SharedFetch<V>),
}

/// Result cache for one value type, keyed by [`QueryKey`].
pub struct QueryCache<V> {
    entries: Mutex<HashMap<QueryKey, Entry<V>>>,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> std::fmt::Debug for QueryCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.lock().len())
            .finish()
    }
}

impl<V> QueryCache<V> {
    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drops a cached success so the next fetch goes to the network.
    ///
    /// A request already in flight for `key` is left alone.
    pub fn invalidate(&self, key: &QueryKey) {
        let mut entries = self.lock();
        if matches!(entries.get(key), Some(Entry::Ready(_))) {
            entries.remove(key);
            tracing::debug!(key = %key, "query invalidated");
        }
    }

    /// Whether a request for `key` is currently running.
    #[must_use]
    pub fn is_in_flight(&self, key: &QueryKey) -> bool {
        matches!(self.lock().get(key), Some(Entry::InFlight(_)))
    }
}

impl<V> QueryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Returns the cached value for `key`, if a request for it succeeded.
    #[must_use]
    pub fn peek(&self, key: &QueryKey) -> Option<V> {
        match self.lock().get(key) {
            Some(Entry::Ready(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Resolves `key`, reusing a cached success or a running request.
    ///
    /// `make` builds one attempt; it is called again for each retry the
    /// policy allows.
    ///
    /// # Errors
    ///
    /// Returns the last attempt's [`RemoteError`] once the policy gives up.
    pub async fn fetch<F, Fut>(
        &self,
        key: &QueryKey,
        policy: RetryPolicy,
        make: F,
    ) -> Result<V, RemoteError>
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, RemoteError>> + Send + 'static,
    {
        let shared = {
            let mut entries = self.lock();
            match entries.get(key) {
                Some(Entry::Ready(value)) => {
                    tracing::trace!(key = %key, "query cache hit");
                    return Ok(value.clone());
                }
                Some(Entry::InFlight(running)) => {
                    tracing::debug!(key = %key, "joining in-flight query");
                    running.clone()
                }
                None => {
                    tracing::debug!(key = %key, "starting query");
                    let running = run_with_retry(key.clone(), policy, make).boxed().shared();
                    entries.insert(key.clone(), Entry::InFlight(running.clone()));
                    running
                }
            }
        };

        let result = shared.clone().await;

        let mut entries = self.lock();
        let owns_entry = matches!(
            entries.get(key),
            Some(Entry::InFlight(running)) if running.ptr_eq(&shared)
        );
        if owns_entry {
            match &result {
                Ok(value) => {
                    entries.insert(key.clone(), Entry::Ready(value.clone()));
                }
                Err(_) => {
                    entries.remove(key);
                }
            }
        }

        result
    }
}

async fn run_with_retry<V, F, Fut>(key: QueryKey, policy: RetryPolicy, make: F) -> Result<V, RemoteError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<V, RemoteError>>,
{
    let mut attempt = 0;
    loop {
        match make().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                let Some(delay) = policy.delay_for(attempt) else {
                    tracing::debug!(key = %key, attempts = attempt + 1, error = %error, "query failed");
                    return Err(error);
                };
                tracing::debug!(
                    key = %key,
                    attempt = attempt + 1,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %error,
                    "retrying query"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::with_base_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn concurrent_fetches_share_one_request() {
        let cache: Arc<QueryCache<u32>> = Arc::new(QueryCache::default());
        let calls = Arc::new(AtomicU32::new(0));
        let key = QueryKey::Page(1);

        let make = |calls: Arc<AtomicU32>| {
            move || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(7)
                }
            }
        };

        let (a, b) = tokio::join!(
            cache.fetch(&key, RetryPolicy::Never, make(Arc::clone(&calls))),
            cache.fetch(&key, RetryPolicy::Never, make(Arc::clone(&calls))),
        );

        assert_eq!(a, Ok(7));
        assert_eq!(b, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.peek(&key), Some(7));
    }

    #[tokio::test]
    async fn default_policy_retries_then_succeeds() {
        let cache: QueryCache<&'static str> = QueryCache::default();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result = cache
            .fetch(&QueryKey::Detail("25".into()), fast_retry(), move || {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(RemoteError::new(ErrorKind::Network, "offline"))
                    } else {
                        Ok("pikachu")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("pikachu"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn never_policy_makes_a_single_attempt_and_does_not_cache_failure() {
        let cache: QueryCache<u32> = QueryCache::default();
        let calls = Arc::new(AtomicU32::new(0));
        let key = QueryKey::Search("missingno".into());

        for _ in 0..2 {
            let counter = Arc::clone(&calls);
            let result = cache
                .fetch(&key, RetryPolicy::Never, move || {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err(RemoteError::new(ErrorKind::NotFound, "nope"))
                    }
                })
                .await;
            assert_eq!(result.unwrap_err().kind, ErrorKind::NotFound);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!cache.is_in_flight(&key));
    }

    #[tokio::test]
    async fn invalidate_forces_a_refetch() {
        let cache: QueryCache<u32> = QueryCache::default();
        let calls = Arc::new(AtomicU32::new(0));
        let key = QueryKey::Category("fire".into());

        for _ in 0..2 {
            let counter = Arc::clone(&calls);
            cache
                .fetch(&key, RetryPolicy::Never, move || {
                    let counter = Arc::clone(&counter);
                    async move { Ok(counter.fetch_add(1, Ordering::SeqCst)) }
                })
                .await
                .unwrap();
            cache.invalidate(&key);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.peek(&key), None);
    }

    #[test]
    fn backoff_is_capped() {
        let policy = RetryPolicy::Backoff {
            retries: 10,
            base_delay: Duration::from_secs(10),
        };
        assert_eq!(policy.delay_for(5), Some(MAX_RETRY_DELAY));
    }
}
