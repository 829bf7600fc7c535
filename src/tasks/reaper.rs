//! Expiry Reaper Task
//!
//! Background loop that sleeps until the cache's next expiry, runs an
//! eviction pass, and repeats until its shutdown future resolves.

use std::future::Future;
use std::hash::Hash;
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Cache;
use crate::clock::{from_unix_seconds, Clock};

/// Shortest sleep between passes, and the polling period while no entry has
/// a TTL.
pub const FALLBACK_INTERVAL: Duration = Duration::from_secs(1);

/// Runs the reaper loop on the current task until `shutdown` resolves.
///
/// Each round reads the next expiry and waits for it, never less than
/// `fallback`. With no TTL entries it waits `fallback` and checks again
/// without evicting. Otherwise it runs one eviction pass, handing each
/// removed pair to `on_evicted`.
///
/// Shutdown is only observed while waiting and takes priority over a timer
/// that fires at the same moment; no final pass runs after it.
pub async fn run_reaper<K, V, C, S, F>(
    cache: Cache<K, V, C>,
    fallback: Duration,
    shutdown: S,
    mut on_evicted: F,
) where
    K: Eq + Hash + Clone,
    C: Clock,
    S: Future<Output = ()>,
    F: FnMut(K, V) -> bool,
{
    tokio::pin!(shutdown);

    info!(
        "Starting expiry reaper with fallback interval of {}ms",
        fallback.as_millis()
    );

    loop {
        let next_expiry = cache.next_expiry_time();
        let wait = wait_duration(next_expiry, cache.now(), fallback);

        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Expiry reaper stopped");
                return;
            }
            _ = tokio::time::sleep(wait) => {}
        }

        if next_expiry.is_none() {
            continue;
        }

        let evicted = cache.evict(&mut on_evicted);
        if evicted > 0 {
            info!("Expiry reaper: evicted {} expired entries", evicted);
        } else {
            debug!("Expiry reaper: no expired entries found");
        }
    }
}

/// Spawns [`run_reaper`] on the tokio runtime.
///
/// # Example
/// ```ignore
/// let cache: Cache<String, String> = Cache::new();
/// let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
/// let handle = spawn_reaper(cache.clone(), FALLBACK_INTERVAL, async move {
///     let _ = stop_rx.await;
/// }, |_, _| true);
/// // Later, during shutdown:
/// let _ = stop_tx.send(());
/// handle.await?;
/// ```
pub fn spawn_reaper<K, V, C, S, F>(
    cache: Cache<K, V, C>,
    fallback: Duration,
    shutdown: S,
    on_evicted: F,
) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
    C: Clock,
    S: Future<Output = ()> + Send + 'static,
    F: FnMut(K, V) -> bool + Send + 'static,
{
    tokio::spawn(run_reaper(cache, fallback, shutdown, on_evicted))
}

/// How long to sleep before the next pass: until `next_expiry`, clamped up
/// to `fallback`. Overdue or unrepresentable deadlines clamp the same way.
pub fn wait_duration(next_expiry: Option<i64>, now: SystemTime, fallback: Duration) -> Duration {
    let Some(expiry) = next_expiry else {
        return fallback;
    };

    match from_unix_seconds(expiry) {
        Some(deadline) => deadline
            .duration_since(now)
            .unwrap_or(Duration::ZERO)
            .max(fallback),
        None => Duration::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::UNIX_EPOCH;
    use tokio::sync::oneshot;

    const T0: u64 = 1_700_000_000;

    fn shutdown_pair() -> (oneshot::Sender<()>, impl Future<Output = ()> + Send + 'static) {
        let (tx, rx) = oneshot::channel::<()>();
        (tx, async move {
            let _ = rx.await;
        })
    }

    #[test]
    fn test_wait_duration_without_ttl_entries() {
        let now = UNIX_EPOCH + Duration::from_secs(T0);
        assert_eq!(wait_duration(None, now, FALLBACK_INTERVAL), FALLBACK_INTERVAL);
    }

    #[test]
    fn test_wait_duration_until_deadline() {
        let now = UNIX_EPOCH + Duration::from_millis(T0 * 1000 + 250);
        let wait = wait_duration(Some(T0 as i64 + 10), now, FALLBACK_INTERVAL);
        assert_eq!(wait, Duration::from_millis(9_750));
    }

    #[test]
    fn test_wait_duration_clamped_to_fallback() {
        let now = UNIX_EPOCH + Duration::from_secs(T0);

        // Due in under a second
        let soon = UNIX_EPOCH + Duration::from_millis(T0 * 1000 + 500);
        assert_eq!(
            wait_duration(Some(T0 as i64), soon, FALLBACK_INTERVAL),
            FALLBACK_INTERVAL
        );

        // Already overdue
        assert_eq!(
            wait_duration(Some(T0 as i64 - 30), now, FALLBACK_INTERVAL),
            FALLBACK_INTERVAL
        );
    }

    #[test]
    fn test_wait_duration_far_future() {
        let now = UNIX_EPOCH + Duration::from_secs(T0);
        let wait = wait_duration(Some(i64::MAX), now, FALLBACK_INTERVAL);
        assert!(wait > Duration::from_secs(3600));
    }

    #[test]
    fn test_reaper_returns_when_shutdown_already_resolved() {
        let cache: Cache<String, i32> = Cache::new();
        cache.set_with_ttl("k".to_string(), 1, Duration::ZERO);

        tokio_test::block_on(run_reaper(
            cache.clone(),
            FALLBACK_INTERVAL,
            std::future::ready(()),
            |_, _| true,
        ));

        // No final pass after cancellation
        assert_eq!(cache.get("k"), Some(1));
    }

    #[tokio::test]
    async fn test_reaper_removes_expired_entries() {
        let cache: Cache<String, i32> = Cache::new();
        cache.set("key1".to_string(), 1);
        cache.set_with_ttl("key2".to_string(), 2, Duration::from_secs(1));

        let (stop, shutdown) = shutdown_pair();
        let handle = spawn_reaper(cache.clone(), FALLBACK_INTERVAL, shutdown, |_, _| true);

        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(cache.get("key1"), Some(1), "Entry without TTL must survive");
        assert_eq!(cache.get("key2"), None, "Expired entry should have been reaped");

        stop.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_reaper_follows_mock_clock() {
        let clock = MockClock::at_unix(T0);
        let cache = Cache::with_clock(clock.clone());
        cache.set_with_ttl("a".to_string(), 1, Duration::from_secs(1));
        cache.set_with_ttl("b".to_string(), 2, Duration::from_secs(3600));

        clock.advance(Duration::from_secs(5));

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let (stop, shutdown) = shutdown_pair();
        let handle = spawn_reaper(
            cache.clone(),
            Duration::from_millis(20),
            shutdown,
            move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            },
        );

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        stop.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_reaper_idle_cache_stops_promptly() {
        let cache: Cache<String, i32> = Cache::new();
        cache.set("permanent".to_string(), 1);

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let (stop, shutdown) = shutdown_pair();
        let handle = spawn_reaper(cache.clone(), FALLBACK_INTERVAL, shutdown, move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        stop.send(()).unwrap();

        tokio::time::timeout(FALLBACK_INTERVAL, handle)
            .await
            .expect("reaper should stop within one fallback interval")
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(cache.get("permanent"), Some(1));
    }

    #[tokio::test]
    async fn test_reaper_cancelled_during_long_wait() {
        let cache: Cache<String, i32> = Cache::new();
        cache.set_with_ttl("later".to_string(), 1, Duration::from_secs(3600));

        let (stop, shutdown) = shutdown_pair();
        let handle = spawn_reaper(cache.clone(), FALLBACK_INTERVAL, shutdown, |_, _| true);

        tokio::time::sleep(Duration::from_millis(50)).await;
        stop.send(()).unwrap();

        tokio::time::timeout(Duration::from_millis(500), handle)
            .await
            .expect("reaper should stop while waiting")
            .unwrap();

        assert_eq!(cache.get("later"), Some(1));
    }

    #[tokio::test]
    async fn test_cache_run_reaper_method() {
        let cache: Cache<String, i32> = Cache::new();
        cache.set_with_ttl("k".to_string(), 1, Duration::ZERO);

        let (stop, shutdown) = shutdown_pair();
        let reaper_cache = cache.clone();
        let handle = tokio::spawn(async move {
            reaper_cache.run_reaper(shutdown, |_, _| true).await;
        });

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(cache.get("k"), None);

        stop.send(()).unwrap();
        handle.await.unwrap();
    }
}
