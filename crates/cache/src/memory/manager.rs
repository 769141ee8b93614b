//! Memory accounting, pressure notification and cleanup scheduling
//!
//! The manager tracks bytes reported by the cache layer, classifies them
//! against the configured limit and reacts to pressure by shedding pooled
//! objects. Listeners observe every evaluation.

use super::items::{CacheItem, ItemMetadata};
use super::pool::ObjectPool;
use super::pressure::{MemoryPressure, PressureThresholds};
use super::size::SizeEstimator;
use crate::config::MemoryConfig;
use crate::errors::{CacheError, RecoveryHint, Result};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Callback invoked with the current stats on every pressure evaluation
pub type PressureListener = Arc<dyn Fn(&MemoryStats) -> anyhow::Result<()> + Send + Sync>;

type CollectHook = Arc<dyn Fn() + Send + Sync>;

/// Snapshot of the manager's accounting
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    /// Tracked usage plus bytes held by idle pooled objects
    pub total_used: u64,
    pub limit: u64,
    /// `total_used / limit`, may exceed 1.0
    pub usage_percentage: f64,
    pub engine_usage: BTreeMap<String, u64>,
    pub item_count: u64,
    pub pressure_level: MemoryPressure,
    pub last_cleanup_time: Option<DateTime<Utc>>,
    pub cleanup_count: u64,
    pub pooled_objects: usize,
    pub pooled_bytes: u64,
}

/// Outcome of one cleanup pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub pooled_objects_released: usize,
    pub bytes_released: u64,
    /// Whether a collection hook was installed and invoked
    pub collect_hint_sent: bool,
}

#[derive(Default)]
struct UsageState {
    current_usage: u64,
    engine_usage: BTreeMap<String, u64>,
    item_count: u64,
    cleanup_count: u64,
    /// Monotonic time of the last cleanup, used for rate limiting
    last_cleanup: Option<Instant>,
    last_cleanup_at: Option<DateTime<Utc>>,
}

struct Inner {
    config: MemoryConfig,
    thresholds: PressureThresholds,
    usage: Mutex<UsageState>,
    listeners: Mutex<Vec<(u64, PressureListener)>>,
    next_listener_id: AtomicU64,
    metadata_pool: ObjectPool<ItemMetadata>,
    item_pool: ObjectPool<CacheItem>,
    estimator: SizeEstimator,
    collect_hook: RwLock<Option<CollectHook>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    destroyed: AtomicBool,
}

/// Tracks memory use for one cache instance.
///
/// Dropping the manager destroys it, which stops the background timer.
pub struct MemoryManager {
    inner: Arc<Inner>,
}

/// Handle returned by [`MemoryManager::on_pressure`]
#[derive(Debug)]
pub struct PressureSubscription {
    id: u64,
    inner: Weak<Inner>,
}

impl PressureSubscription {
    /// Remove the listener. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };

        let mut listeners = inner.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != self.id);
        listeners.len() != before
    }
}

impl std::fmt::Debug for Inner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryManager")
            .field("limit", &self.config.max_memory)
            .field("destroyed", &self.destroyed.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for MemoryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.inner, f)
    }
}

impl MemoryManager {
    /// Create a manager and, when a tokio runtime is available and the
    /// interval is non-zero, start the background cleanup timer.
    pub fn new(config: MemoryConfig) -> Result<Self> {
        config.validate()?;

        let metadata_pool =
            ObjectPool::with_default(config.metadata_pool_size).with_reset(ItemMetadata::reset);
        let item_pool =
            ObjectPool::with_default(config.item_pool_size).with_reset(CacheItem::reset);

        let inner = Arc::new(Inner {
            thresholds: config.thresholds(),
            usage: Mutex::new(UsageState::default()),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(0),
            metadata_pool,
            item_pool,
            estimator: SizeEstimator::new(),
            collect_hook: RwLock::new(None),
            timer: Mutex::new(None),
            destroyed: AtomicBool::new(false),
            config,
        });

        if let Some(period) = inner.config.auto_cleanup_interval() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let task = handle.spawn(monitor_loop(Arc::downgrade(&inner), period));
                    *inner.timer.lock() = Some(task);
                }
                Err(_) => {
                    tracing::warn!(
                        "No tokio runtime available, automatic memory cleanup is disabled"
                    );
                }
            }
        }

        Ok(Self { inner })
    }

    /// Install a hook asking the host to reclaim memory during cleanup
    pub fn with_collect_hook<F>(self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.inner.collect_hook.write() = Some(Arc::new(hook));
        self
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.inner.config
    }

    /// Adjust tracked usage by `delta` bytes, clamping at zero
    pub fn update_usage(&self, delta: i64, engine: Option<&str>) {
        {
            let mut usage = self.inner.usage.lock();
            usage.current_usage = apply_delta(usage.current_usage, delta);
            if let Some(engine) = engine {
                let slot = usage.engine_usage.entry(engine.to_string()).or_insert(0);
                *slot = apply_delta(*slot, delta);
            }
        }

        if self.inner.config.enable_auto_pressure_response && !self.is_destroyed() {
            self.inner.evaluate();
        }
    }

    pub fn estimator(&self) -> &SizeEstimator {
        &self.inner.estimator
    }

    /// Count a new entry: estimate its size, add it to usage and bump the item count
    pub fn track_value(&self, value: &Value, engine: Option<&str>) -> u64 {
        let size = self.inner.estimator.estimate(value);
        self.update_item_count(1);
        self.update_usage(size as i64, engine);
        size
    }

    /// Reverse of [`track_value`](Self::track_value) for a removed entry
    pub fn untrack_value(&self, value: &Value, engine: Option<&str>) -> u64 {
        let size = self.inner.estimator.estimate(value);
        self.update_item_count(-1);
        self.update_usage(-(size as i64), engine);
        size
    }

    pub fn update_item_count(&self, delta: i64) {
        let mut usage = self.inner.usage.lock();
        usage.item_count = apply_delta(usage.item_count, delta);
    }

    pub fn stats(&self) -> MemoryStats {
        self.inner.snapshot()
    }

    pub fn pressure_level(&self) -> MemoryPressure {
        self.inner.snapshot().pressure_level
    }

    /// Evaluate pressure now, notifying listeners and applying the cleanup policy
    pub fn check_pressure(&self) -> MemoryPressure {
        if self.is_destroyed() {
            return self.pressure_level();
        }
        self.inner.evaluate()
    }

    /// Register a listener. After destroy the returned subscription is inert.
    pub fn on_pressure<F>(&self, listener: F) -> PressureSubscription
    where
        F: Fn(&MemoryStats) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        if self.is_destroyed() {
            return PressureSubscription {
                id: u64::MAX,
                inner: Weak::new(),
            };
        }

        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));

        PressureSubscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    /// Whether `size` more bytes fit under the limit
    pub fn has_enough_memory(&self, size: u64) -> bool {
        self.inner.fits(size)
    }

    /// Like [`has_enough_memory`](Self::has_enough_memory), but runs one
    /// cleanup pass and checks again before giving up
    pub fn request_memory(&self, size: u64) -> bool {
        if self.inner.fits(size) {
            return true;
        }

        let report = self.inner.cleanup();
        tracing::debug!(
            requested = size,
            released = report.bytes_released,
            "Cleanup ran for memory request"
        );
        self.inner.fits(size)
    }

    /// [`request_memory`](Self::request_memory) as a `Result`
    pub fn ensure_memory(&self, size: u64) -> Result<()> {
        if self.request_memory(size) {
            return Ok(());
        }

        let stats = self.stats();
        Err(CacheError::CapacityExceeded {
            requested_bytes: size,
            available_bytes: stats.limit.saturating_sub(stats.total_used),
            recovery_hint: RecoveryHint::RunEviction,
        })
    }

    pub fn acquire_metadata(&self) -> ItemMetadata {
        self.inner.metadata_pool.acquire()
    }

    /// Return metadata to the pool. Dropped once the manager is destroyed.
    pub fn release_metadata(&self, metadata: ItemMetadata) {
        if !self.is_destroyed() {
            self.inner.metadata_pool.release(metadata);
        }
    }

    pub fn acquire_cache_item(&self) -> CacheItem {
        self.inner.item_pool.acquire()
    }

    pub fn release_cache_item(&self, item: CacheItem) {
        if !self.is_destroyed() {
            self.inner.item_pool.release(item);
        }
    }

    /// Run one cleanup pass regardless of pressure
    pub fn cleanup(&self) -> CleanupReport {
        self.inner.cleanup()
    }

    /// Zero usage, item and cleanup counters. Pools, listeners and the timer stay.
    pub fn reset(&self) {
        *self.inner.usage.lock() = UsageState::default();
    }

    /// Stop the timer, drop pooled objects and listeners. Idempotent.
    pub fn destroy(&self) {
        self.inner.destroy();
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::Acquire)
    }
}

impl Drop for MemoryManager {
    fn drop(&mut self) {
        self.inner.destroy();
    }
}

impl Inner {
    fn pooled(&self) -> (usize, u64) {
        let metadata = self.metadata_pool.size();
        let items = self.item_pool.size();
        let bytes = metadata as u64 * self.metadata_pool.object_size() as u64
            + items as u64 * self.item_pool.object_size() as u64;
        (metadata + items, bytes)
    }

    fn total_used(&self) -> u64 {
        let tracked = self.usage.lock().current_usage;
        tracked.saturating_add(self.pooled().1)
    }

    fn fits(&self, size: u64) -> bool {
        self.total_used().saturating_add(size) <= self.config.max_memory
    }

    fn snapshot(&self) -> MemoryStats {
        let (pooled_objects, pooled_bytes) = self.pooled();
        let usage = self.usage.lock();
        let total_used = usage.current_usage.saturating_add(pooled_bytes);
        let usage_percentage = total_used as f64 / self.config.max_memory as f64;

        MemoryStats {
            total_used,
            limit: self.config.max_memory,
            usage_percentage,
            engine_usage: usage.engine_usage.clone(),
            item_count: usage.item_count,
            pressure_level: self.thresholds.classify(usage_percentage),
            last_cleanup_time: usage.last_cleanup_at,
            cleanup_count: usage.cleanup_count,
            pooled_objects,
            pooled_bytes,
        }
    }

    fn evaluate(&self) -> MemoryPressure {
        let stats = self.snapshot();
        let level = stats.pressure_level;

        tracing::debug!(
            level = %level,
            used = stats.total_used,
            limit = stats.limit,
            "Evaluated memory pressure"
        );

        self.notify(&stats);

        if self.destroyed.load(Ordering::Acquire) {
            return level;
        }

        match level {
            MemoryPressure::Critical => {
                tracing::warn!(used = stats.total_used, limit = stats.limit, "Memory pressure is critical");
                self.cleanup();
            }
            MemoryPressure::High => {
                if self.cleanup_due() {
                    tracing::warn!(used = stats.total_used, limit = stats.limit, "Memory pressure is high");
                    self.cleanup();
                }
            }
            MemoryPressure::Low | MemoryPressure::Medium => {}
        }

        level
    }

    fn notify(&self, stats: &MemoryStats) {
        let listeners: Vec<PressureListener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            if self.destroyed.load(Ordering::Acquire) {
                break;
            }

            match catch_unwind(AssertUnwindSafe(|| listener(stats))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!("Memory pressure listener failed: {:#}", e);
                }
                Err(_) => {
                    tracing::warn!("Memory pressure listener panicked");
                }
            }
        }
    }

    fn cleanup_due(&self) -> bool {
        match self.usage.lock().last_cleanup {
            Some(last) => last.elapsed() >= self.config.min_cleanup_interval(),
            None => true,
        }
    }

    fn cleanup(&self) -> CleanupReport {
        let mut report = CleanupReport::default();

        if self.metadata_pool.size() > self.config.pool_cleanup_threshold {
            let released = self.metadata_pool.clear();
            report.pooled_objects_released += released;
            report.bytes_released += released as u64 * self.metadata_pool.object_size() as u64;
        }
        if self.item_pool.size() > self.config.pool_cleanup_threshold {
            let released = self.item_pool.clear();
            report.pooled_objects_released += released;
            report.bytes_released += released as u64 * self.item_pool.object_size() as u64;
        }

        let hook = self.collect_hook.read().clone();
        if let Some(hook) = hook {
            hook();
            report.collect_hint_sent = true;
        }

        {
            let mut usage = self.usage.lock();
            usage.cleanup_count += 1;
            usage.last_cleanup = Some(Instant::now());
            usage.last_cleanup_at = Some(Utc::now());
        }

        tracing::debug!(
            released = report.pooled_objects_released,
            bytes = report.bytes_released,
            "Memory cleanup pass finished"
        );
        report
    }

    fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(handle) = self.timer.lock().take() {
            handle.abort();
        }

        self.metadata_pool.clear();
        self.item_pool.clear();
        self.listeners.lock().clear();

        tracing::info!("Memory manager destroyed");
    }
}

/// Background timer. Holds only a weak reference so it never keeps the
/// manager alive.
async fn monitor_loop(inner: Weak<Inner>, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);

    loop {
        ticker.tick().await;

        let Some(inner) = inner.upgrade() else {
            break;
        };
        if inner.destroyed.load(Ordering::Acquire) {
            break;
        }

        if inner.snapshot().pressure_level != MemoryPressure::Low {
            inner.cleanup();
        }
    }
}

fn apply_delta(current: u64, delta: i64) -> u64 {
    if delta >= 0 {
        current.saturating_add(delta as u64)
    } else {
        current.saturating_sub(delta.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn config(max_memory: u64) -> MemoryConfig {
        MemoryConfig::builder()
            .with_max_memory(max_memory)
            .with_auto_cleanup_interval(Duration::ZERO)
            .build()
            .unwrap()
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("memtide_cache=debug")
            .with_test_writer()
            .try_init();
    }

    fn quiet_config(max_memory: u64) -> MemoryConfig {
        MemoryConfig::builder()
            .with_max_memory(max_memory)
            .with_auto_cleanup_interval(Duration::ZERO)
            .with_auto_pressure_response(false)
            .build()
            .unwrap()
    }

    #[test]
    fn test_pressure_levels_at_boundaries() {
        let manager = MemoryManager::new(quiet_config(1000)).unwrap();

        assert_eq!(manager.pressure_level(), MemoryPressure::Low);
        manager.update_usage(599, None);
        assert_eq!(manager.pressure_level(), MemoryPressure::Low);
        manager.update_usage(1, None);
        assert_eq!(manager.pressure_level(), MemoryPressure::Medium);
        manager.update_usage(200, None);
        assert_eq!(manager.pressure_level(), MemoryPressure::High);
        manager.update_usage(150, None);
        assert_eq!(manager.pressure_level(), MemoryPressure::Critical);
        manager.update_usage(500, None);
        assert!(manager.stats().usage_percentage > 1.0);
    }

    #[test]
    fn test_usage_and_item_count_clamp_at_zero() {
        let manager = MemoryManager::new(quiet_config(1000)).unwrap();

        manager.update_usage(100, Some("memory"));
        manager.update_usage(-500, Some("memory"));
        manager.update_item_count(3);
        manager.update_item_count(-10);

        let stats = manager.stats();
        assert_eq!(stats.total_used, 0);
        assert_eq!(stats.engine_usage.get("memory"), Some(&0));
        assert_eq!(stats.item_count, 0);
    }

    #[test]
    fn test_engine_usage_is_tracked_separately() {
        let manager = MemoryManager::new(quiet_config(10_000)).unwrap();

        manager.update_usage(100, Some("memory"));
        manager.update_usage(250, Some("disk"));
        manager.update_usage(50, None);

        let stats = manager.stats();
        assert_eq!(stats.total_used, 400);
        assert_eq!(stats.engine_usage["memory"], 100);
        assert_eq!(stats.engine_usage["disk"], 250);
    }

    #[test]
    fn test_track_value_uses_size_estimate() {
        let manager = MemoryManager::new(quiet_config(100_000)).unwrap();
        let value = serde_json::json!({"a": 1, "b": "ab", "c": [1, 2]});

        let size = manager.track_value(&value, Some("memory"));
        assert_eq!(size, manager.estimator().estimate(&value));

        let stats = manager.stats();
        assert_eq!(stats.total_used, size);
        assert_eq!(stats.item_count, 1);
        assert_eq!(stats.engine_usage["memory"], size);

        manager.untrack_value(&value, Some("memory"));
        assert_eq!(manager.stats().total_used, 0);
        assert_eq!(manager.stats().item_count, 0);
    }

    #[test]
    fn test_pooled_objects_count_toward_usage() {
        let manager = MemoryManager::new(quiet_config(100_000)).unwrap();

        manager.release_metadata(ItemMetadata::default());
        manager.release_cache_item(CacheItem::default());

        let stats = manager.stats();
        let expected = (std::mem::size_of::<ItemMetadata>() + std::mem::size_of::<CacheItem>()) as u64;
        assert_eq!(stats.pooled_objects, 2);
        assert_eq!(stats.pooled_bytes, expected);
        assert_eq!(stats.total_used, expected);
    }

    #[test]
    fn test_request_memory_succeeds_after_pool_cleanup() {
        let config = MemoryConfig::builder()
            .with_max_memory(10_000)
            .with_auto_cleanup_interval(Duration::ZERO)
            .with_auto_pressure_response(false)
            .with_pool_cleanup_threshold(0)
            .build()
            .unwrap();
        let manager = MemoryManager::new(config).unwrap();
        let pooled = 5 * std::mem::size_of::<ItemMetadata>() as u64;

        for _ in 0..5 {
            manager.release_metadata(ItemMetadata::default());
        }
        manager.update_usage((10_000 - pooled - 10) as i64, None);

        assert!(!manager.has_enough_memory(pooled));
        assert!(manager.request_memory(pooled));
        assert_eq!(manager.stats().pooled_objects, 0);
        assert_eq!(manager.stats().cleanup_count, 1);
    }

    #[test]
    fn test_request_memory_fails_when_cleanup_cannot_help() {
        let manager = MemoryManager::new(quiet_config(1000)).unwrap();
        manager.update_usage(990, None);

        assert!(manager.request_memory(5));
        assert!(!manager.request_memory(50));

        match manager.ensure_memory(50) {
            Err(CacheError::CapacityExceeded {
                requested_bytes,
                available_bytes,
                ..
            }) => {
                assert_eq!(requested_bytes, 50);
                assert_eq!(available_bytes, 10);
            }
            other => panic!("expected capacity error, got {other:?}"),
        }
    }

    #[test]
    fn test_pooled_metadata_is_reset() {
        let manager = MemoryManager::new(quiet_config(100_000)).unwrap();

        let mut metadata = manager.acquire_metadata();
        metadata.key.push_str("user:1");
        metadata.size = 42;
        metadata.engine = Some("memory".to_string());
        manager.release_metadata(metadata);

        let reused = manager.acquire_metadata();
        assert!(reused.key.is_empty());
        assert_eq!(reused.size, 0);
        assert_eq!(reused.engine, None);
    }

    #[test]
    fn test_listeners_run_on_every_evaluation_and_failures_are_isolated() {
        init_tracing();
        let manager = MemoryManager::new(config(1000)).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        manager.on_pressure(|_| anyhow::bail!("listener failure"));
        manager.on_pressure(|_| panic!("listener panic"));
        let counter = Arc::clone(&calls);
        manager.on_pressure(move |stats| {
            assert_eq!(stats.limit, 1000);
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        manager.update_usage(10, None);
        manager.update_usage(10, None);
        manager.check_pressure();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_unsubscribe_removes_listener() {
        let manager = MemoryManager::new(config(1000)).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let subscription = manager.on_pressure(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        manager.update_usage(1, None);
        assert!(subscription.unsubscribe());
        manager.update_usage(1, None);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(manager.listener_count(), 0);
    }

    #[test]
    fn test_cleanup_policy_rate_limits_high_pressure() {
        let manager = MemoryManager::new(config(1000)).unwrap();

        manager.update_usage(500, None);
        assert_eq!(manager.stats().cleanup_count, 0);

        manager.update_usage(350, None);
        assert_eq!(manager.pressure_level(), MemoryPressure::High);
        assert_eq!(manager.stats().cleanup_count, 1);

        manager.update_usage(1, None);
        assert_eq!(manager.stats().cleanup_count, 1);

        manager.update_usage(149, None);
        assert_eq!(manager.pressure_level(), MemoryPressure::Critical);
        assert_eq!(manager.stats().cleanup_count, 2);
        manager.update_usage(1, None);
        assert_eq!(manager.stats().cleanup_count, 3);
        assert!(manager.stats().last_cleanup_time.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_high_pressure_cleanup_resumes_after_interval() {
        let config = MemoryConfig::builder()
            .with_max_memory(1000)
            .with_auto_cleanup_interval(Duration::ZERO)
            .with_min_cleanup_interval(Duration::from_secs(5))
            .build()
            .unwrap();
        let manager = MemoryManager::new(config).unwrap();

        manager.update_usage(850, None);
        manager.update_usage(1, None);
        assert_eq!(manager.stats().cleanup_count, 1);

        tokio::time::advance(Duration::from_secs(5)).await;
        manager.update_usage(1, None);
        assert_eq!(manager.stats().cleanup_count, 2);
    }

    #[test]
    fn test_collect_hook_is_invoked() {
        let collected = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&collected);
        let manager = MemoryManager::new(quiet_config(1000))
            .unwrap()
            .with_collect_hook(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        let report = manager.cleanup();
        assert!(report.collect_hint_sent);
        assert_eq!(collected.load(Ordering::SeqCst), 1);

        let plain = MemoryManager::new(quiet_config(1000)).unwrap();
        assert!(!plain.cleanup().collect_hint_sent);
    }

    #[test]
    fn test_reset_keeps_pools_and_listeners() {
        let manager = MemoryManager::new(quiet_config(100_000)).unwrap();
        manager.on_pressure(|_| Ok(()));
        manager.release_metadata(ItemMetadata::default());
        manager.update_usage(500, Some("memory"));
        manager.update_item_count(4);
        manager.cleanup();

        manager.reset();

        let stats = manager.stats();
        assert_eq!(stats.total_used, stats.pooled_bytes);
        assert_eq!(stats.item_count, 0);
        assert_eq!(stats.cleanup_count, 0);
        assert!(stats.engine_usage.is_empty());
        assert_eq!(stats.pooled_objects, 1);
        assert_eq!(manager.listener_count(), 1);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let manager = MemoryManager::new(quiet_config(100_000)).unwrap();
        manager.on_pressure(|_| Ok(()));
        manager.release_cache_item(CacheItem::default());

        manager.destroy();
        manager.destroy();

        assert!(manager.is_destroyed());
        assert_eq!(manager.listener_count(), 0);
        assert_eq!(manager.stats().pooled_objects, 0);

        manager.release_cache_item(CacheItem::default());
        assert_eq!(manager.stats().pooled_objects, 0);

        let late = manager.on_pressure(|_| Ok(()));
        assert_eq!(manager.listener_count(), 0);
        assert!(!late.unsubscribe());
    }

    #[test]
    fn test_listener_can_destroy_manager() {
        let manager = Arc::new(MemoryManager::new(config(1000)).unwrap());
        let later_calls = Arc::new(AtomicUsize::new(0));

        let weak = Arc::downgrade(&manager);
        manager.on_pressure(move |_| {
            if let Some(manager) = weak.upgrade() {
                manager.destroy();
            }
            Ok(())
        });
        let counter = Arc::clone(&later_calls);
        manager.on_pressure(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        manager.update_usage(990, None);

        assert!(manager.is_destroyed());
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
        assert_eq!(manager.stats().cleanup_count, 0);

        // Further updates are accounted but no longer evaluated
        manager.update_usage(5, None);
        assert_eq!(manager.stats().total_used, 995);
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_timer_is_skipped_without_runtime() {
        let config = MemoryConfig::builder()
            .with_max_memory(1000)
            .with_auto_cleanup_interval(Duration::from_millis(10))
            .build()
            .unwrap();

        let manager = MemoryManager::new(config).unwrap();
        assert!(manager.inner.timer.lock().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_cleans_up_under_pressure() {
        let config = MemoryConfig::builder()
            .with_max_memory(1000)
            .with_auto_cleanup_interval(Duration::from_secs(1))
            .with_auto_pressure_response(false)
            .build()
            .unwrap();
        let manager = MemoryManager::new(config).unwrap();

        // Low pressure: ticks do nothing
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(manager.stats().cleanup_count, 0);

        manager.update_usage(700, None);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(manager.stats().cleanup_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_stops_after_destroy() {
        let config = MemoryConfig::builder()
            .with_max_memory(1000)
            .with_auto_cleanup_interval(Duration::from_secs(1))
            .with_auto_pressure_response(false)
            .build()
            .unwrap();
        let manager = MemoryManager::new(config).unwrap();
        manager.update_usage(900, None);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(manager.stats().cleanup_count, 1);

        manager.destroy();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(manager.stats().cleanup_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_does_not_keep_manager_alive() {
        let config = MemoryConfig::builder()
            .with_max_memory(1000)
            .with_auto_cleanup_interval(Duration::from_secs(1))
            .build()
            .unwrap();
        let manager = MemoryManager::new(config).unwrap();
        let weak = Arc::downgrade(&manager.inner);

        drop(manager);
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(weak.upgrade().is_none());
    }
}
