//! Object pool for reducing allocation churn

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;
type Reset<T> = Box<dyn Fn(&mut T) + Send + Sync>;
type Validate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Reusable object store with stack discipline.
///
/// `acquire` hands out the most recently released instance, or builds a new
/// one. `release` resets the instance and keeps it while the pool is below
/// `max_size`; anything beyond that is dropped.
pub struct ObjectPool<T> {
    /// Idle instances, most recently released last
    items: Mutex<Vec<T>>,
    /// Maximum number of idle instances to keep
    max_size: usize,
    factory: Factory<T>,
    reset: Reset<T>,
    validate: Option<Validate<T>>,
    created: AtomicU64,
    acquired: AtomicU64,
    released: AtomicU64,
    reused: AtomicU64,
    discarded: AtomicU64,
}

/// Pool counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStats {
    pub created: u64,
    pub acquired: u64,
    pub released: u64,
    pub reused: u64,
    /// Instances dropped because the pool was full or they failed validation
    pub discarded: u64,
    pub pooled: usize,
}

impl<T> ObjectPool<T> {
    pub fn new<F>(max_size: usize, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            items: Mutex::new(Vec::new()),
            max_size,
            factory: Box::new(factory),
            reset: Box::new(|_| {}),
            validate: None,
            created: AtomicU64::new(0),
            acquired: AtomicU64::new(0),
            released: AtomicU64::new(0),
            reused: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    /// Run `reset` on every instance before it goes back into the pool
    pub fn with_reset<R>(mut self, reset: R) -> Self
    where
        R: Fn(&mut T) + Send + Sync + 'static,
    {
        self.reset = Box::new(reset);
        self
    }

    /// Instances failing `validate` are dropped instead of handed out
    pub fn with_validator<V>(mut self, validate: V) -> Self
    where
        V: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.validate = Some(Box::new(validate));
        self
    }

    /// Fill the pool with up to `count` fresh instances
    pub fn prewarm(self, count: usize) -> Self {
        {
            let mut items = self.items.lock();
            while items.len() < count.min(self.max_size) {
                items.push((self.factory)());
                self.created.fetch_add(1, Ordering::Relaxed);
            }
        }
        self
    }

    pub fn acquire(&self) -> T {
        self.acquired.fetch_add(1, Ordering::Relaxed);

        loop {
            let Some(item) = self.items.lock().pop() else {
                break;
            };

            match &self.validate {
                Some(validate) if !validate(&item) => {
                    self.discarded.fetch_add(1, Ordering::Relaxed);
                }
                _ => {
                    self.reused.fetch_add(1, Ordering::Relaxed);
                    return item;
                }
            }
        }

        self.created.fetch_add(1, Ordering::Relaxed);
        (self.factory)()
    }

    /// Return an instance. Returns false when the pool was full and it was dropped.
    pub fn release(&self, mut item: T) -> bool {
        self.released.fetch_add(1, Ordering::Relaxed);

        if self.items.lock().len() >= self.max_size {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        (self.reset)(&mut item);

        let mut items = self.items.lock();
        if items.len() < self.max_size {
            items.push(item);
            true
        } else {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Drop every idle instance, returning how many were dropped
    pub fn clear(&self) -> usize {
        let drained: Vec<T> = std::mem::take(&mut *self.items.lock());
        drained.len()
    }

    /// Current number of idle instances
    pub fn size(&self) -> usize {
        self.items.lock().len()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Approximate bytes held by one idle instance
    pub const fn object_size(&self) -> usize {
        std::mem::size_of::<T>()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.created.load(Ordering::Relaxed),
            acquired: self.acquired.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            pooled: self.size(),
        }
    }
}

impl<T: Default> ObjectPool<T> {
    /// Pool building instances with `T::default()`
    pub fn with_default(max_size: usize) -> Self
    where
        T: 'static,
    {
        Self::new(max_size, T::default)
    }
}
