//! Pooled instance manager.
//!
//! Keeps per-type free-lists of reusable containers so that repeated decode
//! calls do not reallocate collection storage.
//!
//! # Design
//!
//! - [`Pool<T>`]: one bounded free-list behind a `parking_lot::Mutex`
//! - [`PoolSet`]: one `Pool<T>` per container type, keyed by `TypeId`
//! - `checkout` and `release` are the only two operations
//!
//! A checked-out instance is owned by the caller until it is moved back in
//! with `release`. Instances that are never released are simply dropped.
//!
//! # Usage
//!
//! ```
//! use fieldwire::pool::PoolSet;
//!
//! let pools = PoolSet::new(8);
//! let mut list: Vec<u32> = pools.checkout();
//! list.extend([1, 2, 3]);
//! pools.release(list);
//!
//! let again: Vec<u32> = pools.checkout();
//! assert!(again.is_empty());
//! assert!(again.capacity() >= 3);
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::config::{CodecConfig, DEFAULT_POOL_CAPACITY};

/// A container that can be recycled through a [`Pool`].
pub trait Poolable: Send + 'static {
    /// Construct a fresh, empty instance.
    fn create() -> Self;

    /// Reset contents while keeping allocated storage.
    fn clean(&mut self);
}

impl<T: Send + 'static> Poolable for Vec<T> {
    #[inline]
    fn create() -> Self {
        Vec::new()
    }

    #[inline]
    fn clean(&mut self) {
        self.clear();
    }
}

/// Bounded free-list of one container type.
pub struct Pool<T: Poolable> {
    free: Mutex<Vec<T>>,
    capacity: usize,
    created: AtomicUsize,
    reused: AtomicUsize,
}

impl<T: Poolable> Pool<T> {
    /// Create a pool that retains at most `capacity` idle instances.
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            created: AtomicUsize::new(0),
            reused: AtomicUsize::new(0),
        }
    }

    /// Take a cleared instance, constructing one if the free-list is empty.
    pub fn checkout(&self) -> T {
        if let Some(item) = self.free.lock().pop() {
            self.reused.fetch_add(1, Ordering::Relaxed);
            return item;
        }
        self.created.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("Pool<{}>: creating instance", std::any::type_name::<T>());
        T::create()
    }

    /// Clean an instance and push it back onto the free-list.
    ///
    /// The instance is dropped if the pool already holds `capacity` idle
    /// instances.
    pub fn release(&self, mut item: T) {
        item.clean();
        let mut free = self.free.lock();
        if free.len() >= self.capacity {
            tracing::warn!(
                "Pool<{}> at capacity ({}), dropping instance",
                std::any::type_name::<T>(),
                self.capacity
            );
            return;
        }
        free.push(item);
    }

    /// Number of idle instances ready for checkout.
    #[inline]
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    /// Total instances constructed by this pool.
    #[inline]
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    /// Total checkouts served from the free-list.
    #[inline]
    pub fn reused(&self) -> usize {
        self.reused.load(Ordering::Relaxed)
    }

    /// Most idle instances this pool retains.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Poolable> Default for Pool<T> {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}

impl<T: Poolable> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("type", &std::any::type_name::<T>())
            .field("capacity", &self.capacity)
            .field("idle", &self.idle())
            .field("created", &self.created())
            .field("reused", &self.reused())
            .finish()
    }
}

/// One [`Pool`] per container type, created on first use.
///
/// Safe to share between threads; owned by the codec context.
pub struct PoolSet {
    pools: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    capacity: usize,
}

impl PoolSet {
    /// Create a set whose pools each retain at most `capacity` instances.
    pub fn new(capacity: usize) -> Self {
        Self {
            pools: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Create a set sized from a codec config.
    pub fn from_config(config: &CodecConfig) -> Self {
        Self::new(config.pool_capacity)
    }

    /// Get (or create) the pool for `T`.
    pub fn pool<T: Poolable>(&self) -> Arc<Pool<T>> {
        let key = TypeId::of::<T>();
        if let Some(pool) = self.pools.read().get(&key) {
            if let Ok(pool) = Arc::clone(pool).downcast::<Pool<T>>() {
                return pool;
            }
        }

        let mut pools = self.pools.write();
        let entry = pools.entry(key).or_insert_with(|| {
            Arc::new(Pool::<T>::new(self.capacity)) as Arc<dyn Any + Send + Sync>
        });
        match Arc::clone(entry).downcast::<Pool<T>>() {
            Ok(pool) => pool,
            Err(_) => {
                // Keyed by TypeId, so the entry is always a Pool<T>
                let pool = Arc::new(Pool::<T>::new(self.capacity));
                *entry = Arc::clone(&pool) as Arc<dyn Any + Send + Sync>;
                pool
            }
        }
    }

    /// Check out an instance of `T`.
    #[inline]
    pub fn checkout<T: Poolable>(&self) -> T {
        self.pool::<T>().checkout()
    }

    /// Return an instance of `T`. It must not be used afterwards.
    #[inline]
    pub fn release<T: Poolable>(&self, item: T) {
        self.pool::<T>().release(item)
    }

    /// Number of container types with a pool.
    pub fn len(&self) -> usize {
        self.pools.read().len()
    }

    /// Check if no pool has been created yet.
    pub fn is_empty(&self) -> bool {
        self.pools.read().is_empty()
    }
}

impl Default for PoolSet {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}

impl std::fmt::Debug for PoolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolSet")
            .field("pools", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
