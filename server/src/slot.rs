use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

/// A lazily filled, resettable holder for a single shared value.
///
/// Readers of an already filled slot only take a shared lock, so they never
/// exclude each other. Filling is serialized by a separate mutex, which guarantees
/// that concurrent first callers run the initializer at most once. A failed
/// initialization leaves the slot empty so the next caller tries again.
#[derive(Debug)]
pub struct ModelSlot<M> {
    cached: RwLock<Option<Arc<M>>>,
    init: Mutex<()>,
}

impl<M> Default for ModelSlot<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> ModelSlot<M> {
    pub fn new() -> Self {
        Self {
            cached: RwLock::new(None),
            init: Mutex::new(()),
        }
    }

    /// Returns the cached value, if any.
    pub fn get(&self) -> Option<Arc<M>> {
        self.cached.read().clone()
    }

    /// Returns the cached value, running `init` to create it if the slot is empty.
    ///
    /// # Arguments
    /// * `init` - Builds the value, only called while holding the init lock.
    ///
    /// # Returns
    /// The shared value, or whatever error `init` failed with.
    pub fn get_or_try_init<F, E>(&self, init: F) -> Result<Arc<M>, E>
    where
        F: FnOnce() -> Result<M, E>,
    {
        if let Some(value) = self.get() {
            return Ok(value);
        }

        let _guard = self.init.lock();

        // Someone else may have filled it while we waited.
        if let Some(value) = self.get() {
            return Ok(value);
        }

        let value = Arc::new(init()?);
        *self.cached.write() = Some(Arc::clone(&value));
        Ok(value)
    }

    pub fn is_filled(&self) -> bool {
        self.cached.read().is_some()
    }

    /// Empties the slot, the next `get_or_try_init` will initialize it again.
    pub fn reset(&self) {
        let _guard = self.init.lock();
        *self.cached.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Barrier,
            atomic::{AtomicUsize, Ordering},
        },
        thread,
        time::Duration,
    };

    use super::*;

    #[test]
    fn initializes_once_and_reuses() {
        let slot = ModelSlot::new();
        let calls = AtomicUsize::new(0);
        let init = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(7)
        };

        let a = slot.get_or_try_init(init).unwrap();
        let b = slot.get_or_try_init(init).unwrap();

        assert_eq!(*a, 7);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failure_is_not_cached() {
        let slot = ModelSlot::new();

        assert_eq!(slot.get_or_try_init(|| Err("boom")), Err("boom"));
        assert!(!slot.is_filled());

        assert_eq!(*slot.get_or_try_init(|| Ok::<_, &str>(1)).unwrap(), 1);
        assert!(slot.is_filled());
    }

    #[test]
    fn reset_forces_a_new_init() {
        let slot = ModelSlot::new();
        slot.get_or_try_init(|| Ok::<_, ()>(1)).unwrap();

        slot.reset();
        assert!(slot.get().is_none());

        assert_eq!(*slot.get_or_try_init(|| Ok::<_, ()>(2)).unwrap(), 2);
    }

    #[test]
    fn concurrent_first_callers_share_one_init() {
        const THREADS: usize = 8;

        let slot = ModelSlot::new();
        let calls = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);
        let (slot, calls, barrier) = (&slot, &calls, &barrier);

        let values: Vec<Arc<i32>> = thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(move || {
                        barrier.wait();
                        slot.get_or_try_init(|| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(20));
                            Ok::<_, ()>(42)
                        })
                        .unwrap()
                    })
                })
                .collect();

            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(values.iter().all(|v| Arc::ptr_eq(v, &values[0])));
    }
}
