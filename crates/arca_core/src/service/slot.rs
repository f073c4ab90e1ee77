//! Single-flight cache slot.
//!
//! # Invariants
//! - At most one load runs per slot at a time; waiters observe its result.
//! - A failed or cancelled load leaves the slot `Unloaded`.
//! - Cached reads only take the state read lock, never the flight lock.

use crate::error::CoreResult;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;

/// Observable state of one cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Unloaded,
    Loading,
    Loaded,
}

enum Phase<T> {
    Unloaded,
    Loading,
    Loaded(Arc<T>),
}

pub(crate) struct Slot<T> {
    phase: RwLock<Phase<T>>,
    flight: Mutex<()>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            phase: RwLock::new(Phase::Unloaded),
            flight: Mutex::new(()),
        }
    }
}

impl<T> Slot<T> {
    pub(crate) fn state(&self) -> SlotState {
        match &*self.phase.read().unwrap_or_else(PoisonError::into_inner) {
            Phase::Unloaded => SlotState::Unloaded,
            Phase::Loading => SlotState::Loading,
            Phase::Loaded(_) => SlotState::Loaded,
        }
    }

    pub(crate) fn get(&self) -> Option<Arc<T>> {
        match &*self.phase.read().unwrap_or_else(PoisonError::into_inner) {
            Phase::Loaded(value) => Some(Arc::clone(value)),
            Phase::Unloaded | Phase::Loading => None,
        }
    }

    /// Returns the cached value, or runs `load` once and caches its output.
    ///
    /// Concurrent callers queue on the flight lock and pick up the value the
    /// winner stored. An error is returned to the caller that ran the load;
    /// queued callers then retry with their own `load`.
    pub(crate) async fn get_or_load<F, Fut>(&self, load: F) -> CoreResult<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CoreResult<T>>,
    {
        if let Some(value) = self.get() {
            return Ok(value);
        }

        let _flight = self.flight.lock().await;
        if let Some(value) = self.get() {
            return Ok(value);
        }

        let guard = LoadingGuard::enter(self);
        let value = Arc::new(load().await?);
        guard.complete(Arc::clone(&value));
        Ok(value)
    }

    fn set(&self, phase: Phase<T>) {
        *self.phase.write().unwrap_or_else(PoisonError::into_inner) = phase;
    }
}

/// Marks a slot `Loading` and rolls it back to `Unloaded` unless completed.
struct LoadingGuard<'a, T> {
    slot: &'a Slot<T>,
    completed: bool,
}

impl<'a, T> LoadingGuard<'a, T> {
    fn enter(slot: &'a Slot<T>) -> Self {
        slot.set(Phase::Loading);
        Self {
            slot,
            completed: false,
        }
    }

    fn complete(mut self, value: Arc<T>) {
        self.slot.set(Phase::Loaded(value));
        self.completed = true;
    }
}

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        if !self.completed {
            self.slot.set(Phase::Unloaded);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Slot, SlotState};
    use crate::error::{CoreError, ErrorKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn loads_once_and_then_serves_cache() {
        let slot = Slot::default();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = slot
                .get_or_load(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await
                .unwrap();
            assert_eq!(*value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(slot.state(), SlotState::Loaded);
    }

    #[tokio::test]
    async fn failure_returns_slot_to_unloaded() {
        let slot: Slot<u8> = Slot::default();

        let err = slot
            .get_or_load(|| async { Err(CoreError::new(ErrorKind::NotFound)) })
            .await
            .unwrap_err();

        assert!(err.is(ErrorKind::NotFound));
        assert_eq!(slot.state(), SlotState::Unloaded);
        assert!(slot.get().is_none());
    }

    #[tokio::test]
    async fn cancelled_load_returns_slot_to_unloaded() {
        let slot: Slot<u8> = Slot::default();

        let outcome = tokio::time::timeout(
            Duration::from_millis(10),
            slot.get_or_load(|| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(1)
            }),
        )
        .await;

        assert!(outcome.is_err());
        assert_eq!(slot.state(), SlotState::Unloaded);
        assert_eq!(*slot.get_or_load(|| async { Ok(2) }).await.unwrap(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_one_load() {
        let slot = Arc::new(Slot::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let slot = Arc::clone(&slot);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    slot.get_or_load(|| async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok("loaded")
                    })
                    .await
                    .map(|value| *value)
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "loaded");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
