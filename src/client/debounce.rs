//! Coalesces bursts of calls into one delayed call per key.

use std::{
    collections::HashMap,
    future::Future,
    hash::Hash,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{sync::Notify, task::JoinHandle};

struct PendingTask {
    generation: u64,
    handle: JoinHandle<()>,
}

struct Slots<K> {
    next_generation: u64,
    pending: HashMap<K, PendingTask>,
    /// Tasks whose delay elapsed and that are still running.
    in_flight: usize,
}

impl<K> Slots<K> {
    fn outstanding(&self) -> usize {
        self.pending.len() + self.in_flight
    }
}

/// At most one scheduled task per key. Scheduling again for a key that still
/// waits out its delay cancels the waiting task. A task whose delay has
/// elapsed has left its slot and runs to completion; [`Debouncer::flush`]
/// waits for those as well as the waiting ones.
pub struct Debouncer<K> {
    slots: Arc<Mutex<Slots<K>>>,
    settled: Arc<Notify>,
}

impl<K> Clone for Debouncer<K> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
            settled: Arc::clone(&self.settled),
        }
    }
}

impl<K> Default for Debouncer<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Slots {
                next_generation: 0,
                pending: HashMap::new(),
                in_flight: 0,
            })),
            settled: Arc::new(Notify::new()),
        }
    }

    /// Runs `task` after `delay` unless another call for `key` arrives first.
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, key: K, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slots = lock(&self.slots);
        slots.next_generation += 1;
        let generation = slots.next_generation;

        if let Some(previous) = slots.pending.remove(&key) {
            previous.handle.abort();
        }

        let shared = Arc::clone(&self.slots);
        let settled = Arc::clone(&self.settled);
        let slot_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let running = {
                let mut slots = lock(&shared);
                let current = slots.pending.get(&slot_key).map(|task| task.generation);
                if current != Some(generation) {
                    // Superseded between the timer firing and taking the lock.
                    return;
                }
                slots.pending.remove(&slot_key);
                slots.in_flight += 1;
                InFlight {
                    slots: Arc::clone(&shared),
                    settled,
                }
            };
            task.await;
            drop(running);
        });

        slots.pending.insert(key, PendingTask { generation, handle });
    }

    /// Drops the waiting task for `key`. Returns whether one was waiting.
    pub fn cancel(&self, key: &K) -> bool {
        let mut slots = lock(&self.slots);
        let Some(task) = slots.pending.remove(key) else {
            return false;
        };
        task.handle.abort();
        if slots.outstanding() == 0 {
            self.settled.notify_waiters();
        }
        true
    }

    pub fn is_pending(&self, key: &K) -> bool {
        lock(&self.slots).pending.contains_key(key)
    }

    /// Tasks still waiting out their delay.
    pub fn pending_count(&self) -> usize {
        lock(&self.slots).pending.len()
    }

    /// Waiting tasks plus fired tasks that have not finished yet.
    pub fn outstanding(&self) -> usize {
        lock(&self.slots).outstanding()
    }

    /// Resolves once no task is waiting or running.
    pub async fn flush(&self) {
        loop {
            let settled = self.settled.notified();
            if self.outstanding() == 0 {
                return;
            }
            settled.await;
        }
    }
}

/// Held by a fired task while it runs. Dropping it, on completion or on
/// unwind, releases the task's `in_flight` count.
struct InFlight<K> {
    slots: Arc<Mutex<Slots<K>>>,
    settled: Arc<Notify>,
}

impl<K> Drop for InFlight<K> {
    fn drop(&mut self) {
        let mut slots = lock(&self.slots);
        slots.in_flight = slots.in_flight.saturating_sub(1);
        if slots.outstanding() == 0 {
            self.settled.notify_waiters();
        }
    }
}

fn lock<K>(slots: &Mutex<Slots<K>>) -> MutexGuard<'_, Slots<K>> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}
