use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

/// Time source for TTL decisions, injectable so expiry is testable
/// without real time passing.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Entry<T> {
    value: T,
    stored_at: Instant,
}

/// Single-slot cache holding one value under a fixed key with a TTL.
pub struct TtlCell<T> {
    slot: Mutex<Option<Entry<T>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> TtlCell<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { slot: Mutex::new(None), ttl, clock }
    }

    /// Returns the cached value if present and not expired. Stale
    /// entries are evicted on read.
    pub fn get(&self) -> Option<T> {
        let mut slot = self.slot.lock().expect("ttl cell poisoned");
        match &*slot {
            Some(entry) if self.clock.now().duration_since(entry.stored_at) <= self.ttl => {
                Some(entry.value.clone())
            },
            Some(_) => {
                *slot = None;
                None
            },
            None => None,
        }
    }

    pub fn put(&self, value: T) {
        let mut slot = self.slot.lock().expect("ttl cell poisoned");
        *slot = Some(Entry { value, stored_at: self.clock.now() });
    }

    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().expect("ttl cell poisoned");
        *slot = None;
    }
}
