//! Last-write-wins bookkeeping for preview requests.
//!
//! Slider drags issue many preview requests for the same key. Renders are
//! cheap and never cancelled; a caller tags each request with a ticket and
//! drops results whose ticket is no longer current.

use parking_lot::Mutex;
use std::collections::HashMap;

/// Identifies one preview request for a cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTicket {
    key: String,
    generation: u64,
}

impl PreviewTicket {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
struct Generations {
    /// Shared across keys so a forgotten key never reuses a generation.
    next: u64,
    latest: HashMap<String, u64>,
}

/// Newest request generation per cache key.
///
/// Keys stay tracked until [`forget`](Self::forget) is called; callers
/// forget a key when its cache entry goes away.
#[derive(Debug, Default)]
pub struct LatestRequests {
    generations: Mutex<Generations>,
}

impl LatestRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request for `key`, superseding earlier ones.
    pub fn issue(&self, key: &str) -> PreviewTicket {
        let mut state = self.generations.lock();
        state.next += 1;
        let generation = state.next;
        state.latest.insert(key.to_string(), generation);
        PreviewTicket {
            key: key.to_string(),
            generation,
        }
    }

    /// Whether no newer request for the ticket's key has been issued.
    pub fn is_current(&self, ticket: &PreviewTicket) -> bool {
        self.generations
            .lock()
            .latest
            .get(&ticket.key)
            .is_some_and(|&g| g == ticket.generation)
    }

    /// Stop tracking a key. Outstanding tickets for it become stale.
    pub fn forget(&self, key: &str) {
        self.generations.lock().latest.remove(key);
    }

    /// Number of keys with an outstanding generation.
    pub fn tracked(&self) -> usize {
        self.generations.lock().latest.len()
    }
}
