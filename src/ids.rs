/// Mock identifier generation for backend records.
///
/// The real backend allocates ids server-side; here a prefixed atomic counter
/// stands in so ids stay unique and deterministic within a process.
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl IdGenerator {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Allocate the next id, e.g. `note-000001`.
    pub fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{:06}", self.prefix, n)
    }

    /// Number of ids allocated so far.
    pub fn allocated(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}
