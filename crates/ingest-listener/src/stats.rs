use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Rolling 60s counters for the listener (§4.5 step 5). Reset after every
/// emission; `last_event` is a unix timestamp, 0 meaning "never".
#[derive(Default)]
pub struct ListenerStats {
    pub received: AtomicU64,
    pub published: AtomicU64,
    pub failed: AtomicU64,
    pub last_event: AtomicI64,
}

impl ListenerStats {
    pub fn mark_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
        self.last_event.store(chrono::Utc::now().timestamp(), Ordering::Relaxed);
    }

    pub fn mark_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn mark_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Logs the current snapshot with `allowed_size`, then zeroes the counters.
    pub fn emit_and_reset(&self, identity_id: &str, allowed_size: usize) {
        let received = self.received.swap(0, Ordering::Relaxed);
        let published = self.published.swap(0, Ordering::Relaxed);
        let failed = self.failed.swap(0, Ordering::Relaxed);
        let last_event = self.last_event.load(Ordering::Relaxed);
        tracing::info!(
            identity_id,
            received,
            published,
            failed,
            allowed_size,
            last_event,
            "listener stats"
        );
    }
}
