use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Rolling 60s counters shared by the realtime and historical consumer
/// loops (§4.9). Urgency buckets are 1..5, stored at index `score - 1`.
#[derive(Default)]
pub struct IngestorStats {
    pub consumed: AtomicU64,
    pub persisted: AtomicU64,
    pub failed: AtomicU64,
    pub notifications_sent: AtomicU64,
    pub forced: AtomicU64,
    pub filtered: AtomicU64,
    pub urgency: [AtomicU64; 5],
    pub last_event: AtomicI64,
}

impl IngestorStats {
    pub fn mark_consumed(&self) {
        self.consumed.fetch_add(1, Ordering::Relaxed);
        self.last_event.store(chrono::Utc::now().timestamp(), Ordering::Relaxed);
    }

    pub fn mark_urgency(&self, score: i32) {
        if (1..=5).contains(&score) {
            self.urgency[(score - 1) as usize].fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Logs the combined snapshot from both consumer loops, then resets.
    pub fn emit_and_reset(&self) {
        let consumed = self.consumed.swap(0, Ordering::Relaxed);
        let persisted = self.persisted.swap(0, Ordering::Relaxed);
        let failed = self.failed.swap(0, Ordering::Relaxed);
        let notifications_sent = self.notifications_sent.swap(0, Ordering::Relaxed);
        let forced = self.forced.swap(0, Ordering::Relaxed);
        let filtered = self.filtered.swap(0, Ordering::Relaxed);
        let urgency: Vec<u64> = self.urgency.iter().map(|a| a.swap(0, Ordering::Relaxed)).collect();
        let last_event = self.last_event.load(Ordering::Relaxed);
        tracing::info!(
            consumed,
            persisted,
            failed,
            notifications_sent,
            forced,
            filtered,
            urgency_1 = urgency[0],
            urgency_2 = urgency[1],
            urgency_3 = urgency[2],
            urgency_4 = urgency[3],
            urgency_5 = urgency[4],
            last_event,
            "ingestor stats"
        );
    }
}
