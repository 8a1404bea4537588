// Bounded in-memory telemetry log
use crate::domain::HealthSnapshot;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Most recent snapshots, oldest evicted first. Never persisted.
pub struct TelemetryLog {
    snapshots: Mutex<VecDeque<HealthSnapshot>>,
    capacity: usize,
}

impl TelemetryLog {
    /// Capacity is at least 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshots: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn record(&self, snapshot: HealthSnapshot) {
        let mut snapshots = self
            .snapshots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        snapshots.push_back(snapshot);

        // Keep only recent snapshots
        while snapshots.len() > self.capacity {
            snapshots.pop_front();
        }
    }

    /// Copy of the log, oldest first
    pub fn recent(&self) -> Vec<HealthSnapshot> {
        self.snapshots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    /// Last `limit` snapshots, oldest first
    pub fn latest(&self, limit: usize) -> Vec<HealthSnapshot> {
        let all = self.recent();
        let start = all.len().saturating_sub(limit);
        all[start..].to_vec()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_evicts_oldest() {
        let log = TelemetryLog::new(3);
        for ts in 1..=5 {
            log.record(HealthSnapshot::unknown(ts));
        }

        let timestamps: Vec<i64> = log.recent().iter().map(|s| s.timestamp).collect();
        assert_eq!(timestamps, vec![3, 4, 5]);
    }

    #[test]
    fn test_latest_limit() {
        let log = TelemetryLog::new(10);
        for ts in 1..=4 {
            log.record(HealthSnapshot::unknown(ts));
        }

        let timestamps: Vec<i64> = log.latest(2).iter().map(|s| s.timestamp).collect();
        assert_eq!(timestamps, vec![3, 4]);
        assert_eq!(log.latest(100).len(), 4);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let log = TelemetryLog::new(0);
        log.record(HealthSnapshot::unknown(1));
        log.record(HealthSnapshot::unknown(2));
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.recent()[0].timestamp, 2);
    }
}
