// Host facts port
// reason: async-trait so adapters may refresh blocking OS counters off the caller's path
use async_trait::async_trait;

/// Static and slow-moving host facts, read directly without sampling
#[derive(Debug, Clone, PartialEq)]
pub struct HostFacts {
    pub hostname: String,
    pub architecture: String,
    pub cpu_cores: usize,
    pub cpu_model: String,
    pub total_memory_bytes: u64,
    pub available_memory_bytes: u64,
    pub uptime_secs: u64,
    pub load_average_1m: f64,
}

/// Host information port
#[async_trait]
pub trait HostInfo: Send + Sync {
    /// Read current host facts
    ///
    /// Never fails: unknown fields are empty strings or zero.
    async fn facts(&self) -> HostFacts;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock HostInfo for testing
    pub struct MockHostInfo {
        facts: Arc<Mutex<HostFacts>>,
    }

    impl MockHostInfo {
        /// 8 cores, 16 GiB total with 8 GiB available, up for a day
        pub fn new() -> Self {
            Self::with_facts(HostFacts {
                hostname: "test-host".to_string(),
                architecture: "x86_64".to_string(),
                cpu_cores: 8,
                cpu_model: "Test CPU @ 3.00GHz".to_string(),
                total_memory_bytes: 16 * 1024 * 1024 * 1024,
                available_memory_bytes: 8 * 1024 * 1024 * 1024,
                uptime_secs: 86_400,
                load_average_1m: 0.5,
            })
        }

        pub fn with_facts(facts: HostFacts) -> Self {
            Self {
                facts: Arc::new(Mutex::new(facts)),
            }
        }

        pub fn set_load_average(&self, load: f64) {
            self.facts.lock().unwrap().load_average_1m = load;
        }

        pub fn set_memory(&self, total_bytes: u64, available_bytes: u64) {
            let mut facts = self.facts.lock().unwrap();
            facts.total_memory_bytes = total_bytes;
            facts.available_memory_bytes = available_bytes;
        }
    }

    impl Default for MockHostInfo {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl HostInfo for MockHostInfo {
        async fn facts(&self) -> HostFacts {
            self.facts.lock().unwrap().clone()
        }
    }
}
