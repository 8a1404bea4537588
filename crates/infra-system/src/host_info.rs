// Host facts via sysinfo
// reason: sysinfo for cross-platform host facts; refresh runs on the blocking pool
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use sysinfo::System;
use tracing::{debug, warn};

use deskops_core::port::{HostFacts, HostInfo};

/// HostInfo backed by a shared `sysinfo::System`
pub struct SysinfoHostInfo {
    system: Arc<Mutex<System>>,
}

impl SysinfoHostInfo {
    /// Create a host info adapter
    ///
    /// # Example
    /// ```ignore
    /// let host_info = SysinfoHostInfo::new();
    /// ```
    pub fn new() -> Self {
        Self {
            system: Arc::new(Mutex::new(System::new_all())),
        }
    }
}

impl Default for SysinfoHostInfo {
    fn default() -> Self {
        Self::new()
    }
}

fn read_facts(system: &Mutex<System>) -> HostFacts {
    let mut sys = system.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    sys.refresh_memory();

    let cpu_model = sys
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .unwrap_or_default();
    let cpu_cores = match sys.cpus().len() {
        0 => std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(0),
        n => n,
    };

    HostFacts {
        hostname: System::host_name().unwrap_or_default(),
        architecture: std::env::consts::ARCH.to_string(),
        cpu_cores,
        cpu_model,
        total_memory_bytes: sys.total_memory(),
        available_memory_bytes: sys.available_memory(),
        uptime_secs: System::uptime(),
        load_average_1m: System::load_average().one,
    }
}

fn empty_facts() -> HostFacts {
    HostFacts {
        hostname: String::new(),
        architecture: std::env::consts::ARCH.to_string(),
        cpu_cores: 0,
        cpu_model: String::new(),
        total_memory_bytes: 0,
        available_memory_bytes: 0,
        uptime_secs: 0,
        load_average_1m: 0.0,
    }
}

#[async_trait]
impl HostInfo for SysinfoHostInfo {
    async fn facts(&self) -> HostFacts {
        let system = self.system.clone();
        match tokio::task::spawn_blocking(move || read_facts(&system)).await {
            Ok(facts) => {
                debug!(
                    hostname = %facts.hostname,
                    cores = facts.cpu_cores,
                    total_memory = facts.total_memory_bytes,
                    load_1m = facts.load_average_1m,
                    "Host facts collected"
                );
                facts
            }
            Err(e) => {
                warn!(error = %e, "Host facts refresh failed, reporting empty facts");
                empty_facts()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_facts_are_populated() {
        let host_info = SysinfoHostInfo::new();
        let facts = host_info.facts().await;

        assert!(facts.cpu_cores > 0);
        assert!(facts.total_memory_bytes > 0);
        assert!(facts.available_memory_bytes <= facts.total_memory_bytes);
        assert_eq!(facts.architecture, std::env::consts::ARCH);
    }

    #[tokio::test]
    async fn test_repeated_reads_share_the_system() {
        let host_info = SysinfoHostInfo::new();
        let first = host_info.facts().await;
        let second = host_info.facts().await;

        assert_eq!(first.cpu_cores, second.cpu_cores);
        assert_eq!(first.total_memory_bytes, second.total_memory_bytes);
    }
}
