// Health & telemetry value objects
//
// Every value here is built fresh for one call and never cached, except the
// snapshots kept by the bounded telemetry log.

use crate::domain::{ActiveApplicationRecord, Platform};
use serde::{Deserialize, Serialize};

/// Ordinal machine-health rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthRating {
    Good,
    Fair,
    Poor,
    Unknown,
}

impl std::fmt::Display for HealthRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthRating::Good => write!(f, "Good"),
            HealthRating::Fair => write!(f, "Fair"),
            HealthRating::Poor => write!(f, "Poor"),
            HealthRating::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Point-in-time health snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub overall: HealthRating,
    pub memory_pct: u32,
    pub cpu_pct: u32,
    pub disk_pct: u32,
    pub disk_free_gb: f64,
    pub disk_total_gb: f64,
    pub uptime_hours: f64,
    pub timestamp: i64, // epoch ms
}

impl HealthSnapshot {
    /// Snapshot used when assembly could not run at all
    pub fn unknown(timestamp: i64) -> Self {
        Self {
            overall: HealthRating::Unknown,
            memory_pct: 0,
            cpu_pct: 0,
            disk_pct: 0,
            disk_free_gb: 0.0,
            disk_total_gb: 0.0,
            uptime_hours: 0.0,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuStats {
    pub usage_pct: u32,
    pub cores: usize,
    pub model: String,
    /// Successful samples behind `usage_pct`; 0 means the value is a default or an approximation
    pub samples_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_gb: f64,
    pub used_gb: f64,
    pub free_gb: f64,
    pub usage_pct: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskStats {
    pub total_gb: f64,
    pub free_gb: f64,
    pub usage_pct: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UptimeStats {
    pub seconds: u64,
    pub hours: f64,
    pub days: f64,
}

impl UptimeStats {
    pub fn from_seconds(seconds: u64) -> Self {
        Self {
            seconds,
            hours: round2(seconds as f64 / 3600.0),
            days: round2(seconds as f64 / 86_400.0),
        }
    }
}

/// Richer variant of `HealthSnapshot` returned by `get_system_status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedStats {
    pub platform: Platform,
    pub hostname: String,
    pub architecture: String,
    pub overall: HealthRating,
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub disk: DiskStats,
    pub uptime: UptimeStats,
    pub timestamp: i64,
}

impl DetailedStats {
    pub fn unknown(platform: Platform, timestamp: i64) -> Self {
        Self {
            platform,
            hostname: String::new(),
            architecture: String::new(),
            overall: HealthRating::Unknown,
            cpu: CpuStats {
                usage_pct: 0,
                cores: 0,
                model: String::new(),
                samples_count: 0,
            },
            memory: MemoryStats {
                total_gb: 0.0,
                used_gb: 0.0,
                free_gb: 0.0,
                usage_pct: 0,
            },
            disk: DiskStats {
                total_gb: 0.0,
                free_gb: 0.0,
                usage_pct: 0,
            },
            uptime: UptimeStats::from_seconds(0),
            timestamp,
        }
    }

    /// Flatten into the snapshot shape kept by the telemetry log
    pub fn to_snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            overall: self.overall,
            memory_pct: self.memory.usage_pct,
            cpu_pct: self.cpu.usage_pct,
            disk_pct: self.disk.usage_pct,
            disk_free_gb: self.disk.free_gb,
            disk_total_gb: self.disk.total_gb,
            uptime_hours: self.uptime.hours,
            timestamp: self.timestamp,
        }
    }
}

/// Cheap, unaveraged machine facts (`get_system_info`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub platform: Platform,
    pub hostname: String,
    pub architecture: String,
    pub cpu_cores: usize,
    pub cpu_model: String,
    pub total_memory_gb: f64,
    pub free_memory_gb: f64,
    pub uptime_hours: f64,
}

/// What the UI layer shows alongside a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentContext {
    pub platform: Platform,
    pub active_applications: Vec<ActiveApplicationRecord>,
    pub cwd: String,
    pub timestamp: i64,
    pub system_info: SystemInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_window_title: Option<String>,
}

/// Round to two decimals (GB and hour figures)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Bytes to gigabytes (1024^3), two decimals
pub fn bytes_to_gb(bytes: u64) -> f64 {
    round2(bytes as f64 / 1024.0 / 1024.0 / 1024.0)
}

/// Whole percentage of `part` in `total`, truncated toward zero and capped at 100
///
/// A zero total yields 0 so missing figures never look like a full disk.
pub fn whole_percent(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let pct = (part as f64 / total as f64 * 100.0).floor();
    pct.clamp(0.0, 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_percent_truncates() {
        let size = 1_021_821_579_264u64;
        let free = 863_185_633_280u64;
        assert_eq!(whole_percent(size - free, size), 15);
        assert_eq!(whole_percent(5, 0), 0);
        assert_eq!(whole_percent(200, 100), 100);
    }

    #[test]
    fn test_uptime_breakdown() {
        let uptime = UptimeStats::from_seconds(2 * 86_400 + 3 * 3600);
        assert_eq!(uptime.hours, 51.0);
        assert_eq!(uptime.days, 2.13);
    }

    #[test]
    fn test_detailed_stats_flatten() {
        let mut stats = DetailedStats::unknown(Platform::Linux, 42);
        stats.overall = HealthRating::Fair;
        stats.memory.usage_pct = 70;
        stats.disk.total_gb = 100.0;

        let snapshot = stats.to_snapshot();
        assert_eq!(snapshot.overall, HealthRating::Fair);
        assert_eq!(snapshot.memory_pct, 70);
        assert_eq!(snapshot.disk_total_gb, 100.0);
        assert_eq!(snapshot.timestamp, 42);
    }

    #[test]
    fn test_bytes_to_gb() {
        assert_eq!(bytes_to_gb(1024 * 1024 * 1024), 1.0);
        assert_eq!(bytes_to_gb(0), 0.0);
    }
}
