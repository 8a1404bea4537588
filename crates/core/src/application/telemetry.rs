//! Telemetry Assembler - builds health snapshots on demand
//!
//! Five independently fault-tolerant steps: host facts, sampled CPU, disk query,
//! memory query, classification. A failing step contributes zeroed figures
//! instead of failing the snapshot.

use crate::application::constants::{DISK_QUERY_TIMEOUT, LOAD_AVERAGE_MULTIPLIER, SAMPLE_TIMEOUT};
use crate::application::health::classify;
use crate::application::parsers::{parse_key_value_lines, parse_numeric_output, DiskUsage};
use crate::application::platform_resolver::PlatformProfile;
use crate::application::sampler::Sampler;
use crate::application::telemetry_log::TelemetryLog;
use crate::domain::health::{bytes_to_gb, round2, whole_percent};
use crate::domain::{
    CpuStats, DetailedStats, DiskStats, HealthSnapshot, MemoryStats, SystemInfo, TelemetryError,
    UptimeStats,
};
use crate::port::{CommandRunner, HostFacts, HostInfo, TimeProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
struct CpuReading {
    usage: f64,
    samples_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct MemoryFigures {
    total_bytes: u64,
    free_bytes: u64,
}

impl MemoryFigures {
    fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.free_bytes)
    }
}

struct Measurements {
    facts: HostFacts,
    cpu: CpuReading,
    disk: DiskUsage,
    memory: MemoryFigures,
}

impl Measurements {
    fn memory_pct(&self) -> u32 {
        whole_percent(self.memory.used_bytes(), self.memory.total_bytes)
    }

    fn cpu_pct(&self) -> u32 {
        self.cpu.usage.floor().clamp(0.0, 100.0) as u32
    }
}

/// CPU approximation for platforms without a load query
///
/// 1-minute load average times a fixed multiplier, clamped to 0..=100.
pub fn load_average_cpu(load_average_1m: f64) -> f64 {
    if !load_average_1m.is_finite() {
        return 0.0;
    }
    (load_average_1m * LOAD_AVERAGE_MULTIPLIER).clamp(0.0, 100.0)
}

/// Orchestrates sampler, platform queries and host facts into snapshots
pub struct TelemetryAssembler {
    profile: Arc<PlatformProfile>,
    runner: Arc<dyn CommandRunner>,
    host_info: Arc<dyn HostInfo>,
    time_provider: Arc<dyn TimeProvider>,
    sampler: Sampler,
    log: Arc<TelemetryLog>,
}

impl TelemetryAssembler {
    pub fn new(
        profile: Arc<PlatformProfile>,
        runner: Arc<dyn CommandRunner>,
        host_info: Arc<dyn HostInfo>,
        time_provider: Arc<dyn TimeProvider>,
        sampler: Sampler,
        log: Arc<TelemetryLog>,
    ) -> Self {
        Self {
            profile,
            runner,
            host_info,
            time_provider,
            sampler,
            log,
        }
    }

    pub fn log(&self) -> &Arc<TelemetryLog> {
        &self.log
    }

    /// Cheap path: host facts only, no sampling, no external commands
    pub async fn system_info(&self) -> SystemInfo {
        let facts = self.host_info.facts().await;
        SystemInfo {
            platform: self.profile.platform,
            hostname: facts.hostname,
            architecture: facts.architecture,
            cpu_cores: facts.cpu_cores,
            cpu_model: facts.cpu_model,
            total_memory_gb: bytes_to_gb(facts.total_memory_bytes),
            free_memory_gb: bytes_to_gb(facts.available_memory_bytes),
            uptime_hours: round2(facts.uptime_secs as f64 / 3600.0),
        }
    }

    /// Build a fresh health snapshot and append it to the telemetry log
    pub async fn build_snapshot(&self) -> HealthSnapshot {
        let m = self.measure().await;
        let (memory_pct, cpu_pct, disk_pct) = (m.memory_pct(), m.cpu_pct(), m.disk.used_pct());

        let snapshot = HealthSnapshot {
            overall: classify(memory_pct as f64, cpu_pct as f64, disk_pct as f64),
            memory_pct,
            cpu_pct,
            disk_pct,
            disk_free_gb: bytes_to_gb(m.disk.free_bytes),
            disk_total_gb: bytes_to_gb(m.disk.size_bytes),
            uptime_hours: round2(m.facts.uptime_secs as f64 / 3600.0),
            timestamp: self.time_provider.now_millis(),
        };

        info!(
            overall = %snapshot.overall,
            memory_pct = snapshot.memory_pct,
            cpu_pct = snapshot.cpu_pct,
            disk_pct = snapshot.disk_pct,
            "Health snapshot built"
        );

        self.log.record(snapshot.clone());
        snapshot
    }

    /// Build detailed stats (same measurements, richer shape)
    pub async fn build_detailed_stats(&self) -> DetailedStats {
        let m = self.measure().await;
        let (memory_pct, cpu_pct, disk_pct) = (m.memory_pct(), m.cpu_pct(), m.disk.used_pct());

        let stats = DetailedStats {
            platform: self.profile.platform,
            hostname: m.facts.hostname.clone(),
            architecture: m.facts.architecture.clone(),
            overall: classify(memory_pct as f64, cpu_pct as f64, disk_pct as f64),
            cpu: CpuStats {
                usage_pct: cpu_pct,
                cores: m.facts.cpu_cores,
                model: m.facts.cpu_model.clone(),
                samples_count: m.cpu.samples_count,
            },
            memory: MemoryStats {
                total_gb: bytes_to_gb(m.memory.total_bytes),
                used_gb: bytes_to_gb(m.memory.used_bytes()),
                free_gb: bytes_to_gb(m.memory.free_bytes),
                usage_pct: memory_pct,
            },
            disk: DiskStats {
                total_gb: bytes_to_gb(m.disk.size_bytes),
                free_gb: bytes_to_gb(m.disk.free_bytes),
                usage_pct: disk_pct,
            },
            uptime: UptimeStats::from_seconds(m.facts.uptime_secs),
            timestamp: self.time_provider.now_millis(),
        };

        info!(
            overall = %stats.overall,
            cpu_samples = stats.cpu.samples_count,
            "Detailed stats built"
        );

        self.log.record(stats.to_snapshot());
        stats
    }

    async fn measure(&self) -> Measurements {
        let facts = self.host_info.facts().await;
        let cpu = self.cpu_usage(&facts).await;
        let disk = self.disk_usage().await;
        let memory = self.memory_figures(&facts).await;

        Measurements {
            facts,
            cpu,
            disk,
            memory,
        }
    }

    async fn cpu_usage(&self, facts: &HostFacts) -> CpuReading {
        match self.profile.cpu_query {
            Some(command) => {
                let timeout = self.sampler.window().sample_timeout;
                let summary = self
                    .sampler
                    .sample("cpu", move || self.query_number(command, timeout))
                    .await;
                CpuReading {
                    usage: summary.average.clamp(0.0, 100.0),
                    samples_count: summary.samples_count,
                }
            }
            None => {
                let usage = load_average_cpu(facts.load_average_1m);
                debug!(
                    load_average = facts.load_average_1m,
                    usage = usage,
                    "CPU approximated from load average"
                );
                CpuReading {
                    usage,
                    samples_count: 0,
                }
            }
        }
    }

    async fn query_number(&self, command: &str, timeout: Duration) -> Result<f64, TelemetryError> {
        let stdout = self.runner.run(command, timeout).await?;
        Ok(parse_numeric_output(&stdout)?)
    }

    async fn disk_usage(&self) -> DiskUsage {
        match self.read_disk().await {
            Ok(usage) => usage,
            Err(TelemetryError::Unsupported(metric)) => {
                debug!(platform = %self.profile.platform, metric = metric, "Disk figures unavailable");
                DiskUsage::default()
            }
            Err(e) => {
                warn!(error = %e, "Disk query failed, reporting zeroed disk figures");
                DiskUsage::default()
            }
        }
    }

    async fn read_disk(&self) -> Result<DiskUsage, TelemetryError> {
        let query = self
            .profile
            .disk_query
            .as_ref()
            .ok_or(TelemetryError::Unsupported("disk"))?;
        let stdout = self.runner.run(query.command, DISK_QUERY_TIMEOUT).await?;
        Ok(query.format.parse(&stdout)?)
    }

    /// Platform memory query first, host facts second, zeros last
    async fn memory_figures(&self, facts: &HostFacts) -> MemoryFigures {
        match self.memory_from_query().await {
            Some(figures) => figures,
            None => memory_from_host(facts).unwrap_or_default(),
        }
    }

    async fn memory_from_query(&self) -> Option<MemoryFigures> {
        let query = self.profile.memory_query.as_ref()?;
        let stdout = match self.runner.run(query.command, SAMPLE_TIMEOUT).await {
            Ok(stdout) => stdout,
            Err(e) => {
                debug!(error = %e, "Memory query failed, falling back to host facts");
                return None;
            }
        };

        let report = parse_key_value_lines(&stdout);
        let total_bytes = report.get(query.total_key).saturating_mul(1024);
        if total_bytes == 0 {
            debug!(keys = report.len(), "Memory report has no total");
            return None;
        }

        Some(MemoryFigures {
            total_bytes,
            free_bytes: report.get(query.free_key).saturating_mul(1024),
        })
    }
}

fn memory_from_host(facts: &HostFacts) -> Option<MemoryFigures> {
    (facts.total_memory_bytes > 0).then(|| MemoryFigures {
        total_bytes: facts.total_memory_bytes,
        free_bytes: facts.available_memory_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sampler::SampleWindow;
    use crate::domain::{HealthRating, Platform};
    use crate::port::command_runner::mocks::{MockCommandRunner, MockResponse};
    use crate::port::host_info::mocks::MockHostInfo;
    use crate::port::time_provider::mocks::FixedTimeProvider;
    use crate::port::CommandError;

    const WINDOWS_DISK: &str = "Size FreeSpace\n---- ---------\n1021821579264 863185633280";
    const WINDOWS_MEMORY: &str =
        "\r\nTotalVisibleMemorySize : 16663532\r\nFreePhysicalMemory     : 7340032\r\n";

    fn assembler(
        platform: Platform,
        runner: MockCommandRunner,
        host: MockHostInfo,
    ) -> TelemetryAssembler {
        TelemetryAssembler::new(
            Arc::new(PlatformProfile::resolve(platform)),
            Arc::new(runner),
            Arc::new(host),
            Arc::new(FixedTimeProvider::new(5_000)),
            Sampler::new(SampleWindow {
                count: 4,
                window: Duration::from_millis(8),
                sample_timeout: Duration::from_millis(50),
            }),
            Arc::new(TelemetryLog::new(8)),
        )
    }

    #[tokio::test]
    async fn test_windows_snapshot_averages_cpu() {
        let runner = MockCommandRunner::new()
            .on_sequence(
                "LoadPercentage",
                vec![
                    MockResponse::Output("20".into()),
                    MockResponse::Output("40".into()),
                    MockResponse::Fail(CommandError::Timeout(2000)),
                    MockResponse::Output("30".into()),
                ],
            )
            .on_output("Win32_LogicalDisk", WINDOWS_DISK)
            .on_output("Win32_OperatingSystem", WINDOWS_MEMORY);
        let telemetry = assembler(Platform::Windows, runner.clone(), MockHostInfo::new());

        let stats = telemetry.build_detailed_stats().await;

        assert_eq!(stats.cpu.usage_pct, 30);
        assert_eq!(stats.cpu.samples_count, 3);
        assert_eq!(stats.disk.usage_pct, 15);
        assert_eq!(stats.memory.usage_pct, 55);
        assert_eq!(stats.overall, HealthRating::Good);
        assert_eq!(stats.timestamp, 5_000);
        assert_eq!(
            runner.calls().iter().filter(|c| c.contains("LoadPercentage")).count(),
            4
        );
    }

    #[tokio::test]
    async fn test_windows_total_failure_degrades_to_defaults() {
        let host = MockHostInfo::new();
        host.set_memory(0, 0);
        let runner = MockCommandRunner::new()
            .on("LoadPercentage", MockResponse::Hang)
            .on_output("Win32_LogicalDisk", "garbage");
        let telemetry = assembler(Platform::Windows, runner, host);

        let stats = telemetry.build_detailed_stats().await;

        assert_eq!(stats.cpu.usage_pct, 0);
        assert_eq!(stats.cpu.samples_count, 0);
        assert_eq!(stats.disk.total_gb, 0.0);
        assert_eq!(stats.disk.usage_pct, 0);
        assert_eq!(stats.memory.total_gb, 0.0);
        assert_eq!(stats.overall, HealthRating::Good);
    }

    #[tokio::test]
    async fn test_memory_falls_back_to_host_facts() {
        let runner = MockCommandRunner::new()
            .on_output("LoadPercentage", "10")
            .on_output("Win32_LogicalDisk", WINDOWS_DISK)
            .on_output("Win32_OperatingSystem", "Access denied");
        let telemetry = assembler(Platform::Windows, runner, MockHostInfo::new());

        let stats = telemetry.build_detailed_stats().await;

        // MockHostInfo: 16 GiB total, 8 GiB available
        assert_eq!(stats.memory.total_gb, 16.0);
        assert_eq!(stats.memory.usage_pct, 50);
    }

    #[tokio::test]
    async fn test_macos_runs_no_queries() {
        let runner = MockCommandRunner::new();
        let host = MockHostInfo::new();
        host.set_load_average(2.5);
        let telemetry = assembler(Platform::Macos, runner.clone(), host);

        let snapshot = telemetry.build_snapshot().await;

        assert_eq!(runner.call_count(), 0);
        assert_eq!(snapshot.cpu_pct, 25);
        assert_eq!(snapshot.disk_pct, 0);
        assert_eq!(snapshot.disk_total_gb, 0.0);
        assert_eq!(snapshot.memory_pct, 50);
        assert_eq!(snapshot.uptime_hours, 24.0);
    }

    #[tokio::test]
    async fn test_linux_load_average_clamps_to_poor() {
        let runner = MockCommandRunner::new()
            .on_output(
                "df -kP",
                "Filesystem 1024-blocks Used Available Capacity Mounted on\n/dev/sda1 1000 500 500 50% /\n",
            )
            .on_output(
                "/proc/meminfo",
                "MemTotal: 1000 kB\nMemFree: 100 kB\nMemAvailable: 300 kB\n",
            );
        let host = MockHostInfo::new();
        host.set_load_average(12.0);
        let telemetry = assembler(Platform::Linux, runner, host);

        let snapshot = telemetry.build_snapshot().await;

        assert_eq!(snapshot.cpu_pct, 100);
        assert_eq!(snapshot.memory_pct, 70);
        assert_eq!(snapshot.disk_pct, 50);
        assert_eq!(snapshot.overall, HealthRating::Poor);
    }

    #[tokio::test]
    async fn test_every_build_is_logged() {
        let telemetry = assembler(Platform::Macos, MockCommandRunner::new(), MockHostInfo::new());

        telemetry.build_snapshot().await;
        telemetry.build_detailed_stats().await;

        assert_eq!(telemetry.log().recent().len(), 2);
    }

    #[tokio::test]
    async fn test_system_info_skips_commands() {
        let runner = MockCommandRunner::new();
        let telemetry = assembler(Platform::Linux, runner.clone(), MockHostInfo::new());

        let info = telemetry.system_info().await;

        assert_eq!(runner.call_count(), 0);
        assert_eq!(info.platform, Platform::Linux);
        assert_eq!(info.cpu_cores, 8);
        assert_eq!(info.total_memory_gb, 16.0);
    }

    #[test]
    fn test_load_average_cpu() {
        assert_eq!(load_average_cpu(0.5), 5.0);
        assert_eq!(load_average_cpu(50.0), 100.0);
        assert_eq!(load_average_cpu(-1.0), 0.0);
        assert_eq!(load_average_cpu(f64::NAN), 0.0);
    }
}
