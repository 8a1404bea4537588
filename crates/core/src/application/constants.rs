// Dispatch and telemetry constants (no magic values in the services)
use std::time::Duration;

/// Samples taken per CPU window
pub const DEFAULT_SAMPLE_COUNT: usize = 8;

/// Span of one CPU sample window (8 samples, 250ms apart)
pub const DEFAULT_SAMPLE_WINDOW: Duration = Duration::from_millis(2000);

/// Timeout for one CPU sample and for the memory query
pub const SAMPLE_TIMEOUT: Duration = Duration::from_secs(2);

/// Timeout for the disk query
pub const DISK_QUERY_TIMEOUT: Duration = Duration::from_secs(3);

/// Timeout for application open/close commands
pub const APP_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for the active-window title lookup
pub const WINDOW_TITLE_TIMEOUT: Duration = Duration::from_secs(2);

/// Load-average to CPU-percent multiplier on platforms without a load query
pub const LOAD_AVERAGE_MULTIPLIER: f64 = 10.0;

/// Health thresholds (percent, strictly greater than)
pub const POOR_MEMORY_PCT: f64 = 80.0;
pub const POOR_CPU_PCT: f64 = 80.0;
pub const POOR_DISK_PCT: f64 = 90.0;
pub const FAIR_MEMORY_PCT: f64 = 60.0;
pub const FAIR_CPU_PCT: f64 = 60.0;
pub const FAIR_DISK_PCT: f64 = 80.0;

/// Snapshots kept by the in-memory telemetry log
pub const DEFAULT_TELEMETRY_HISTORY: usize = 32;

/// Targets containing any of these open the web CAD tool instead of a native process
pub const BROWSER_ROUTE_KEYWORDS: [&str; 3] = ["onshape", "3d", "cad"];

/// Where browser-routed targets are opened
pub const CAD_WEB_URL: &str = "https://cad.onshape.com";

/// Characters never accepted in an application name (shell and `cmd.exe` metacharacters)
pub const FORBIDDEN_TARGET_CHARS: [char; 10] = ['"', ';', '&', '|', '<', '>', '^', '%', '$', '`'];
