//! Platform Resolver - command tables per operating system
//!
//! Maps a `Platform` to the application alias table, the argv prefixes used to
//! open and close applications, and the telemetry queries. A missing query
//! (`None`) means the platform has no support for that metric and telemetry
//! degrades to defaults.
//!
//! Application names travel as a single argv entry and never through a shell;
//! only the fixed telemetry queries are shell lines.

use crate::application::constants::{BROWSER_ROUTE_KEYWORDS, FORBIDDEN_TARGET_CHARS};
use crate::application::parsers::DiskReportFormat;
use crate::domain::error::Result;
use crate::domain::{DispatchError, Platform};
use crate::port::Invocation;
use std::collections::HashMap;

/// Disk query and the shape of its report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskQuery {
    pub command: &'static str,
    pub format: DiskReportFormat,
}

/// Memory query and the report keys it yields (values in KiB)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryQuery {
    pub command: &'static str,
    pub total_key: &'static str,
    pub free_key: &'static str,
}

/// How an application is started
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchStrategy {
    /// Program and leading arguments; the application name is appended last
    Via(&'static [&'static str]),
    /// The application name is the program itself, started detached
    Direct,
}

/// Everything platform-specific the dispatcher and telemetry need
#[derive(Debug, Clone)]
pub struct PlatformProfile {
    pub platform: Platform,
    pub app_aliases: HashMap<&'static str, &'static str>,
    pub launch: LaunchStrategy,
    /// Program and leading arguments of the kill command; the image name is appended
    pub close_prefix: &'static [&'static str],
    pub disk_query: Option<DiskQuery>,
    pub memory_query: Option<MemoryQuery>,
    pub cpu_query: Option<&'static str>,
    /// Tried in order; first non-empty output wins
    pub active_window_queries: Vec<&'static str>,
}

impl PlatformProfile {
    /// Resolve the profile for a platform tag
    pub fn resolve(platform: Platform) -> Self {
        match platform {
            Platform::Windows => Self::windows(),
            Platform::Macos => Self::macos(),
            Platform::Linux => Self::linux(),
        }
    }

    fn windows() -> Self {
        Self {
            platform: Platform::Windows,
            app_aliases: HashMap::from([
                ("notepad", "notepad.exe"),
                ("calculator", "calc.exe"),
                ("calc", "calc.exe"),
                ("paint", "mspaint.exe"),
                ("explorer", "explorer.exe"),
                ("file explorer", "explorer.exe"),
                ("cmd", "cmd.exe"),
                ("terminal", "wt.exe"),
                ("powershell", "powershell.exe"),
                ("chrome", "chrome.exe"),
                ("edge", "msedge.exe"),
                ("firefox", "firefox.exe"),
                ("word", "winword.exe"),
                ("excel", "excel.exe"),
                ("vscode", "code.exe"),
                ("vs code", "code.exe"),
            ]),
            launch: LaunchStrategy::Via(&["cmd", "/C", "start", ""]),
            close_prefix: &["taskkill", "/F", "/IM"],
            disk_query: Some(DiskQuery {
                command: "powershell -NoProfile -Command \"Get-CimInstance Win32_LogicalDisk -Filter 'DeviceID=''C:''' | Format-Table Size,FreeSpace -AutoSize\"",
                format: DiskReportFormat::WindowsTable,
            }),
            memory_query: Some(MemoryQuery {
                command: "powershell -NoProfile -Command \"Get-CimInstance Win32_OperatingSystem | Format-List TotalVisibleMemorySize,FreePhysicalMemory\"",
                total_key: "TotalVisibleMemorySize",
                free_key: "FreePhysicalMemory",
            }),
            cpu_query: Some(
                "powershell -NoProfile -Command \"(Get-CimInstance Win32_Processor | Measure-Object -Property LoadPercentage -Average).Average\"",
            ),
            active_window_queries: vec![
                "powershell -NoProfile -Command \"(Get-Process | Where-Object { $_.MainWindowTitle } | Sort-Object StartTime -Descending | Select-Object -First 1).MainWindowTitle\"",
            ],
        }
    }

    fn macos() -> Self {
        Self {
            platform: Platform::Macos,
            app_aliases: HashMap::from([
                ("notepad", "TextEdit"),
                ("textedit", "TextEdit"),
                ("calculator", "Calculator"),
                ("calc", "Calculator"),
                ("finder", "Finder"),
                ("file explorer", "Finder"),
                ("terminal", "Terminal"),
                ("chrome", "Google Chrome"),
                ("safari", "Safari"),
                ("firefox", "Firefox"),
                ("word", "Microsoft Word"),
                ("excel", "Microsoft Excel"),
                ("vscode", "Visual Studio Code"),
                ("vs code", "Visual Studio Code"),
            ]),
            launch: LaunchStrategy::Via(&["open", "-a"]),
            close_prefix: &["pkill", "-x"],
            disk_query: None,
            memory_query: None,
            cpu_query: None,
            active_window_queries: vec![
                "osascript -e 'tell application \"System Events\" to get name of first application process whose frontmost is true'",
            ],
        }
    }

    fn linux() -> Self {
        Self {
            platform: Platform::Linux,
            app_aliases: HashMap::from([
                ("notepad", "gedit"),
                ("text editor", "gedit"),
                ("calculator", "gnome-calculator"),
                ("calc", "gnome-calculator"),
                ("files", "nautilus"),
                ("file explorer", "nautilus"),
                ("terminal", "gnome-terminal"),
                ("chrome", "google-chrome"),
                ("firefox", "firefox"),
                ("vscode", "code"),
                ("vs code", "code"),
            ]),
            launch: LaunchStrategy::Direct,
            close_prefix: &["pkill", "-x"],
            disk_query: Some(DiskQuery {
                command: "df -kP /",
                format: DiskReportFormat::PosixDf,
            }),
            memory_query: Some(MemoryQuery {
                command: "cat /proc/meminfo",
                total_key: "MemTotal",
                free_key: "MemAvailable",
            }),
            cpu_query: None,
            active_window_queries: vec![
                "xdotool getactivewindow getwindowname",
                "kdotool getactivewindow getwindowname",
            ],
        }
    }

    /// Case-insensitive alias lookup; unknown names are launched literally
    pub fn resolve_alias(&self, name: &str) -> String {
        let trimmed = name.trim();
        self.app_aliases
            .get(trimmed.to_lowercase().as_str())
            .map(|alias| alias.to_string())
            .unwrap_or_else(|| trimmed.to_string())
    }

    /// Launch invocation for an application name or path
    ///
    /// # Errors
    /// - DispatchError::InvalidTarget if the name carries shell metacharacters
    pub fn open_invocation(&self, name: &str) -> Result<Invocation> {
        let app = self.checked_alias(name)?;
        Ok(match &self.launch {
            LaunchStrategy::Via(prefix) => with_prefix(prefix, app),
            LaunchStrategy::Direct => Invocation::new(app).detached(),
        })
    }

    /// Kill invocation; on Windows an extension-less image name gets `.exe`
    pub fn close_invocation(&self, name: &str) -> Result<Invocation> {
        let mut image = self.checked_alias(name)?;
        if self.platform == Platform::Windows && !image.contains('.') {
            image.push_str(".exe");
        }
        Ok(with_prefix(self.close_prefix, image))
    }

    fn checked_alias(&self, name: &str) -> Result<String> {
        validate_app_name(name)?;
        Ok(self.resolve_alias(name))
    }
}

fn with_prefix(prefix: &[&str], app: String) -> Invocation {
    match prefix.split_first() {
        Some((program, args)) => Invocation::new(*program).args(args.iter().copied()).arg(app),
        None => Invocation::new(app),
    }
}

/// Reject names that could be read as options or shell syntax
pub fn validate_app_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    let invalid = |reason: String| DispatchError::InvalidTarget {
        target: trimmed.to_string(),
        reason,
    };

    if trimmed.starts_with('-') {
        return Err(invalid("must not start with '-'".to_string()));
    }
    match trimmed
        .chars()
        .find(|c| c.is_control() || FORBIDDEN_TARGET_CHARS.contains(c))
    {
        Some(c) => Err(invalid(format!("contains {:?}", c))),
        None => Ok(()),
    }
}

/// Targets that open the web CAD tool instead of a native process
pub fn routes_to_browser(target: &str) -> bool {
    let lowered = target.to_lowercase();
    BROWSER_ROUTE_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shown(invocation: Result<Invocation>) -> String {
        invocation.unwrap().to_string()
    }

    #[test]
    fn test_windows_alias_resolution() {
        let profile = PlatformProfile::resolve(Platform::Windows);
        assert_eq!(profile.resolve_alias("Notepad"), "notepad.exe");
        assert_eq!(
            shown(profile.open_invocation("notepad")),
            "cmd /C start \"\" notepad.exe"
        );
        assert_eq!(
            shown(profile.close_invocation("NOTEPAD")),
            "taskkill /F /IM notepad.exe"
        );
    }

    #[test]
    fn test_unknown_alias_falls_back_to_literal_name() {
        let profile = PlatformProfile::resolve(Platform::Windows);
        let open = profile.open_invocation(" spotify ").unwrap();
        assert_eq!(open.program, "cmd");
        assert_eq!(open.args, vec!["/C", "start", "", "spotify"]);
        assert_eq!(
            shown(profile.close_invocation("spotify")),
            "taskkill /F /IM spotify.exe"
        );

        let linux = PlatformProfile::resolve(Platform::Linux);
        let krita = linux.open_invocation("krita").unwrap();
        assert_eq!(krita, Invocation::new("krita").detached());
    }

    #[test]
    fn test_macos_has_no_disk_or_cpu_query() {
        let profile = PlatformProfile::resolve(Platform::Macos);
        assert!(profile.disk_query.is_none());
        assert!(profile.cpu_query.is_none());
        let open = profile.open_invocation("chrome").unwrap();
        assert_eq!(open.args, vec!["-a", "Google Chrome"]);
    }

    #[test]
    fn test_close_matches_exact_process_name() {
        for platform in [Platform::Macos, Platform::Linux] {
            let profile = PlatformProfile::resolve(platform);
            let close = profile.close_invocation("vscode").unwrap();
            assert_eq!(close.program, "pkill");
            assert_eq!(close.args[0], "-x");
            assert!(!close.args.contains(&"-f".to_string()));
        }
        let linux = PlatformProfile::resolve(Platform::Linux);
        assert_eq!(shown(linux.close_invocation("vscode")), "pkill -x code");
    }

    #[test]
    fn test_shell_syntax_in_target_is_rejected() {
        for platform in [Platform::Windows, Platform::Macos, Platform::Linux] {
            let profile = PlatformProfile::resolve(platform);
            for target in [
                "x; touch /tmp/owned",
                "notepad\" & calc \"",
                "$(rm -rf ~)",
                "`id`",
                "a | b",
                "-9",
                "gedit\nreboot",
            ] {
                let open = profile.open_invocation(target);
                assert!(
                    matches!(open, Err(DispatchError::InvalidTarget { .. })),
                    "{:?} accepted on {}",
                    target,
                    platform
                );
                assert!(profile.close_invocation(target).is_err());
            }
        }
    }

    #[test]
    fn test_spaces_and_paths_stay_one_argument() {
        let profile = PlatformProfile::resolve(Platform::Linux);
        let open = profile
            .open_invocation("/opt/My Tools (x86)/editor")
            .unwrap();
        assert_eq!(open.program, "/opt/My Tools (x86)/editor");
        assert!(open.args.is_empty());
        assert!(open.detached);
    }

    #[test]
    fn test_every_platform_resolves_itself() {
        for platform in [Platform::Windows, Platform::Macos, Platform::Linux] {
            let profile = PlatformProfile::resolve(platform);
            assert_eq!(profile.platform, platform);
            assert!(!profile.close_prefix.is_empty());
            let open = profile.open_invocation("calculator").unwrap();
            assert!(open.to_string().contains(&profile.resolve_alias("calculator")));
        }
    }

    #[test]
    fn test_browser_routing_keywords() {
        assert!(routes_to_browser("3d modeler"));
        assert!(routes_to_browser("OnShape"));
        assert!(routes_to_browser("AutoCAD"));
        assert!(!routes_to_browser("notepad"));
    }
}
