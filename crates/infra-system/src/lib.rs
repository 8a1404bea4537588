// DeskOps Infrastructure - System Adapters
// Implements: CommandRunner, HostInfo, Filesystem, BrowserAutomation

pub mod browser;
pub mod filesystem;
pub mod host_info;
pub mod subprocess_runner;

pub use browser::SystemBrowserLauncher;
pub use filesystem::LocalFilesystem;
pub use host_info::SysinfoHostInfo;
pub use subprocess_runner::SubprocessCommandRunner;
