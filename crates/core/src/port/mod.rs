// Port Layer - Interfaces for external collaborators

pub mod browser;
pub mod command_runner;
pub mod filesystem;
pub mod host_info;
pub mod time_provider;

// Re-exports
pub use browser::BrowserAutomation;
pub use command_runner::{CommandError, CommandRunner, Invocation};
pub use filesystem::Filesystem;
pub use host_info::{HostFacts, HostInfo};
pub use time_provider::TimeProvider;
