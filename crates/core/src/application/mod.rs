// Application Layer - Use cases: dispatch, telemetry, registry

pub mod constants;
mod context;
pub mod dispatcher;
pub mod health;
mod panic_guard;
pub mod parsers;
pub mod platform_resolver;
pub mod registry;
pub mod sampler;
pub mod telemetry;
pub mod telemetry_log;

// Re-exports
pub use dispatcher::OperationDispatcher;
pub use health::classify;
pub use platform_resolver::PlatformProfile;
pub use registry::ApplicationRegistry;
pub use sampler::{SampleWindow, Sampler};
pub use telemetry::TelemetryAssembler;
pub use telemetry_log::TelemetryLog;
