// Domain Layer - Pure value types shared by every adapter

pub mod application;
pub mod error;
pub mod health;
pub mod operation;
pub mod platform;

// Re-exports
pub use application::ActiveApplicationRecord;
pub use error::{DispatchError, ParseError, TelemetryError};
pub use health::{
    CpuStats, CurrentContext, DetailedStats, DiskStats, HealthRating, HealthSnapshot,
    MemoryStats, SystemInfo, UptimeStats,
};
pub use operation::{Operation, OperationRequest, OperationResult};
pub use platform::Platform;
