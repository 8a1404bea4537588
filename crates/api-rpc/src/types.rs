//! RPC Request/Response Types
//!
//! `ops.execute.v1` takes an `OperationRequest` and answers with an
//! `OperationResult`; telemetry methods answer with the domain types directly.

use deskops_core::domain::{HealthSnapshot, OperationRequest};
use serde::{Deserialize, Serialize};

pub use deskops_core::domain::{CurrentContext, DetailedStats, OperationResult};

/// ops.execute.v1
pub type ExecuteRequest = OperationRequest;

/// system.history.v1 - recent snapshots from the telemetry log
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryRequest {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for HistoryRequest {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub capacity: usize,
    pub snapshots: Vec<HealthSnapshot>,
}
