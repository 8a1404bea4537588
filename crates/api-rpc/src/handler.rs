//! RPC Method Handlers
//!
//! Thin adapters from JSON-RPC params to the dispatcher.

use crate::error::to_rpc_error;
use crate::types::{ExecuteRequest, HistoryRequest, HistoryResponse};
use deskops_core::application::OperationDispatcher;
use deskops_core::domain::{CurrentContext, DetailedStats, HealthSnapshot, OperationResult};
use deskops_core::error::AppError;
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use tracing::debug;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    dispatcher: Arc<OperationDispatcher>,
}

impl RpcHandler {
    pub fn new(dispatcher: Arc<OperationDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// ops.execute.v1
    ///
    /// Always answers with an `OperationResult`; a failed operation is not an RPC error.
    pub async fn execute(&self, params: ExecuteRequest) -> Result<OperationResult, ErrorObjectOwned> {
        debug!(operation = %params.operation, "ops.execute.v1");
        Ok(self.dispatcher.execute(params).await)
    }

    /// system.health.v1
    pub async fn health(&self) -> Result<HealthSnapshot, ErrorObjectOwned> {
        Ok(self.dispatcher.health_snapshot().await)
    }

    /// system.stats.v1
    pub async fn stats(&self) -> Result<DetailedStats, ErrorObjectOwned> {
        Ok(self.dispatcher.detailed_stats().await)
    }

    /// system.history.v1
    pub async fn history(&self, params: HistoryRequest) -> Result<HistoryResponse, ErrorObjectOwned> {
        if params.limit == 0 {
            return Err(to_rpc_error(AppError::Validation(
                "limit must be at least 1".to_string(),
            )));
        }

        Ok(HistoryResponse {
            capacity: self.dispatcher.history_capacity(),
            snapshots: self.dispatcher.recent_snapshots(params.limit),
        })
    }

    /// context.current.v1
    pub async fn context(&self) -> Result<CurrentContext, ErrorObjectOwned> {
        Ok(self.dispatcher.current_context().await)
    }
}
