//! JSON-RPC Server
//!
//! JSON-RPC 2.0 over HTTP on localhost.

use crate::handler::RpcHandler;
use crate::types::{ExecuteRequest, HistoryRequest};
use deskops_core::application::OperationDispatcher;
use deskops_core::error::AppError;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 9531;

/// RPC method names
pub mod method {
    pub const EXECUTE: &str = "ops.execute.v1";
    pub const HEALTH: &str = "system.health.v1";
    pub const STATS: &str = "system.stats.v1";
    pub const HISTORY: &str = "system.history.v1";
    pub const CONTEXT: &str = "context.current.v1";
}

/// RPC Server Configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcServerConfig {
    pub host: String,
    /// 0 picks a free port
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, dispatcher: Arc<OperationDispatcher>) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(dispatcher)),
        }
    }

    fn build_module(&self) -> Result<RpcModule<()>, AppError> {
        let mut module = RpcModule::new(());

        let handler = self.handler.clone();
        module
            .register_async_method(method::EXECUTE, move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ExecuteRequest = params.parse()?;
                    handler.execute(req).await
                }
            })
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let handler = self.handler.clone();
        module
            .register_async_method(method::HEALTH, move |_, _, _| {
                let handler = handler.clone();
                async move { handler.health().await }
            })
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let handler = self.handler.clone();
        module
            .register_async_method(method::STATS, move |_, _, _| {
                let handler = handler.clone();
                async move { handler.stats().await }
            })
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let handler = self.handler.clone();
        module
            .register_async_method(method::HISTORY, move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: Option<HistoryRequest> = params.parse()?;
                    handler.history(req.unwrap_or_default()).await
                }
            })
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let handler = self.handler.clone();
        module
            .register_async_method(method::CONTEXT, move |_, _, _| {
                let handler = handler.clone();
                async move { handler.context().await }
            })
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(module)
    }

    /// Start the JSON-RPC server
    ///
    /// Returns the bound address (useful with port 0) and the server handle.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), AppError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server on TCP"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| AppError::Config(format!("Failed to build server on {}: {}", addr, e)))?;
        let local_addr = server.local_addr()?;

        let module = self.build_module()?;
        let handle = server.start(module);

        info!(addr = %local_addr, "JSON-RPC server started successfully");
        Ok((local_addr, handle))
    }
}
