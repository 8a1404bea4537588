//! JSON-RPC API Layer
//!
//! Exposes the operation dispatcher and health telemetry over JSON-RPC 2.0
//! on localhost.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use handler::RpcHandler;
pub use server::{RpcServer, RpcServerConfig};
