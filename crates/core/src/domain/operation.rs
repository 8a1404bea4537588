// Operation Domain Model

use crate::domain::DispatchError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Closed set of automation actions the dispatcher understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    OpenApplication,
    CloseApplication,
    CreateFile,
    CreateFolder,
    MoveFile,
    CopyFile,
    DeleteFile,
    ReadFile,
    GetSystemInfo,
    GetSystemStatus,
}

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::OpenApplication,
        Operation::CloseApplication,
        Operation::CreateFile,
        Operation::CreateFolder,
        Operation::MoveFile,
        Operation::CopyFile,
        Operation::DeleteFile,
        Operation::ReadFile,
        Operation::GetSystemInfo,
        Operation::GetSystemStatus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::OpenApplication => "open_application",
            Operation::CloseApplication => "close_application",
            Operation::CreateFile => "create_file",
            Operation::CreateFolder => "create_folder",
            Operation::MoveFile => "move_file",
            Operation::CopyFile => "copy_file",
            Operation::DeleteFile => "delete_file",
            Operation::ReadFile => "read_file",
            Operation::GetSystemInfo => "get_system_info",
            Operation::GetSystemStatus => "get_system_status",
        }
    }

    /// Telemetry operations ignore `target`; everything else acts on it
    pub fn requires_target(&self) -> bool {
        !matches!(
            self,
            Operation::GetSystemInfo | Operation::GetSystemStatus
        )
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == wanted)
            .ok_or_else(|| DispatchError::UnknownOperation(s.to_string()))
    }
}

/// Request as received from the caller
///
/// `operation` stays a raw string so that an unrecognized value reaches the
/// dispatcher and becomes a typed failure instead of a deserialization error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRequest {
    pub operation: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl OperationRequest {
    pub fn new(operation: Operation, target: impl Into<String>) -> Self {
        Self {
            operation: operation.as_str().to_string(),
            target: target.into(),
            options: Map::new(),
        }
    }

    /// Build a request from an arbitrary operation name (may be unrecognized)
    pub fn raw(operation: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            target: target.into(),
            options: Map::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// String option lookup; non-string values are ignored
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(|v| v.as_str())
    }
}

/// Uniform result of every dispatched operation
///
/// Either `message`/`data` or `error` is meaningful, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationResult {
    pub fn ok_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            error: None,
        }
    }

    pub fn ok_data(data: Value) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            error: None,
        }
    }

    /// Failed result; an empty error text is replaced so `error` is never blank
    pub fn failure(error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "operation failed".to_string();
        }

        Self {
            success: false,
            message: None,
            data: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

impl From<DispatchError> for OperationResult {
    fn from(err: DispatchError) -> Self {
        OperationResult::failure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_names_round_trip_through_from_str() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
    }

    #[test]
    fn test_unknown_operation_is_typed() {
        let err = "launch_rocket".parse::<Operation>().unwrap_err();
        assert!(matches!(err, DispatchError::UnknownOperation(ref s) if s == "launch_rocket"));
        assert!(err.to_string().contains("launch_rocket"));
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let req: OperationRequest =
            serde_json::from_value(json!({"operation": "get_system_info"})).unwrap();
        assert_eq!(req.operation, "get_system_info");
        assert!(req.target.is_empty());
        assert!(req.options.is_empty());
    }

    #[test]
    fn test_failure_never_blank() {
        let result = OperationResult::failure("   ");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("operation failed"));
    }

    #[test]
    fn test_result_serialization_skips_empty_fields() {
        let value = serde_json::to_value(OperationResult::ok_message("done")).unwrap();
        assert_eq!(value, json!({"success": true, "message": "done"}));
    }
}
