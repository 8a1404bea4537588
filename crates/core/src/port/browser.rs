// Browser automation port
// Page-level automation is an external collaborator; only its surface lives here.

use crate::domain::OperationResult;
use async_trait::async_trait;

/// Browser automation surface
///
/// Every call answers with the same `OperationResult` shape as native operations.
#[async_trait]
pub trait BrowserAutomation: Send + Sync {
    async fn navigate(&self, url: &str) -> OperationResult;

    async fn click(&self, selector: &str) -> OperationResult;

    async fn type_text(&self, selector: &str, text: &str) -> OperationResult;

    async fn screenshot(&self, path: &str) -> OperationResult;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every call and answers with success (or a fixed failure)
    #[derive(Clone, Default)]
    pub struct RecordingBrowser {
        actions: Arc<Mutex<Vec<String>>>,
        fail_with: Option<String>,
    }

    impl RecordingBrowser {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing(error: impl Into<String>) -> Self {
            Self {
                fail_with: Some(error.into()),
                ..Self::default()
            }
        }

        /// Recorded actions as `verb:argument`
        pub fn actions(&self) -> Vec<String> {
            self.actions.lock().unwrap().clone()
        }

        fn record(&self, action: String) -> OperationResult {
            self.actions.lock().unwrap().push(action.clone());
            match &self.fail_with {
                Some(err) => OperationResult::failure(err.clone()),
                None => OperationResult::ok_message(action),
            }
        }
    }

    #[async_trait]
    impl BrowserAutomation for RecordingBrowser {
        async fn navigate(&self, url: &str) -> OperationResult {
            self.record(format!("navigate:{}", url))
        }

        async fn click(&self, selector: &str) -> OperationResult {
            self.record(format!("click:{}", selector))
        }

        async fn type_text(&self, selector: &str, text: &str) -> OperationResult {
            self.record(format!("type:{}={}", selector, text))
        }

        async fn screenshot(&self, path: &str) -> OperationResult {
            self.record(format!("screenshot:{}", path))
        }
    }
}
