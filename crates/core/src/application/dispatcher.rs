//! Operation Dispatcher - single entry point of the automation layer
//!
//! Parses the operation tag, routes it to its handler and folds every outcome
//! (including handler panics) into an `OperationResult`. Nothing raised inside a
//! handler escapes `execute`.

use crate::application::constants::{APP_COMMAND_TIMEOUT, CAD_WEB_URL};
use crate::application::context::active_window_title;
use crate::application::panic_guard::catch_panic;
use crate::application::platform_resolver::{routes_to_browser, PlatformProfile};
use crate::application::registry::ApplicationRegistry;
use crate::application::telemetry::TelemetryAssembler;
use crate::domain::error::Result;
use crate::domain::{
    ActiveApplicationRecord, CurrentContext, DetailedStats, DispatchError, HealthSnapshot,
    Operation, OperationRequest, OperationResult, SystemInfo,
};
use crate::port::{BrowserAutomation, CommandRunner, Filesystem, Invocation, TimeProvider};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Routes operation requests to platform handlers
pub struct OperationDispatcher {
    profile: Arc<PlatformProfile>,
    runner: Arc<dyn CommandRunner>,
    filesystem: Arc<dyn Filesystem>,
    browser: Arc<dyn BrowserAutomation>,
    registry: Arc<ApplicationRegistry>,
    telemetry: Arc<TelemetryAssembler>,
    time_provider: Arc<dyn TimeProvider>,
}

impl OperationDispatcher {
    pub fn new(
        profile: Arc<PlatformProfile>,
        runner: Arc<dyn CommandRunner>,
        filesystem: Arc<dyn Filesystem>,
        browser: Arc<dyn BrowserAutomation>,
        registry: Arc<ApplicationRegistry>,
        telemetry: Arc<TelemetryAssembler>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            profile,
            runner,
            filesystem,
            browser,
            registry,
            telemetry,
            time_provider,
        }
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    /// Execute one operation request
    ///
    /// Never fails: unknown operations, missing targets, command failures and
    /// handler panics all come back as `success: false` with an `error` text.
    pub async fn execute(&self, request: OperationRequest) -> OperationResult {
        let operation = match request.operation.parse::<Operation>() {
            Ok(operation) => operation,
            Err(e) => {
                warn!(operation = %request.operation, "Rejected unknown operation");
                return e.into();
            }
        };

        info!(
            operation = %operation,
            target = %request.target,
            platform = %self.profile.platform,
            "Dispatching operation"
        );

        let result = match catch_panic(operation.as_str(), self.route(operation, &request)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => OperationResult::from(e),
            Err(panic_msg) => {
                OperationResult::failure(format!("{} handler panicked: {}", operation, panic_msg))
            }
        };

        if result.success {
            info!(operation = %operation, "Operation succeeded");
        } else {
            warn!(
                operation = %operation,
                error = result.error.as_deref().unwrap_or_default(),
                "Operation failed"
            );
        }
        result
    }

    /// Routing table: one arm per operation, checked exhaustively by the compiler
    async fn route(
        &self,
        operation: Operation,
        request: &OperationRequest,
    ) -> Result<OperationResult> {
        let target = request.target.trim();
        if operation.requires_target() && target.is_empty() {
            return Err(DispatchError::MissingTarget(operation));
        }

        match operation {
            Operation::OpenApplication => self.open_application(target).await,
            Operation::CloseApplication => self.close_application(target).await,
            Operation::CreateFile => {
                let content = request.option_str("content").unwrap_or_default();
                self.create_file(target, content).await
            }
            Operation::CreateFolder => self.create_folder(target).await,
            Operation::MoveFile => {
                let destination = required_option(operation, request, "destination")?;
                self.move_file(target, destination).await
            }
            Operation::CopyFile => {
                let destination = required_option(operation, request, "destination")?;
                self.copy_file(target, destination).await
            }
            Operation::DeleteFile => self.delete_file(target).await,
            Operation::ReadFile => self.read_file(target).await,
            Operation::GetSystemInfo => Ok(OperationResult::ok_data(serde_json::to_value(
                self.system_info().await,
            )?)),
            Operation::GetSystemStatus => Ok(OperationResult::ok_data(serde_json::to_value(
                self.detailed_stats().await,
            )?)),
        }
    }

    // ------------------------------------------------------------------------
    // Application lifecycle
    // ------------------------------------------------------------------------

    async fn open_application(&self, target: &str) -> Result<OperationResult> {
        if routes_to_browser(target) {
            info!(target = %target, url = CAD_WEB_URL, "Routing application to browser");
            let result = self.browser.navigate(CAD_WEB_URL).await;
            if result.success {
                self.registry.register(target, CAD_WEB_URL);
            }
            return Ok(result);
        }

        let invocation = self.profile.open_invocation(target)?;
        self.run_app_command(&invocation).await?;
        self.registry.register(target, &invocation.to_string());

        Ok(OperationResult::ok_message(format!("Opened {}", target)))
    }

    async fn close_application(&self, target: &str) -> Result<OperationResult> {
        if routes_to_browser(target) {
            // No native process to kill; the browser session outlives the record
            return match self.registry.unregister(target) {
                Some(_) => Ok(OperationResult::ok_message(format!(
                    "Closed {} (browser session)",
                    target
                ))),
                None => Err(DispatchError::NotRunning(target.to_string())),
            };
        }

        let invocation = self.profile.close_invocation(target)?;
        self.run_app_command(&invocation).await?;
        self.registry.unregister(target);

        Ok(OperationResult::ok_message(format!("Closed {}", target)))
    }

    async fn run_app_command(&self, invocation: &Invocation) -> Result<String> {
        self.runner
            .exec(invocation, APP_COMMAND_TIMEOUT)
            .await
            .map_err(|source| DispatchError::ExternalCommand {
                command: invocation.to_string(),
                source,
            })
    }

    // ------------------------------------------------------------------------
    // Filesystem
    // ------------------------------------------------------------------------

    async fn create_file(&self, path: &str, content: &str) -> Result<OperationResult> {
        let created = self
            .filesystem
            .create_file(path, content)
            .await
            .map_err(|source| fs_error(path, source))?;
        Ok(OperationResult::ok_message(format!(
            "Created file {}",
            created.display()
        )))
    }

    async fn create_folder(&self, path: &str) -> Result<OperationResult> {
        let created = self
            .filesystem
            .create_dir(path)
            .await
            .map_err(|source| fs_error(path, source))?;
        Ok(OperationResult::ok_message(format!(
            "Created folder {}",
            created.display()
        )))
    }

    async fn move_file(&self, from: &str, to: &str) -> Result<OperationResult> {
        let moved = self
            .filesystem
            .move_path(from, to)
            .await
            .map_err(|source| fs_error(from, source))?;
        Ok(OperationResult::ok_message(format!(
            "Moved {} to {}",
            from,
            moved.display()
        )))
    }

    async fn copy_file(&self, from: &str, to: &str) -> Result<OperationResult> {
        let copied = self
            .filesystem
            .copy_file(from, to)
            .await
            .map_err(|source| fs_error(from, source))?;
        Ok(OperationResult::ok_message(format!(
            "Copied {} to {}",
            from,
            copied.display()
        )))
    }

    async fn delete_file(&self, path: &str) -> Result<OperationResult> {
        let removed = self
            .filesystem
            .remove(path)
            .await
            .map_err(|source| fs_error(path, source))?;
        Ok(OperationResult::ok_message(format!(
            "Deleted {}",
            removed.display()
        )))
    }

    async fn read_file(&self, path: &str) -> Result<OperationResult> {
        let content = self
            .filesystem
            .read_to_string(path)
            .await
            .map_err(|source| fs_error(path, source))?;
        Ok(OperationResult::ok_data(json!({
            "path": path,
            "content": content,
        })))
    }

    // ------------------------------------------------------------------------
    // Telemetry & context
    // ------------------------------------------------------------------------

    /// Cheap, unaveraged host facts
    pub async fn system_info(&self) -> SystemInfo {
        self.telemetry.system_info().await
    }

    /// Fresh health snapshot; `Unknown` if assembly itself blew up
    pub async fn health_snapshot(&self) -> HealthSnapshot {
        match catch_panic("health_snapshot", self.telemetry.build_snapshot()).await {
            Ok(snapshot) => snapshot,
            Err(_) => HealthSnapshot::unknown(self.time_provider.now_millis()),
        }
    }

    /// Fresh detailed stats (sampled CPU window)
    pub async fn detailed_stats(&self) -> DetailedStats {
        match catch_panic("detailed_stats", self.telemetry.build_detailed_stats()).await {
            Ok(stats) => stats,
            Err(_) => DetailedStats::unknown(self.profile.platform, self.time_provider.now_millis()),
        }
    }

    /// Snapshots kept by the bounded telemetry log, oldest first
    pub fn recent_snapshots(&self, limit: usize) -> Vec<HealthSnapshot> {
        self.telemetry.log().latest(limit)
    }

    pub fn history_capacity(&self) -> usize {
        self.telemetry.log().capacity()
    }

    pub fn active_applications(&self) -> Vec<ActiveApplicationRecord> {
        self.registry.list()
    }

    /// Context reported to the UI alongside each conversation turn
    pub async fn current_context(&self) -> CurrentContext {
        let system_info = self.system_info().await;
        let active_window_title = active_window_title(self.runner.as_ref(), &self.profile).await;

        CurrentContext {
            platform: self.profile.platform,
            active_applications: self.registry.list(),
            cwd: self.filesystem.current_dir(),
            timestamp: self.time_provider.now_millis(),
            system_info,
            active_window_title,
        }
    }
}

fn required_option<'a>(
    operation: Operation,
    request: &'a OperationRequest,
    option: &'static str,
) -> Result<&'a str> {
    request
        .option_str(option)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(DispatchError::MissingOption { operation, option })
}

fn fs_error(path: &str, source: std::io::Error) -> DispatchError {
    DispatchError::Filesystem {
        path: path.to_string(),
        source,
    }
}
