// Browser adapter: hands URLs to the desktop's default browser
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use deskops_core::application::constants::APP_COMMAND_TIMEOUT;
use deskops_core::domain::{DispatchError, OperationResult, Platform};
use deskops_core::port::{BrowserAutomation, CommandRunner, Invocation};

/// Opens pages with the platform URL handler
///
/// Only `navigate` is backed by the OS; page-level automation (click, typing,
/// screenshots) needs a driven browser session and reports as unsupported.
pub struct SystemBrowserLauncher {
    platform: Platform,
    runner: Arc<dyn CommandRunner>,
}

impl SystemBrowserLauncher {
    pub fn new(platform: Platform, runner: Arc<dyn CommandRunner>) -> Self {
        Self { platform, runner }
    }

    fn open_url(&self, url: &str) -> Invocation {
        match self.platform {
            // cmd.exe would split the URL at `&`
            Platform::Windows => {
                Invocation::new("rundll32").args(["url.dll,FileProtocolHandler", url])
            }
            Platform::Macos => Invocation::new("open").arg(url),
            Platform::Linux => Invocation::new("xdg-open").arg(url).detached(),
        }
    }

    fn unsupported(&self, feature: &str) -> OperationResult {
        DispatchError::PlatformUnsupported {
            feature: format!("browser {}", feature),
            platform: self.platform,
        }
        .into()
    }
}

#[async_trait]
impl BrowserAutomation for SystemBrowserLauncher {
    async fn navigate(&self, url: &str) -> OperationResult {
        let invocation = self.open_url(url);
        match self.runner.exec(&invocation, APP_COMMAND_TIMEOUT).await {
            Ok(_) => {
                info!(url = %url, platform = %self.platform, "Opened URL in default browser");
                OperationResult::ok_message(format!("Opened {} in the browser", url))
            }
            Err(source) => DispatchError::ExternalCommand {
                command: invocation.to_string(),
                source,
            }
            .into(),
        }
    }

    async fn click(&self, _selector: &str) -> OperationResult {
        self.unsupported("click")
    }

    async fn type_text(&self, _selector: &str, _text: &str) -> OperationResult {
        self.unsupported("typing")
    }

    async fn screenshot(&self, _path: &str) -> OperationResult {
        self.unsupported("screenshot")
    }
}
