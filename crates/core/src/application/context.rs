// Active-window lookup for context reporting
use crate::application::constants::WINDOW_TITLE_TIMEOUT;
use crate::application::platform_resolver::PlatformProfile;
use crate::port::CommandRunner;
use tracing::debug;

/// Title of the focused window, trying each platform query in order
///
/// Any failure or blank output moves on to the next query; `None` when all fail.
pub(crate) async fn active_window_title(
    runner: &dyn CommandRunner,
    profile: &PlatformProfile,
) -> Option<String> {
    for query in &profile.active_window_queries {
        match runner.run(query, WINDOW_TITLE_TIMEOUT).await {
            Ok(stdout) => {
                let title = stdout.trim();
                if !title.is_empty() {
                    return Some(title.to_string());
                }
            }
            Err(e) => debug!(query = %query, error = %e, "Active window query failed"),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Platform;
    use crate::port::command_runner::mocks::MockCommandRunner;

    #[tokio::test]
    async fn test_first_working_query_wins() {
        let runner = MockCommandRunner::new().on_output("kdotool", "Konsole - ~\n");
        let profile = PlatformProfile::resolve(Platform::Linux);

        let title = active_window_title(&runner, &profile).await;

        assert_eq!(title.as_deref(), Some("Konsole - ~"));
        assert_eq!(runner.call_count(), 2);
    }

    #[tokio::test]
    async fn test_blank_output_is_none() {
        let runner = MockCommandRunner::new().on_output("osascript", "  \n");
        let profile = PlatformProfile::resolve(Platform::Macos);

        assert!(active_window_title(&runner, &profile).await.is_none());
    }
}
