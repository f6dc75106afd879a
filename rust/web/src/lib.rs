pub mod advisor;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod server;
pub mod session;
pub mod settings;

pub use advisor::{AdvisorClient, AdvisorError, DealerAdvisor, GeminiClient};
pub use errors::{ErrorResponse, ErrorSeverity, IntoErrorResponse};
pub use logging::init_logging;
pub use server::{AppContext, ServerConfig, ServerError, ServerHandle, WebServer};
pub use session::{GameAction, GameSession, SessionError, SessionId, SessionManager};
pub use settings::{AdvisorSettings, AppSettings, SettingsError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_provides_shared_components() {
        let ctx = AppContext::new_for_tests();

        assert!(ctx.sessions().active_sessions().is_empty());
        assert_eq!(ctx.settings().starting_bankroll, 1_000);
    }
}
