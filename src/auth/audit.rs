// Auth audit events as structured log records

use tracing::{info, warn};

/// Authentication event type
#[derive(Debug, Clone, Copy)]
pub enum AuthEvent<'a> {
    LoginSuccess { username: &'a str },
    LoginFailure { username: &'a str, reason: &'a str },
    TokenMissing { path: &'a str },
    TokenRejected { path: &'a str },
    AccessDenied { username: &'a str, path: &'a str },
}

/// Audit logger for authentication events
///
/// Log-only: events go to the structured log stream and never alter the
/// request flow.
#[derive(Debug, Default)]
pub struct AuditLogger;

impl AuditLogger {
    pub fn new() -> Self {
        Self
    }

    pub fn log_auth_event(&self, event: AuthEvent<'_>) {
        match event {
            AuthEvent::LoginSuccess { username } => {
                info!(username, "Login successful");
            }
            AuthEvent::LoginFailure { username, reason } => {
                warn!(username, reason, "Login failed");
            }
            AuthEvent::TokenMissing { path } => {
                warn!(path, "Request without credential rejected");
            }
            AuthEvent::TokenRejected { path } => {
                warn!(path, "Invalid or expired token rejected");
            }
            AuthEvent::AccessDenied { username, path } => {
                warn!(username, path, "Admin-only route denied");
            }
        }
    }
}
