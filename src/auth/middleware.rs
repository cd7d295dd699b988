// Axum authentication middleware and role check

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{Json, Response},
};
use std::sync::Arc;

use crate::api::responses::ErrorResponse;
use crate::auth::audit::{AuditLogger, AuthEvent};
use crate::auth::token::TokenService;
use crate::core::errors::ServiceError;
use crate::core::models::Identity;

/// Authentication state shared by the middleware
#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
    pub audit_logger: Arc<AuditLogger>,
}

/// Authentication middleware
///
/// Reads the raw token from the `Authorization` header (no scheme prefix --
/// the wire format clients already speak), verifies it, and attaches the
/// decoded `Identity` to request extensions for handlers to use.
///
/// Missing header yields 401; a token that fails verification yields 403.
pub async fn authenticate(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let token = match extract_token(request.headers()) {
        Some(token) => token,
        None => {
            auth_state.audit_logger.log_auth_event(AuthEvent::TokenMissing {
                path: request.uri().path(),
            });
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Authentication required".to_string(),
                    request_id: None,
                }),
            ));
        }
    };

    match auth_state.tokens.verify(&token) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(_) => {
            auth_state.audit_logger.log_auth_event(AuthEvent::TokenRejected {
                path: request.uri().path(),
            });
            Err((
                StatusCode::FORBIDDEN,
                Json(ErrorResponse {
                    error: "Forbidden".to_string(),
                    request_id: None,
                }),
            ))
        }
    }
}

/// Role check for admin-only operations
///
/// Called by the catalogue mutation handlers after `authenticate` has
/// attached the identity.
pub fn require_admin(identity: &Identity) -> Result<(), ServiceError> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}

/// Extract the session token from request headers
///
/// An empty header value counts as absent.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
