// Axum web server layer

use axum::{
    error_handling::HandleErrorLayer,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    routing::{get, post, put},
    BoxError, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod responses;

use crate::auth::audit::AuditLogger;
use crate::auth::middleware::AuthState;
use crate::auth::token::TokenService;
use crate::config::Config;
use crate::core::errors::ServiceError;
use crate::core::models::{Product, User};

/// Application state containing all shared dependencies
///
/// Components are Arc-wrapped trait objects so handlers stay decoupled from
/// the concrete sqlx-backed implementations. The state is cloned per request;
/// all components must be Send + Sync.
#[derive(Clone)]
pub struct AppState {
    pub product_store: Arc<dyn ProductStore + Send + Sync>,
    pub inventory_engine: Arc<dyn InventoryEngine + Send + Sync>,
    pub user_store: Arc<dyn UserStore + Send + Sync>,
    pub tokens: Arc<TokenService>,
    pub audit_logger: Arc<AuditLogger>,
    pub config: Arc<Config>,
}

/// Plain CRUD reads/writes against the products table
#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, ServiceError>;
    /// Returns the generated id.
    async fn create(&self, name: &str, quantity: i64) -> Result<i64, ServiceError>;
    /// Returns rows affected; zero rows is not an error.
    async fn update(&self, id: i64, name: &str, quantity: i64) -> Result<u64, ServiceError>;
    /// Returns rows affected; repeat deletes are idempotent.
    async fn delete(&self, id: i64) -> Result<u64, ServiceError>;
}

/// Atomic stock mutation: quantity update and audit record commit together
#[async_trait::async_trait]
pub trait InventoryEngine: Send + Sync {
    async fn record_sale(&self, product_id: i64, quantity_sold: i64) -> Result<(), ServiceError>;
    async fn record_purchase(
        &self,
        product_id: i64,
        quantity_purchased: i64,
    ) -> Result<(), ServiceError>;
}

/// User lookup for the login flow
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError>;
}

/// Create the Axum router with all routes and middleware
///
/// Middleware stack (outermost to innermost):
/// - Request timeout (tower::timeout behind HandleErrorLayer)
/// - Body size limit (tower-http::limit)
/// - Request tracing (tower-http::trace)
/// - Authentication (route_layer) - `/health` and `/auth/login` bypass it
///
/// The admin role check is enforced inside the catalogue mutation handlers,
/// after `authenticate` has attached the identity.
pub fn create_router(app_state: AppState, auth_state: Arc<AuthState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/auth/login", post(handlers::login_handler))
        .route(
            "/api/products",
            get(handlers::list_products_handler).post(handlers::create_product_handler),
        )
        .route(
            "/api/products/:id",
            put(handlers::update_product_handler).delete(handlers::delete_product_handler),
        )
        .route("/api/products/sell", post(handlers::sell_handler))
        .route("/api/products/purchase", post(handlers::purchase_handler));

    // Authentication applies to /api/* only; health and login stay open
    router = router.route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        |state: State<Arc<AuthState>>, request: Request, next: Next| async move {
            let path = request.uri().path();
            if path == "/health" || path == "/auth/login" {
                return Ok(next.run(request).await);
            }

            crate::auth::middleware::authenticate(state, request, next).await
        },
    ));

    let body_limit = app_state.config.body_size_limit_bytes;
    let timeout_secs = app_state.config.request_timeout_secs;

    let router = router
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(body_limit));

    // HandleErrorLayer must come BEFORE timeout to convert the Elapsed error
    // into an HTTP response
    let middleware_stack = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|e: BoxError| async move {
            let status = if e.is::<tower::timeout::error::Elapsed>() {
                StatusCode::REQUEST_TIMEOUT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, status.canonical_reason().unwrap_or("error").to_string())
        }))
        .timeout(Duration::from_secs(timeout_secs))
        .into_inner();

    router.layer(middleware_stack).with_state(app_state)
}
