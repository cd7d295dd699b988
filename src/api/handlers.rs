// Request handlers for API endpoints

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    Extension,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::api::responses::{
    request_id, ApiError, HealthResponse, MessageResponse, TokenResponse,
};
use crate::api::AppState;
use crate::auth::audit::AuthEvent;
use crate::auth::middleware::require_admin;
use crate::auth::password::Password;
use crate::core::errors::ServiceError;
use crate::core::models::{Identity, Product};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductBody {
    pub name: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellRequest {
    pub product_id: i64,
    pub quantity_sold: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub product_id: i64,
    pub quantity_purchased: i64,
}

/// Health check handler
///
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Login handler
///
/// POST /auth/login
///
/// Unknown username and wrong password produce the same 401 body; the audit
/// log records which check failed, the client never learns.
pub async fn login_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let request_id = request_id(&headers);

    let user = app_state
        .user_store
        .find_by_username(&request.username)
        .await
        .map_err(|e| {
            error!(error = %e, request_id = %request_id, "User lookup failed");
            ApiError::from_service_error_with_id(e, request_id.clone())
        })?;

    let user = match user {
        Some(user) => user,
        None => {
            app_state.audit_logger.log_auth_event(AuthEvent::LoginFailure {
                username: &request.username,
                reason: "unknown username",
            });
            return Err(ApiError::from_service_error_with_id(
                ServiceError::InvalidCredentials,
                request_id,
            ));
        }
    };

    if !Password::new(&request.password).verify(&user.password) {
        app_state.audit_logger.log_auth_event(AuthEvent::LoginFailure {
            username: &request.username,
            reason: "password mismatch",
        });
        return Err(ApiError::from_service_error_with_id(
            ServiceError::InvalidCredentials,
            request_id,
        ));
    }

    let token = app_state.tokens.issue(&user).map_err(|e| {
        error!(error = %e, request_id = %request_id, "Token signing failed");
        ApiError::from_service_error_with_id(e, request_id.clone())
    })?;

    app_state.audit_logger.log_auth_event(AuthEvent::LoginSuccess {
        username: &user.username,
    });
    info!(username = %user.username, request_id = %request_id, "Session token issued");

    Ok(Json(TokenResponse { token }))
}

/// List all products
///
/// GET /api/products
pub async fn list_products_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Product>>, ApiError> {
    let request_id = request_id(&headers);

    let products = app_state.product_store.list().await.map_err(|e| {
        error!(error = %e, request_id = %request_id, "Product listing failed");
        ApiError::from_service_error_with_id(e, request_id)
    })?;

    Ok(Json(products))
}

/// Create a product (admin only)
///
/// POST /api/products
pub async fn create_product_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Extension(identity): Extension<Identity>,
    Json(body): Json<ProductBody>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let request_id = request_id(&headers);
    check_admin(&app_state, &identity, "/api/products", &request_id)?;
    validate_product_body(&body)
        .map_err(|e| ApiError::from_service_error_with_id(e, request_id.clone()))?;

    let id = app_state
        .product_store
        .create(&body.name, body.quantity)
        .await
        .map_err(|e| {
            error!(error = %e, request_id = %request_id, "Product insert failed");
            ApiError::from_service_error_with_id(e, request_id.clone())
        })?;

    info!(product_id = id, name = %body.name, request_id = %request_id, "Product created");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Product created successfully")),
    ))
}

/// Update a product by id (admin only)
///
/// PUT /api/products/:id
///
/// An id that matches no row is still a success, matching the repository's
/// rows-affected semantics.
pub async fn update_product_handler(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Extension(identity): Extension<Identity>,
    Json(body): Json<ProductBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request_id = request_id(&headers);
    check_admin(&app_state, &identity, "/api/products/:id", &request_id)?;
    validate_product_body(&body)
        .map_err(|e| ApiError::from_service_error_with_id(e, request_id.clone()))?;

    let rows = app_state
        .product_store
        .update(id, &body.name, body.quantity)
        .await
        .map_err(|e| {
            error!(error = %e, product_id = id, request_id = %request_id, "Product update failed");
            ApiError::from_service_error_with_id(e, request_id.clone())
        })?;

    if rows == 0 {
        warn!(product_id = id, request_id = %request_id, "Update matched no product");
    }
    info!(product_id = id, request_id = %request_id, "Product updated");

    Ok(Json(MessageResponse::new("Product updated successfully")))
}

/// Delete a product by id (admin only)
///
/// DELETE /api/products/:id
///
/// Repeat deletes are idempotent: deleting an already-deleted id succeeds.
pub async fn delete_product_handler(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Extension(identity): Extension<Identity>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request_id = request_id(&headers);
    check_admin(&app_state, &identity, "/api/products/:id", &request_id)?;

    let rows = app_state.product_store.delete(id).await.map_err(|e| {
        error!(error = %e, product_id = id, request_id = %request_id, "Product delete failed");
        ApiError::from_service_error_with_id(e, request_id.clone())
    })?;

    if rows == 0 {
        warn!(product_id = id, request_id = %request_id, "Delete matched no product");
    }
    info!(product_id = id, request_id = %request_id, "Product deleted");

    Ok(Json(MessageResponse::new("Product deleted successfully")))
}

/// Record a sale
///
/// POST /api/products/sell
///
/// Delegates to the inventory engine: the quantity decrement and the sale
/// record commit together or not at all.
pub async fn sell_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SellRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request_id = request_id(&headers);

    if request.quantity_sold <= 0 {
        return Err(ApiError::from_service_error_with_id(
            ServiceError::ValidationFailure("quantitySold must be a positive integer".to_string()),
            request_id,
        ));
    }

    app_state
        .inventory_engine
        .record_sale(request.product_id, request.quantity_sold)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                product_id = request.product_id,
                request_id = %request_id,
                "Sale failed"
            );
            ApiError::from_service_error_with_id(e, request_id.clone())
        })?;

    info!(
        product_id = request.product_id,
        quantity_sold = request.quantity_sold,
        request_id = %request_id,
        "Sale recorded"
    );

    Ok(Json(MessageResponse::new(
        "Product quantity updated successfully",
    )))
}

/// Record a purchase
///
/// POST /api/products/purchase
pub async fn purchase_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PurchaseRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request_id = request_id(&headers);

    if request.quantity_purchased <= 0 {
        return Err(ApiError::from_service_error_with_id(
            ServiceError::ValidationFailure(
                "quantityPurchased must be a positive integer".to_string(),
            ),
            request_id,
        ));
    }

    app_state
        .inventory_engine
        .record_purchase(request.product_id, request.quantity_purchased)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                product_id = request.product_id,
                request_id = %request_id,
                "Purchase failed"
            );
            ApiError::from_service_error_with_id(e, request_id.clone())
        })?;

    info!(
        product_id = request.product_id,
        quantity_purchased = request.quantity_purchased,
        request_id = %request_id,
        "Purchase recorded"
    );

    Ok(Json(MessageResponse::new(
        "Product quantity updated successfully",
    )))
}

/// Admin gate for the catalogue mutation handlers
fn check_admin(
    app_state: &AppState,
    identity: &Identity,
    path: &str,
    request_id: &str,
) -> Result<(), ApiError> {
    require_admin(identity).map_err(|e| {
        app_state.audit_logger.log_auth_event(AuthEvent::AccessDenied {
            username: &identity.username,
            path,
        });
        ApiError::from_service_error_with_id(e, request_id.to_string())
    })
}

/// Boundary validation for product create/update bodies
fn validate_product_body(body: &ProductBody) -> Result<(), ServiceError> {
    if body.name.trim().is_empty() {
        return Err(ServiceError::ValidationFailure(
            "name must not be empty".to_string(),
        ));
    }
    if body.quantity < 0 {
        return Err(ServiceError::ValidationFailure(
            "quantity must not be negative".to_string(),
        ));
    }
    Ok(())
}
