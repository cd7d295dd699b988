// Main entry point for the stock service

use stock_service::api::{create_router, AppState};
use stock_service::auth::audit::AuditLogger;
use stock_service::auth::middleware::AuthState;
use stock_service::auth::token::TokenService;
use stock_service::auth::user_store::{seed_admin, DbUserStore};
use stock_service::config::Config;
use stock_service::engine::inventory::{InventoryGuards, SqlInventoryEngine};
use stock_service::engine::products::DbProductStore;
use stock_service::storage;

use anyhow::Context;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load and validate configuration first (before any logging)
    let config = Config::from_env().context("configuration")?;

    // 2. Initialize tracing subscriber with config values
    // Must be done only once - tracing panics if init() is called twice
    init_tracing(&config);

    info!("Starting stock service");
    info!(
        bind_address = %config.bind_address,
        port = config.port,
        "Configuration loaded"
    );

    // 3. Open the connection pool and verify connectivity
    let pool = storage::connect(&config).await.context("open database")?;
    storage::ping(&pool)
        .await
        .context("database connectivity probe")?;
    info!("Connected to database");

    // 4. Bring the schema up to date
    storage::migrations::run(&pool)
        .await
        .context("run schema migrations")?;
    info!("Schema migrations applied");

    // 5. Seed the admin account when configured
    if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) {
        if seed_admin(&pool, username, password)
            .await
            .context("seed admin user")?
        {
            info!(username = %username, "Admin user seeded");
        }
    }

    // 6. Build components and application state
    let tokens = Arc::new(TokenService::new(&config.token_secret, config.token_ttl_secs));
    let audit_logger = Arc::new(AuditLogger::new());
    let guards = InventoryGuards::from_config(&config);

    let app_state = AppState {
        product_store: Arc::new(DbProductStore::new(pool.clone())),
        inventory_engine: Arc::new(SqlInventoryEngine::new(pool.clone(), guards)),
        user_store: Arc::new(DbUserStore::new(pool.clone())),
        tokens: tokens.clone(),
        audit_logger: audit_logger.clone(),
        config: Arc::new(config.clone()),
    };

    let auth_state = Arc::new(AuthState {
        tokens,
        audit_logger,
    });

    // 7. Create router
    let router = create_router(app_state, auth_state);
    info!("Router created");

    // 8. Start HTTP server
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // 9. Close the pool so in-flight writes flush before exit
    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing subscriber based on configuration
///
/// The level set is owned by `Config::validate`; here the already-validated
/// value feeds the filter directly. RUST_LOG wins over it when set.
fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_env_filter(filter);

    if config.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            info!("SIGTERM received, starting graceful shutdown");
        },
    }
}
