// Configuration management

use crate::core::errors::ServiceError;
use std::env;
use std::fmt;

/// Application configuration loaded from environment variables
///
/// All configuration is validated on load with clear error messages.
/// Debug output redacts secret material.
#[derive(Clone)]
pub struct Config {
    // Server configuration
    pub bind_address: String,
    pub port: u16,

    // Database configuration
    pub database_url: String,
    pub database_max_connections: u32,

    // Session token configuration
    pub token_secret: String,
    pub token_ttl_secs: u64,

    // Inventory guard configuration (both off preserves the legacy
    // zero-row-update behaviour of the stock endpoints)
    pub enforce_stock_floor: bool,
    pub require_known_product: bool,

    // Middleware configuration
    pub request_timeout_secs: u64,
    pub body_size_limit_bytes: usize,

    // Startup seeding (optional; both set or both unset)
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,

    // Logging configuration
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("database_max_connections", &self.database_max_connections)
            .field("token_secret", &"<REDACTED>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("enforce_stock_floor", &self.enforce_stock_floor)
            .field("require_known_product", &self.require_known_product)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("body_size_limit_bytes", &self.body_size_limit_bytes)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<REDACTED>"))
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Supports `.env` file loading in development (via dotenv crate).
    ///
    /// # Returns
    /// * `Result<Self, ServiceError>` - Config instance or validation error
    pub fn from_env() -> Result<Self, ServiceError> {
        // Load .env file if present (development)
        // Skip in test environment to avoid interfering with test environment variables
        #[cfg(not(test))]
        {
            dotenv::dotenv().ok(); // Ignore errors (file may not exist)
        }

        let config = Self {
            bind_address: Self::get_env_or_default("HOST", "0.0.0.0")?,
            port: Self::parse_port()?,
            database_url: Self::get_env_or_default("DATABASE_URL", "sqlite://stock.db")?,
            database_max_connections: Self::parse_u32_or_default("DATABASE_MAX_CONNECTIONS", 5)?,
            token_secret: Self::get_required_env("ACCESS_TOKEN_SECRET")?,
            token_ttl_secs: Self::parse_u64_or_default("TOKEN_TTL_SECS", 3600)?,
            enforce_stock_floor: Self::parse_bool_or_default("ENFORCE_STOCK_FLOOR", false)?,
            require_known_product: Self::parse_bool_or_default("REQUIRE_KNOWN_PRODUCT", false)?,
            request_timeout_secs: Self::parse_u64_or_default("REQUEST_TIMEOUT_SECS", 30)?,
            body_size_limit_bytes: Self::parse_usize_or_default("BODY_SIZE_LIMIT_BYTES", 1024 * 1024)?,
            admin_username: Self::get_optional_env("ADMIN_USERNAME")?,
            admin_password: Self::get_optional_env("ADMIN_PASSWORD")?,
            log_level: Self::get_env_or_default("LOG_LEVEL", "info")?,
            log_format: Self::get_env_or_default("LOG_FORMAT", "text")?,
        };

        // Post-load validation
        config.validate()?;

        Ok(config)
    }

    /// Get environment variable or return default value
    fn get_env_or_default(key: &str, default: &str) -> Result<String, ServiceError> {
        Ok(env::var(key).unwrap_or_else(|_| default.to_string()))
    }

    /// Get optional environment variable
    fn get_optional_env(key: &str) -> Result<Option<String>, ServiceError> {
        match env::var(key) {
            Ok(value) if !value.is_empty() => Ok(Some(value)),
            _ => Ok(None),
        }
    }

    /// Get required environment variable
    fn get_required_env(key: &str) -> Result<String, ServiceError> {
        let value = env::var(key)
            .map_err(|_| ServiceError::ConfigError(format!("{} not set", key)))?;

        if value.is_empty() {
            return Err(ServiceError::ConfigError(format!("{} is empty", key)));
        }

        Ok(value)
    }

    /// Parse port from PORT environment variable
    fn parse_port() -> Result<u16, ServiceError> {
        let port_str = env::var("PORT").unwrap_or_else(|_| "3001".to_string());
        let port = port_str.parse::<u16>().map_err(|e| {
            ServiceError::ConfigError(format!("Invalid PORT value '{}': {}", port_str, e))
        })?;

        if port == 0 {
            return Err(ServiceError::ConfigError(
                "PORT must be between 1 and 65535".to_string(),
            ));
        }

        Ok(port)
    }

    /// Parse u64 from environment variable or return default
    fn parse_u64_or_default(key: &str, default: u64) -> Result<u64, ServiceError> {
        match env::var(key) {
            Ok(value) => {
                let parsed = value.parse::<u64>().map_err(|e| {
                    ServiceError::ConfigError(format!("Invalid {} value '{}': {}", key, value, e))
                })?;

                if parsed == 0 {
                    return Err(ServiceError::ConfigError(format!(
                        "{} must be greater than 0",
                        key
                    )));
                }

                Ok(parsed)
            }
            _ => Ok(default),
        }
    }

    /// Parse u32 from environment variable or return default
    fn parse_u32_or_default(key: &str, default: u32) -> Result<u32, ServiceError> {
        match env::var(key) {
            Ok(value) => {
                let parsed = value.parse::<u32>().map_err(|e| {
                    ServiceError::ConfigError(format!("Invalid {} value '{}': {}", key, value, e))
                })?;

                if parsed == 0 {
                    return Err(ServiceError::ConfigError(format!(
                        "{} must be greater than 0",
                        key
                    )));
                }

                Ok(parsed)
            }
            _ => Ok(default),
        }
    }

    /// Parse usize from environment variable or return default
    fn parse_usize_or_default(key: &str, default: usize) -> Result<usize, ServiceError> {
        match env::var(key) {
            Ok(value) => {
                let parsed = value.parse::<usize>().map_err(|e| {
                    ServiceError::ConfigError(format!("Invalid {} value '{}': {}", key, value, e))
                })?;

                if parsed == 0 {
                    return Err(ServiceError::ConfigError(format!(
                        "{} must be greater than 0",
                        key
                    )));
                }

                Ok(parsed)
            }
            _ => Ok(default),
        }
    }

    /// Parse bool from environment variable or return default
    ///
    /// Accepts "true"/"false" and "1"/"0" (case-insensitive).
    fn parse_bool_or_default(key: &str, default: bool) -> Result<bool, ServiceError> {
        match env::var(key) {
            Ok(value) => match value.to_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                other => Err(ServiceError::ConfigError(format!(
                    "Invalid {} value '{}': must be true or false",
                    key, other
                ))),
            },
            _ => Ok(default),
        }
    }

    /// Validate all configuration values
    fn validate(&self) -> Result<(), ServiceError> {
        // Validate port range (u16 max is 65535, so only check for 0)
        if self.port == 0 {
            return Err(ServiceError::ConfigError(format!(
                "Invalid PORT value '{}': must be between 1 and 65535",
                self.port
            )));
        }

        if self.token_secret.is_empty() {
            return Err(ServiceError::ConfigError(
                "ACCESS_TOKEN_SECRET is empty".to_string(),
            ));
        }

        // Admin seed needs both halves
        match (&self.admin_username, &self.admin_password) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(ServiceError::ConfigError(
                    "ADMIN_USERNAME and ADMIN_PASSWORD must be set together".to_string(),
                ));
            }
            _ => {}
        }

        // Validate log level
        Self::validate_log_level(&self.log_level)?;

        // Validate log format
        Self::validate_log_format(&self.log_format)?;

        Ok(())
    }

    /// Validate log level
    fn validate_log_level(level: &str) -> Result<(), ServiceError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&level.to_lowercase().as_str()) {
            return Err(ServiceError::ConfigError(format!(
                "Invalid LOG_LEVEL '{}': must be one of {}",
                level,
                valid_levels.join(", ")
            )));
        }
        Ok(())
    }

    /// Validate log format
    fn validate_log_format(format: &str) -> Result<(), ServiceError> {
        if format != "json" && format != "text" {
            return Err(ServiceError::ConfigError(format!(
                "Invalid LOG_FORMAT '{}': must be 'json' or 'text'",
                format
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Create a test configuration for unit tests
    ///
    /// This bypasses environment variable loading for use in tests that
    /// don't need real configuration.
    pub fn test_config() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3001,
            database_url: "sqlite::memory:".to_string(),
            database_max_connections: 1,
            token_secret: "test-secret-not-for-production".to_string(),
            token_ttl_secs: 3600,
            enforce_stock_floor: false,
            require_known_product: false,
            request_timeout_secs: 30,
            body_size_limit_bytes: 1024 * 1024,
            admin_username: None,
            admin_password: None,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}
