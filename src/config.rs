// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Every setting has a default suitable for a single classroom on
//! localhost. Configuration is validated eagerly and failures are treated
//! as deployment errors rather than recoverable runtime conditions.

use anyhow::{ensure, Result};
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails validation with a
/// message mentioning the given fragment.
macro_rules! assert_invalid_config {
    // ---
    ($expr:expr, $fragment:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string().contains($fragment),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: server::ServerConfig,
    pub token: token::TokenConfig,
    pub sessions: sessions::SessionsConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any value is out of range.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            server: server::ServerConfig::from_env()?,
            token: token::TokenConfig::from_env()?,
            sessions: sessions::SessionsConfig::from_env()?,
        })
    }
}

// ============================================================
// Server configuration
// ============================================================

mod server {
    // ---
    use super::*;

    /// Network-facing settings.
    #[derive(Debug, Clone)]
    pub struct ServerConfig {
        /// Listen address. Defaults to `127.0.0.1:3000`.
        pub bind_addr: String,

        /// CORS origins allowed to call the API. `*` allows any origin.
        pub allowed_origins: Vec<String>,

        /// `prom` for Prometheus, anything else for no-op metrics.
        pub metrics_type: String,
    }

    impl ServerConfig {
        /// Builds a [`ServerConfig`] from environment variables.
        pub fn from_env() -> Result<Self> {
            // ---
            let bind_addr = std::env::var("ATTENDANCE_BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:3000".to_string());

            let allowed_origins = std::env::var("ATTENDANCE_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();

            let metrics_type =
                std::env::var("ATTENDANCE_METRICS_TYPE").unwrap_or_else(|_| "noop".to_string());

            Ok(Self {
                bind_addr,
                allowed_origins,
                metrics_type,
            })
        }
    }
}
pub use server::ServerConfig;

// ============================================================
// Rotating token configuration
// ============================================================

mod token {
    // ---
    use super::*;

    /// One hour. Rotating codes are meant to live for seconds.
    pub const MAX_TOKEN_TTL_MS: u64 = 3_600_000;

    /// Rotating-token timing.
    ///
    /// The rotation interval must be shorter than the token lifetime so
    /// that consecutive tokens overlap.
    #[derive(Debug, Clone)]
    pub struct TokenConfig {
        /// Validity window of each token. Defaults to 5 seconds.
        pub ttl: Duration,

        /// Cadence advertised to presenting clients. Defaults to 2 seconds.
        pub rotation_interval: Duration,
    }

    impl TokenConfig {
        /// Builds a [`TokenConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if either duration is zero or the rotation
        /// interval is not strictly shorter than the TTL.
        pub fn from_env() -> Result<Self> {
            // ---
            let ttl_ms = optional_env_parse!("ATTENDANCE_TOKEN_TTL_MS", u64, 5_000);
            let rotation_ms = optional_env_parse!("ATTENDANCE_ROTATION_INTERVAL_MS", u64, 2_000);

            ensure!(ttl_ms > 0, "ATTENDANCE_TOKEN_TTL_MS must be positive");
            ensure!(
                ttl_ms <= MAX_TOKEN_TTL_MS,
                "ATTENDANCE_TOKEN_TTL_MS must be at most {MAX_TOKEN_TTL_MS}"
            );
            ensure!(
                rotation_ms > 0,
                "ATTENDANCE_ROTATION_INTERVAL_MS must be positive"
            );
            ensure!(
                rotation_ms < ttl_ms,
                "ATTENDANCE_ROTATION_INTERVAL_MS ({rotation_ms}) must be shorter than ATTENDANCE_TOKEN_TTL_MS ({ttl_ms})"
            );

            Ok(Self {
                ttl: Duration::from_millis(ttl_ms),
                rotation_interval: Duration::from_millis(rotation_ms),
            })
        }
    }
}
pub use token::TokenConfig;

// ============================================================
// Session housekeeping configuration
// ============================================================

mod sessions {
    // ---
    use super::*;

    /// Thirty days.
    pub const MAX_IDLE_TTL_SECS: u64 = 30 * 24 * 3600;

    /// Idle-session sweeping.
    #[derive(Debug, Clone)]
    pub struct SessionsConfig {
        /// Sessions untouched for this long are dropped. Defaults to 12 hours.
        pub idle_ttl: Duration,

        /// How often the sweeper runs. Defaults to 5 minutes.
        pub sweep_interval: Duration,
    }

    impl SessionsConfig {
        /// Builds a [`SessionsConfig`] from environment variables.
        pub fn from_env() -> Result<Self> {
            // ---
            let idle_ttl_secs = optional_env_parse!("ATTENDANCE_SESSION_IDLE_TTL_SEC", u64, 43_200);
            let sweep_secs = optional_env_parse!("ATTENDANCE_SWEEP_INTERVAL_SEC", u64, 300);

            ensure!(
                idle_ttl_secs > 0,
                "ATTENDANCE_SESSION_IDLE_TTL_SEC must be positive"
            );
            ensure!(
                idle_ttl_secs <= MAX_IDLE_TTL_SECS,
                "ATTENDANCE_SESSION_IDLE_TTL_SEC must be at most {MAX_IDLE_TTL_SECS}"
            );
            ensure!(sweep_secs > 0, "ATTENDANCE_SWEEP_INTERVAL_SEC must be positive");

            Ok(Self {
                idle_ttl: Duration::from_secs(idle_ttl_secs),
                sweep_interval: Duration::from_secs(sweep_secs),
            })
        }
    }
}
pub use sessions::SessionsConfig;

// ============================================================
// Tests
// ============================================================
