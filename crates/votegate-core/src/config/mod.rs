//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field carries a serde default, so an empty configuration
//! source yields a runnable (memory-backed in tests, Postgres-backed by
//! default) setup.

pub mod admission;
pub mod app;
pub mod database;
pub mod logging;
pub mod scheduler;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub use self::admission::{AdmissionConfig, MAX_SESSION_TTL_SECONDS, StoreBackend};
pub use self::app::{CorsConfig, ServerConfig};
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::scheduler::SchedulerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay) and the
/// `VOTEGATE__*` environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Admission engine settings (capacity, TTL, batch limit).
    #[serde(default)]
    pub admission: AdmissionConfig,
    /// Promotion scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `VOTEGATE__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", env)
    }

    /// Load configuration using an explicit base file (without extension).
    pub fn load_from(base: &str, env: &str) -> Result<Self, AppError> {
        let overlay = match base.rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/{env}"),
            None => env.to_string(),
        };

        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&overlay).required(false))
            .add_source(
                config::Environment::with_prefix("VOTEGATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app: AppConfig = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        app.validate()?;
        Ok(app)
    }

    /// Reject configurations the admission engine cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        let admission = &self.admission;

        if admission.capacity == 0 {
            return Err(AppError::configuration(
                "admission.capacity must be at least 1",
            ));
        }
        if admission.session_ttl_seconds == 0 {
            return Err(AppError::configuration(
                "admission.session_ttl_seconds must be at least 1",
            ));
        }
        if admission.session_ttl_seconds > MAX_SESSION_TTL_SECONDS {
            return Err(AppError::configuration(format!(
                "admission.session_ttl_seconds must be at most {MAX_SESSION_TTL_SECONDS}"
            )));
        }
        if admission.promotion_batch_limit == 0 {
            return Err(AppError::configuration(
                "admission.promotion_batch_limit must be at least 1",
            ));
        }
        if self.scheduler.interval_seconds == 0 {
            return Err(AppError::configuration(
                "scheduler.interval_seconds must be at least 1",
            ));
        }

        if admission.poll_interval_seconds.saturating_mul(5) > admission.session_ttl_seconds {
            warn!(
                poll_interval_seconds = admission.poll_interval_seconds,
                session_ttl_seconds = admission.session_ttl_seconds,
                "Client poll interval exceeds a fifth of the session TTL; \
                 slow clients may be reaped between heartbeats"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.admission.capacity, 100);
        assert_eq!(config.admission.session_ttl_seconds, 300);
        assert_eq!(config.admission.promotion_batch_limit, 10);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = AppConfig::default();
        config.admission.capacity = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_zero_batch_limit_rejected() {
        let mut config = AppConfig::default();
        config.admission.promotion_batch_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_ttl_rejected() {
        let mut config = AppConfig::default();
        config.admission.session_ttl_seconds = u64::MAX;
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);

        config.admission.session_ttl_seconds = MAX_SESSION_TTL_SECONDS + 1;
        assert!(config.validate().is_err());

        config.admission.session_ttl_seconds = MAX_SESSION_TTL_SECONDS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_session_ttl_never_negative() {
        let mut config = AppConfig::default();
        config.admission.session_ttl_seconds = u64::MAX;
        let ttl = config.admission.session_ttl();
        assert!(ttl > chrono::Duration::zero());
        assert_eq!(ttl, chrono::Duration::seconds(86_400));
    }

    #[test]
    fn test_huge_poll_interval_only_warns() {
        let mut config = AppConfig::default();
        config.admission.poll_interval_seconds = u64::MAX;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let config = AppConfig::load_from("does-not-exist/default", "nowhere").unwrap();
        assert_eq!(config.scheduler.interval_seconds, 15);
        assert!(config.scheduler.wake_on_release);
    }
}
