//! Logging utilities and configuration for Weft.
//!
//! The engine itself only emits `tracing` events; embedding applications
//! decide how to subscribe. This module provides a small configuration
//! surface and a setup helper for hosts that want sensible defaults.

use tracing::Level;

/// Logging configuration for Weft components.
///
/// Allows hosts to dial engine logging up or down without touching their
/// own subscriber configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for Weft components
    pub base_level: Level,
    /// Whether to log per-column profiling details
    pub log_profile_details: bool,
    /// Whether to log materialization operations
    pub log_materialization: bool,
    /// Maximum length for logged field values (to prevent huge logs)
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_profile_details: false,
            log_materialization: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Creates a verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_profile_details: true,
            log_materialization: true,
            max_field_length: 1024,
        }
    }

    /// Creates a minimal configuration for production with lowest overhead.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_profile_details: false,
            log_materialization: false,
            max_field_length: 128,
        }
    }
}

/// Truncates a string to the maximum field length if needed.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        value.to_string()
    } else {
        let truncated = &value[..max_length];
        format!("{truncated}...(truncated)")
    }
}

/// Utilities for setting up structured logging in host applications.
pub mod setup {
    use tracing::Level;

    /// Configuration for Weft's logging setup.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for the application
        pub level: Level,
        /// Log level for Weft components specifically
        pub weft_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                weft_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// Creates a configuration for production use.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                weft_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        /// Creates a configuration for development use.
        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                weft_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        /// Sets the log level for the application.
        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        /// Sets whether to use JSON output format.
        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Sets a custom environment filter.
        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                filter.clone()
            } else {
                format!(
                    "{},weft_core={}",
                    self.level.as_str().to_lowercase(),
                    self.weft_level.as_str().to_lowercase()
                )
            }
        }
    }

    /// Initializes logging for a host application.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use weft_core::logging::setup::{LoggingConfig, init_logging};
    ///
    /// init_logging(LoggingConfig::development()).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();

        Ok(())
    }
}
