// ABOUTME: Logging configuration and structured logging setup for observability
// ABOUTME: Configures log levels, formatters, and output destinations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

//! Production-ready logging configuration with structured output

use crate::constants::service;
use crate::errors::{AppError, AppResult};
use std::env;
use tracing::info;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

/// Log output format options
#[derive(Debug, Clone)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for space-constrained environments
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            service_name: service::SERVICE_NAME.into(),
            service_version: service::SERVICE_VERSION.into(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Build logging configuration from environment variables
    ///
    /// Reads `LOG_LEVEL`, `LOG_FORMAT` (json/pretty/compact), and
    /// `ENVIRONMENT`; anything unset falls back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = env::var("LOG_LEVEL") {
            config.level = level;
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            config.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }
        if let Ok(environment) = env::var("ENVIRONMENT") {
            if environment.eq_ignore_ascii_case("production") {
                config.format = LogFormat::Json;
            }
            config.environment = environment;
        }

        config
    }

    /// Initialize the global tracing subscriber with this configuration
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the level string does not parse as an
    /// `EnvFilter` directive or a subscriber is already installed.
    pub fn init(&self) -> AppResult<()> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .map_err(|e| AppError::config(format!("invalid log level '{}': {e}", self.level)))?;

        let registry = tracing_subscriber::registry().with(filter);

        let result = match self.format {
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_file(self.include_location)
                        .with_line_number(self.include_location),
                )
                .try_init(),
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .with_file(self.include_location)
                        .with_line_number(self.include_location)
                        .with_target(true),
                )
                .try_init(),
            LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
        };

        result.map_err(|e| AppError::config(format!("failed to install subscriber: {e}")))?;

        info!(
            service = %self.service_name,
            version = %self.service_version,
            environment = %self.environment,
            "logging initialized"
        );
        Ok(())
    }
}

/// Initialize logging from the environment, for binaries and embedders
///
/// # Errors
///
/// Returns `AppError::Config` when the subscriber cannot be installed.
pub fn init_from_env() -> AppResult<()> {
    LoggingConfig::from_env().init()
}
