// ABOUTME: Unified error handling system with standard error codes for the engine
// ABOUTME: Defines ErrorCode, structured AppError, and conversions used across modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

//! # Unified Error Handling System
//!
//! Centralized error types for the orchestrator. Every fallible public
//! operation returns [`AppResult`]; collaborator traits that callers
//! implement use `anyhow::Result` and are bridged via
//! `From<anyhow::Error>`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Subscription & quota policy (1000-1999)
    /// Owner has no active subscription
    #[serde(rename = "SUBSCRIPTION_REQUIRED")]
    SubscriptionRequired = 1000,
    /// Owner's monthly post quota is exhausted
    #[serde(rename = "POST_LIMIT_REACHED")]
    PostLimitReached = 1001,

    // Concurrency (2000-2999)
    /// A generation run already holds the owner's cycle lock
    #[serde(rename = "GENERATION_IN_PROGRESS")]
    GenerationInProgress = 2000,

    // Validation (3000-3999)
    /// Site has no business profile to plan from
    #[serde(rename = "PROFILE_MISSING")]
    ProfileMissing = 3000,

    // Resource management (4000-4999)
    /// Referenced entity does not exist
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,

    // External services (5000-5999)
    /// The content generator or image service failed
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError = 5000,

    // Configuration (6000-6999)
    /// Configuration value invalid
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,
    /// Required configuration missing (e.g. generator credentials)
    #[serde(rename = "CONFIG_MISSING")]
    ConfigMissing = 6001,

    // Internal errors (9000-9999)
    /// Repository operation failed
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 9000,
}

impl ErrorCode {
    /// Get a human-readable description for this error code
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::SubscriptionRequired => "An active subscription is required",
            Self::PostLimitReached => "Monthly post limit reached",
            Self::GenerationInProgress => "A generation run is already in progress",
            Self::ProfileMissing => "The site has no business profile",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigMissing => "Required configuration is missing",
            Self::StorageError => "Repository operation failed",
        }
    }

    /// Whether this code must abort a whole generation run. Configuration
    /// problems are the only fatal class; every other failure is retried
    /// or recorded as a per-site issue string.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigError | Self::ConfigMissing)
    }
}

/// Additional context that can be attached to errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Owner ID if available
    pub owner_id: Option<Uuid>,
    /// Site ID if applicable
    pub site_id: Option<Uuid>,
    /// Additional key-value context
    pub details: serde_json::Value,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            owner_id: None,
            site_id: None,
            details: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    pub context: ErrorContext,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add an owner ID to the error context
    #[must_use]
    pub fn with_owner_id(mut self, owner_id: Uuid) -> Self {
        self.context.owner_id = Some(owner_id);
        self
    }

    /// Add a site ID to the error context
    #[must_use]
    pub fn with_site_id(mut self, site_id: Uuid) -> Self {
        self.context.site_id = Some(site_id);
        self
    }

    /// Add details to the error context
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.context.details = details;
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors for common errors
impl AppError {
    /// Owner lacks an active subscription
    #[must_use]
    pub fn subscription_required() -> Self {
        Self::new(
            ErrorCode::SubscriptionRequired,
            "An active subscription is required to generate content",
        )
    }

    /// Monthly post quota exhausted
    #[must_use]
    pub fn post_limit_reached(limit: u32) -> Self {
        Self::new(
            ErrorCode::PostLimitReached,
            format!("Monthly post limit of {limit} reached"),
        )
        .with_details(serde_json::json!({ "limit": limit }))
    }

    /// A concurrent run already holds the cycle lock
    #[must_use]
    pub fn generation_in_progress() -> Self {
        Self::new(
            ErrorCode::GenerationInProgress,
            "Content generation already in progress for this billing cycle",
        )
    }

    /// Site lacks the business profile needed to plan content
    #[must_use]
    pub fn profile_missing() -> Self {
        Self::new(
            ErrorCode::ProfileMissing,
            "no business profile configured",
        )
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Required configuration missing
    pub fn config_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigMissing, message)
    }

    /// External service error
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }
}

/// Conversion from `anyhow::Error` (collaborator trait boundary) to `AppError`
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        match error.source() {
            Some(source) => Self::new(ErrorCode::StorageError, error.to_string()).with_details(
                serde_json::json!({
                    "source": source.to_string()
                }),
            ),
            None => Self::new(ErrorCode::StorageError, error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_config_codes_are_fatal() {
        assert!(ErrorCode::ConfigMissing.is_fatal());
        assert!(ErrorCode::ConfigError.is_fatal());
        assert!(!ErrorCode::ExternalServiceError.is_fatal());
        assert!(!ErrorCode::SubscriptionRequired.is_fatal());
        assert!(!ErrorCode::StorageError.is_fatal());
    }

    #[test]
    fn test_app_error_creation() {
        let error = AppError::subscription_required().with_owner_id(Uuid::new_v4());

        assert_eq!(error.code, ErrorCode::SubscriptionRequired);
        assert!(error.context.owner_id.is_some());
        assert!(error.context.site_id.is_none());
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::PostLimitReached).unwrap();
        assert_eq!(json, "\"POST_LIMIT_REACHED\"");
    }
}
