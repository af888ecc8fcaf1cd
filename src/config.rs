// ABOUTME: Environment-based engine configuration with documented defaults
// ABOUTME: Tunables for pillar pool size, retry bounds, and quota clamps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

//! # Engine Configuration
//!
//! Environment-only configuration, mirroring the deployment model of the
//! rest of the stack: every tunable has a compiled-in default from
//! [`crate::constants`] and an optional environment override. Values that
//! fail to parse fall back to the default with a warning rather than
//! aborting startup.

use crate::constants::{pillars, planning, quota, retries};
use std::env;
use tracing::warn;

/// Runtime tunables for the generation engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of automation pillars kept active per site
    pub active_pillar_count: usize,
    /// Article cap per pillar before retirement
    pub max_articles_per_pillar: u32,
    /// Attempts before a planned article fails permanently
    pub max_plan_retries: u32,
    /// Work-queue over-provisioning factor per run
    pub overprovision_factor: u32,
    /// Floor for any per-site monthly target
    pub min_site_target: u32,
    /// Ceiling for an even-split per-site target
    pub max_split_target: u32,
    /// Ceiling for an explicitly allocated per-site target
    pub max_allocated_target: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            active_pillar_count: pillars::INITIAL_PILLAR_COUNT,
            max_articles_per_pillar: pillars::MAX_ARTICLES_PER_PILLAR,
            max_plan_retries: retries::MAX_PLAN_RETRIES,
            overprovision_factor: planning::OVERPROVISION_FACTOR,
            min_site_target: quota::MIN_SITE_TARGET,
            max_split_target: quota::MAX_SPLIT_TARGET,
            max_allocated_target: quota::MAX_ALLOCATED_TARGET,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Recognized variables, all optional:
    /// `ENGINE_ACTIVE_PILLAR_COUNT`, `ENGINE_MAX_ARTICLES_PER_PILLAR`,
    /// `ENGINE_MAX_PLAN_RETRIES`, `ENGINE_OVERPROVISION_FACTOR`.
    /// Quota clamp bounds are not overridable; they encode product policy.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.active_pillar_count = parse_env(
            "ENGINE_ACTIVE_PILLAR_COUNT",
            config.active_pillar_count,
        );
        config.max_articles_per_pillar = parse_env(
            "ENGINE_MAX_ARTICLES_PER_PILLAR",
            config.max_articles_per_pillar,
        );
        config.max_plan_retries = parse_env("ENGINE_MAX_PLAN_RETRIES", config.max_plan_retries);
        config.overprovision_factor = parse_env(
            "ENGINE_OVERPROVISION_FACTOR",
            config.overprovision_factor,
        );

        config
    }
}

/// Parse an environment variable, warning and defaulting on failure
fn parse_env<T: std::str::FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(variable = name, value = %raw, default = %default, "unparseable value, using default");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.active_pillar_count, 4);
        assert_eq!(config.max_articles_per_pillar, 100);
        assert_eq!(config.max_plan_retries, 3);
        assert_eq!(config.overprovision_factor, 2);
        assert_eq!(config.min_site_target, 4);
        assert_eq!(config.max_split_target, 40);
        assert_eq!(config.max_allocated_target, 100);
    }
}
