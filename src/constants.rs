// ABOUTME: System-wide constants and tuning defaults for the content engine
// ABOUTME: Contains pillar pool sizing, retry bounds, and quota clamp values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

//! # Constants Module
//!
//! Hardcoded defaults for the orchestrator. Runtime overrides for the
//! tunable subset live in [`crate::config::EngineConfig`].

/// Pillar pool management defaults
pub mod pillars {
    /// Number of automation pillars kept concurrently active per site
    pub const INITIAL_PILLAR_COUNT: usize = 4;

    /// Hard cap on articles a single pillar may accumulate before retirement
    pub const MAX_ARTICLES_PER_PILLAR: u32 = 100;
}

/// Planning shape defaults used by the topical mapper
pub mod planning {
    /// Articles per category used to derive the category count
    pub const ARTICLES_PER_CATEGORY_DIVISOR: u32 = 20;

    /// Minimum categories in a topical map
    pub const MIN_CATEGORIES: u32 = 3;

    /// Maximum categories in a topical map
    pub const MAX_CATEGORIES: u32 = 8;

    /// Work-queue over-provisioning factor applied to the per-run target
    pub const OVERPROVISION_FACTOR: u32 = 2;
}

/// Per-article retry policy
pub mod retries {
    /// Attempts before a planned article is marked permanently failed
    pub const MAX_PLAN_RETRIES: u32 = 3;
}

/// Quota clamp bounds applied by the allocator
pub mod quota {
    /// Floor for any per-site monthly target
    pub const MIN_SITE_TARGET: u32 = 4;

    /// Ceiling for an even-split per-site target
    pub const MAX_SPLIT_TARGET: u32 = 40;

    /// Ceiling for an explicitly allocated per-site target
    pub const MAX_ALLOCATED_TARGET: u32 = 100;
}

/// Linking policy bounds
pub mod linking {
    /// Maximum internal-link targets attached to a single article plan
    pub const MAX_LINK_TARGETS: usize = 5;
}

/// Service identity used in logs
pub mod service {
    /// Service name for structured logging
    pub const SERVICE_NAME: &str = "contentloom";

    /// Service version from Cargo.toml
    pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
}
