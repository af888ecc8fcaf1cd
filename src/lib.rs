// ABOUTME: Main library entry point for the Contentloom generation engine
// ABOUTME: Plans topical content hierarchies and realizes them under monthly quotas
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

#![deny(unsafe_code)]

//! # Contentloom
//!
//! A topical content generation orchestrator for tenant websites. Given a
//! site's business profile, Contentloom plans a pillar → cluster →
//! article hierarchy, assigns each planned article a structural role and
//! internal-linking strategy, and incrementally realizes the plan into
//! published posts while respecting a subscription-based monthly quota
//! shared across an owner's sites.
//!
//! ## Architecture
//!
//! The engine is collaborator-driven: the natural-language generator,
//! image lookup, persistent repository, and advisory-lock service are
//! traits injected at construction time. The crate ships in-process
//! reference implementations of the repository and lock provider for
//! tests and single-node deployments.
//!
//! - **Packs**: static catalogs of roles, linking rules, and role mixes
//! - **Mapper**: one-shot planner with deterministic fallback padding
//! - **Pillars**: self-healing pool of active content themes
//! - **Quota**: per-site target math and idempotent backfill
//! - **Orchestrator**: the sequential, lock-guarded monthly run
//!
//! ## Example
//!
//! ```rust,no_run
//! use contentloom::config::EngineConfig;
//! use contentloom::locks::InProcessLockProvider;
//! use contentloom::orchestrator::GenerationOrchestrator;
//! use contentloom::repository::memory::MemoryRepository;
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     generator: Arc<dyn contentloom::generator::ContentGenerator>,
//! #     images: Arc<dyn contentloom::images::ImageLookup>,
//! #     owner_id: uuid::Uuid,
//! # ) -> contentloom::errors::AppResult<()> {
//! let orchestrator = GenerationOrchestrator::new(
//!     Arc::new(MemoryRepository::new()),
//!     generator,
//!     images,
//!     Arc::new(InProcessLockProvider::new()),
//!     EngineConfig::from_env(),
//! );
//! let report = orchestrator.run_monthly(owner_id).await?;
//! println!("created {} articles", report.total_articles_created);
//! # Ok(())
//! # }
//! ```

/// Environment-based engine configuration
pub mod config;

/// Application constants and tuning defaults
pub mod constants;

/// Unified error handling system with standard error codes
pub mod errors;

/// Content generator collaborator contract
pub mod generator;

/// Image lookup collaborator contract and fallback query cascade
pub mod images;

/// Internal-link target selection
pub mod linking;

/// Named advisory-lock contract and in-process provider
pub mod locks;

/// Logging configuration and structured logging setup
pub mod logging;

/// Topical mapper planning article hierarchies
pub mod mapper;

/// Core data models for sites, owners, pillars, clusters, plans, and posts
pub mod models;

/// Generation run coordinator and retry state machine
pub mod orchestrator;

/// Static content-pack catalog and role distributions
pub mod packs;

/// Pillar lifecycle management
pub mod pillars;

/// Per-owner and per-site quota arithmetic
pub mod quota;

/// Repository abstraction layer and in-memory backend
pub mod repository;
