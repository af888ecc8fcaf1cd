// ABOUTME: Content generator collaborator contract and request/response types
// ABOUTME: Tolerates incomplete generator output by defaulting fields from the plan
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

//! # Content Generator Contract
//!
//! The natural-language generator is an external collaborator injected
//! into the orchestrator at construction time; the engine never holds a
//! lazily-initialized global client. Implementations may fail or return
//! incomplete output: under-delivery on planning requests is a normal
//! outcome the callers pad deterministically, and missing article fields
//! are filled from the request via [`GeneratedArticle::complete_from`].

use crate::errors::AppResult;
use crate::models::{ArticleRole, BusinessProfile, LinkTarget, PackType};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request for a single article body
#[derive(Debug, Clone, Serialize)]
pub struct ArticleRequest {
    /// Pack role shaping the prompt
    pub role: ArticleRole,
    /// Pack the pillar runs under
    pub pack_type: PackType,
    /// Planned title
    pub title: String,
    /// Target keywords, ordered by priority
    pub keywords: Vec<String>,
    /// Internal links the article must include
    pub link_targets: Vec<LinkTarget>,
    /// Output-language directive (BCP 47 tag)
    pub language: String,
    /// Free-form extra instructions (theme context, rotation hints)
    pub extra_context: Option<String>,
    /// Tenant business context
    pub business_context: BusinessProfile,
}

/// A generated article, possibly with missing fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedArticle {
    /// Final title; empty means "use the planned title"
    #[serde(default)]
    pub title: String,
    /// Article body
    #[serde(default)]
    pub content: String,
    /// Topic tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// SEO title
    #[serde(default)]
    pub meta_title: String,
    /// SEO description
    #[serde(default)]
    pub meta_description: String,
}

impl GeneratedArticle {
    /// Fill any missing fields from the originating request.
    ///
    /// Generators returning partial JSON are tolerated: the planned title
    /// stands in for a missing title and keywords seed the missing
    /// metadata, so a post can always be assembled from whatever came back.
    #[must_use]
    pub fn complete_from(mut self, request: &ArticleRequest) -> Self {
        if self.title.trim().is_empty() {
            self.title = request.title.clone();
        }
        if self.meta_title.trim().is_empty() {
            self.meta_title = self.title.clone();
        }
        if self.meta_description.trim().is_empty() {
            self.meta_description = request.keywords.join(", ");
        }
        if self.tags.is_empty() {
            self.tags = request.keywords.iter().take(5).cloned().collect();
        }
        self
    }
}

/// Request for a pillar's topical map
#[derive(Debug, Clone, Serialize)]
pub struct TopicalMapRequest {
    /// Theme the map covers
    pub pillar_topic: String,
    /// Tenant business context
    pub business_context: BusinessProfile,
    /// Output-language directive
    pub language: String,
    /// Number of categories requested
    pub categories_count: u32,
    /// Subtopic articles requested per category
    pub articles_per_category: u32,
}

/// One planned category returned by the generator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannedCategory {
    /// Category name
    pub name: String,
    /// Category description
    #[serde(default)]
    pub description: String,
    /// Subtopic article ideas under this category
    #[serde(default)]
    pub articles: Vec<PlannedTopic>,
}

/// One planned article idea returned by the generator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannedTopic {
    /// Proposed title
    pub title: String,
    /// Proposed keywords
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Generator output for a topical map request; may under-deliver
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicalMapResponse {
    /// Pillar-level overview article idea
    #[serde(default)]
    pub pillar_article: Option<PlannedTopic>,
    /// Category plans, possibly fewer than requested
    #[serde(default)]
    pub categories: Vec<PlannedCategory>,
}

/// Request for new pillar themes
#[derive(Debug, Clone, Serialize)]
pub struct PillarThemeRequest {
    /// Tenant business context
    pub business_context: BusinessProfile,
    /// Number of themes requested
    pub count: usize,
    /// Names the new themes must not duplicate (case-insensitive)
    pub excluded_names: Vec<String>,
}

/// A proposed pillar theme
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PillarTheme {
    /// Theme name
    pub name: String,
    /// Theme description
    #[serde(default)]
    pub description: String,
}

/// External natural-language content generator
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate a full article for one planned unit of work
    ///
    /// # Errors
    ///
    /// Returns an error on transport or credential failure; partial output
    /// is not an error and is completed by the caller.
    async fn generate_article(&self, request: &ArticleRequest) -> AppResult<GeneratedArticle>;

    /// Plan a pillar's category/subtopic hierarchy
    ///
    /// # Errors
    ///
    /// Returns an error on transport or credential failure; under-delivery
    /// (fewer categories or articles than requested) is not an error.
    async fn generate_topical_map(
        &self,
        request: &TopicalMapRequest,
    ) -> AppResult<TopicalMapResponse>;

    /// Propose new pillar themes for the rotation
    ///
    /// # Errors
    ///
    /// Returns an error on transport or credential failure; under-delivery
    /// is not an error.
    async fn generate_pillar_themes(
        &self,
        request: &PillarThemeRequest,
    ) -> AppResult<Vec<PillarTheme>>;
}
