// ABOUTME: Repository abstraction layer for sites, owners, pillars, plans, and posts
// ABOUTME: Defines the async CRUD contract plus the quota-checked post insert
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

//! # Repository Abstraction
//!
//! Persistence is a collaborator, not part of the engine: callers plug in
//! whatever backend they run by implementing [`ContentRepository`]. The
//! crate ships [`memory::MemoryRepository`] as the reference backend for
//! tests and single-node embedding.
//!
//! The one non-CRUD contract is [`ContentRepository::create_post_with_limit_check`]:
//! subscription and quota are re-validated at the moment of insert and the
//! owner's usage counter moves atomically with the row, so the coordinator
//! can trust the outcome without holding its own quota state.

pub mod memory;

use crate::models::{
    ArticleRole, Cluster, Owner, Pillar, PlannedArticle, Post, PostSource, PostStatus, Site,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Input for a quota-checked post insert
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Site the post belongs to
    pub site_id: Uuid,
    /// Originating pillar, when produced by the orchestrator
    pub pillar_id: Option<Uuid>,
    /// Final title
    pub title: String,
    /// Slug copied from the plan
    pub slug: String,
    /// Generated body
    pub content: String,
    /// Topic tags
    pub tags: Vec<String>,
    /// Hero image URL, when the lookup produced one
    pub hero_image_url: Option<String>,
    /// SEO title
    pub meta_title: String,
    /// SEO description
    pub meta_description: String,
    /// Role the article was generated under
    pub article_role: ArticleRole,
    /// Publication status
    pub status: PostStatus,
    /// Provenance
    pub source: PostSource,
    /// When the post goes live
    pub scheduled_publish_date: DateTime<Utc>,
}

/// Why a quota-checked post insert was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostDenial {
    /// The target site does not exist
    SiteNotFound,
    /// The site has no owner on record
    OwnerNotFound,
    /// The owner's subscription is not active
    SubscriptionRequired,
    /// The owner's monthly quota is exhausted
    PostLimitReached,
}

impl PostDenial {
    /// Stable string code for reports and logs
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::SiteNotFound => "SITE_NOT_FOUND",
            Self::OwnerNotFound => "OWNER_NOT_FOUND",
            Self::SubscriptionRequired => "SUBSCRIPTION_REQUIRED",
            Self::PostLimitReached => "POST_LIMIT_REACHED",
        }
    }
}

/// Outcome of a quota-checked post insert
#[derive(Debug, Clone)]
pub enum PostCreateOutcome {
    /// Row inserted; usage counter already incremented
    Created(Post),
    /// Refused by policy; nothing persisted
    Denied(PostDenial),
}

/// Persistent storage contract consumed by the engine
#[async_trait]
pub trait ContentRepository: Send + Sync {
    // ================================
    // Owners & Sites
    // ================================

    /// Get an owner by ID
    async fn get_owner(&self, owner_id: Uuid) -> Result<Option<Owner>>;

    /// Get a site by ID
    async fn get_site(&self, site_id: Uuid) -> Result<Option<Site>>;

    /// All sites belonging to an owner
    async fn get_sites_for_owner(&self, owner_id: Uuid) -> Result<Vec<Site>>;

    /// Advance a site's rotating topic index
    async fn update_site_topic_index(&self, site_id: Uuid, index: u32) -> Result<()>;

    // ================================
    // Pillars
    // ================================

    /// Create a pillar
    async fn create_pillar(&self, pillar: &Pillar) -> Result<()>;

    /// Get a pillar by ID
    async fn get_pillar(&self, pillar_id: Uuid) -> Result<Option<Pillar>>;

    /// All pillars for a site regardless of provenance or status
    /// (name-collision checks)
    async fn list_pillars(&self, site_id: Uuid) -> Result<Vec<Pillar>>;

    /// All automation pillars for a site, any status
    async fn list_automation_pillars(&self, site_id: Uuid) -> Result<Vec<Pillar>>;

    /// Persist pillar counters, status, and timestamps
    async fn update_pillar(&self, pillar: &Pillar) -> Result<()>;

    // ================================
    // Clusters
    // ================================

    /// Create a cluster
    async fn create_cluster(&self, cluster: &Cluster) -> Result<()>;

    /// Get a cluster by ID
    async fn get_cluster(&self, cluster_id: Uuid) -> Result<Option<Cluster>>;

    /// Persist cluster counters
    async fn update_cluster(&self, cluster: &Cluster) -> Result<()>;

    /// Remove every cluster owned by a pillar (map regeneration)
    async fn delete_clusters_for_pillar(&self, pillar_id: Uuid) -> Result<()>;

    // ================================
    // Planned articles
    // ================================

    /// Create a planned article
    async fn create_planned_article(&self, plan: &PlannedArticle) -> Result<()>;

    /// All plans for a pillar, ordered by `sort_order`
    async fn list_planned_articles(&self, pillar_id: Uuid) -> Result<Vec<PlannedArticle>>;

    /// Persist plan status, retry count, and realization fields
    async fn update_planned_article(&self, plan: &PlannedArticle) -> Result<()>;

    /// Remove every plan owned by a pillar (map regeneration)
    async fn delete_planned_articles_for_pillar(&self, pillar_id: Uuid) -> Result<()>;

    // ================================
    // Posts & quota
    // ================================

    /// Count a site's posts with the given provenance created since a time
    async fn count_posts_since(
        &self,
        site_id: Uuid,
        since: DateTime<Utc>,
        source: PostSource,
    ) -> Result<u64>;

    /// Insert a post after re-validating subscription and quota.
    ///
    /// On `Created`, the owner's `posts_used_this_month` has been
    /// incremented atomically with the insert.
    async fn create_post_with_limit_check(&self, post: NewPost) -> Result<PostCreateOutcome>;

    /// Attach a hero image to an existing post (deferred backfill)
    async fn set_post_image(&self, post_id: Uuid, image_url: &str) -> Result<()>;
}
