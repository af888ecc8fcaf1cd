// ABOUTME: Core data models for sites, owners, pillars, clusters, plans, and posts
// ABOUTME: Closed status and role enums make invalid lifecycle states unrepresentable
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

//! # Data Models
//!
//! Persisted entities and their lifecycle enums. All states that the
//! original domain kept as loose strings (`articleRole`, pillar and plan
//! status) are closed enums here so every transition is an exhaustive
//! match.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// A tenant website that receives generated content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    /// Unique site identifier
    pub id: Uuid,
    /// Owning subscription holder, if claimed
    pub owner_id: Option<Uuid>,
    /// Display name
    pub name: String,
    /// Display language for generated content (BCP 47 tag, e.g. "en")
    pub language: String,
    /// Business profile driving planning; sites without one are skipped
    pub business_profile: Option<BusinessProfile>,
    /// Rotating index used to vary monthly themes
    pub current_topic_index: u32,
    /// When the site was registered
    pub created_at: DateTime<Utc>,
}

impl Site {
    /// Whether the site carries enough profile data to plan content for
    #[must_use]
    pub fn has_business_profile(&self) -> bool {
        self.business_profile
            .as_ref()
            .is_some_and(|p| !p.description.trim().is_empty())
    }
}

/// Business context fed to the planner and generator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessProfile {
    /// What the business does
    pub description: String,
    /// Who the content is written for
    pub target_audience: String,
    /// Tone directives for the generator
    pub brand_voice: String,
    /// Key selling points
    pub value_propositions: Vec<String>,
    /// Industry label, also the seed for deterministic fallback names
    pub industry: String,
    /// Competitor names for differentiation context
    pub competitors: Vec<String>,
}

/// Subscription holder owning one or more sites
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    /// Unique owner identifier
    pub id: Uuid,
    /// Current plan, as reported by the billing collaborator
    pub subscription_plan: SubscriptionPlan,
    /// Current status, as reported by the billing collaborator
    pub subscription_status: SubscriptionStatus,
    /// Posts created across all sites in the current billing cycle
    pub posts_used_this_month: u32,
    /// Anchor date defining billing-cycle boundaries
    pub posts_reset_date: DateTime<Utc>,
    /// Optional fixed per-site monthly article counts, keyed by site ID
    pub article_allocation: Option<HashMap<Uuid, u32>>,
}

impl Owner {
    /// Whether the owner may run content generation at all
    #[must_use]
    pub const fn has_active_subscription(&self) -> bool {
        matches!(self.subscription_status, SubscriptionStatus::Active)
    }

    /// Explicit allocation for a site, when one is configured
    #[must_use]
    pub fn allocation_for(&self, site_id: Uuid) -> Option<u32> {
        self.article_allocation
            .as_ref()
            .and_then(|map| map.get(&site_id).copied())
    }
}

/// Subscription plan details supplied by the billing collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    /// Plan name for reporting
    pub name: String,
    /// Monthly post quota shared across the owner's sites
    pub posts_per_month: u32,
}

/// Subscription status, read-only input from billing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid and in good standing
    Active,
    /// Payment failed, grace period
    PastDue,
    /// Cancelled by the owner
    Canceled,
    /// Never subscribed
    #[default]
    None,
}

impl Display for SubscriptionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::PastDue => write!(f, "past_due"),
            Self::Canceled => write!(f, "canceled"),
            Self::None => write!(f, "none"),
        }
    }
}

/// A top-level content theme for a site, capped at a maximum article count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pillar {
    /// Unique pillar identifier
    pub id: Uuid,
    /// Site this pillar belongs to
    pub site_id: Uuid,
    /// Theme name, unique per site (case-insensitive) among automation pillars
    pub name: String,
    /// Short theme description
    pub description: String,
    /// Lifecycle status
    pub status: PillarStatus,
    /// Content pack governing roles and linking for this pillar
    pub pack_type: PackType,
    /// Planned article total set when the topical map is realized
    pub target_article_count: u32,
    /// Articles successfully realized from this pillar
    pub generated_count: u32,
    /// Plans permanently failed under this pillar
    pub failed_count: u32,
    /// Article cap triggering retirement
    pub max_articles: u32,
    /// True for pillars created by the monthly rotation, false for manual ones
    pub is_automation: bool,
    /// Set when the pillar reaches its cap and retires
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Pillar {
    /// Whether this pillar can still accept generated articles.
    ///
    /// Permanently failed plans consume capacity alongside realized ones,
    /// so `generated_count + failed_count <= max_articles` holds by the
    /// time a pillar completes.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        !matches!(self.status, PillarStatus::Completed)
            && self.generated_count + self.failed_count < self.max_articles
    }
}

/// Pillar lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PillarStatus {
    /// Created, topical map not yet realized
    #[default]
    Generating,
    /// Topical map realized; plans exist
    Mapped,
    /// Reached its article cap and retired
    Completed,
    /// Map realization failed
    Failed,
}

impl Display for PillarStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generating => write!(f, "generating"),
            Self::Mapped => write!(f, "mapped"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A subgrouping ("category") of planned articles within a pillar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// Unique cluster identifier
    pub id: Uuid,
    /// Owning pillar; clusters are deleted when the pillar's map is rebuilt
    pub pillar_id: Uuid,
    /// Category name
    pub name: String,
    /// Category description
    pub description: String,
    /// Display ordering within the pillar
    pub sort_order: u32,
    /// Planned article count
    pub article_count: u32,
    /// Realized article count
    pub generated_count: u32,
}

/// Structural position of a planned article within the topical map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleType {
    /// The single map-level overview article
    Pillar,
    /// A category hub article
    Category,
    /// A leaf article under a category
    Subtopic,
}

/// Structural content archetype governing generation and linking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArticleRole {
    /// Broad hub content anchoring a theme
    Pillar,
    /// Supporting cluster content (the generic role)
    Cluster,
    /// X-vs-Y comparison content
    Comparison,
    /// Step-by-step instructional content
    HowTo,
    /// Ranked or enumerated list content
    Listicle,
    /// Narrative customer/outcome content
    CaseStudy,
    /// Question-and-answer content
    FaqPage,
    /// Term-definition content
    Glossary,
}

impl ArticleRole {
    /// Stable string tag used in persisted records and prompts
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pillar => "pillar",
            Self::Cluster => "cluster",
            Self::Comparison => "comparison",
            Self::HowTo => "how-to",
            Self::Listicle => "listicle",
            Self::CaseStudy => "case-study",
            Self::FaqPage => "faq-page",
            Self::Glossary => "glossary",
        }
    }

    /// The generic supporting role used when no distribution applies
    #[must_use]
    pub const fn generic() -> Self {
        Self::Cluster
    }
}

impl Display for ArticleRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ArticleRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pillar" => Ok(Self::Pillar),
            "cluster" => Ok(Self::Cluster),
            "comparison" => Ok(Self::Comparison),
            "how-to" => Ok(Self::HowTo),
            "listicle" => Ok(Self::Listicle),
            "case-study" => Ok(Self::CaseStudy),
            "faq-page" => Ok(Self::FaqPage),
            "glossary" => Ok(Self::Glossary),
            other => Err(format!("unknown article role: {other}")),
        }
    }
}

/// Content pack selector; looked up in the static catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PackType {
    /// General organic-search content
    #[default]
    Seo,
    /// Location-oriented service content
    Local,
    /// Product and buying-guide content
    Ecommerce,
}

impl Display for PackType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seo => write!(f, "seo"),
            Self::Local => write!(f, "local"),
            Self::Ecommerce => write!(f, "ecommerce"),
        }
    }
}

/// A unit of planned work, not yet realized as a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedArticle {
    /// Unique plan identifier
    pub id: Uuid,
    /// Owning pillar
    pub pillar_id: Uuid,
    /// Owning cluster, absent for the pillar-level article
    pub cluster_id: Option<Uuid>,
    /// Working title
    pub title: String,
    /// URL slug, assigned at planning time and never changed afterwards so
    /// forward internal links resolve before their target is generated
    pub slug: String,
    /// Target keywords, ordered by priority
    pub keywords: Vec<String>,
    /// Structural position within the map
    pub article_type: ArticleType,
    /// Pack role governing prompt shape and linking eligibility
    pub article_role: ArticleRole,
    /// Work-unit status
    pub status: PlanStatus,
    /// Display ordering within its group
    pub sort_order: u32,
    /// Failed generation attempts so far
    pub retry_count: u32,
    /// Last failure message, if any
    pub error: Option<String>,
    /// Realized post, set at most once
    pub post_id: Option<Uuid>,
    /// When generation completed
    pub generated_at: Option<DateTime<Utc>>,
    /// When the realized post was published
    pub published_at: Option<DateTime<Utc>>,
}

/// Planned-article work-unit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Awaiting generation
    #[default]
    Pending,
    /// Generation in flight
    Generating,
    /// Realized as a post
    Completed,
    /// Permanently failed after exhausting retries
    Failed,
}

impl Display for PlanStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Generating => write!(f, "generating"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Provenance tag on realized posts; the backfill allocator counts only
/// `MonthlyAutomation`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostSource {
    /// Created by the monthly generation run
    MonthlyAutomation,
    /// Created by hand in the admin surface
    Manual,
    /// Imported from CSV
    CsvImport,
}

/// Publication status of a realized post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    /// Awaiting its scheduled publish date
    #[default]
    Scheduled,
    /// Live
    Published,
    /// Saved but not publishable
    Draft,
}

/// A realized content artifact owned by the repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique post identifier
    pub id: Uuid,
    /// Site the post belongs to
    pub site_id: Uuid,
    /// Originating pillar, when produced by the orchestrator
    pub pillar_id: Option<Uuid>,
    /// Final title
    pub title: String,
    /// Generated slug (copied from the plan)
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
    /// When the post goes (or went) live
    pub scheduled_publish_date: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Anchor-text style for an internal link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnchorStyle {
    /// Meaning-preserving natural phrasing (the default)
    #[default]
    Semantic,
    /// Exact keyword match
    Exact,
    /// Partial keyword match
    Partial,
    /// Brand-name anchor
    Branded,
}

/// An internal-link instruction attached to an article request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTarget {
    /// Title of the target article (may not be generated yet)
    pub title: String,
    /// Pre-assigned slug of the target
    pub slug: String,
    /// Anchor-text style to use
    pub anchor_style: AnchorStyle,
}
