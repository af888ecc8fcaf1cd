// ABOUTME: Shared test utilities and fixtures for integration tests
// ABOUTME: Provides an in-memory repository, scripted stub collaborators, and builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

//! Shared test utilities for `contentloom`

use async_trait::async_trait;
use chrono::Utc;
use contentloom::errors::{AppError, AppResult};
use contentloom::generator::{
    ArticleRequest, ContentGenerator, GeneratedArticle, PillarTheme, PillarThemeRequest,
    PlannedCategory, PlannedTopic, TopicalMapRequest, TopicalMapResponse,
};
use contentloom::images::ImageLookup;
use contentloom::models::{
    BusinessProfile, Owner, Site, SubscriptionPlan, SubscriptionStatus,
};
use contentloom::repository::memory::MemoryRepository;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Once;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };
        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Fresh in-memory repository with logging initialized
pub fn create_test_repository() -> MemoryRepository {
    init_test_logging();
    MemoryRepository::new()
}

/// Seed an active owner with the given monthly quota
pub fn create_owner(repo: &MemoryRepository, posts_per_month: u32) -> Owner {
    let owner = Owner {
        id: Uuid::new_v4(),
        subscription_plan: SubscriptionPlan {
            name: "growth".into(),
            posts_per_month,
        },
        subscription_status: SubscriptionStatus::Active,
        posts_used_this_month: 0,
        posts_reset_date: Utc::now() - chrono::Duration::days(10),
        article_allocation: None,
    };
    repo.insert_owner(owner.clone());
    owner
}

/// Seed a site for an owner, optionally with a business profile
pub fn create_site(repo: &MemoryRepository, owner_id: Uuid, name: &str, with_profile: bool) -> Site {
    let profile = with_profile.then(|| BusinessProfile {
        description: "Independent outdoor gear retailer".into(),
        target_audience: "weekend hikers".into(),
        brand_voice: "practical, warm".into(),
        value_propositions: vec!["expert fitting".into()],
        industry: "outdoor retail".into(),
        competitors: vec!["BigBox Outdoors".into()],
    });
    let site = Site {
        id: Uuid::new_v4(),
        owner_id: Some(owner_id),
        name: name.into(),
        language: "en".into(),
        business_profile: profile,
        current_topic_index: 0,
        created_at: Utc::now(),
    };
    repo.insert_site(site.clone());
    site
}

/// Scripted content generator for tests.
///
/// Happy path by default; failure counters let tests inject a fixed number
/// of article or map failures, and the delivery knobs simulate generator
/// under-delivery on planning calls.
#[derive(Debug)]
pub struct StubGenerator {
    /// Fail this many `generate_article` calls before succeeding
    pub article_failures: AtomicU32,
    /// Fail every `generate_topical_map` call when true
    pub map_fails: bool,
    /// Categories returned per map call (requested count is capped to this)
    pub map_categories_delivered: usize,
    /// Articles returned per category (requested count is capped to this)
    pub map_articles_delivered: usize,
    /// Themes returned per theme call (requested count is capped to this)
    pub themes_delivered: usize,
    /// Fail every `generate_article` call with a missing-config error
    pub article_config_error: bool,
    /// Counter backing sequential stub theme names
    pub theme_counter: AtomicU32,
    /// Number of `generate_article` calls observed
    pub article_calls: AtomicU32,
}

impl Default for StubGenerator {
    fn default() -> Self {
        Self {
            article_failures: AtomicU32::new(0),
            map_fails: false,
            map_categories_delivered: usize::MAX,
            map_articles_delivered: usize::MAX,
            themes_delivered: usize::MAX,
            article_config_error: false,
            theme_counter: AtomicU32::new(0),
            article_calls: AtomicU32::new(0),
        }
    }
}

impl StubGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A generator that fails the first `n` article calls
    pub fn failing_articles(n: u32) -> Self {
        Self {
            article_failures: AtomicU32::new(n),
            ..Self::default()
        }
    }

    /// A generator that returns nothing from planning calls
    pub fn empty_planner() -> Self {
        Self {
            map_categories_delivered: 0,
            map_articles_delivered: 0,
            themes_delivered: 0,
            ..Self::default()
        }
    }

    /// Number of article calls made so far
    pub fn article_call_count(&self) -> u32 {
        self.article_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for StubGenerator {
    async fn generate_article(&self, request: &ArticleRequest) -> AppResult<GeneratedArticle> {
        self.article_calls.fetch_add(1, Ordering::SeqCst);
        if self.article_config_error {
            return Err(AppError::config_missing("generator credentials not configured"));
        }
        let remaining = self.article_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.article_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::external_service("stub-generator", "simulated timeout"));
        }
        Ok(GeneratedArticle {
            title: request.title.clone(),
            content: format!("Generated body for {}", request.title),
            tags: request.keywords.clone(),
            meta_title: request.title.clone(),
            meta_description: format!("All about {}", request.title),
        })
    }

    async fn generate_topical_map(
        &self,
        request: &TopicalMapRequest,
    ) -> AppResult<TopicalMapResponse> {
        if self.map_fails {
            return Err(AppError::external_service("stub-generator", "simulated map failure"));
        }
        let categories = (request.categories_count as usize).min(self.map_categories_delivered);
        let per_category =
            (request.articles_per_category as usize).min(self.map_articles_delivered);
        Ok(TopicalMapResponse {
            pillar_article: Some(PlannedTopic {
                title: format!("{} Explained", request.pillar_topic),
                keywords: vec![request.pillar_topic.to_lowercase()],
            }),
            categories: (0..categories)
                .map(|c| PlannedCategory {
                    name: format!("{} Category {c}", request.pillar_topic),
                    description: "stub category".into(),
                    articles: (0..per_category)
                        .map(|a| PlannedTopic {
                            title: format!("{} Article {c}-{a}", request.pillar_topic),
                            keywords: vec![format!("kw-{c}-{a}")],
                        })
                        .collect(),
                })
                .collect(),
        })
    }

    async fn generate_pillar_themes(
        &self,
        request: &PillarThemeRequest,
    ) -> AppResult<Vec<PillarTheme>> {
        let delivered = request.count.min(self.themes_delivered);
        Ok((0..delivered)
            .map(|_| {
                let n = self.theme_counter.fetch_add(1, Ordering::SeqCst);
                PillarTheme {
                    name: format!("Stub Theme {n}"),
                    description: "stub theme".into(),
                }
            })
            .collect())
    }
}

/// Image lookup stub with a fixed answer
#[derive(Debug, Clone)]
pub struct StubImages {
    /// URL returned for every search, or None for a permanent miss
    pub url: Option<String>,
}

impl StubImages {
    pub fn always(url: &str) -> Self {
        Self {
            url: Some(url.into()),
        }
    }

    pub fn never() -> Self {
        Self { url: None }
    }
}

#[async_trait]
impl ImageLookup for StubImages {
    async fn search(&self, _query: &str, _fallback_queries: &[String]) -> Option<String> {
        self.url.clone()
    }
}
