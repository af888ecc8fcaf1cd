// ABOUTME: Topical mapper planning pillar/category/subtopic article hierarchies
// ABOUTME: Pads generator under-delivery deterministically so map shape is always exact
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

//! # Topical Mapper
//!
//! One-shot planner turning a pillar theme plus business context into a
//! persisted tree of article plans. The external generator proposes
//! titles and keywords; whatever it fails to deliver is synthesized
//! deterministically from the site's industry so the resulting map always
//! has exactly the requested shape. Slugs are assigned here and never
//! change, which is what lets the link selector hand out forward
//! references to not-yet-generated articles.

use crate::constants::planning::{ARTICLES_PER_CATEGORY_DIVISOR, MAX_CATEGORIES, MIN_CATEGORIES};
use crate::errors::AppResult;
use crate::generator::{
    ContentGenerator, PlannedCategory, PlannedTopic, TopicalMapRequest, TopicalMapResponse,
};
use crate::models::{
    ArticleRole, ArticleType, BusinessProfile, Cluster, Pillar, PillarStatus, PlanStatus,
    PlannedArticle, Site,
};
use crate::packs::{PackDefinition, RoleDistribution};
use crate::repository::ContentRepository;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Shape of a planned topical map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapShape {
    /// Number of categories
    pub categories: u32,
    /// Subtopic articles per category
    pub articles_per_category: u32,
}

impl MapShape {
    /// Derive the map shape for a target article count.
    ///
    /// `categories = clamp(ceil(target / 20), 3, 8)` and subtopics fill
    /// the remainder after the pillar article and one hub article per
    /// category.
    #[must_use]
    pub fn for_target(target_count: u32) -> Self {
        let categories =
            target_count.div_ceil(ARTICLES_PER_CATEGORY_DIVISOR).clamp(MIN_CATEGORIES, MAX_CATEGORIES);
        let remainder = target_count.saturating_sub(1).saturating_sub(categories);
        let articles_per_category = remainder.div_ceil(categories);
        Self {
            categories,
            articles_per_category,
        }
    }

    /// Total plans the shape realizes (pillar + hubs + subtopics)
    #[must_use]
    pub const fn total_plans(&self) -> u32 {
        1 + self.categories + self.categories * self.articles_per_category
    }
}

/// Summary of a realized topical map
#[derive(Debug, Clone)]
pub struct MapSummary {
    /// Plans written for the pillar
    pub total_planned: u32,
    /// Clusters written for the pillar
    pub clusters: u32,
}

/// One-shot planner for a pillar's article hierarchy
pub struct TopicalMapper {
    repository: Arc<dyn ContentRepository>,
    generator: Arc<dyn ContentGenerator>,
}

impl TopicalMapper {
    /// Create a mapper over the injected collaborators
    #[must_use]
    pub fn new(
        repository: Arc<dyn ContentRepository>,
        generator: Arc<dyn ContentGenerator>,
    ) -> Self {
        Self {
            repository,
            generator,
        }
    }

    /// Plan and persist a pillar's topical map.
    ///
    /// Clears and rewrites every cluster and plan the pillar owned, then
    /// marks the pillar mapped with its realized article total. Any
    /// failure past the planning call marks the pillar failed and
    /// propagates.
    ///
    /// # Errors
    ///
    /// Returns generator transport errors and repository failures. Planning
    /// under-delivery is not an error.
    pub async fn build_map(
        &self,
        site: &Site,
        pillar: &Pillar,
        target_count: u32,
    ) -> AppResult<MapSummary> {
        match self.plan_and_persist(site, pillar, target_count).await {
            Ok(summary) => {
                info!(
                    pillar = %pillar.name,
                    plans = summary.total_planned,
                    clusters = summary.clusters,
                    "topical map realized"
                );
                Ok(summary)
            }
            Err(error) => {
                let mut failed = pillar.clone();
                failed.status = PillarStatus::Failed;
                if let Err(update_error) = self.repository.update_pillar(&failed).await {
                    warn!(pillar = %pillar.name, %update_error, "failed to mark pillar failed");
                }
                Err(error)
            }
        }
    }

    async fn plan_and_persist(
        &self,
        site: &Site,
        pillar: &Pillar,
        target_count: u32,
    ) -> AppResult<MapSummary> {
        let shape = MapShape::for_target(target_count);
        let profile = site.business_profile.clone().unwrap_or_default();

        // Under-delivery (down to zero items) is padded below; only
        // transport or credential failures propagate.
        let response = self
            .generator
            .generate_topical_map(&TopicalMapRequest {
                pillar_topic: pillar.name.clone(),
                business_context: profile.clone(),
                language: site.language.clone(),
                categories_count: shape.categories,
                articles_per_category: shape.articles_per_category,
            })
            .await?;

        let padded = pad_response(response, &shape, &pillar.name, &profile);
        self.persist_map(pillar, &padded, &shape).await
    }

    /// Rewrite the pillar's clusters and plans from a padded response
    async fn persist_map(
        &self,
        pillar: &Pillar,
        padded: &TopicalMapResponse,
        shape: &MapShape,
    ) -> AppResult<MapSummary> {
        self.repository
            .delete_planned_articles_for_pillar(pillar.id)
            .await?;
        self.repository.delete_clusters_for_pillar(pillar.id).await?;

        let pack = PackDefinition::for_pack(pillar.pack_type);
        let distribution = RoleDistribution::build(&pack);
        let mut slugs = SlugAssigner::new();
        let mut sort_order = 0_u32;
        let mut role_index = 0_usize;
        let mut total_planned = 0_u32;

        let pillar_topic = padded.pillar_article.clone().unwrap_or_default();
        let pillar_plan = build_plan(
            pillar.id,
            None,
            &pillar_topic,
            ArticleType::Pillar,
            ArticleRole::Pillar,
            sort_order,
            &mut slugs,
        );
        self.repository.create_planned_article(&pillar_plan).await?;
        sort_order += 1;
        total_planned += 1;

        for (category_index, category) in padded.categories.iter().enumerate() {
            let cluster = Cluster {
                id: Uuid::new_v4(),
                pillar_id: pillar.id,
                name: category.name.clone(),
                description: category.description.clone(),
                sort_order: category_index as u32,
                article_count: 1 + category.articles.len() as u32,
                generated_count: 0,
            };
            self.repository.create_cluster(&cluster).await?;

            let hub_topic = PlannedTopic {
                title: category.name.clone(),
                keywords: vec![category.name.to_lowercase()],
            };
            let hub_plan = build_plan(
                pillar.id,
                Some(cluster.id),
                &hub_topic,
                ArticleType::Category,
                distribution.role_at(role_index),
                sort_order,
                &mut slugs,
            );
            self.repository.create_planned_article(&hub_plan).await?;
            sort_order += 1;
            role_index += 1;
            total_planned += 1;

            for topic in &category.articles {
                let plan = build_plan(
                    pillar.id,
                    Some(cluster.id),
                    topic,
                    ArticleType::Subtopic,
                    distribution.role_at(role_index),
                    sort_order,
                    &mut slugs,
                );
                self.repository.create_planned_article(&plan).await?;
                sort_order += 1;
                role_index += 1;
                total_planned += 1;
            }
        }

        let mut mapped = pillar.clone();
        mapped.status = PillarStatus::Mapped;
        mapped.target_article_count = total_planned;
        self.repository.update_pillar(&mapped).await?;

        Ok(MapSummary {
            total_planned,
            clusters: shape.categories,
        })
    }
}

/// Pad a generator response to the exact requested shape.
///
/// Missing categories and articles are synthesized from the industry and
/// an incrementing index; surplus items beyond the shape are trimmed so
/// the realized map is exact in both directions.
fn pad_response(
    mut response: TopicalMapResponse,
    shape: &MapShape,
    pillar_topic: &str,
    profile: &BusinessProfile,
) -> TopicalMapResponse {
    let industry = if profile.industry.trim().is_empty() {
        "business"
    } else {
        profile.industry.as_str()
    };

    if response
        .pillar_article
        .as_ref()
        .map_or(true, |t| t.title.trim().is_empty())
    {
        response.pillar_article = Some(PlannedTopic {
            title: format!("The Complete Guide to {pillar_topic}"),
            keywords: vec![pillar_topic.to_lowercase(), industry.to_lowercase()],
        });
    }

    response.categories.truncate(shape.categories as usize);
    let mut synthetic_index = 1_u32;
    while response.categories.len() < shape.categories as usize {
        response.categories.push(PlannedCategory {
            name: format!("{pillar_topic} Essentials {synthetic_index}"),
            description: format!("Core {industry} topics for {pillar_topic}"),
            articles: Vec::new(),
        });
        synthetic_index += 1;
    }

    for category in &mut response.categories {
        category.articles.truncate(shape.articles_per_category as usize);
        let mut article_index = 1_u32;
        while category.articles.len() < shape.articles_per_category as usize {
            category.articles.push(PlannedTopic {
                title: format!("{} for {industry}: Part {article_index}", category.name),
                keywords: vec![category.name.to_lowercase(), industry.to_lowercase()],
            });
            article_index += 1;
        }
    }

    response
}

fn build_plan(
    pillar_id: Uuid,
    cluster_id: Option<Uuid>,
    topic: &PlannedTopic,
    article_type: ArticleType,
    article_role: ArticleRole,
    sort_order: u32,
    slugs: &mut SlugAssigner,
) -> PlannedArticle {
    PlannedArticle {
        id: Uuid::new_v4(),
        pillar_id,
        cluster_id,
        title: topic.title.clone(),
        slug: slugs.assign(&topic.title),
        keywords: topic.keywords.clone(),
        article_type,
        article_role,
        status: PlanStatus::Pending,
        sort_order,
        retry_count: 0,
        error: None,
        post_id: None,
        generated_at: None,
        published_at: None,
    }
}

/// Deterministic, collision-free slug assignment within one map
struct SlugAssigner {
    used: HashSet<String>,
}

impl SlugAssigner {
    fn new() -> Self {
        Self {
            used: HashSet::new(),
        }
    }

    fn assign(&mut self, title: &str) -> String {
        let base = slugify(title);
        let mut candidate = base.clone();
        let mut suffix = 2_u32;
        while !self.used.insert(candidate.clone()) {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        candidate
    }
}

/// Lowercase ASCII kebab-casing with collapsed separators
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "article".into()
    } else {
        trimmed.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_shape_math() {
        // target 40 -> ceil(40/20)=2 clamped to 3 categories;
        // remainder 36 -> ceil(36/3)=12 per category
        let shape = MapShape::for_target(40);
        assert_eq!(shape.categories, 3);
        assert_eq!(shape.articles_per_category, 12);

        // target 200 -> ceil(200/20)=10 clamped to 8
        let shape = MapShape::for_target(200);
        assert_eq!(shape.categories, 8);

        // small target still yields a valid shape
        let shape = MapShape::for_target(4);
        assert_eq!(shape.categories, 3);
        assert_eq!(shape.articles_per_category, 0);
    }

    #[test]
    fn test_pad_full_synthetic_fallback() {
        let shape = MapShape::for_target(40);
        let profile = BusinessProfile {
            industry: "landscaping".into(),
            ..BusinessProfile::default()
        };
        let padded = pad_response(TopicalMapResponse::default(), &shape, "Lawn Care", &profile);

        assert!(padded.pillar_article.is_some());
        assert_eq!(padded.categories.len(), 3);
        for category in &padded.categories {
            assert_eq!(category.articles.len(), 12);
            assert!(category.articles.iter().all(|a| !a.title.is_empty()));
        }
    }

    #[test]
    fn test_pad_trims_surplus() {
        let shape = MapShape::for_target(40);
        let response = TopicalMapResponse {
            pillar_article: Some(PlannedTopic {
                title: "Hub".into(),
                keywords: vec![],
            }),
            categories: (0..10)
                .map(|i| PlannedCategory {
                    name: format!("C{i}"),
                    description: String::new(),
                    articles: (0..20)
                        .map(|j| PlannedTopic {
                            title: format!("A{j}"),
                            keywords: vec![],
                        })
                        .collect(),
                })
                .collect(),
        };
        let padded = pad_response(response, &shape, "Theme", &BusinessProfile::default());
        assert_eq!(padded.categories.len(), 3);
        assert!(padded
            .categories
            .iter()
            .all(|c| c.articles.len() == 12));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("The Complete Guide to Lawn Care!"), "the-complete-guide-to-lawn-care");
        assert_eq!(slugify("  --  "), "article");
        assert_eq!(slugify("Émigré café"), "migr-caf");
    }

    #[test]
    fn test_slug_assigner_deduplicates() {
        let mut slugs = SlugAssigner::new();
        assert_eq!(slugs.assign("Lawn Care"), "lawn-care");
        assert_eq!(slugs.assign("Lawn Care"), "lawn-care-2");
        assert_eq!(slugs.assign("Lawn care"), "lawn-care-3");
    }
}
