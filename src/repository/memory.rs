// ABOUTME: In-memory repository backend over concurrent maps
// ABOUTME: Reference implementation for tests and single-node embedding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

//! In-memory [`ContentRepository`] backend.
//!
//! Backed by `DashMap`s; the quota-checked insert serializes through the
//! owner entry so the usage counter and the post row move together.

use super::{ContentRepository, NewPost, PostCreateOutcome, PostDenial};
use crate::models::{Cluster, Owner, Pillar, PlannedArticle, Post, PostSource, Site};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory repository over concurrent maps
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    owners: Arc<DashMap<Uuid, Owner>>,
    sites: Arc<DashMap<Uuid, Site>>,
    pillars: Arc<DashMap<Uuid, Pillar>>,
    clusters: Arc<DashMap<Uuid, Cluster>>,
    plans: Arc<DashMap<Uuid, PlannedArticle>>,
    posts: Arc<DashMap<Uuid, Post>>,
}

impl MemoryRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an owner (test/bootstrap helper)
    pub fn insert_owner(&self, owner: Owner) {
        self.owners.insert(owner.id, owner);
    }

    /// Seed a site (test/bootstrap helper)
    pub fn insert_site(&self, site: Site) {
        self.sites.insert(site.id, site);
    }

    /// Snapshot of all posts, unordered (test helper)
    #[must_use]
    pub fn all_posts(&self) -> Vec<Post> {
        self.posts.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Snapshot of one post by ID (test helper)
    #[must_use]
    pub fn post(&self, post_id: Uuid) -> Option<Post> {
        self.posts.get(&post_id).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl ContentRepository for MemoryRepository {
    async fn get_owner(&self, owner_id: Uuid) -> Result<Option<Owner>> {
        Ok(self.owners.get(&owner_id).map(|e| e.value().clone()))
    }

    async fn get_site(&self, site_id: Uuid) -> Result<Option<Site>> {
        Ok(self.sites.get(&site_id).map(|e| e.value().clone()))
    }

    async fn get_sites_for_owner(&self, owner_id: Uuid) -> Result<Vec<Site>> {
        let mut sites: Vec<Site> = self
            .sites
            .iter()
            .filter(|e| e.value().owner_id == Some(owner_id))
            .map(|e| e.value().clone())
            .collect();
        sites.sort_by_key(|s| s.created_at);
        Ok(sites)
    }

    async fn update_site_topic_index(&self, site_id: Uuid, index: u32) -> Result<()> {
        let mut site = self
            .sites
            .get_mut(&site_id)
            .ok_or_else(|| anyhow!("site {site_id} not found"))?;
        site.current_topic_index = index;
        Ok(())
    }

    async fn create_pillar(&self, pillar: &Pillar) -> Result<()> {
        self.pillars.insert(pillar.id, pillar.clone());
        Ok(())
    }

    async fn get_pillar(&self, pillar_id: Uuid) -> Result<Option<Pillar>> {
        Ok(self.pillars.get(&pillar_id).map(|e| e.value().clone()))
    }

    async fn list_pillars(&self, site_id: Uuid) -> Result<Vec<Pillar>> {
        let mut pillars: Vec<Pillar> = self
            .pillars
            .iter()
            .filter(|e| e.value().site_id == site_id)
            .map(|e| e.value().clone())
            .collect();
        pillars.sort_by_key(|p| p.created_at);
        Ok(pillars)
    }

    async fn list_automation_pillars(&self, site_id: Uuid) -> Result<Vec<Pillar>> {
        let mut pillars: Vec<Pillar> = self
            .pillars
            .iter()
            .filter(|e| e.value().site_id == site_id && e.value().is_automation)
            .map(|e| e.value().clone())
            .collect();
        pillars.sort_by_key(|p| p.created_at);
        Ok(pillars)
    }

    async fn update_pillar(&self, pillar: &Pillar) -> Result<()> {
        if !self.pillars.contains_key(&pillar.id) {
            return Err(anyhow!("pillar {} not found", pillar.id));
        }
        self.pillars.insert(pillar.id, pillar.clone());
        Ok(())
    }

    async fn create_cluster(&self, cluster: &Cluster) -> Result<()> {
        self.clusters.insert(cluster.id, cluster.clone());
        Ok(())
    }

    async fn get_cluster(&self, cluster_id: Uuid) -> Result<Option<Cluster>> {
        Ok(self.clusters.get(&cluster_id).map(|e| e.value().clone()))
    }

    async fn update_cluster(&self, cluster: &Cluster) -> Result<()> {
        if !self.clusters.contains_key(&cluster.id) {
            return Err(anyhow!("cluster {} not found", cluster.id));
        }
        self.clusters.insert(cluster.id, cluster.clone());
        Ok(())
    }

    async fn delete_clusters_for_pillar(&self, pillar_id: Uuid) -> Result<()> {
        self.clusters.retain(|_, c| c.pillar_id != pillar_id);
        Ok(())
    }

    async fn create_planned_article(&self, plan: &PlannedArticle) -> Result<()> {
        self.plans.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn list_planned_articles(&self, pillar_id: Uuid) -> Result<Vec<PlannedArticle>> {
        let mut plans: Vec<PlannedArticle> = self
            .plans
            .iter()
            .filter(|e| e.value().pillar_id == pillar_id)
            .map(|e| e.value().clone())
            .collect();
        plans.sort_by_key(|p| p.sort_order);
        Ok(plans)
    }

    async fn update_planned_article(&self, plan: &PlannedArticle) -> Result<()> {
        if !self.plans.contains_key(&plan.id) {
            return Err(anyhow!("planned article {} not found", plan.id));
        }
        self.plans.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn delete_planned_articles_for_pillar(&self, pillar_id: Uuid) -> Result<()> {
        self.plans.retain(|_, p| p.pillar_id != pillar_id);
        Ok(())
    }

    async fn count_posts_since(
        &self,
        site_id: Uuid,
        since: DateTime<Utc>,
        source: PostSource,
    ) -> Result<u64> {
        Ok(self
            .posts
            .iter()
            .filter(|e| {
                let post = e.value();
                post.site_id == site_id && post.source == source && post.created_at >= since
            })
            .count() as u64)
    }

    async fn create_post_with_limit_check(&self, post: NewPost) -> Result<PostCreateOutcome> {
        let Some(owner_id) = self
            .sites
            .get(&post.site_id)
            .map(|site| site.owner_id)
        else {
            return Ok(PostCreateOutcome::Denied(PostDenial::SiteNotFound));
        };
        let Some(owner_id) = owner_id else {
            return Ok(PostCreateOutcome::Denied(PostDenial::OwnerNotFound));
        };

        // Holding the owner entry serializes the check-and-increment with
        // the insert, the in-memory stand-in for a transactional insert.
        let Some(mut owner) = self.owners.get_mut(&owner_id) else {
            return Ok(PostCreateOutcome::Denied(PostDenial::OwnerNotFound));
        };
        if !owner.has_active_subscription() {
            return Ok(PostCreateOutcome::Denied(PostDenial::SubscriptionRequired));
        }
        if owner.posts_used_this_month >= owner.subscription_plan.posts_per_month {
            return Ok(PostCreateOutcome::Denied(PostDenial::PostLimitReached));
        }

        let created = Post {
            id: Uuid::new_v4(),
            site_id: post.site_id,
            pillar_id: post.pillar_id,
            title: post.title,
            slug: post.slug,
            content: post.content,
            tags: post.tags,
            hero_image_url: post.hero_image_url,
            meta_title: post.meta_title,
            meta_description: post.meta_description,
            article_role: post.article_role,
            status: post.status,
            source: post.source,
            scheduled_publish_date: post.scheduled_publish_date,
            created_at: Utc::now(),
        };
        owner.posts_used_this_month += 1;
        self.posts.insert(created.id, created.clone());
        Ok(PostCreateOutcome::Created(created))
    }

    async fn set_post_image(&self, post_id: Uuid, image_url: &str) -> Result<()> {
        let mut post = self
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| anyhow!("post {post_id} not found"))?;
        post.hero_image_url = Some(image_url.to_owned());
        Ok(())
    }
}
