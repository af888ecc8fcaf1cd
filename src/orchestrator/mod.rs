// ABOUTME: Generation run coordinator driving planning, generation, and quota bookkeeping
// ABOUTME: Owns the per-owner cycle lock, sequential article loop, and run reporting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

//! # Generation Run Coordinator
//!
//! Top-level entry point for a monthly content run. One invocation is a
//! single logical worker: articles are processed strictly sequentially so
//! quota bookkeeping never races, and a best-effort advisory lock keyed
//! by `(owner, billing cycle start)` keeps concurrent invocations for the
//! same owner from double-producing. Expected business conditions (no
//! subscription, quota exhausted, missing profile, lock contention) are
//! reported, never thrown; only configuration problems abort with an
//! error.

pub mod retry;

use crate::config::EngineConfig;
use crate::errors::{AppError, AppResult};
use crate::generator::{ArticleRequest, ContentGenerator};
use crate::images::{fallback_queries, ImageLookup};
use crate::linking::select_links;
use crate::locks::{run_lock_key, LockProvider};
use crate::mapper::{slugify, TopicalMapper};
use crate::models::{
    ArticleType, Owner, Pillar, PillarStatus, PlanStatus, PlannedArticle, PostSource,
    PostStatus, Site,
};
use crate::packs::{PackDefinition, RoleDistribution};
use crate::pillars::PillarLifecycle;
use crate::quota::{billing_cycle_start, QuotaAllocator};
use crate::repository::{ContentRepository, NewPost, PostCreateOutcome, PostDenial};
use chrono::{Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Why a run ended without processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// Owner has no active subscription
    SubscriptionRequired,
    /// Another run already holds the cycle lock (benign)
    AlreadyInProgress,
}

/// Terminal state of a generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// At least one site produced at least one article
    Completed,
    /// Run was stopped before processing, for an expected reason
    Aborted(AbortReason),
    /// Run processed sites but produced no articles
    Failed,
}

/// Per-site results in a run report
#[derive(Debug, Clone)]
pub struct SiteReport {
    /// Site identifier
    pub site_id: Uuid,
    /// Site display name
    pub site_name: String,
    /// Monthly target for the site
    pub target: u32,
    /// Articles still missing at run start (backfill-aware)
    pub missing_at_start: u32,
    /// Articles realized during this run
    pub articles_created: u32,
}

/// Aggregate result of a generation run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Terminal state
    pub outcome: RunOutcome,
    /// Per-site counts
    pub sites: Vec<SiteReport>,
    /// Total articles realized across all sites
    pub total_articles_created: u32,
    /// Human-readable non-fatal issues encountered
    pub issues: Vec<String>,
}

impl RunReport {
    /// Whether the run produced any content
    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed)
    }

    fn aborted(reason: AbortReason, issues: Vec<String>) -> Self {
        Self {
            outcome: RunOutcome::Aborted(reason),
            sites: Vec::new(),
            total_articles_created: 0,
            issues,
        }
    }
}

/// How processing one planned article ended
enum PlanOutcome {
    /// Post persisted
    Created,
    /// Repository refused the insert by policy
    Denied(PostDenial),
    /// Transient failure, retry policy applied
    Failed,
}

/// Top-level generation run coordinator
pub struct GenerationOrchestrator {
    repository: Arc<dyn ContentRepository>,
    generator: Arc<dyn ContentGenerator>,
    images: Arc<dyn ImageLookup>,
    locks: Arc<dyn LockProvider>,
    config: EngineConfig,
    quota: QuotaAllocator,
    mapper: TopicalMapper,
    lifecycle: PillarLifecycle,
}

impl GenerationOrchestrator {
    /// Create an orchestrator over constructor-injected collaborators
    #[must_use]
    pub fn new(
        repository: Arc<dyn ContentRepository>,
        generator: Arc<dyn ContentGenerator>,
        images: Arc<dyn ImageLookup>,
        locks: Arc<dyn LockProvider>,
        config: EngineConfig,
    ) -> Self {
        let quota = QuotaAllocator::new(config.clone());
        let mapper = TopicalMapper::new(Arc::clone(&repository), Arc::clone(&generator));
        let lifecycle = PillarLifecycle::new(
            Arc::clone(&repository),
            Arc::clone(&generator),
            config.clone(),
        );
        Self {
            repository,
            generator,
            images,
            locks,
            config,
            quota,
            mapper,
            lifecycle,
        }
    }

    /// Execute a monthly generation run for one owner.
    ///
    /// # Errors
    ///
    /// Returns an error only for unrecoverable problems: unknown owner,
    /// repository failures, or generator configuration errors. Expected
    /// business conditions are reported in the returned [`RunReport`].
    pub async fn run_monthly(&self, owner_id: Uuid) -> AppResult<RunReport> {
        let owner = self
            .repository
            .get_owner(owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("Owner").with_owner_id(owner_id))?;

        if !owner.has_active_subscription() {
            info!(%owner_id, status = %owner.subscription_status, "run aborted: no active subscription");
            return Ok(RunReport::aborted(
                AbortReason::SubscriptionRequired,
                vec![AppError::subscription_required().to_string()],
            ));
        }

        let cycle_start = billing_cycle_start(&owner, Utc::now());
        let lock_key = run_lock_key(owner.id, cycle_start);
        if !self.locks.try_acquire(&lock_key).await {
            info!(%owner_id, "run aborted: generation already in progress");
            return Ok(RunReport::aborted(
                AbortReason::AlreadyInProgress,
                vec![AppError::generation_in_progress().to_string()],
            ));
        }

        // Lock release must survive every exit path below.
        let result = self
            .run_locked(&owner, cycle_start)
            .await;
        self.locks.release(&lock_key).await;
        result
    }

    async fn run_locked(
        &self,
        owner: &Owner,
        cycle_start: chrono::DateTime<Utc>,
    ) -> AppResult<RunReport> {
        let sites = self.repository.get_sites_for_owner(owner.id).await?;
        let mut issues: Vec<String> = Vec::new();
        let mut reports: Vec<SiteReport> = Vec::new();
        let mut total_created = 0_u32;

        for site in &sites {
            if !site.has_business_profile() {
                issues.push(format!("{}: skipped, {}", site.name, AppError::profile_missing()));
                continue;
            }

            let target = self.quota.site_target(owner, site.id, sites.len());
            let missing = self
                .quota
                .backfill_missing(self.repository.as_ref(), site.id, target, cycle_start)
                .await?;

            let mut report = SiteReport {
                site_id: site.id,
                site_name: site.name.clone(),
                target,
                missing_at_start: missing,
                articles_created: 0,
            };

            if missing == 0 {
                debug!(site = %site.name, target, "site already at target this cycle");
                reports.push(report);
                continue;
            }

            let created = self
                .run_site(site, missing, &mut issues)
                .await?;
            report.articles_created = created;
            total_created += created;

            if created > 0 {
                // Advance the rotation so next cycle's themes vary.
                let next_index = site.current_topic_index.wrapping_add(1);
                self.repository
                    .update_site_topic_index(site.id, next_index)
                    .await?;
            }
            reports.push(report);
        }

        let outcome = if total_created > 0 {
            RunOutcome::Completed
        } else {
            RunOutcome::Failed
        };
        info!(
            owner = %owner.id,
            total = total_created,
            sites = reports.len(),
            issues = issues.len(),
            "generation run finished"
        );
        Ok(RunReport {
            outcome,
            sites: reports,
            total_articles_created: total_created,
            issues,
        })
    }

    /// Produce up to `missing` articles for one site
    async fn run_site(
        &self,
        site: &Site,
        missing: u32,
        issues: &mut Vec<String>,
    ) -> AppResult<u32> {
        let pillars = self.lifecycle.active_pillars(site).await?;
        if pillars.is_empty() {
            issues.push(format!("{}: no active pillars available", site.name));
            return Ok(0);
        }

        let queue = self.build_work_queue(site, &pillars, missing, issues).await?;
        let mut plans_by_pillar: HashMap<Uuid, Vec<PlannedArticle>> = HashMap::new();
        for pillar in &pillars {
            plans_by_pillar.insert(
                pillar.id,
                self.repository.list_planned_articles(pillar.id).await?,
            );
        }

        let mut created = 0_u32;
        for entry in queue {
            if created >= missing {
                break;
            }
            let QueueEntry { pillar, plan } = entry;
            let siblings = plans_by_pillar
                .get(&pillar.id)
                .map(Vec::as_slice)
                .unwrap_or_default();

            match self
                .process_plan(site, &pillar, plan, siblings, created)
                .await?
            {
                PlanOutcome::Created => created += 1,
                PlanOutcome::Denied(denial) => {
                    issues.push(format!("{}: {}", site.name, denial.code()));
                    match denial {
                        // Quota and subscription refusals end the site loop.
                        PostDenial::PostLimitReached | PostDenial::SubscriptionRequired => break,
                        PostDenial::SiteNotFound | PostDenial::OwnerNotFound => break,
                    }
                }
                PlanOutcome::Failed => {}
            }
        }

        Ok(created)
    }

    /// Assemble the site's over-provisioned work queue.
    ///
    /// Maps unmapped pillars on demand; a transient mapping failure takes
    /// that pillar out of the run as a per-site issue (the mapper already
    /// marked it failed) while configuration errors abort. Takes
    /// `ceil(missing / pillar_count)` pending plans per remaining pillar,
    /// then tops the queue up to `overprovision_factor * missing` with
    /// further backlog and, when the backlog runs dry, deterministic
    /// filler plans. Over-provisioning means individual article failures
    /// cannot starve the run before the quota is met.
    async fn build_work_queue(
        &self,
        site: &Site,
        pillars: &[Pillar],
        missing: u32,
        issues: &mut Vec<String>,
    ) -> AppResult<Vec<QueueEntry>> {
        let mut ready: Vec<Pillar> = Vec::with_capacity(pillars.len());
        for pillar in pillars {
            if pillar.status == PillarStatus::Generating {
                if let Err(error) = self
                    .mapper
                    .build_map(site, pillar, pillar.max_articles)
                    .await
                {
                    if error.code.is_fatal() {
                        return Err(error.with_site_id(site.id));
                    }
                    warn!(site = %site.name, pillar = %pillar.name, %error, "pillar mapping failed, continuing without it");
                    issues.push(format!(
                        "{}: pillar '{}' mapping failed: {error}",
                        site.name, pillar.name
                    ));
                    continue;
                }
                ready.push(
                    self.repository
                        .get_pillar(pillar.id)
                        .await?
                        .unwrap_or_else(|| pillar.clone()),
                );
            } else {
                ready.push(pillar.clone());
            }
        }

        let capacity = (missing * self.config.overprovision_factor) as usize;
        let mut queue: Vec<QueueEntry> = Vec::with_capacity(capacity);
        if ready.is_empty() {
            return Ok(queue);
        }

        let per_pillar = missing.div_ceil(ready.len() as u32) as usize;
        let mut backlog: HashMap<Uuid, Vec<PlannedArticle>> = HashMap::new();

        for pillar in &ready {
            let pending: Vec<PlannedArticle> = self
                .repository
                .list_planned_articles(pillar.id)
                .await?
                .into_iter()
                .filter(|p| p.status == PlanStatus::Pending)
                .collect();
            let mut pending = pending.into_iter();

            for plan in pending.by_ref().take(per_pillar) {
                queue.push(QueueEntry {
                    pillar: pillar.clone(),
                    plan,
                });
            }
            backlog.insert(pillar.id, pending.collect());
        }

        // Second pass: drain remaining backlog round-robin up to capacity.
        let mut drained = true;
        while queue.len() < capacity && drained {
            drained = false;
            for pillar in &ready {
                if queue.len() >= capacity {
                    break;
                }
                if let Some(rest) = backlog.get_mut(&pillar.id) {
                    if !rest.is_empty() {
                        let plan = rest.remove(0);
                        queue.push(QueueEntry {
                            pillar: pillar.clone(),
                            plan,
                        });
                        drained = true;
                    }
                }
            }
        }

        // Backlog exhausted: synthesize filler plans on the first live pillar.
        if queue.len() < capacity {
            if let Some(pillar) = ready.iter().find(|p| p.is_live()) {
                let fillers = self
                    .synthesize_filler_plans(site, pillar, capacity - queue.len())
                    .await?;
                for plan in fillers {
                    queue.push(QueueEntry {
                        pillar: pillar.clone(),
                        plan,
                    });
                }
            }
        }

        Ok(queue)
    }

    /// Create and persist deterministic filler plans for a pillar
    async fn synthesize_filler_plans(
        &self,
        site: &Site,
        pillar: &Pillar,
        count: usize,
    ) -> AppResult<Vec<PlannedArticle>> {
        let existing = self.repository.list_planned_articles(pillar.id).await?;
        let mut used_slugs: HashSet<String> =
            existing.iter().map(|p| p.slug.clone()).collect();
        let mut sort_order = existing.iter().map(|p| p.sort_order).max().map_or(0, |n| n + 1);

        let industry = site
            .business_profile
            .as_ref()
            .map_or_else(|| "business".to_owned(), |p| p.industry.clone());
        let pack = PackDefinition::for_pack(pillar.pack_type);
        let distribution = RoleDistribution::build(&pack);

        let mut plans = Vec::with_capacity(count);
        for index in 0..count {
            let title = format!("{}: {} Deep Dive {}", pillar.name, industry, sort_order + 1);
            let mut slug = slugify(&title);
            let mut suffix = 2_u32;
            while !used_slugs.insert(slug.clone()) {
                slug = format!("{}-{suffix}", slugify(&title));
                suffix += 1;
            }
            let plan = PlannedArticle {
                id: Uuid::new_v4(),
                pillar_id: pillar.id,
                cluster_id: None,
                title,
                slug,
                keywords: vec![pillar.name.to_lowercase(), industry.to_lowercase()],
                article_type: ArticleType::Subtopic,
                article_role: distribution.role_at(index),
                status: PlanStatus::Pending,
                sort_order,
                retry_count: 0,
                error: None,
                post_id: None,
                generated_at: None,
                published_at: None,
            };
            self.repository.create_planned_article(&plan).await?;
            plans.push(plan);
            sort_order += 1;
        }
        debug!(pillar = %pillar.name, count, "filler plans synthesized");
        Ok(plans)
    }

    /// Generate, persist, and account one planned article
    async fn process_plan(
        &self,
        site: &Site,
        pillar: &Pillar,
        mut plan: PlannedArticle,
        siblings: &[PlannedArticle],
        created_so_far: u32,
    ) -> AppResult<PlanOutcome> {
        retry::begin_attempt(&mut plan);
        self.repository.update_planned_article(&plan).await?;

        let pack = PackDefinition::for_pack(pillar.pack_type);
        let parent = parent_plan(&plan, siblings);
        let links = select_links(&plan, siblings, parent, &pack);
        let profile = site.business_profile.clone().unwrap_or_default();

        let request = ArticleRequest {
            role: plan.article_role,
            pack_type: pillar.pack_type,
            title: plan.title.clone(),
            keywords: plan.keywords.clone(),
            link_targets: links,
            language: site.language.clone(),
            extra_context: Some(format!(
                "Theme: {}. Monthly rotation index {}.",
                pillar.name, site.current_topic_index
            )),
            business_context: profile.clone(),
        };

        let article = match self.generator.generate_article(&request).await {
            Ok(article) => article.complete_from(&request),
            Err(error) => {
                // Missing credentials abort the whole run; anything else is
                // a transient per-article failure under the retry policy.
                if error.code.is_fatal() {
                    return Err(error.with_site_id(site.id));
                }
                warn!(plan = %plan.title, %error, "article generation failed");
                self.apply_failure(pillar, &mut plan, &error.to_string())
                    .await?;
                return Ok(PlanOutcome::Failed);
            }
        };

        let queries = fallback_queries(&plan.keywords, plan.article_role, &profile.industry);
        let hero_image_url = self.images.search(&plan.title, &queries).await;
        let image_missing = hero_image_url.is_none();

        let outcome = self
            .repository
            .create_post_with_limit_check(NewPost {
                site_id: site.id,
                pillar_id: Some(pillar.id),
                title: article.title,
                slug: plan.slug.clone(),
                content: article.content,
                tags: article.tags,
                hero_image_url,
                meta_title: article.meta_title,
                meta_description: article.meta_description,
                article_role: plan.article_role,
                status: PostStatus::Scheduled,
                source: PostSource::MonthlyAutomation,
                scheduled_publish_date: Utc::now() + Duration::days(i64::from(created_so_far)),
            })
            .await?;

        match outcome {
            PostCreateOutcome::Created(post) => {
                retry::record_completion(&mut plan, post.id);
                self.repository.update_planned_article(&plan).await?;
                self.account_completion(pillar, &plan).await?;
                if image_missing {
                    self.spawn_image_backfill(post.id, plan.title.clone(), queries);
                }
                Ok(PlanOutcome::Created)
            }
            PostCreateOutcome::Denied(denial) => {
                // Not an article failure: put the plan back untouched.
                plan.status = PlanStatus::Pending;
                self.repository.update_planned_article(&plan).await?;
                Ok(PlanOutcome::Denied(denial))
            }
        }
    }

    /// Apply the retry policy to a failed plan and persist the fallout
    async fn apply_failure(
        &self,
        pillar: &Pillar,
        plan: &mut PlannedArticle,
        error: &str,
    ) -> AppResult<()> {
        let outcome = retry::record_failure(plan, error, self.config.max_plan_retries);
        self.repository.update_planned_article(plan).await?;

        if outcome == retry::FailureOutcome::Permanent {
            if let Some(mut fresh) = self.repository.get_pillar(pillar.id).await? {
                fresh.failed_count += 1;
                self.repository.update_pillar(&fresh).await?;
            }
        }
        Ok(())
    }

    /// Move pillar and cluster counters after a successful realization
    async fn account_completion(&self, pillar: &Pillar, plan: &PlannedArticle) -> AppResult<()> {
        if let Some(mut fresh) = self.repository.get_pillar(pillar.id).await? {
            fresh.generated_count += 1;
            self.repository.update_pillar(&fresh).await?;
        }
        if let Some(cluster_id) = plan.cluster_id {
            if let Some(mut cluster) = self.repository.get_cluster(cluster_id).await? {
                cluster.generated_count += 1;
                self.repository.update_cluster(&cluster).await?;
            }
        }
        Ok(())
    }

    /// Detached one-shot image retry for a post created without an image.
    /// Not on the run's critical path; failure is logged and dropped.
    fn spawn_image_backfill(&self, post_id: Uuid, title: String, queries: Vec<String>) {
        let images = Arc::clone(&self.images);
        let repository = Arc::clone(&self.repository);
        tokio::spawn(async move {
            let Some(url) = images.search(&title, &queries).await else {
                debug!(%post_id, "image backfill found nothing");
                return;
            };
            if let Err(error) = repository.set_post_image(post_id, &url).await {
                debug!(%post_id, %error, "image backfill persist failed");
            }
        });
    }
}

/// One unit of queued work with its pillar snapshot
struct QueueEntry {
    pillar: Pillar,
    plan: PlannedArticle,
}

/// Structural parent for link purposes: subtopics link up to their
/// category hub, hubs link up to the pillar article
fn parent_plan<'a>(
    plan: &PlannedArticle,
    siblings: &'a [PlannedArticle],
) -> Option<&'a PlannedArticle> {
    match plan.article_type {
        ArticleType::Pillar => None,
        ArticleType::Category => siblings
            .iter()
            .find(|s| s.article_type == ArticleType::Pillar),
        ArticleType::Subtopic => plan.cluster_id.map_or_else(
            || {
                siblings
                    .iter()
                    .find(|s| s.article_type == ArticleType::Pillar)
            },
            |cluster_id| {
                siblings.iter().find(|s| {
                    s.article_type == ArticleType::Category && s.cluster_id == Some(cluster_id)
                })
            },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleRole;

    fn plan_of(article_type: ArticleType, cluster_id: Option<Uuid>) -> PlannedArticle {
        PlannedArticle {
            id: Uuid::new_v4(),
            pillar_id: Uuid::new_v4(),
            cluster_id,
            title: "T".into(),
            slug: Uuid::new_v4().to_string(),
            keywords: vec![],
            article_type,
            article_role: ArticleRole::Cluster,
            status: PlanStatus::Pending,
            sort_order: 0,
            retry_count: 0,
            error: None,
            post_id: None,
            generated_at: None,
            published_at: None,
        }
    }

    #[test]
    fn test_parent_resolution() {
        let cluster_id = Uuid::new_v4();
        let pillar_article = plan_of(ArticleType::Pillar, None);
        let hub = plan_of(ArticleType::Category, Some(cluster_id));
        let siblings = vec![pillar_article.clone(), hub.clone()];

        let subtopic = plan_of(ArticleType::Subtopic, Some(cluster_id));
        assert_eq!(
            parent_plan(&subtopic, &siblings).map(|p| p.id),
            Some(hub.id)
        );

        assert_eq!(
            parent_plan(&hub, &siblings).map(|p| p.id),
            Some(pillar_article.id)
        );
        assert!(parent_plan(&pillar_article, &siblings).is_none());
    }
}
