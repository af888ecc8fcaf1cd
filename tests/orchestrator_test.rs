// ABOUTME: Integration tests for the generation run coordinator
// ABOUTME: Covers subscription gating, mutual exclusion, quota splits, and retries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

//! Generation run coordinator integration tests

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Utc;
use common::{create_owner, create_site, create_test_repository, StubGenerator, StubImages};
use contentloom::config::EngineConfig;
use contentloom::errors::ErrorCode;
use contentloom::locks::{run_lock_key, InProcessLockProvider, LockProvider};
use contentloom::models::{PillarStatus, PlanStatus, SubscriptionStatus};
use contentloom::orchestrator::{AbortReason, GenerationOrchestrator, RunOutcome};
use contentloom::quota::billing_cycle_start;
use contentloom::repository::{memory::MemoryRepository, ContentRepository};
use std::sync::Arc;

fn orchestrator_with(
    repo: &MemoryRepository,
    generator: StubGenerator,
    locks: Arc<InProcessLockProvider>,
) -> GenerationOrchestrator {
    GenerationOrchestrator::new(
        Arc::new(repo.clone()),
        Arc::new(generator),
        Arc::new(StubImages::always("https://img.example/hero.jpg")),
        locks,
        EngineConfig::default(),
    )
}

#[tokio::test]
async fn test_inactive_subscription_aborts_run() {
    let repo = create_test_repository();
    let mut owner = create_owner(&repo, 40);
    owner.subscription_status = SubscriptionStatus::Canceled;
    repo.insert_owner(owner.clone());
    create_site(&repo, owner.id, "Alpha", true);

    let orchestrator =
        orchestrator_with(&repo, StubGenerator::new(), Arc::new(InProcessLockProvider::new()));
    let report = orchestrator.run_monthly(owner.id).await.unwrap();

    assert_eq!(
        report.outcome,
        RunOutcome::Aborted(AbortReason::SubscriptionRequired)
    );
    assert_eq!(report.total_articles_created, 0);
    assert!(repo.all_posts().is_empty());
}

#[tokio::test]
async fn test_concurrent_run_aborts_then_succeeds_after_release() {
    let repo = create_test_repository();
    let owner = create_owner(&repo, 8);
    create_site(&repo, owner.id, "Alpha", true);

    let locks = Arc::new(InProcessLockProvider::new());
    let key = run_lock_key(owner.id, billing_cycle_start(&owner, Utc::now()));
    assert!(locks.try_acquire(&key).await);

    let orchestrator = orchestrator_with(&repo, StubGenerator::new(), Arc::clone(&locks));
    let report = orchestrator.run_monthly(owner.id).await.unwrap();
    assert_eq!(
        report.outcome,
        RunOutcome::Aborted(AbortReason::AlreadyInProgress)
    );
    assert!(repo.all_posts().is_empty());

    locks.release(&key).await;
    let report = orchestrator.run_monthly(owner.id).await.unwrap();
    assert_eq!(report.outcome, RunOutcome::Completed);
    assert!(report.total_articles_created > 0);

    // Lock was released by the run itself
    assert!(locks.try_acquire(&key).await);
}

#[tokio::test]
async fn test_two_site_split_and_post_limit_mid_run() {
    let repo = create_test_repository();
    let mut owner = create_owner(&repo, 40);
    // 35 posts already used this cycle: only 5 creations remain
    owner.posts_used_this_month = 35;
    repo.insert_owner(owner.clone());
    let site_a = create_site(&repo, owner.id, "Alpha", true);
    let site_b = create_site(&repo, owner.id, "Beta", true);

    let orchestrator =
        orchestrator_with(&repo, StubGenerator::new(), Arc::new(InProcessLockProvider::new()));
    let report = orchestrator.run_monthly(owner.id).await.unwrap();

    // Even split of 40 over 2 sites, clamped to [4, 40]
    assert_eq!(report.sites.len(), 2);
    assert!(report.sites.iter().all(|s| s.target == 20));

    // First site hits the limit after 5 posts; the second is still attempted
    assert_eq!(report.total_articles_created, 5);
    let by_name = |name: &str| {
        report
            .sites
            .iter()
            .find(|s| s.site_name == name)
            .unwrap()
            .articles_created
    };
    assert_eq!(by_name("Alpha"), 5);
    assert_eq!(by_name("Beta"), 0);
    assert_eq!(
        report
            .issues
            .iter()
            .filter(|i| i.contains("POST_LIMIT_REACHED"))
            .count(),
        2
    );

    let _ = (site_a, site_b);
    let owner = repo.get_owner(owner.id).await.unwrap().unwrap();
    assert_eq!(owner.posts_used_this_month, 40);
}

#[tokio::test]
async fn test_site_without_profile_is_skipped_not_fatal() {
    let repo = create_test_repository();
    let owner = create_owner(&repo, 8);
    create_site(&repo, owner.id, "NoProfile", false);
    create_site(&repo, owner.id, "WithProfile", true);

    let orchestrator =
        orchestrator_with(&repo, StubGenerator::new(), Arc::new(InProcessLockProvider::new()));
    let report = orchestrator.run_monthly(owner.id).await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert!(report
        .issues
        .iter()
        .any(|i| i.contains("NoProfile") && i.contains("no business profile")));
    // Only the profiled site produced content
    assert_eq!(report.sites.len(), 1);
    assert!(report.total_articles_created > 0);
}

#[tokio::test]
async fn test_repeated_run_is_idempotent_within_cycle() {
    let repo = create_test_repository();
    let owner = create_owner(&repo, 8);
    create_site(&repo, owner.id, "Alpha", true);

    let orchestrator =
        orchestrator_with(&repo, StubGenerator::new(), Arc::new(InProcessLockProvider::new()));

    let first = orchestrator.run_monthly(owner.id).await.unwrap();
    assert_eq!(first.outcome, RunOutcome::Completed);
    assert_eq!(first.total_articles_created, 8);

    // Same cycle, target already met: nothing new is produced
    let second = orchestrator.run_monthly(owner.id).await.unwrap();
    assert_eq!(second.total_articles_created, 0);
    assert_eq!(second.sites[0].missing_at_start, 0);
    assert_eq!(repo.all_posts().len(), 8);
}

#[tokio::test]
async fn test_retry_bound_marks_plans_permanently_failed() {
    let repo = create_test_repository();
    let owner = create_owner(&repo, 4);
    let site = create_site(&repo, owner.id, "Alpha", true);

    // Every article call fails; three runs exhaust the retry budget of the
    // over-provisioned queue (2x target = 8 plans attempted per run).
    let generator = StubGenerator::failing_articles(u32::MAX);
    let orchestrator =
        orchestrator_with(&repo, generator, Arc::new(InProcessLockProvider::new()));

    for _ in 0..3 {
        let report = orchestrator.run_monthly(owner.id).await.unwrap();
        assert_eq!(report.outcome, RunOutcome::Failed);
        assert_eq!(report.total_articles_created, 0);
    }

    let pillars = repo.list_automation_pillars(site.id).await.unwrap();
    let failed_total: u32 = pillars.iter().map(|p| p.failed_count).sum();
    assert_eq!(failed_total, 8, "each attempted plan fails permanently once");

    let mut permanently_failed = 0;
    for pillar in &pillars {
        for plan in repo.list_planned_articles(pillar.id).await.unwrap() {
            if plan.status == PlanStatus::Failed {
                permanently_failed += 1;
                assert_eq!(plan.retry_count, 3);
                assert!(plan.error.is_some());
            }
        }
    }
    assert_eq!(permanently_failed, 8);
}

#[tokio::test]
async fn test_transient_failures_do_not_starve_the_run() {
    let repo = create_test_repository();
    let owner = create_owner(&repo, 4);
    create_site(&repo, owner.id, "Alpha", true);

    // First three article calls fail; the over-provisioned queue still
    // carries enough work to meet the target of 4.
    let generator = StubGenerator::failing_articles(3);
    let orchestrator =
        orchestrator_with(&repo, generator, Arc::new(InProcessLockProvider::new()));

    let report = orchestrator.run_monthly(owner.id).await.unwrap();
    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.total_articles_created, 4);
    assert_eq!(repo.all_posts().len(), 4);
}

#[tokio::test]
async fn test_map_failure_is_reported_not_fatal() {
    let repo = create_test_repository();
    let owner = create_owner(&repo, 40);
    let site_a = create_site(&repo, owner.id, "Alpha", true);
    let site_b = create_site(&repo, owner.id, "Beta", true);

    // Every mapping call fails; the run must still visit both sites and
    // come back with a report instead of an error.
    let generator = StubGenerator {
        map_fails: true,
        ..StubGenerator::default()
    };
    let orchestrator =
        orchestrator_with(&repo, generator, Arc::new(InProcessLockProvider::new()));
    let report = orchestrator.run_monthly(owner.id).await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Failed);
    assert_eq!(report.total_articles_created, 0);
    assert_eq!(report.sites.len(), 2);
    assert!(report.issues.iter().any(|i| i.contains("Alpha") && i.contains("mapping failed")));
    assert!(report.issues.iter().any(|i| i.contains("Beta") && i.contains("mapping failed")));

    for site_id in [site_a.id, site_b.id] {
        let pillars = repo.list_automation_pillars(site_id).await.unwrap();
        assert!(!pillars.is_empty());
        assert!(pillars.iter().all(|p| p.status == PillarStatus::Failed));
    }
}

#[tokio::test]
async fn test_missing_generator_config_aborts_run() {
    let repo = create_test_repository();
    let owner = create_owner(&repo, 8);
    create_site(&repo, owner.id, "Alpha", true);

    let generator = StubGenerator {
        article_config_error: true,
        ..StubGenerator::default()
    };
    let locks = Arc::new(InProcessLockProvider::new());
    let orchestrator = orchestrator_with(&repo, generator, Arc::clone(&locks));

    let error = orchestrator.run_monthly(owner.id).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigMissing);
    assert!(repo.all_posts().is_empty());

    // The cycle lock was released despite the abort
    let key = run_lock_key(owner.id, billing_cycle_start(&owner, Utc::now()));
    assert!(locks.try_acquire(&key).await);
}

#[tokio::test]
async fn test_posts_carry_plan_slugs_and_automation_source() {
    let repo = create_test_repository();
    let owner = create_owner(&repo, 4);
    let site = create_site(&repo, owner.id, "Alpha", true);

    let orchestrator =
        orchestrator_with(&repo, StubGenerator::new(), Arc::new(InProcessLockProvider::new()));
    let report = orchestrator.run_monthly(owner.id).await.unwrap();
    assert_eq!(report.total_articles_created, 4);

    let pillars = repo.list_automation_pillars(site.id).await.unwrap();
    let mut realized = 0;
    for pillar in &pillars {
        for plan in repo.list_planned_articles(pillar.id).await.unwrap() {
            if plan.status != PlanStatus::Completed {
                continue;
            }
            realized += 1;
            let post = repo.post(plan.post_id.unwrap()).unwrap();
            assert_eq!(post.slug, plan.slug);
            assert_eq!(post.article_role, plan.article_role);
            assert!(post.hero_image_url.is_some());
        }
    }
    assert_eq!(realized, 4);

    // Topic rotation advanced after a productive site run
    let site = repo.get_site(site.id).await.unwrap().unwrap();
    assert_eq!(site.current_topic_index, 1);
}
