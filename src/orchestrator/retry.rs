// ABOUTME: Planned-article state transitions with a bounded retry policy
// ABOUTME: Pure functions so the coordinator owns all persistence side effects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

//! Per-plan state machine: pending → generating → completed, or failure
//! that resets to pending until the retry bound makes it permanent.

use crate::models::{PlanStatus, PlannedArticle};
use chrono::Utc;
use uuid::Uuid;

/// Where a failed attempt leaves the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Reset to pending for a later pass
    WillRetry,
    /// Permanently failed; the pillar's failure counter must move once
    Permanent,
}

/// Mark a plan as picked up for generation
pub fn begin_attempt(plan: &mut PlannedArticle) {
    plan.status = PlanStatus::Generating;
}

/// Record a failed attempt, applying the bounded retry policy
pub fn record_failure(
    plan: &mut PlannedArticle,
    error: &str,
    max_retries: u32,
) -> FailureOutcome {
    plan.retry_count += 1;
    plan.error = Some(error.to_owned());
    if plan.retry_count >= max_retries {
        plan.status = PlanStatus::Failed;
        FailureOutcome::Permanent
    } else {
        plan.status = PlanStatus::Pending;
        FailureOutcome::WillRetry
    }
}

/// Record a successful realization
pub fn record_completion(plan: &mut PlannedArticle, post_id: Uuid) {
    plan.status = PlanStatus::Completed;
    plan.post_id = Some(post_id);
    plan.generated_at = Some(Utc::now());
    plan.error = None;
}
