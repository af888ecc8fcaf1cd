// ABOUTME: Per-owner and per-site monthly quota arithmetic with clamped targets
// ABOUTME: Billing-cycle anchoring and idempotent backfill counting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

//! # Quota Allocator
//!
//! Turns an owner's plan quota into per-site monthly targets. An explicit
//! allocation entry overrides the even split; both paths clamp so no site
//! ever gets a degenerate target. Backfill mode subtracts what the
//! automation already produced this cycle, making repeated invocations
//! within one cycle idempotent.

use crate::config::EngineConfig;
use crate::errors::AppResult;
use crate::models::{Owner, PostSource};
use crate::repository::ContentRepository;
use chrono::{DateTime, Datelike, Months, TimeZone, Timelike, Utc};
use uuid::Uuid;

/// Per-site quota computation
#[derive(Debug, Clone)]
pub struct QuotaAllocator {
    config: EngineConfig,
}

impl QuotaAllocator {
    /// Create an allocator with the given tuning
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Monthly article target for one of an owner's sites.
    ///
    /// An explicit allocation entry clamps to `[min, max_allocated]`;
    /// otherwise the plan quota splits evenly across the owner's sites and
    /// clamps to `[min, max_split]`.
    #[must_use]
    pub fn site_target(&self, owner: &Owner, site_id: Uuid, owner_site_count: usize) -> u32 {
        if let Some(allocated) = owner.allocation_for(site_id) {
            return allocated.clamp(
                self.config.min_site_target,
                self.config.max_allocated_target,
            );
        }

        let site_count = owner_site_count.max(1) as u32;
        let per_site = owner.subscription_plan.posts_per_month / site_count;
        per_site.clamp(self.config.min_site_target, self.config.max_split_target)
    }

    /// Articles still missing to reach a site's target this cycle.
    ///
    /// Counts only automation-sourced posts created since the cycle start,
    /// so manual posts never eat into the automation budget and a re-run
    /// with no new posts returns the same count.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn backfill_missing(
        &self,
        repository: &dyn ContentRepository,
        site_id: Uuid,
        target: u32,
        cycle_start: DateTime<Utc>,
    ) -> AppResult<u32> {
        let already_created = repository
            .count_posts_since(site_id, cycle_start, PostSource::MonthlyAutomation)
            .await?;
        Ok(target.saturating_sub(already_created as u32))
    }
}

/// Start of the billing cycle containing `now`.
///
/// The cycle anchors to the owner's `posts_reset_date`: the result is the
/// most recent monthly anniversary of that date at or before `now`, with
/// the day-of-month clamped for short months.
#[must_use]
pub fn billing_cycle_start(owner: &Owner, now: DateTime<Utc>) -> DateTime<Utc> {
    let anchor = owner.posts_reset_date;
    if anchor >= now {
        return anchor;
    }

    let candidate = anniversary_in(anchor, now.year(), now.month());
    if candidate <= now {
        candidate
    } else {
        candidate
            .checked_sub_months(Months::new(1))
            .unwrap_or(anchor)
    }
}

/// The anchor's anniversary within a given year/month, day clamped
fn anniversary_in(anchor: DateTime<Utc>, year: i32, month: u32) -> DateTime<Utc> {
    let day = anchor.day().min(days_in_month(year, month));
    Utc.with_ymd_and_hms(
        year,
        month,
        day,
        anchor.time().hour(),
        anchor.time().minute(),
        anchor.time().second(),
    )
    .single()
    .unwrap_or(anchor)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    chrono::NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(28, |last| last.day())
}
