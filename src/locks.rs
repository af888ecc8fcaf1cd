// ABOUTME: Named advisory-lock contract serializing per-owner generation runs
// ABOUTME: Ships an in-process DashMap backend for single-node deployments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

//! # Advisory Lock Provider
//!
//! Run mutual exclusion is keyed by `(owner, billing cycle start)` and
//! acquired best-effort: contention is a normal, reportable outcome, not
//! a wait-and-retry. The contract is backend-agnostic so the same
//! orchestrator works against a database advisory lock, a distributed
//! lock service, or the bundled in-process provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Named-lock service contract
#[async_trait]
pub trait LockProvider: Send + Sync {
    /// Try to acquire the named lock without blocking.
    /// Returns false when another holder already has it.
    async fn try_acquire(&self, key: &str) -> bool;

    /// Release the named lock. Releasing a lock that is not held is a no-op.
    async fn release(&self, key: &str);
}

/// Build the exclusive-run key for an owner's billing cycle
#[must_use]
pub fn run_lock_key(owner_id: Uuid, cycle_start: DateTime<Utc>) -> String {
    format!("generation-run:{owner_id}:{}", cycle_start.format("%Y-%m-%dT%H:%M:%SZ"))
}

/// In-process lock provider over a concurrent set
#[derive(Debug, Clone, Default)]
pub struct InProcessLockProvider {
    held: Arc<DashMap<String, ()>>,
}

impl InProcessLockProvider {
    /// Create a provider with no locks held
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LockProvider for InProcessLockProvider {
    async fn try_acquire(&self, key: &str) -> bool {
        // Entry API gives a single atomic insert-if-absent.
        match self.held.entry(key.to_owned()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(());
                true
            }
        }
    }

    async fn release(&self, key: &str) {
        self.held.remove(key);
    }
}
