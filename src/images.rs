// ABOUTME: Image lookup collaborator contract with infallible absence-as-value search
// ABOUTME: Builds the cascading fallback query list used for hero images
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

//! # Image Lookup Contract
//!
//! Hero images are best-effort. The lookup never errors; a miss is an
//! ordinary `None` and posts ship without an image rather than failing.

use crate::models::ArticleRole;
use async_trait::async_trait;

/// External image search collaborator
#[async_trait]
pub trait ImageLookup: Send + Sync {
    /// Find an image URL for the query, trying fallbacks in order.
    /// Absence is a valid result, never an error.
    async fn search(&self, query: &str, fallback_queries: &[String]) -> Option<String>;
}

/// Cascading query set for a planned article's hero image.
///
/// Primary query is the article title; fallbacks degrade from the first
/// keyword through the role archetype to the site's industry, so even a
/// very specific title has a generic query to land on.
#[must_use]
pub fn fallback_queries(
    keywords: &[String],
    role: ArticleRole,
    industry: &str,
) -> Vec<String> {
    let mut queries = Vec::with_capacity(3);
    if let Some(keyword) = keywords.first() {
        if !keyword.trim().is_empty() {
            queries.push(keyword.clone());
        }
    }
    queries.push(format!("{industry} {role}"));
    if !industry.trim().is_empty() {
        queries.push(industry.to_owned());
    }
    queries
}
