// ABOUTME: Pillar lifecycle management for a self-healing active pool
// ABOUTME: Retires capped pillars and spins up collision-free replacements
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

//! # Pillar Lifecycle Manager
//!
//! Keeps each site's pool of concurrently generating automation pillars
//! at a fixed size without operator intervention: pillars that reach
//! their article cap retire with a timestamp, and replacement themes are
//! requested from the generator with deterministic fallbacks, never
//! reusing a name any existing or retired pillar already holds.

use crate::config::EngineConfig;
use crate::errors::AppResult;
use crate::generator::{ContentGenerator, PillarTheme, PillarThemeRequest};
use crate::models::{PackType, Pillar, PillarStatus, Site};
use crate::repository::ContentRepository;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Manages a site's active automation pillar pool
pub struct PillarLifecycle {
    repository: Arc<dyn ContentRepository>,
    generator: Arc<dyn ContentGenerator>,
    config: EngineConfig,
}

impl PillarLifecycle {
    /// Create a lifecycle manager over the injected collaborators
    #[must_use]
    pub fn new(
        repository: Arc<dyn ContentRepository>,
        generator: Arc<dyn ContentGenerator>,
        config: EngineConfig,
    ) -> Self {
        Self {
            repository,
            generator,
            config,
        }
    }

    /// Return the site's active pillar pool, retiring and replacing as
    /// needed to hold it at the configured size.
    ///
    /// Replacement names must not collide with any pillar on the site,
    /// manual and retired ones included.
    ///
    /// # Errors
    ///
    /// Propagates repository failures. Generator failures fall back to
    /// deterministic theme names and never fail the check.
    pub async fn active_pillars(&self, site: &Site) -> AppResult<Vec<Pillar>> {
        let all = self.repository.list_pillars(site.id).await?;

        let mut taken_names: Vec<String> = all.iter().map(|p| p.name.to_lowercase()).collect();
        let mut active: Vec<Pillar> = Vec::with_capacity(self.config.active_pillar_count);

        for pillar in all {
            if !pillar.is_automation || pillar.status == PillarStatus::Completed {
                continue;
            }
            // Permanently failed plans count toward the cap alongside
            // realized ones.
            if pillar.generated_count + pillar.failed_count >= pillar.max_articles {
                let mut retired = pillar;
                retired.status = PillarStatus::Completed;
                retired.completed_at = Some(Utc::now());
                self.repository.update_pillar(&retired).await?;
                info!(site = %site.name, pillar = %retired.name, "pillar retired at article cap");
                continue;
            }
            active.push(pillar);
        }

        if active.len() >= self.config.active_pillar_count {
            return Ok(active);
        }

        let missing = self.config.active_pillar_count - active.len();
        let themes = self.propose_themes(site, missing, &taken_names).await;
        for theme in themes {
            let name = dedupe_name(&theme.name, &taken_names);
            taken_names.push(name.to_lowercase());
            let pillar = Pillar {
                id: Uuid::new_v4(),
                site_id: site.id,
                name,
                description: theme.description,
                status: PillarStatus::Generating,
                pack_type: PackType::default(),
                target_article_count: 0,
                generated_count: 0,
                failed_count: 0,
                max_articles: self.config.max_articles_per_pillar,
                is_automation: true,
                completed_at: None,
                created_at: Utc::now(),
            };
            self.repository.create_pillar(&pillar).await?;
            info!(site = %site.name, pillar = %pillar.name, "replacement pillar created");
            active.push(pillar);
        }

        Ok(active)
    }

    /// Ask the generator for themes, padding any shortfall with
    /// deterministic names derived from the site's industry
    async fn propose_themes(
        &self,
        site: &Site,
        count: usize,
        excluded: &[String],
    ) -> Vec<PillarTheme> {
        let profile = site.business_profile.clone().unwrap_or_default();
        let mut themes = match self
            .generator
            .generate_pillar_themes(&PillarThemeRequest {
                business_context: profile.clone(),
                count,
                excluded_names: excluded.to_vec(),
            })
            .await
        {
            Ok(themes) => themes,
            Err(error) => {
                debug!(site = %site.name, %error, "theme generation failed, using fallbacks");
                Vec::new()
            }
        };

        themes.retain(|t| !t.name.trim().is_empty());
        themes.truncate(count);

        let industry = if profile.industry.trim().is_empty() {
            "Business".to_owned()
        } else {
            profile.industry.clone()
        };
        let mut index = 1_u32;
        while themes.len() < count {
            let candidate = PillarTheme {
                name: format!("{industry} Insights {index}"),
                description: format!("Recurring themes and guidance for {industry}"),
            };
            if !themes
                .iter()
                .any(|t| t.name.eq_ignore_ascii_case(&candidate.name))
            {
                themes.push(candidate);
            }
            index += 1;
        }
        themes
    }
}

/// Resolve a proposed name against taken names (case-insensitive),
/// appending a numeric suffix when the generator insists on a duplicate
fn dedupe_name(proposed: &str, taken: &[String]) -> String {
    let is_taken =
        |candidate: &str| taken.iter().any(|t| t.eq_ignore_ascii_case(candidate));

    if !is_taken(proposed) {
        return proposed.to_owned();
    }
    let mut suffix = 2_u32;
    loop {
        let candidate = format!("{proposed} {suffix}");
        if !is_taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_name() {
        let taken = vec!["lawn care".to_owned(), "lawn care 2".to_owned()];
        assert_eq!(dedupe_name("Garden Design", &taken), "Garden Design");
        assert_eq!(dedupe_name("Lawn Care", &taken), "Lawn Care 3");
    }
}
