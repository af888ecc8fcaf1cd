// ABOUTME: Internal-link target selection driven by pack linking rules
// ABOUTME: Falls back to arbitrary siblings so no article generates link-less
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

//! # Link Target Selector
//!
//! Picks the internal links an article request carries into generation.
//! Because slugs are assigned at planning time, forward references to
//! not-yet-generated targets are valid and the parent link is attached
//! regardless of the parent's completion status.

use crate::constants::linking::MAX_LINK_TARGETS;
use crate::models::{AnchorStyle, LinkTarget, PlannedArticle};
use crate::packs::PackDefinition;

/// Select link targets for a plan from its siblings and parent.
///
/// Up to [`MAX_LINK_TARGETS`] sibling links chosen by the pack's linking
/// rule for the plan's role; when no rule matches or the rule filters
/// everything out, up to the same number of arbitrary siblings are taken
/// instead. The parent plan's link is always prepended (deduplicated by
/// slug). Anchor style comes from the matched rule, defaulting to
/// semantic.
#[must_use]
pub fn select_links(
    plan: &PlannedArticle,
    siblings: &[PlannedArticle],
    parent: Option<&PlannedArticle>,
    pack: &PackDefinition,
) -> Vec<LinkTarget> {
    let rule = pack.rule_for(plan.article_role);
    let anchor_style = rule.map_or(AnchorStyle::Semantic, |r| r.anchor_style);

    let candidates: Vec<&PlannedArticle> = siblings
        .iter()
        .filter(|s| s.slug != plan.slug)
        .collect();

    let mut selected: Vec<&PlannedArticle> = rule
        .map(|r| {
            candidates
                .iter()
                .filter(|s| r.to_roles.contains(&s.article_role))
                .copied()
                .take(MAX_LINK_TARGETS)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    // Rule missing or too strict: arbitrary siblings beat no links at all.
    if selected.is_empty() {
        selected = candidates.iter().take(MAX_LINK_TARGETS).copied().collect();
    }

    let mut targets: Vec<LinkTarget> = Vec::with_capacity(selected.len() + 1);
    if let Some(parent) = parent {
        if parent.slug != plan.slug {
            targets.push(LinkTarget {
                title: parent.title.clone(),
                slug: parent.slug.clone(),
                anchor_style,
            });
        }
    }
    for sibling in selected {
        if targets.iter().any(|t| t.slug == sibling.slug) {
            continue;
        }
        targets.push(LinkTarget {
            title: sibling.title.clone(),
            slug: sibling.slug.clone(),
            anchor_style,
        });
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleRole, ArticleType, PackType, PlanStatus};
    use uuid::Uuid;

    fn plan(title: &str, slug: &str, role: ArticleRole) -> PlannedArticle {
        PlannedArticle {
            id: Uuid::new_v4(),
            pillar_id: Uuid::new_v4(),
            cluster_id: None,
            title: title.into(),
            slug: slug.into(),
            keywords: vec![],
            article_type: ArticleType::Subtopic,
            article_role: role,
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
    fn test_rule_filtered_selection() {
        let pack = PackDefinition::for_pack(PackType::Seo);
        let subject = plan("Subject", "subject", ArticleRole::Pillar);
        let siblings = vec![
            plan("A", "a", ArticleRole::Cluster),
            plan("B", "b", ArticleRole::Glossary),
            plan("C", "c", ArticleRole::HowTo),
        ];

        let targets = select_links(&subject, &siblings, None, &pack);
        // Pillar links to cluster and how-to under the SEO pack
        let slugs: Vec<&str> = targets.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "c"]);
        assert!(targets.iter().all(|t| t.anchor_style == AnchorStyle::Semantic));
    }

    #[test]
    fn test_fallback_to_arbitrary_siblings() {
        let pack = PackDefinition::for_pack(PackType::Seo);
        // Glossary has no linking rule in the SEO pack
        let subject = plan("Subject", "subject", ArticleRole::Glossary);
        let siblings: Vec<PlannedArticle> = (0..8)
            .map(|i| plan(&format!("S{i}"), &format!("s{i}"), ArticleRole::Glossary))
            .collect();
        let parent = plan("Parent", "parent", ArticleRole::Pillar);

        let targets = select_links(&subject, &siblings, Some(&parent), &pack);
        assert_eq!(targets.len(), MAX_LINK_TARGETS + 1);
        assert_eq!(targets[0].slug, "parent");
        assert_eq!(targets[0].anchor_style, AnchorStyle::Semantic);
    }

    #[test]
    fn test_parent_prepended_and_deduplicated() {
        let pack = PackDefinition::for_pack(PackType::Seo);
        let subject = plan("Subject", "subject", ArticleRole::Cluster);
        let parent = plan("Parent", "shared", ArticleRole::Pillar);
        let siblings = vec![
            plan("Dup", "shared", ArticleRole::Pillar),
            plan("Other", "other", ArticleRole::Comparison),
        ];

        let targets = select_links(&subject, &siblings, Some(&parent), &pack);
        let shared_count = targets.iter().filter(|t| t.slug == "shared").count();
        assert_eq!(shared_count, 1);
        assert_eq!(targets[0].slug, "shared");
        assert_eq!(targets[0].title, "Parent");
    }

    #[test]
    fn test_never_empty_when_siblings_exist() {
        let pack = PackDefinition::for_pack(PackType::Ecommerce);
        let subject = plan("Subject", "subject", ArticleRole::FaqPage);
        let siblings = vec![plan("Only", "only", ArticleRole::HowTo)];

        let targets = select_links(&subject, &siblings, None, &pack);
        assert_eq!(targets.len(), 1);
    }

    #[test]
    fn test_self_excluded() {
        let pack = PackDefinition::for_pack(PackType::Seo);
        let subject = plan("Subject", "subject", ArticleRole::Cluster);
        let siblings = vec![plan("Me too", "subject", ArticleRole::Pillar)];

        assert!(select_links(&subject, &siblings, None, &pack).is_empty());
    }
}
