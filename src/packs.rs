// ABOUTME: Static content-pack catalog with roles, linking rules, and distributions
// ABOUTME: Expands percentage distributions into deterministic cyclable role sequences
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Contentloom

//! # Content Pack Catalog
//!
//! Packs are immutable configuration, not per-tenant state: each
//! [`PackType`] maps to one [`PackDefinition`] describing which roles a
//! pillar may produce, how roles link to one another, and the default
//! role mix. The distribution builder turns the percentage mix into a
//! repeatable sequence so the Nth planned article always gets the same
//! role without persisting role choices ahead of generation.

use crate::models::{AnchorStyle, ArticleRole, PackType};

/// An inter-role linking rule
#[derive(Debug, Clone)]
pub struct LinkingRule {
    /// Role of the article being generated
    pub from_role: ArticleRole,
    /// Roles its internal links should point at
    pub to_roles: Vec<ArticleRole>,
    /// Anchor-text style for links produced under this rule
    pub anchor_style: AnchorStyle,
    /// Rule priority; lower wins when multiple rules share a `from_role`
    pub priority: u32,
}

/// A role's share of the default distribution
#[derive(Debug, Clone, Copy)]
pub struct RoleShare {
    /// The role
    pub role: ArticleRole,
    /// Percentage of planned articles assigned this role
    pub percentage: f32,
}

/// Immutable configuration for one content pack
#[derive(Debug, Clone)]
pub struct PackDefinition {
    /// The pack this definition describes
    pub pack_type: PackType,
    /// Roles this pack may assign
    pub allowed_roles: Vec<ArticleRole>,
    /// Inter-role linking rules
    pub linking_rules: Vec<LinkingRule>,
    /// Default role mix, percentages summing to roughly 100
    pub default_role_distribution: Vec<RoleShare>,
}

impl PackDefinition {
    /// Look up a pack definition by type
    #[must_use]
    pub fn for_pack(pack_type: PackType) -> Self {
        match pack_type {
            PackType::Seo => Self::seo(),
            PackType::Local => Self::local(),
            PackType::Ecommerce => Self::ecommerce(),
        }
    }

    /// The highest-priority linking rule for a role, if any
    #[must_use]
    pub fn rule_for(&self, from_role: ArticleRole) -> Option<&LinkingRule> {
        self.linking_rules
            .iter()
            .filter(|r| r.from_role == from_role)
            .min_by_key(|r| r.priority)
    }

    /// General organic-search pack
    fn seo() -> Self {
        Self {
            pack_type: PackType::Seo,
            allowed_roles: vec![
                ArticleRole::Pillar,
                ArticleRole::Cluster,
                ArticleRole::Comparison,
                ArticleRole::HowTo,
                ArticleRole::Listicle,
                ArticleRole::FaqPage,
            ],
            linking_rules: vec![
                LinkingRule {
                    from_role: ArticleRole::Pillar,
                    to_roles: vec![ArticleRole::Cluster, ArticleRole::HowTo],
                    anchor_style: AnchorStyle::Semantic,
                    priority: 1,
                },
                LinkingRule {
                    from_role: ArticleRole::Cluster,
                    to_roles: vec![ArticleRole::Pillar, ArticleRole::Comparison],
                    anchor_style: AnchorStyle::Partial,
                    priority: 1,
                },
                LinkingRule {
                    from_role: ArticleRole::HowTo,
                    to_roles: vec![ArticleRole::Cluster, ArticleRole::FaqPage],
                    anchor_style: AnchorStyle::Semantic,
                    priority: 1,
                },
                LinkingRule {
                    from_role: ArticleRole::Comparison,
                    to_roles: vec![ArticleRole::Pillar],
                    anchor_style: AnchorStyle::Exact,
                    priority: 2,
                },
            ],
            default_role_distribution: vec![
                RoleShare {
                    role: ArticleRole::Cluster,
                    percentage: 40.0,
                },
                RoleShare {
                    role: ArticleRole::HowTo,
                    percentage: 25.0,
                },
                RoleShare {
                    role: ArticleRole::Comparison,
                    percentage: 15.0,
                },
                RoleShare {
                    role: ArticleRole::Listicle,
                    percentage: 10.0,
                },
                RoleShare {
                    role: ArticleRole::FaqPage,
                    percentage: 10.0,
                },
            ],
        }
    }

    /// Location-oriented service pack
    fn local() -> Self {
        Self {
            pack_type: PackType::Local,
            allowed_roles: vec![
                ArticleRole::Pillar,
                ArticleRole::Cluster,
                ArticleRole::HowTo,
                ArticleRole::CaseStudy,
                ArticleRole::FaqPage,
            ],
            linking_rules: vec![
                LinkingRule {
                    from_role: ArticleRole::Pillar,
                    to_roles: vec![ArticleRole::Cluster, ArticleRole::CaseStudy],
                    anchor_style: AnchorStyle::Semantic,
                    priority: 1,
                },
                LinkingRule {
                    from_role: ArticleRole::CaseStudy,
                    to_roles: vec![ArticleRole::Pillar, ArticleRole::FaqPage],
                    anchor_style: AnchorStyle::Branded,
                    priority: 1,
                },
            ],
            default_role_distribution: vec![
                RoleShare {
                    role: ArticleRole::Cluster,
                    percentage: 45.0,
                },
                RoleShare {
                    role: ArticleRole::CaseStudy,
                    percentage: 25.0,
                },
                RoleShare {
                    role: ArticleRole::HowTo,
                    percentage: 15.0,
                },
                RoleShare {
                    role: ArticleRole::FaqPage,
                    percentage: 15.0,
                },
            ],
        }
    }

    /// Product and buying-guide pack
    fn ecommerce() -> Self {
        Self {
            pack_type: PackType::Ecommerce,
            allowed_roles: vec![
                ArticleRole::Pillar,
                ArticleRole::Cluster,
                ArticleRole::Comparison,
                ArticleRole::Listicle,
                ArticleRole::Glossary,
            ],
            linking_rules: vec![
                LinkingRule {
                    from_role: ArticleRole::Pillar,
                    to_roles: vec![ArticleRole::Listicle, ArticleRole::Comparison],
                    anchor_style: AnchorStyle::Semantic,
                    priority: 1,
                },
                LinkingRule {
                    from_role: ArticleRole::Listicle,
                    to_roles: vec![ArticleRole::Comparison, ArticleRole::Glossary],
                    anchor_style: AnchorStyle::Partial,
                    priority: 1,
                },
            ],
            default_role_distribution: vec![
                RoleShare {
                    role: ArticleRole::Cluster,
                    percentage: 30.0,
                },
                RoleShare {
                    role: ArticleRole::Comparison,
                    percentage: 30.0,
                },
                RoleShare {
                    role: ArticleRole::Listicle,
                    percentage: 25.0,
                },
                RoleShare {
                    role: ArticleRole::Glossary,
                    percentage: 15.0,
                },
            ],
        }
    }
}

/// A deterministic, cyclable role sequence expanded from a pack's
/// percentage distribution
#[derive(Debug, Clone)]
pub struct RoleDistribution {
    sequence: Vec<ArticleRole>,
}

impl RoleDistribution {
    /// Expand a pack's distribution into its role sequence.
    ///
    /// Each share contributes `ceil(percentage)` replicas, so the sequence
    /// length approximates 100. Ceiling rounding can overshoot 100; the
    /// overshoot is accepted rather than re-normalized, so actual ratios
    /// can skew slightly when many roles are present.
    #[must_use]
    pub fn build(pack: &PackDefinition) -> Self {
        let mut sequence = Vec::with_capacity(100);
        for share in &pack.default_role_distribution {
            let replicas = share.percentage.ceil().max(0.0) as usize;
            sequence.extend(std::iter::repeat(share.role).take(replicas));
        }
        Self { sequence }
    }

    /// Role for the Nth planned article, cycling through the sequence.
    ///
    /// Falls back to the generic role when the sequence is empty.
    #[must_use]
    pub fn role_at(&self, index: usize) -> ArticleRole {
        if self.sequence.is_empty() {
            return ArticleRole::generic();
        }
        self.sequence[index % self.sequence.len()]
    }

    /// Number of entries in the expanded sequence
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Whether the expanded sequence is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pack_distribution_is_valid() {
        for pack_type in [PackType::Seo, PackType::Local, PackType::Ecommerce] {
            let pack = PackDefinition::for_pack(pack_type);
            let distribution = RoleDistribution::build(&pack);

            assert!(!distribution.is_empty(), "{pack_type} distribution empty");
            for index in 0..distribution.len() {
                let role = distribution.role_at(index);
                assert!(
                    pack.allowed_roles.contains(&role),
                    "{pack_type} emitted disallowed role {role}"
                );
            }
        }
    }

    #[test]
    fn test_role_at_cycles() {
        let pack = PackDefinition::for_pack(PackType::Seo);
        let distribution = RoleDistribution::build(&pack);
        let len = distribution.len();

        assert_eq!(distribution.role_at(0), distribution.role_at(len));
        assert_eq!(distribution.role_at(7), distribution.role_at(len + 7));
    }

    #[test]
    fn test_ceiling_overshoot_is_preserved() {
        let pack = PackDefinition {
            pack_type: PackType::Seo,
            allowed_roles: vec![ArticleRole::Cluster, ArticleRole::HowTo],
            linking_rules: vec![],
            default_role_distribution: vec![
                RoleShare {
                    role: ArticleRole::Cluster,
                    percentage: 50.5,
                },
                RoleShare {
                    role: ArticleRole::HowTo,
                    percentage: 50.5,
                },
            ],
        };
        // ceil(50.5) + ceil(50.5) = 102; no normalization back to 100
        assert_eq!(RoleDistribution::build(&pack).len(), 102);
    }

    #[test]
    fn test_empty_distribution_falls_back_to_generic() {
        let pack = PackDefinition {
            pack_type: PackType::Seo,
            allowed_roles: vec![],
            linking_rules: vec![],
            default_role_distribution: vec![],
        };
        let distribution = RoleDistribution::build(&pack);
        assert_eq!(distribution.role_at(0), ArticleRole::generic());
        assert_eq!(distribution.role_at(99), ArticleRole::generic());
    }

    #[test]
    fn test_rule_priority_wins() {
        let pack = PackDefinition::for_pack(PackType::Seo);
        let rule = pack.rule_for(ArticleRole::Pillar).unwrap();
        assert_eq!(rule.priority, 1);
        assert!(pack.rule_for(ArticleRole::Glossary).is_none());
    }
}
