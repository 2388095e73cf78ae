//! Ranked search for a partner component.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, trace, warn};

use crate::{
    category::{CategoryId, CategoryRegistry, GameCategory},
    component::{ComponentRecord, ComponentType},
    error::Result,
    score::{score, weighted_mean},
    validate::{validate, Stage},
};

/// What to return when no candidate clears the minimum requirements.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// The best of the inadmissible candidates, flagged as degraded.
    LeastBad,
    /// Nothing.
    Empty,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::LeastBad
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub limit: usize,
    pub fallback: FallbackPolicy,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub candidate: ComponentRecord,
    pub match_score: u8,
    /// Passed all three validation stages in every category searched.
    pub compatible: bool,
    pub balance_description: &'static str,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RecommendationSet {
    pub known: ComponentRecord,
    pub target_type: ComponentType,
    pub category: Option<CategoryId>,
    /// No candidate met the minimum requirements; the list (if any) is least-bad results.
    pub degraded: bool,
    pub recommendations: Vec<Recommendation>,
}

fn describe(match_score: u8) -> &'static str {
    match match_score {
        90..=u8::MAX => "Perfect match",
        80..=89 => "Excellent balance",
        70..=79 => "Very good balance",
        _ => "Good balance",
    }
}

/// Descending score, then descending normalized score, then name.
fn rank(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.match_score
        .cmp(&a.match_score)
        .then_with(|| b.candidate.normalized_score.cmp(&a.candidate.normalized_score))
        .then_with(|| a.candidate.name.cmp(&b.candidate.name))
}

/// Score every candidate of the opposite type against `known` and keep the best.
///
/// With a category the match score is that category's balance score; without
/// one it is the `weight_in_overall` mean across all categories. Candidates
/// failing a minimum requirement in any searched category are discarded unless
/// nothing else is left.
///
/// # Errors
/// [`crate::Error::MalformedComponent`] if `known` is malformed. Malformed
/// candidates are skipped.
pub fn recommend<I>(
    known: &ComponentRecord,
    candidates: I,
    registry: &CategoryRegistry,
    category: Option<CategoryId>,
    options: SearchOptions,
) -> Result<RecommendationSet>
where
    I: IntoIterator<Item = ComponentRecord>,
{
    known.check()?;
    let scope: Vec<&GameCategory> = match category {
        Some(id) => vec![registry.category(id)?],
        None => registry.categories().iter().collect(),
    };
    let target_type = known.kind.opposite();

    let mut admissible = Vec::new();
    let mut rejected = Vec::new();
    for candidate in candidates {
        if candidate.kind != target_type {
            trace!("Skipping {} '{}': not a {}", candidate.kind, candidate.name, target_type);
            continue;
        }
        if let Err(e) = candidate.check() {
            warn!("Skipping candidate: {}", e);
            continue;
        }

        let (cpu, gpu) = match known.kind {
            ComponentType::Cpu => (known, &candidate),
            ComponentType::Gpu => (&candidate, known),
        };
        let mut passes_minimum = true;
        let mut compatible = true;
        let mut scores = Vec::with_capacity(scope.len());
        for category in &scope {
            let validation = validate(cpu, gpu, category);
            passes_minimum &= validation.stage_failed != Stage::Minimum;
            compatible &= validation.compatible;
            scores.push((category.weight_in_overall, score(cpu, gpu, category, &validation)));
        }
        let match_score = match scores.as_slice() {
            [(_, only)] => *only,
            _ => weighted_mean(scores),
        };
        trace!(
            "Candidate '{}': match score {}, compatible {}, minimum {}",
            candidate.name,
            match_score,
            compatible,
            passes_minimum
        );

        let recommendation = Recommendation {
            match_score,
            compatible,
            balance_description: describe(match_score),
            candidate,
        };
        if passes_minimum {
            admissible.push(recommendation);
        } else {
            rejected.push(recommendation);
        }
    }

    let degraded = admissible.is_empty() && !rejected.is_empty();
    let mut recommendations = if degraded {
        warn!(
            "No {} meets the minimum requirements next to '{}' ({} candidates rejected)",
            target_type,
            known.name,
            rejected.len()
        );
        match options.fallback {
            FallbackPolicy::LeastBad => rejected
                .into_iter()
                .map(|r| Recommendation {
                    balance_description: "Sub-optimal",
                    ..r
                })
                .collect(),
            FallbackPolicy::Empty => Vec::new(),
        }
    } else {
        admissible
    };

    recommendations.sort_by(rank);
    recommendations.truncate(options.limit);
    debug!(
        "Recommending {} {}(s) for '{}'",
        recommendations.len(),
        target_type,
        known.name
    );

    Ok(RecommendationSet {
        known: known.clone(),
        target_type,
        category,
        degraded,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::{recommend, FallbackPolicy, SearchOptions};
    use crate::{
        category::{CategoryId, CategoryRegistry},
        component::{ComponentRecord, ComponentType, Tier},
        error::Error,
    };

    fn options(limit: usize) -> SearchOptions {
        SearchOptions {
            limit,
            fallback: FallbackPolicy::LeastBad,
        }
    }

    fn gpu(name: &str, passmark: u32, score: u8, tier: Tier) -> ComponentRecord {
        ComponentRecord::new(name, ComponentType::Gpu, passmark, score, tier)
    }

    fn known_cpu() -> ComponentRecord {
        ComponentRecord::new("Ryzen 7 7700X", ComponentType::Cpu, 36_000, 80, Tier::High)
    }

    #[test]
    fn test_sorted_with_deterministic_ties() {
        let registry = CategoryRegistry::builtin().unwrap();
        let candidates = vec![
            gpu("RX 7600", 11_000, 65, Tier::High),
            gpu("RTX 4060 Ti", 22_500, 80, Tier::High),
            gpu("RX 7700 XT", 22_400, 80, Tier::High),
            gpu("RTX 4070", 26_900, 92, Tier::Ultra),
            gpu("GT 1030", 2_700, 15, Tier::Low),
        ];
        let set = recommend(&known_cpu(), candidates, &registry, Some(CategoryId::Balanced), options(10))
            .unwrap();

        assert!(!set.degraded);
        assert_eq!(set.target_type, ComponentType::Gpu);
        // GT 1030 is below the balanced GPU floor
        assert!(set.recommendations.iter().all(|r| r.candidate.name != "GT 1030"));

        let names: Vec<&str> = set.recommendations.iter().map(|r| r.candidate.name.as_str()).collect();
        assert_eq!(names, vec!["RTX 4060 Ti", "RX 7700 XT", "RTX 4070", "RX 7600"]);
        for pair in set.recommendations.windows(2) {
            assert!(pair[0].match_score >= pair[1].match_score);
        }
    }

    #[test]
    fn test_truncates_to_limit() {
        let registry = CategoryRegistry::builtin().unwrap();
        let candidates = (0..20)
            .map(|i| gpu(&format!("card {:02}", i), 15_000 + i * 100, 65, Tier::High))
            .collect::<Vec<_>>();
        let set = recommend(&known_cpu(), candidates, &registry, None, options(3)).unwrap();
        assert_eq!(set.recommendations.len(), 3);
        // all equal: name order decides
        assert_eq!(set.recommendations[0].candidate.name, "card 00");
    }

    #[test]
    fn test_fallback_policies() {
        let registry = CategoryRegistry::builtin().unwrap();
        let weak = vec![
            gpu("GT 710", 600, 5, Tier::Low),
            gpu("GT 1030", 2_700, 15, Tier::Low),
        ];

        let set = recommend(&known_cpu(), weak.clone(), &registry, Some(CategoryId::AaaGpu), options(5))
            .unwrap();
        assert!(set.degraded);
        assert_eq!(set.recommendations.len(), 2);
        assert!(set.recommendations.iter().all(|r| r.balance_description == "Sub-optimal"));
        // equal scores of 0: the stronger card first
        assert_eq!(set.recommendations[0].candidate.name, "GT 1030");

        let set = recommend(
            &known_cpu(),
            weak,
            &registry,
            Some(CategoryId::AaaGpu),
            SearchOptions {
                limit: 5,
                fallback: FallbackPolicy::Empty,
            },
        )
        .unwrap();
        assert!(set.degraded);
        assert!(set.recommendations.is_empty());
    }

    #[test]
    fn test_skips_wrong_type_and_malformed() {
        let registry = CategoryRegistry::builtin().unwrap();
        let candidates = vec![
            known_cpu(),
            gpu("broken", 0, 70, Tier::High),
            gpu("RTX 4060 Ti", 22_500, 80, Tier::High),
        ];
        let set = recommend(&known_cpu(), candidates, &registry, None, options(5)).unwrap();
        assert_eq!(set.recommendations.len(), 1);
        assert_eq!(set.recommendations[0].candidate.name, "RTX 4060 Ti");
    }

    #[test]
    fn test_malformed_known_component() {
        let registry = CategoryRegistry::builtin().unwrap();
        let known = ComponentRecord { passmark_score: 0, ..known_cpu() };
        assert!(matches!(
            recommend(&known, Vec::new(), &registry, None, options(5)),
            Err(Error::MalformedComponent { .. })
        ));
    }
}
