//! Balance scoring: how well a pairing suits one category, 0-100.

use serde::Serialize;

use crate::{
    category::GameCategory,
    component::ComponentRecord,
    validate::{Stage, ValidationResult},
};

/// Score for a pairing that already went through [`crate::validate::validate`].
///
/// Rejected pairings get a stage-specific penalty: nothing below the minimum
/// floor, a steep tier-gap penalty, a milder score-gap one. Compatible pairings
/// are scored on the weighted shortfall of the weaker side, so a category that
/// barely relies on the GPU shrugs off a weaker GPU while a 50/50 category
/// does not.
pub fn score(
    cpu: &ComponentRecord,
    gpu: &ComponentRecord,
    category: &GameCategory,
    validation: &ValidationResult,
) -> u8 {
    match validation.stage_failed {
        Stage::Minimum => 0,
        Stage::Tier => {
            let tier_diff = i32::from(cpu.tier.index().abs_diff(gpu.tier.index()));
            (30 - 10 * tier_diff).max(0) as u8
        }
        Stage::Score => {
            let score_diff = f64::from(cpu.normalized_score.abs_diff(gpu.normalized_score));
            clamp_score(70.0 - score_diff / 2.0)
        }
        Stage::None => {
            let (cpu_score, gpu_score) = (
                f64::from(cpu.normalized_score),
                f64::from(gpu.normalized_score),
            );
            let weaker_importance = if cpu_score < gpu_score {
                category.cpu_importance
            } else {
                category.gpu_importance
            };
            let balance_diff = (cpu_score - gpu_score).abs() * weaker_importance;
            clamp_score(100.0 - 2.0 * balance_diff)
        }
    }
}

fn clamp_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Weighted mean of per-category scores, rounded.
///
/// Returns 0 when the weights sum to zero.
pub fn weighted_mean<I>(scores: I) -> u8
where
    I: IntoIterator<Item = (f64, u8)>,
{
    let (sum, total) = scores
        .into_iter()
        .fold((0.0, 0.0), |(sum, total), (weight, score)| {
            (sum + weight * f64::from(score), total + weight)
        });
    if total > 0.0 {
        clamp_score(sum / total)
    } else {
        0
    }
}

/// Verbal grade for a balance score.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Excellent,
    VeryGood,
    Good,
    Fair,
    Poor,
}

impl Rating {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => Self::Excellent,
            75..=89 => Self::VeryGood,
            60..=74 => Self::Good,
            40..=59 => Self::Fair,
            _ => Self::Poor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{score, weighted_mean, Rating};
    use crate::{
        category::{CategoryId, CategoryRegistry},
        component::{ComponentRecord, ComponentType, Tier},
        validate::validate,
    };

    fn pair_score(
        category: CategoryId,
        cpu: (u8, Tier, Option<u32>),
        gpu: (u8, Tier),
    ) -> u8 {
        let registry = CategoryRegistry::builtin().unwrap();
        let category = registry.category(category).unwrap();
        let mut cpu_record = ComponentRecord::new("cpu", ComponentType::Cpu, 12_000, cpu.0, cpu.1);
        cpu_record.core_count = cpu.2;
        let gpu_record = ComponentRecord::new("gpu", ComponentType::Gpu, 9_000, gpu.0, gpu.1);
        let validation = validate(&cpu_record, &gpu_record, category);
        score(&cpu_record, &gpu_record, category, &validation)
    }

    #[test]
    fn test_minimum_failure_scores_zero() {
        assert_eq!(
            pair_score(CategoryId::Simulation, (100, Tier::Ultra, None), (8, Tier::Low)),
            0
        );
        assert_eq!(
            pair_score(CategoryId::AaaGpu, (25, Tier::Low, Some(4)), (100, Tier::Ultra)),
            0
        );
    }

    #[test]
    fn test_tier_failure_penalty() {
        // 2 tier gap in balanced: 30 - 20
        assert_eq!(
            pair_score(CategoryId::Balanced, (25, Tier::Low, None), (70, Tier::High)),
            10
        );
        // 3 tier gap collapses to 0
        assert_eq!(
            pair_score(CategoryId::Simulation, (100, Tier::Ultra, None), (20, Tier::Low)),
            0
        );
    }

    #[test]
    fn test_score_failure_penalty() {
        // gap of 34: 70 - 17
        assert_eq!(
            pair_score(CategoryId::Balanced, (84, Tier::High, None), (50, Tier::Mid)),
            53
        );
    }

    #[test]
    fn test_compatible_rewards_weighted_balance() {
        let esport = pair_score(CategoryId::Esport, (45, Tier::Mid, None), (40, Tier::Mid));
        assert!(esport >= 85, "esport score was {}", esport);

        // identical scores are perfectly balanced everywhere
        assert_eq!(
            pair_score(CategoryId::Balanced, (60, Tier::High, None), (60, Tier::High)),
            100
        );

        // a CPU-heavy category tolerates the same GPU deficit better than a 50/50 one
        let cpu_heavy = pair_score(CategoryId::Esport, (80, Tier::High, None), (60, Tier::High));
        let even = pair_score(CategoryId::Balanced, (80, Tier::High, None), (60, Tier::High));
        assert!(cpu_heavy > even);
    }

    #[test]
    fn test_scores_stay_in_range() {
        for category in CategoryId::ALL {
            for cpu in (0..=100).step_by(5) {
                for gpu in (0..=100).step_by(5) {
                    let tier = |s: u8| Tier::from_index(i32::from(s) / 30 + 1);
                    let s = pair_score(category, (cpu, tier(cpu), None), (gpu, tier(gpu)));
                    assert!(s <= 100);
                }
            }
        }
    }

    #[test]
    fn test_weighted_mean() {
        assert_eq!(weighted_mean(vec![(0.5, 100), (0.5, 50)]), 75);
        assert_eq!(weighted_mean(vec![(0.25, 80), (0.75, 40)]), 50);
        assert_eq!(weighted_mean(Vec::<(f64, u8)>::new()), 0);
    }

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(Rating::from_score(100), Rating::Excellent);
        assert_eq!(Rating::from_score(90), Rating::Excellent);
        assert_eq!(Rating::from_score(89), Rating::VeryGood);
        assert_eq!(Rating::from_score(60), Rating::Good);
        assert_eq!(Rating::from_score(40), Rating::Fair);
        assert_eq!(Rating::from_score(39), Rating::Poor);
    }
}
