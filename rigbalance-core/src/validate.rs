//! Three-stage admissibility check for a CPU/GPU pairing in one category.
//!
//! Stages run in order (minimum requirements, tier gap, score gap) and the
//! first failure wins. Every failure names the weak side and the target it has
//! to reach, which is what the upgrade and recommendation logic consume.

use serde::Serialize;
use std::fmt::Display;

use crate::{
    category::GameCategory,
    component::{ComponentRecord, ComponentType, Tier},
};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    None,
    Minimum,
    Tier,
    Score,
}

/// Which side of a rejected pairing has to improve.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeakSide {
    None,
    Cpu,
    Gpu,
    /// Only reachable from the minimum-requirements stage.
    Both,
}

impl WeakSide {
    fn from_flags(cpu: bool, gpu: bool) -> Self {
        match (cpu, gpu) {
            (false, false) => Self::None,
            (true, false) => Self::Cpu,
            (false, true) => Self::Gpu,
            (true, true) => Self::Both,
        }
    }

    fn of(kind: ComponentType) -> Self {
        match kind {
            ComponentType::Cpu => Self::Cpu,
            ComponentType::Gpu => Self::Gpu,
        }
    }

    pub fn includes(self, kind: ComponentType) -> bool {
        matches!(
            (self, kind),
            (Self::Both, _) | (Self::Cpu, ComponentType::Cpu) | (Self::Gpu, ComponentType::Gpu)
        )
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    Score,
    Cores,
    Threads,
    SingleThread,
    MemoryGb,
}

/// One unmet floor.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Shortfall {
    pub side: ComponentType,
    pub requirement: Requirement,
    pub actual: f64,
    pub required: f64,
}

impl Display for Shortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.requirement {
            Requirement::Score => write!(
                f,
                "{} score ({}) below minimum ({})",
                self.side, self.actual, self.required
            ),
            Requirement::Cores => write!(
                f,
                "{} has only {} cores, needs {}+",
                self.side, self.actual, self.required
            ),
            Requirement::Threads => write!(
                f,
                "{} has only {} threads, needs {}+",
                self.side, self.actual, self.required
            ),
            Requirement::SingleThread => write!(
                f,
                "{} single-thread rating ({}) below minimum ({})",
                self.side, self.actual, self.required
            ),
            Requirement::MemoryGb => write!(
                f,
                "{} has only {}GB VRAM, needs {}GB+",
                self.side, self.actual, self.required
            ),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Rejection {
    Minimum {
        shortfalls: Vec<Shortfall>,
    },
    Tier {
        tier_diff: u8,
        current: Tier,
        /// Lowest tier the weak side needs to get within `max_tier_diff`.
        target: Tier,
    },
    Score {
        score_diff: u8,
        current: u8,
        /// Lowest normalized score the weak side needs to get within `max_score_diff`.
        target: u8,
    },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub compatible: bool,
    pub stage_failed: Stage,
    pub weak_side: WeakSide,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Rejection>,
}

impl ValidationResult {
    fn pass() -> Self {
        Self {
            compatible: true,
            stage_failed: Stage::None,
            weak_side: WeakSide::None,
            detail: None,
        }
    }

    fn reject(stage: Stage, weak_side: WeakSide, detail: Rejection) -> Self {
        Self {
            compatible: false,
            stage_failed: stage,
            weak_side,
            detail: Some(detail),
        }
    }

    /// Human-readable description of the failure, empty when compatible.
    pub fn issues(&self) -> Vec<String> {
        match &self.detail {
            None => Vec::new(),
            Some(Rejection::Minimum { shortfalls }) => {
                shortfalls.iter().map(ToString::to_string).collect()
            }
            Some(Rejection::Tier {
                tier_diff,
                current,
                target,
            }) => vec![format!(
                "Tier gap of {}: upgrade {} to at least '{}' tier (currently '{}')",
                tier_diff,
                self.weak_label(),
                target,
                current
            )],
            Some(Rejection::Score {
                score_diff,
                current,
                target,
            }) => vec![format!(
                "Score gap of {}: upgrade {} to a score of at least {} (currently {})",
                score_diff,
                self.weak_label(),
                target,
                current
            )],
        }
    }

    fn weak_label(&self) -> &'static str {
        match self.weak_side {
            WeakSide::Cpu => "CPU",
            WeakSide::Gpu => "GPU",
            WeakSide::Both => "CPU and GPU",
            WeakSide::None => "nothing",
        }
    }
}

/// Run all three stages for `cpu` + `gpu` in `category`.
pub fn validate(
    cpu: &ComponentRecord,
    gpu: &ComponentRecord,
    category: &GameCategory,
) -> ValidationResult {
    let shortfalls = minimum_shortfalls(cpu, gpu, category);
    if !shortfalls.is_empty() {
        let weak_side = WeakSide::from_flags(
            shortfalls.iter().any(|s| s.side == ComponentType::Cpu),
            shortfalls.iter().any(|s| s.side == ComponentType::Gpu),
        );
        return ValidationResult::reject(Stage::Minimum, weak_side, Rejection::Minimum { shortfalls });
    }

    let (cpu_tier, gpu_tier) = (cpu.tier.index(), gpu.tier.index());
    let tier_diff = cpu_tier.abs_diff(gpu_tier);
    if tier_diff > category.max_tier_diff {
        let (weak, current, stronger) = if cpu_tier < gpu_tier {
            (ComponentType::Cpu, cpu.tier, gpu_tier)
        } else {
            (ComponentType::Gpu, gpu.tier, cpu_tier)
        };
        let target = Tier::from_index(i32::from(stronger) - i32::from(category.max_tier_diff));
        return ValidationResult::reject(
            Stage::Tier,
            WeakSide::of(weak),
            Rejection::Tier {
                tier_diff,
                current,
                target,
            },
        );
    }

    let score_diff = cpu.normalized_score.abs_diff(gpu.normalized_score);
    if score_diff > category.max_score_diff {
        let (weak, current, stronger) = if cpu.normalized_score < gpu.normalized_score {
            (ComponentType::Cpu, cpu.normalized_score, gpu.normalized_score)
        } else {
            (ComponentType::Gpu, gpu.normalized_score, cpu.normalized_score)
        };
        return ValidationResult::reject(
            Stage::Score,
            WeakSide::of(weak),
            Rejection::Score {
                score_diff,
                current,
                target: stronger.saturating_sub(category.max_score_diff),
            },
        );
    }

    ValidationResult::pass()
}

fn minimum_shortfalls(
    cpu: &ComponentRecord,
    gpu: &ComponentRecord,
    category: &GameCategory,
) -> Vec<Shortfall> {
    let minimum = &category.minimum;
    let mut shortfalls = Vec::new();
    let mut check = |side, requirement, actual: Option<f64>, required: Option<f64>| {
        if let (Some(actual), Some(required)) = (actual, required) {
            if actual < required {
                shortfalls.push(Shortfall {
                    side,
                    requirement,
                    actual,
                    required,
                });
            }
        }
    };

    use ComponentType::{Cpu, Gpu};
    check(
        Cpu,
        Requirement::Score,
        Some(f64::from(cpu.normalized_score)),
        Some(f64::from(minimum.cpu_score)),
    );
    check(
        Cpu,
        Requirement::Cores,
        cpu.core_count.map(f64::from),
        minimum.cpu_cores.map(f64::from),
    );
    check(
        Cpu,
        Requirement::Threads,
        cpu.thread_count.map(f64::from),
        minimum.cpu_threads.map(f64::from),
    );
    check(
        Cpu,
        Requirement::SingleThread,
        cpu.single_thread_rating.map(f64::from),
        minimum.cpu_single_thread.map(f64::from),
    );
    check(
        Gpu,
        Requirement::Score,
        Some(f64::from(gpu.normalized_score)),
        Some(f64::from(minimum.gpu_score)),
    );
    check(
        Gpu,
        Requirement::MemoryGb,
        gpu.memory_size_gb,
        minimum.gpu_memory_gb,
    );

    shortfalls
}

#[cfg(test)]
mod tests {
    use super::{validate, Rejection, Requirement, Stage, WeakSide};
    use crate::{
        category::{CategoryId, CategoryRegistry},
        component::{ComponentRecord, ComponentType, Tier},
    };

    fn cpu(score: u8, tier: Tier) -> ComponentRecord {
        ComponentRecord::new("test cpu", ComponentType::Cpu, 10_000, score, tier)
    }

    fn gpu(score: u8, tier: Tier) -> ComponentRecord {
        ComponentRecord::new("test gpu", ComponentType::Gpu, 10_000, score, tier)
    }

    #[test]
    fn test_minimum_floor_is_inclusive() {
        let registry = CategoryRegistry::builtin().unwrap();
        let simulation = registry.category(CategoryId::Simulation).unwrap();

        let at_floor = validate(&cpu(55, Tier::Mid), &gpu(15, Tier::Low), simulation);
        assert_ne!(at_floor.stage_failed, Stage::Minimum);

        let below = validate(&cpu(55, Tier::Mid), &gpu(14, Tier::Low), simulation);
        assert_eq!(below.stage_failed, Stage::Minimum);
        assert_eq!(below.weak_side, WeakSide::Gpu);
        assert!(!below.compatible);
    }

    #[test]
    fn test_optional_requirements() {
        let registry = CategoryRegistry::builtin().unwrap();
        let aaa = registry.category(CategoryId::AaaGpu).unwrap();

        let mut quad_core = cpu(60, Tier::High);
        quad_core.core_count = Some(4);
        let mut small_vram = gpu(65, Tier::High);
        small_vram.memory_size_gb = Some(6.0);

        let result = validate(&quad_core, &small_vram, aaa);
        assert_eq!(result.weak_side, WeakSide::Both);
        match result.detail {
            Some(Rejection::Minimum { ref shortfalls }) => {
                let kinds: Vec<Requirement> = shortfalls.iter().map(|s| s.requirement).collect();
                assert_eq!(kinds, vec![Requirement::Cores, Requirement::MemoryGb]);
            }
            ref other => panic!("unexpected detail {:?}", other),
        }
        assert_eq!(result.issues().len(), 2);

        // records without the attribute aren't penalized
        let result = validate(&cpu(60, Tier::High), &gpu(65, Tier::High), aaa);
        assert!(result.compatible);
    }

    #[test]
    fn test_tier_gap_targets_weak_side() {
        let registry = CategoryRegistry::builtin().unwrap();
        let balanced = registry.category(CategoryId::Balanced).unwrap();

        let result = validate(&cpu(25, Tier::Low), &gpu(70, Tier::High), balanced);
        assert_eq!(result.stage_failed, Stage::Tier);
        assert_eq!(result.weak_side, WeakSide::Cpu);
        assert_eq!(
            result.detail,
            Some(Rejection::Tier {
                tier_diff: 2,
                current: Tier::Low,
                target: Tier::Mid,
            })
        );
    }

    #[test]
    fn test_thread_floor() {
        let registry = CategoryRegistry::builtin().unwrap();
        let simulation = registry.category(CategoryId::Simulation).unwrap();

        let mut eight_threads = cpu(55, Tier::Mid);
        eight_threads.thread_count = Some(8);
        let result = validate(&eight_threads, &gpu(15, Tier::Low), simulation);
        assert_eq!(result.stage_failed, Stage::Minimum);
        assert_eq!(result.weak_side, WeakSide::Cpu);
        match result.detail {
            Some(Rejection::Minimum { ref shortfalls }) => {
                assert_eq!(shortfalls.len(), 1);
                assert_eq!(shortfalls[0].requirement, Requirement::Threads);
                assert_eq!(shortfalls[0].actual, 8.0);
                assert_eq!(shortfalls[0].required, 12.0);
            }
            ref other => panic!("unexpected detail {:?}", other),
        }

        eight_threads.thread_count = Some(12);
        let result = validate(&eight_threads, &gpu(15, Tier::Low), simulation);
        assert_ne!(result.stage_failed, Stage::Minimum);
    }

    #[test]
    fn test_single_thread_floor() {
        let registry = CategoryRegistry::builtin().unwrap();
        let esport = registry.category(CategoryId::Esport).unwrap();

        let mut slow_core = cpu(45, Tier::Mid);
        slow_core.single_thread_rating = Some(1500);
        let result = validate(&slow_core, &gpu(40, Tier::Mid), esport);
        assert_eq!(result.stage_failed, Stage::Minimum);
        assert_eq!(result.weak_side, WeakSide::Cpu);
        match result.detail {
            Some(Rejection::Minimum { ref shortfalls }) => {
                let kinds: Vec<Requirement> = shortfalls.iter().map(|s| s.requirement).collect();
                assert_eq!(kinds, vec![Requirement::SingleThread]);
            }
            ref other => panic!("unexpected detail {:?}", other),
        }

        slow_core.single_thread_rating = Some(2000);
        assert!(validate(&slow_core, &gpu(40, Tier::Mid), esport).compatible);
    }

    #[test]
    fn test_tier_gap_with_weak_gpu() {
        let registry = CategoryRegistry::builtin().unwrap();
        let simulation = registry.category(CategoryId::Simulation).unwrap();

        let result = validate(&cpu(100, Tier::Ultra), &gpu(20, Tier::Low), simulation);
        assert_eq!(result.stage_failed, Stage::Tier);
        assert_eq!(result.weak_side, WeakSide::Gpu);
        assert_eq!(
            result.detail,
            Some(Rejection::Tier {
                tier_diff: 3,
                current: Tier::Low,
                target: Tier::Mid,
            })
        );
    }

    #[test]
    fn test_score_gap_targets_weak_side() {
        let registry = CategoryRegistry::builtin().unwrap();
        let balanced = registry.category(CategoryId::Balanced).unwrap();

        let result = validate(&cpu(84, Tier::High), &gpu(50, Tier::Mid), balanced);
        assert_eq!(result.stage_failed, Stage::Score);
        assert_eq!(result.weak_side, WeakSide::Gpu);
        assert_eq!(
            result.detail,
            Some(Rejection::Score {
                score_diff: 34,
                current: 50,
                target: 54,
            })
        );
    }

    #[test]
    fn test_compatible_pairing() {
        let registry = CategoryRegistry::builtin().unwrap();
        let esport = registry.category(CategoryId::Esport).unwrap();

        let result = validate(&cpu(45, Tier::Mid), &gpu(40, Tier::Mid), esport);
        assert!(result.compatible);
        assert_eq!(result.stage_failed, Stage::None);
        assert_eq!(result.weak_side, WeakSide::None);
        assert!(result.issues().is_empty());
    }
}
