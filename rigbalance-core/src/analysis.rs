//! Pairing assessment across every category, with an aggregate verdict.

use serde::Serialize;
use tracing::debug;

use crate::{
    bottleneck::{utilization, Bottleneck, BottleneckDetector},
    category::{CategoryId, CategoryRegistry, GameCategory},
    component::{ComponentRecord, ComponentType, Tier},
    error::Result,
    estimate::{recommended_settings, FpsEstimator, FpsRange, Resolution},
    score::{score, weighted_mean, Rating},
    validate::{validate, Rejection, Requirement, Stage, ValidationResult, WeakSide},
};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PairingAssessment {
    pub category: CategoryId,
    pub compatible: bool,
    pub stage_failed: Stage,
    pub weak_side: WeakSide,
    pub balance_score: u8,
    pub rating: Rating,
    pub bottleneck: Bottleneck,
    pub bottleneck_magnitude_pct: f64,
    pub bottleneck_benign: bool,
    pub cpu_utilization_pct: u8,
    pub gpu_utilization_pct: u8,
    pub fps_estimate: FpsRange,
    pub issues: Vec<String>,
    #[serde(skip)]
    pub validation: ValidationResult,
}

impl PairingAssessment {
    fn significant_bottleneck(&self) -> Option<ComponentType> {
        if self.bottleneck_benign {
            None
        } else {
            self.bottleneck.side()
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UpgradeRecommendation {
    pub component: ComponentType,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_tier: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_score: Option<u8>,
    pub categories: Vec<CategoryId>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OverallAssessment {
    pub cpu: ComponentRecord,
    pub gpu: ComponentRecord,
    pub by_category: Vec<PairingAssessment>,
    pub overall_balance_score: u8,
    pub overall_verdict: Rating,
    pub overall_bottleneck: Option<ComponentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_recommendation: Option<UpgradeRecommendation>,
}

/// Everything needed to assess a pairing, borrowed from one registry snapshot.
pub struct Analyzer<'a> {
    pub registry: &'a CategoryRegistry,
    pub detector: BottleneckDetector,
    pub estimator: &'a dyn FpsEstimator,
}

impl Analyzer<'_> {
    /// Assess `cpu` + `gpu` in one category.
    ///
    /// # Errors
    /// [`crate::Error::MalformedComponent`] if either PassMark score is zero.
    pub fn assess(
        &self,
        cpu: &ComponentRecord,
        gpu: &ComponentRecord,
        category: &GameCategory,
        resolution: Resolution,
    ) -> Result<PairingAssessment> {
        let report = self.detector.report(cpu, gpu, category)?;
        let load = utilization(cpu, gpu, category)?;
        let validation = validate(cpu, gpu, category);
        let balance_score = score(cpu, gpu, category, &validation);
        debug!(
            "{} + {} in {}: score {}, stage {:?}, {:?}",
            cpu.name, gpu.name, category.id, balance_score, validation.stage_failed, report.bottleneck
        );

        Ok(PairingAssessment {
            category: category.id,
            compatible: validation.compatible,
            stage_failed: validation.stage_failed,
            weak_side: validation.weak_side,
            balance_score,
            rating: Rating::from_score(balance_score),
            bottleneck: report.bottleneck,
            bottleneck_magnitude_pct: (report.magnitude_pct * 10.0).round() / 10.0,
            bottleneck_benign: report.benign,
            cpu_utilization_pct: load.cpu_pct,
            gpu_utilization_pct: load.gpu_pct,
            fps_estimate: FpsRange::for_pairing(self.estimator, cpu, gpu, category, resolution),
            issues: validation.issues(),
            validation,
        })
    }

    /// Assess the pairing in every category and aggregate.
    ///
    /// # Errors
    /// A malformed record on either side fails the whole analysis.
    pub fn analyze(
        &self,
        cpu: &ComponentRecord,
        gpu: &ComponentRecord,
        resolution: Resolution,
    ) -> Result<OverallAssessment> {
        cpu.check_as(ComponentType::Cpu)?;
        gpu.check_as(ComponentType::Gpu)?;

        let by_category = self
            .registry
            .categories()
            .iter()
            .map(|category| self.assess(cpu, gpu, category, resolution))
            .collect::<Result<Vec<_>>>()?;
        let weights: Vec<f64> = self
            .registry
            .categories()
            .iter()
            .map(|c| c.weight_in_overall)
            .collect();

        let overall_balance_score = weighted_mean(
            weights
                .iter()
                .copied()
                .zip(by_category.iter().map(|a| a.balance_score)),
        );
        let overall_bottleneck = overall_bottleneck(&by_category, &weights);
        let upgrade_recommendation = upgrade_from_rejections(&by_category, &weights)
            .or_else(|| overall_bottleneck.map(|side| upgrade_from_bottleneck(side, &by_category)));

        Ok(OverallAssessment {
            cpu: cpu.clone(),
            gpu: gpu.clone(),
            by_category,
            overall_balance_score,
            overall_verdict: Rating::from_score(overall_balance_score),
            overall_bottleneck,
            upgrade_recommendation,
        })
    }
}

/// Total weight of the categories matching `f`, per side.
fn weight_per_side<F>(assessments: &[PairingAssessment], weights: &[f64], f: F) -> (f64, f64)
where
    F: Fn(&PairingAssessment, ComponentType) -> bool,
{
    assessments
        .iter()
        .zip(weights)
        .fold((0.0, 0.0), |(cpu, gpu), (a, &w)| {
            (
                cpu + if f(a, ComponentType::Cpu) { w } else { 0.0 },
                gpu + if f(a, ComponentType::Gpu) { w } else { 0.0 },
            )
        })
}

fn heavier_side(cpu: f64, gpu: f64) -> Option<ComponentType> {
    if cpu <= 0.0 && gpu <= 0.0 {
        None
    } else if gpu > cpu {
        Some(ComponentType::Gpu)
    } else {
        Some(ComponentType::Cpu)
    }
}

fn overall_bottleneck(assessments: &[PairingAssessment], weights: &[f64]) -> Option<ComponentType> {
    let (cpu, gpu) = weight_per_side(assessments, weights, |a, side| {
        a.significant_bottleneck() == Some(side)
    });
    heavier_side(cpu, gpu)
}

fn upgrade_from_rejections(
    assessments: &[PairingAssessment],
    weights: &[f64],
) -> Option<UpgradeRecommendation> {
    let (cpu, gpu) = weight_per_side(assessments, weights, |a, side| {
        !a.compatible && a.weak_side.includes(side)
    });
    let side = heavier_side(cpu, gpu)?;

    let failing: Vec<&PairingAssessment> = assessments
        .iter()
        .filter(|a| !a.compatible && a.weak_side.includes(side))
        .collect();
    let mut target_tier = None;
    let mut target_score = None;
    for assessment in &failing {
        match &assessment.validation.detail {
            Some(Rejection::Minimum { shortfalls }) => {
                let required = shortfalls
                    .iter()
                    .filter(|s| s.side == side && s.requirement == Requirement::Score)
                    .map(|s| s.required.round().clamp(0.0, 100.0) as u8)
                    .max();
                target_score = target_score.max(required);
            }
            Some(Rejection::Tier { target, .. }) => target_tier = target_tier.max(Some(*target)),
            Some(Rejection::Score { target, .. }) => target_score = target_score.max(Some(*target)),
            None => {}
        }
    }

    let names = failing
        .iter()
        .map(|a| a.category.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Some(UpgradeRecommendation {
        component: side,
        reason: format!("{} holds the pairing back in: {}", side, names),
        target_tier,
        target_score,
        categories: failing.iter().map(|a| a.category).collect(),
    })
}

fn upgrade_from_bottleneck(side: ComponentType, assessments: &[PairingAssessment]) -> UpgradeRecommendation {
    UpgradeRecommendation {
        component: side,
        reason: format!(
            "{} is bottlenecking {} performance",
            side,
            side.opposite()
        ),
        target_tier: None,
        target_score: None,
        categories: assessments
            .iter()
            .filter(|a| a.significant_bottleneck() == Some(side))
            .map(|a| a.category)
            .collect(),
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CategoryPerformance {
    pub category: CategoryId,
    pub display_name: String,
    pub games: Vec<String>,
    pub fps_estimate: FpsRange,
    pub recommended_settings: &'static str,
    pub balance_score: u8,
    pub bottleneck: Bottleneck,
    pub cpu_utilization_pct: u8,
    pub gpu_utilization_pct: u8,
}

/// Per-category gaming expectations for a pairing at one resolution.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GamingProfile {
    pub cpu: String,
    pub gpu: String,
    pub resolution: Resolution,
    pub overall_balance_score: u8,
    pub overall_verdict: Rating,
    pub performance_by_category: Vec<CategoryPerformance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_recommendation: Option<UpgradeRecommendation>,
}

impl GamingProfile {
    pub fn from_assessment(
        assessment: OverallAssessment,
        registry: &CategoryRegistry,
        resolution: Resolution,
    ) -> Result<Self> {
        let performance_by_category = assessment
            .by_category
            .iter()
            .map(|a| {
                let category = registry.category(a.category)?;
                Ok(CategoryPerformance {
                    category: a.category,
                    display_name: category.display_name.clone(),
                    games: category.examples.clone(),
                    fps_estimate: a.fps_estimate,
                    recommended_settings: recommended_settings(a.balance_score),
                    balance_score: a.balance_score,
                    bottleneck: a.bottleneck,
                    cpu_utilization_pct: a.cpu_utilization_pct,
                    gpu_utilization_pct: a.gpu_utilization_pct,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            cpu: assessment.cpu.name,
            gpu: assessment.gpu.name,
            resolution,
            overall_balance_score: assessment.overall_balance_score,
            overall_verdict: assessment.overall_verdict,
            performance_by_category,
            upgrade_recommendation: assessment.upgrade_recommendation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Analyzer, GamingProfile};
    use crate::{
        bottleneck::{Bottleneck, BottleneckDetector},
        category::{CategoryId, CategoryRegistry},
        component::{ComponentRecord, ComponentType, Tier},
        error::Error,
        estimate::{HeuristicEstimator, Resolution},
        score::Rating,
    };

    fn cpu(passmark: u32, score: u8, tier: Tier) -> ComponentRecord {
        ComponentRecord::new("cpu", ComponentType::Cpu, passmark, score, tier)
    }

    fn gpu(passmark: u32, score: u8, tier: Tier) -> ComponentRecord {
        ComponentRecord::new("gpu", ComponentType::Gpu, passmark, score, tier)
    }

    #[test]
    fn test_well_matched_pairing() {
        let registry = CategoryRegistry::builtin().unwrap();
        let estimator = HeuristicEstimator::default();
        let analyzer = Analyzer {
            registry: &registry,
            detector: BottleneckDetector::default(),
            estimator: &estimator,
        };

        // ratio 0.53 sits inside every category's bounds
        let result = analyzer
            .analyze(&cpu(30_000, 80, Tier::High), &gpu(16_000, 70, Tier::High), Resolution::P1440)
            .unwrap();
        assert_eq!(result.by_category.len(), 4);
        assert!(result.by_category.iter().all(|a| a.compatible));
        assert!(result.by_category.iter().all(|a| a.bottleneck == Bottleneck::None));
        assert_eq!(result.overall_bottleneck, None);
        assert_eq!(result.upgrade_recommendation, None);
        assert!(result.overall_balance_score >= 90);
        assert_eq!(result.overall_verdict, Rating::Excellent);
    }

    #[test]
    fn test_weak_cpu_gets_upgrade() {
        let registry = CategoryRegistry::builtin().unwrap();
        let estimator = HeuristicEstimator::default();
        let analyzer = Analyzer {
            registry: &registry,
            detector: BottleneckDetector::default(),
            estimator: &estimator,
        };

        let mut weak = cpu(4_500, 25, Tier::Low);
        weak.core_count = Some(4);
        let result = analyzer
            .analyze(&weak, &gpu(30_000, 100, Tier::Ultra), Resolution::P1080)
            .unwrap();

        let aaa = result
            .by_category
            .iter()
            .find(|a| a.category == CategoryId::AaaGpu)
            .unwrap();
        assert!(aaa.balance_score <= 10);
        assert_eq!(aaa.bottleneck, Bottleneck::CpuBottleneck);
        assert!(!aaa.issues.is_empty());

        assert_eq!(result.overall_bottleneck, Some(ComponentType::Cpu));
        let upgrade = result.upgrade_recommendation.unwrap();
        assert_eq!(upgrade.component, ComponentType::Cpu);
        // simulation's CPU floor of 40 is the highest score target
        assert_eq!(upgrade.target_score, Some(40));
        assert!(upgrade.categories.contains(&CategoryId::AaaGpu));
    }

    #[test]
    fn test_malformed_side_short_circuits() {
        let registry = CategoryRegistry::builtin().unwrap();
        let estimator = HeuristicEstimator::default();
        let analyzer = Analyzer {
            registry: &registry,
            detector: BottleneckDetector::default(),
            estimator: &estimator,
        };
        let result = analyzer.analyze(&cpu(0, 50, Tier::Mid), &gpu(10_000, 50, Tier::Mid), Resolution::P1080);
        assert!(matches!(result, Err(Error::MalformedComponent { .. })));

        let result = analyzer.analyze(&gpu(10_000, 50, Tier::Mid), &gpu(10_000, 50, Tier::Mid), Resolution::P1080);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_gaming_profile() {
        let registry = CategoryRegistry::builtin().unwrap();
        let estimator = HeuristicEstimator::default();
        let analyzer = Analyzer {
            registry: &registry,
            detector: BottleneckDetector::default(),
            estimator: &estimator,
        };
        let assessment = analyzer
            .analyze(&cpu(30_000, 80, Tier::High), &gpu(16_000, 70, Tier::High), Resolution::P1440)
            .unwrap();
        let profile = GamingProfile::from_assessment(assessment, &registry, Resolution::P1440).unwrap();

        assert_eq!(profile.performance_by_category.len(), 4);
        let esport = &profile.performance_by_category[0];
        assert_eq!(esport.category, CategoryId::Esport);
        assert!(!esport.games.is_empty());
        assert!(esport.fps_estimate.low <= esport.fps_estimate.high);
        assert!(esport.fps_estimate.to_string().ends_with("FPS @ 1440p"));
    }
}
