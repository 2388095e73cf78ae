//! Request-level entry point tying the engine to a catalog.

use serde::{Deserialize, Serialize};

use crate::{
    analysis::{Analyzer, GamingProfile, OverallAssessment},
    catalog::{CatalogScan, ComponentLookup},
    category::{CategoryId, CategoryRegistry, GameCategory, RegistryHandle},
    component::{ComponentRecord, ComponentType},
    error::{Error, Result},
    estimate::{resolution_tier, FpsEstimator, Resolution, Settings},
    power::{analyze_power, PowerAnalysis, PowerSettings},
    recommend::{recommend, RecommendationSet, SearchOptions},
    settings::{AdvisorSettings, RecommendationSettings},
};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AnalyzePairing {
    pub cpu_name: String,
    pub gpu_name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RecommendPairing {
    pub known_name: String,
    pub known_type: ComponentType,
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GamingProfileRequest {
    pub cpu_name: String,
    pub gpu_name: String,
    #[serde(default)]
    pub resolution: Option<Resolution>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EstimatePerformance {
    pub component_name: String,
    pub component_type: ComponentType,
    pub category: CategoryId,
    pub resolution: Resolution,
    pub settings: Settings,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PerformanceEstimate {
    pub component: ComponentRecord,
    pub category: CategoryId,
    pub resolution: Resolution,
    pub settings: Settings,
    pub estimated_fps: u32,
    pub resolution_tier: &'static str,
    pub note: &'static str,
}

/// Serves requests against a catalog and a hot-swappable category registry.
///
/// Each request works on one registry snapshot from start to finish.
pub struct Advisor<C> {
    catalog: C,
    registry: RegistryHandle,
    estimator: Box<dyn FpsEstimator>,
    recommendation: RecommendationSettings,
    default_resolution: Resolution,
    power: PowerSettings,
}

impl<C> Advisor<C>
where
    C: ComponentLookup + CatalogScan,
{
    /// Built-in categories and default settings.
    pub fn new(catalog: C) -> Result<Self> {
        Self::with_settings(catalog, AdvisorSettings::default())
    }

    pub fn with_settings(catalog: C, settings: AdvisorSettings) -> Result<Self> {
        settings.check()?;
        let registry = settings.registry()?;
        let estimator = settings.estimator()?;
        Ok(Self {
            catalog,
            registry: RegistryHandle::new(registry),
            estimator: Box::new(estimator),
            recommendation: settings.recommendation,
            default_resolution: settings.estimator.default_resolution,
            power: settings.power,
        })
    }

    /// Swap the frame-rate model.
    pub fn with_estimator<E: FpsEstimator + 'static>(mut self, estimator: E) -> Self {
        self.estimator = Box::new(estimator);
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    /// Publish a new category table. In-flight requests finish on the old one.
    pub fn reload_categories(&self, registry: CategoryRegistry) {
        self.registry.replace(registry);
    }

    fn resolve(&self, name: &str, kind: ComponentType) -> Result<ComponentRecord> {
        let record = self
            .catalog
            .find(name, kind)
            .ok_or_else(|| Error::ComponentNotFound {
                name: name.to_string(),
                kind,
            })?;
        record.check_as(kind)?;
        Ok(record)
    }

    fn analyze_on(
        &self,
        registry: &CategoryRegistry,
        cpu_name: &str,
        gpu_name: &str,
        resolution: Resolution,
    ) -> Result<OverallAssessment> {
        let cpu = self.resolve(cpu_name, ComponentType::Cpu)?;
        let gpu = self.resolve(gpu_name, ComponentType::Gpu)?;
        Analyzer {
            registry,
            detector: self.recommendation.detector(),
            estimator: self.estimator.as_ref(),
        }
        .analyze(&cpu, &gpu, resolution)
    }

    pub fn analyze_pairing(&self, request: &AnalyzePairing) -> Result<OverallAssessment> {
        let registry = self.registry.snapshot();
        self.analyze_on(
            &registry,
            &request.cpu_name,
            &request.gpu_name,
            self.default_resolution,
        )
    }

    pub fn recommend_pairing(
        &self,
        request: &RecommendPairing,
        filter: &<C as CatalogScan>::Filter,
    ) -> Result<RecommendationSet> {
        let registry = self.registry.snapshot();
        let known = self.resolve(&request.known_name, request.known_type)?;
        let candidates = self.catalog.scan(request.known_type.opposite(), filter);
        recommend(
            &known,
            candidates,
            &registry,
            request.category,
            SearchOptions {
                limit: self.recommendation.limit(request.limit),
                fallback: self.recommendation.fallback,
            },
        )
    }

    pub fn gaming_profile(&self, request: &GamingProfileRequest) -> Result<GamingProfile> {
        let registry = self.registry.snapshot();
        let resolution = request.resolution.unwrap_or(self.default_resolution);
        let assessment = self.analyze_on(&registry, &request.cpu_name, &request.gpu_name, resolution)?;
        GamingProfile::from_assessment(assessment, &registry, resolution)
    }

    pub fn estimate_performance(&self, request: &EstimatePerformance) -> Result<PerformanceEstimate> {
        let registry = self.registry.snapshot();
        let category = registry.category(request.category)?;
        let component = self.resolve(&request.component_name, request.component_type)?;
        let estimated_fps =
            self.estimator
                .estimate_fps(&component, category, request.resolution, request.settings);
        Ok(PerformanceEstimate {
            resolution_tier: resolution_tier(component.normalized_score, request.resolution),
            component,
            category: request.category,
            resolution: request.resolution,
            settings: request.settings,
            estimated_fps,
            note: "Heuristic estimate from synthetic benchmarks; real results vary by game and driver",
        })
    }

    pub fn power_analysis(&self, request: &AnalyzePairing) -> Result<PowerAnalysis> {
        let cpu = self.resolve(&request.cpu_name, ComponentType::Cpu)?;
        let gpu = self.resolve(&request.gpu_name, ComponentType::Gpu)?;
        Ok(analyze_power(&cpu, &gpu, &self.power))
    }

    /// The categories currently in force.
    pub fn categories(&self) -> Vec<GameCategory> {
        self.registry.snapshot().categories().to_vec()
    }
}
