//! Heuristic frame-rate projection.
//!
//! These figures are order-of-magnitude guides derived from synthetic
//! benchmark scores, never measurements.

use maplit::hashmap;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{collections::HashMap, fmt::Display, hash::Hash, str::FromStr};

use crate::{
    category::{CategoryId, GameCategory},
    component::ComponentRecord,
    error::{Error, Result},
};

#[derive(SerializeDisplay, DeserializeFromStr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    P1080,
    P1440,
    P2160,
}

impl Resolution {
    pub const ALL: [Resolution; 3] = [Resolution::P1080, Resolution::P1440, Resolution::P2160];
}

impl FromStr for Resolution {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1080p" | "1080" | "fhd" => Ok(Self::P1080),
            "1440p" | "1440" | "qhd" => Ok(Self::P1440),
            "4k" | "2160p" | "2160" | "uhd" => Ok(Self::P2160),
            _ => Err(Error::InvalidInput(format!(
                "resolution must be one of 1080p, 1440p, 4K (got '{}')",
                s
            ))),
        }
    }
}

impl Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::P1080 => "1080p",
                Self::P1440 => "1440p",
                Self::P2160 => "4K",
            }
        )
    }
}

/// Graphics quality preset.
#[derive(SerializeDisplay, DeserializeFromStr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Settings {
    Low,
    Medium,
    High,
    Ultra,
}

impl Settings {
    pub const ALL: [Settings; 4] = [Settings::Low, Settings::Medium, Settings::High, Settings::Ultra];
}

impl FromStr for Settings {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "mid" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "ultra" => Ok(Self::Ultra),
            _ => Err(Error::InvalidInput(format!(
                "settings must be one of low, medium, high, ultra (got '{}')",
                s
            ))),
        }
    }
}

impl Display for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Low => "low",
                Self::Medium => "medium",
                Self::High => "high",
                Self::Ultra => "ultra",
            }
        )
    }
}

/// Lookup tables behind [`HeuristicEstimator`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FpsTables {
    pub category_scaling: HashMap<CategoryId, f64>,
    pub resolution_penalty: HashMap<Resolution, f64>,
    pub settings_penalty: HashMap<Settings, f64>,
}

impl Default for FpsTables {
    fn default() -> Self {
        Self {
            category_scaling: hashmap! {
                CategoryId::Esport => 3.5,
                CategoryId::AaaGpu => 1.2,
                CategoryId::Balanced => 2.0,
                CategoryId::Simulation => 2.5,
            },
            resolution_penalty: hashmap! {
                Resolution::P1080 => 1.0,
                Resolution::P1440 => 0.65,
                Resolution::P2160 => 0.35,
            },
            settings_penalty: hashmap! {
                Settings::Low => 1.2,
                Settings::Medium => 1.0,
                Settings::High => 0.85,
                Settings::Ultra => 0.70,
            },
        }
    }
}

impl FpsTables {
    pub fn check(&self) -> Result<()> {
        let check_entry = |table: &str, key: String, value: Option<&f64>| match value {
            Some(v) if v.is_finite() && *v > 0.0 => Ok(()),
            Some(v) => Err(Error::invariant(format!(
                "{}[{}] = {} must be positive",
                table, key, v
            ))),
            None => Err(Error::invariant(format!("{} has no entry for {}", table, key))),
        };
        for id in CategoryId::ALL {
            check_entry("category_scaling", id.to_string(), self.category_scaling.get(&id))?;
        }
        for resolution in Resolution::ALL {
            check_entry(
                "resolution_penalty",
                resolution.to_string(),
                self.resolution_penalty.get(&resolution),
            )?;
        }
        for settings in Settings::ALL {
            check_entry(
                "settings_penalty",
                settings.to_string(),
                self.settings_penalty.get(&settings),
            )?;
        }
        check_descending("resolution_penalty", &Resolution::ALL, &self.resolution_penalty)?;
        check_descending("settings_penalty", &Settings::ALL, &self.settings_penalty)
    }
}

/// Heavier presets must never cost less than lighter ones.
fn check_descending<K>(table: &str, order: &[K], values: &HashMap<K, f64>) -> Result<()>
where
    K: Display + Eq + Hash,
{
    for pair in order.windows(2) {
        let (lighter, heavier) = (&pair[0], &pair[1]);
        if let (Some(a), Some(b)) = (values.get(lighter), values.get(heavier)) {
            if a < b {
                return Err(Error::invariant(format!(
                    "{}[{}] = {} is below {}[{}] = {}",
                    table, lighter, a, table, heavier, b
                )));
            }
        }
    }
    Ok(())
}

/// Anything that can project a frame rate for one component.
///
/// Implementations must be monotonic in `passmark_score`.
pub trait FpsEstimator: Send + Sync {
    fn estimate_fps(
        &self,
        component: &ComponentRecord,
        category: &GameCategory,
        resolution: Resolution,
        settings: Settings,
    ) -> u32;
}

/// `passmark / 1000 * category scaling * resolution penalty * settings penalty`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicEstimator {
    tables: FpsTables,
}

impl Default for HeuristicEstimator {
    fn default() -> Self {
        Self {
            tables: FpsTables::default(),
        }
    }
}

impl HeuristicEstimator {
    /// # Errors
    /// [`Error::ConfigurationInvariantViolation`] if a table misses an entry or holds a non-positive factor.
    pub fn new(tables: FpsTables) -> Result<Self> {
        tables.check()?;
        Ok(Self { tables })
    }

    pub fn tables(&self) -> &FpsTables {
        &self.tables
    }
}

impl FpsEstimator for HeuristicEstimator {
    fn estimate_fps(
        &self,
        component: &ComponentRecord,
        category: &GameCategory,
        resolution: Resolution,
        settings: Settings,
    ) -> u32 {
        if component.passmark_score == 0 {
            return 0;
        }
        let factor = |value: Option<&f64>| value.copied().unwrap_or(1.0);
        let fps = f64::from(component.passmark_score) / 1000.0
            * factor(self.tables.category_scaling.get(&category.id))
            * factor(self.tables.resolution_penalty.get(&resolution))
            * factor(self.tables.settings_penalty.get(&settings));
        (fps.round() as u32).max(1)
    }
}

/// Expected frame rate of a pairing: the GPU projection at the requested
/// preset, capped by what the CPU can feed at the reference preset (1080p medium).
pub fn pairing_fps(
    estimator: &dyn FpsEstimator,
    cpu: &ComponentRecord,
    gpu: &ComponentRecord,
    category: &GameCategory,
    resolution: Resolution,
    settings: Settings,
) -> u32 {
    let gpu_fps = estimator.estimate_fps(gpu, category, resolution, settings);
    let cpu_cap = estimator.estimate_fps(cpu, category, Resolution::P1080, Settings::Medium);
    gpu_fps.min(cpu_cap)
}

/// A frame-rate span from ultra to low settings at one resolution.
#[derive(SerializeDisplay, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FpsRange {
    pub low: u32,
    pub high: u32,
    pub resolution: Resolution,
}

impl FpsRange {
    pub fn for_pairing(
        estimator: &dyn FpsEstimator,
        cpu: &ComponentRecord,
        gpu: &ComponentRecord,
        category: &GameCategory,
        resolution: Resolution,
    ) -> Self {
        Self {
            low: pairing_fps(estimator, cpu, gpu, category, resolution, Settings::Ultra),
            high: pairing_fps(estimator, cpu, gpu, category, resolution, Settings::Low),
            resolution,
        }
    }
}

impl Display for FpsRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{} FPS @ {}", self.low, self.high, self.resolution)
    }
}

/// What a normalized score buys at a resolution.
pub fn resolution_tier(normalized_score: u8, resolution: Resolution) -> &'static str {
    match resolution {
        Resolution::P1080 => match normalized_score {
            80..=u8::MAX => "ultra (144+ FPS)",
            60..=79 => "high (100+ FPS)",
            40..=59 => "medium (60+ FPS)",
            _ => "low (30-60 FPS)",
        },
        Resolution::P1440 => match normalized_score {
            85..=u8::MAX => "ultra (100+ FPS)",
            70..=84 => "high (80+ FPS)",
            50..=69 => "medium (60+ FPS)",
            _ => "low (30-60 FPS)",
        },
        Resolution::P2160 => match normalized_score {
            92..=u8::MAX => "ultra (60+ FPS)",
            80..=91 => "high (50+ FPS)",
            60..=79 => "medium (40+ FPS)",
            _ => "low (30+ FPS)",
        },
    }
}

/// Quality preset a pairing with this balance score can comfortably run.
pub fn recommended_settings(balance_score: u8) -> &'static str {
    match balance_score {
        85..=u8::MAX => "Ultra",
        70..=84 => "High-Ultra",
        50..=69 => "Medium-High",
        _ => "Medium",
    }
}
