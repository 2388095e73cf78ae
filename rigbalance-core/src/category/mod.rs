//! Workload categories and the registry that serves them.

mod registry;

pub use registry::{CategoryRegistry, RegistryHandle};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt::Display, str::FromStr};

use crate::error::{Error, Result};

/// Importance above which a category is considered to lean towards one side.
pub const LEAN_THRESHOLD: f64 = 0.6;

#[derive(
    SerializeDisplay, DeserializeFromStr, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum CategoryId {
    Esport,
    AaaGpu,
    Balanced,
    Simulation,
}

impl CategoryId {
    pub const ALL: [CategoryId; 4] = [
        CategoryId::Esport,
        CategoryId::AaaGpu,
        CategoryId::Balanced,
        CategoryId::Simulation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Esport => "esport",
            Self::AaaGpu => "aaa_gpu",
            Self::Balanced => "balanced",
            Self::Simulation => "simulation",
        }
    }
}

impl FromStr for CategoryId {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidCategory(s.to_string()))
    }
}

impl Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Absolute floors every pairing must clear, whatever the weighting.
///
/// Optional requirements are only checked against records that carry the attribute.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct MinimumRequirements {
    pub cpu_score: u8,
    pub gpu_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_cores: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_threads: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_single_thread: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_memory_gb: Option<f64>,
}

/// GPU/CPU PassMark ratio limits.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct BottleneckThresholds {
    /// Above this ratio the CPU is the limiting side.
    pub cpu_bound: f64,
    /// Below this ratio the GPU is the limiting side.
    pub gpu_bound: f64,
    pub ideal_ratio: f64,
}

/// Which side a category's weighting favours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lean {
    Cpu,
    Gpu,
    Balanced,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GameCategory {
    pub id: CategoryId,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub examples: Vec<String>,
    pub cpu_importance: f64,
    pub gpu_importance: f64,
    pub weight_in_overall: f64,
    #[serde(default)]
    pub minimum: MinimumRequirements,
    pub max_tier_diff: u8,
    pub max_score_diff: u8,
    pub bottleneck: BottleneckThresholds,
}

impl GameCategory {
    pub fn lean(&self) -> Lean {
        if self.cpu_importance > LEAN_THRESHOLD {
            Lean::Cpu
        } else if self.gpu_importance > LEAN_THRESHOLD {
            Lean::Gpu
        } else {
            Lean::Balanced
        }
    }
}
