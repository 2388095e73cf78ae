//! Ratio-based bottleneck classification and utilization estimates.
//!
//! Both work on `gpu.passmark_score / cpu.passmark_score`: a high ratio means
//! the GPU outruns the CPU, a low ratio means the CPU outruns the GPU.

use serde::Serialize;

use crate::{
    category::{GameCategory, Lean},
    component::{ComponentRecord, ComponentType},
    error::{Error, Result},
};

/// Past `bound / ESCALATION` (or under `bound * ESCALATION`) every category
/// reports the full bottleneck, not only the side it leans on.
const ESCALATION: f64 = 0.7;

/// Magnitudes under this many percent are reported as benign by default.
pub const DEFAULT_BENIGN_MARGIN_PCT: f64 = 20.0;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Bottleneck {
    None,
    SlightCpu,
    SlightGpu,
    CpuBottleneck,
    GpuBottleneck,
}

impl Bottleneck {
    /// The limiting side, if any.
    pub fn side(self) -> Option<ComponentType> {
        match self {
            Self::None => None,
            Self::SlightCpu | Self::CpuBottleneck => Some(ComponentType::Cpu),
            Self::SlightGpu | Self::GpuBottleneck => Some(ComponentType::Gpu),
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct BottleneckReport {
    pub bottleneck: Bottleneck,
    pub ratio: f64,
    /// How far past the category's threshold the ratio lies.
    pub magnitude_pct: f64,
    /// Under the benign margin: the limiting component is simply fully utilized.
    pub benign: bool,
}

impl BottleneckReport {
    /// A bottleneck worth an upgrade.
    pub fn is_significant(&self) -> bool {
        self.bottleneck != Bottleneck::None && !self.benign
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BottleneckDetector {
    benign_margin_pct: f64,
}

impl Default for BottleneckDetector {
    fn default() -> Self {
        Self::new(DEFAULT_BENIGN_MARGIN_PCT)
    }
}

impl BottleneckDetector {
    pub fn new(benign_margin_pct: f64) -> Self {
        Self { benign_margin_pct }
    }

    pub fn detect(
        &self,
        cpu: &ComponentRecord,
        gpu: &ComponentRecord,
        category: &GameCategory,
    ) -> Result<Bottleneck> {
        Ok(self.report(cpu, gpu, category)?.bottleneck)
    }

    /// Classify the pairing and measure the bottleneck.
    ///
    /// # Errors
    /// [`Error::MalformedComponent`] if either PassMark score is zero.
    pub fn report(
        &self,
        cpu: &ComponentRecord,
        gpu: &ComponentRecord,
        category: &GameCategory,
    ) -> Result<BottleneckReport> {
        let ratio = passmark_ratio(cpu, gpu)?;
        let bounds = &category.bottleneck;
        let lean = category.lean();

        let (bottleneck, magnitude_pct) = if ratio > bounds.cpu_bound {
            let severe = lean == Lean::Cpu || ratio > bounds.cpu_bound / ESCALATION;
            let kind = if severe {
                Bottleneck::CpuBottleneck
            } else {
                Bottleneck::SlightCpu
            };
            (kind, (ratio / bounds.cpu_bound - 1.0) * 100.0)
        } else if ratio < bounds.gpu_bound {
            let severe = lean == Lean::Gpu || ratio < bounds.gpu_bound * ESCALATION;
            let kind = if severe {
                Bottleneck::GpuBottleneck
            } else {
                Bottleneck::SlightGpu
            };
            (kind, (bounds.gpu_bound / ratio - 1.0) * 100.0)
        } else {
            (Bottleneck::None, 0.0)
        };

        Ok(BottleneckReport {
            bottleneck,
            ratio,
            magnitude_pct,
            benign: magnitude_pct < self.benign_margin_pct,
        })
    }
}

/// GPU/CPU PassMark ratio.
///
/// # Errors
/// [`Error::MalformedComponent`] instead of an infinite or zero ratio.
pub fn passmark_ratio(cpu: &ComponentRecord, gpu: &ComponentRecord) -> Result<f64> {
    for record in [cpu, gpu] {
        if record.passmark_score == 0 {
            return Err(Error::malformed(&record.name, "passmark_score must be positive"));
        }
    }
    Ok(f64::from(gpu.passmark_score) / f64::from(cpu.passmark_score))
}

/// Heuristic load per side, in percent.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utilization {
    pub cpu_pct: u8,
    pub gpu_pct: u8,
}

/// Start from the category's importance weights and shift load towards
/// whichever side the ratio says is working harder.
pub fn utilization(
    cpu: &ComponentRecord,
    gpu: &ComponentRecord,
    category: &GameCategory,
) -> Result<Utilization> {
    let ratio = passmark_ratio(cpu, gpu)?;
    let ideal = category.bottleneck.ideal_ratio;
    let (cpu_factor, gpu_factor) = if ratio > ideal * 1.2 {
        (1.2, 0.8)
    } else if ratio < ideal * 0.8 {
        (0.8, 1.2)
    } else {
        (1.0, 1.0)
    };
    let pct = |importance: f64, factor: f64| (importance * 100.0 * factor).round().min(100.0) as u8;
    Ok(Utilization {
        cpu_pct: pct(category.cpu_importance, cpu_factor),
        gpu_pct: pct(category.gpu_importance, gpu_factor),
    })
}
