//! System power draw, PSU sizing and energy cost.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    component::{ComponentRecord, ComponentType, Tier},
    error::{Error, Result},
};

const COMMON_PSU_WATTAGES: [u32; 8] = [450, 550, 650, 750, 850, 1000, 1200, 1500];

/// Idle draw of motherboard, memory and storage.
const IDLE_SYSTEM_WATTS: u32 = 30;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PowerSettings {
    /// PSU headroom on top of the total TDP.
    pub psu_overhead_percent: f64,
    /// Motherboard, memory, storage and fans.
    pub system_overhead_watts: u32,
    pub hours_per_day: f64,
    pub cost_per_kwh: f64,
}

impl Default for PowerSettings {
    fn default() -> Self {
        Self {
            psu_overhead_percent: 30.0,
            system_overhead_watts: 100,
            hours_per_day: 4.0,
            cost_per_kwh: 0.15,
        }
    }
}

impl PowerSettings {
    pub fn check(&self) -> Result<()> {
        let finite_non_negative = |v: f64| v.is_finite() && v >= 0.0;
        if !finite_non_negative(self.psu_overhead_percent) {
            return Err(Error::invariant("psu_overhead_percent must be non-negative"));
        }
        if !finite_non_negative(self.cost_per_kwh) {
            return Err(Error::invariant("cost_per_kwh must be non-negative"));
        }
        if !(finite_non_negative(self.hours_per_day) && self.hours_per_day <= 24.0) {
            return Err(Error::invariant("hours_per_day must lie in 0..=24"));
        }
        Ok(())
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HeatClass {
    Low,
    Medium,
    High,
    Extreme,
}

impl HeatClass {
    fn from_total(total_watts: u32) -> Self {
        match total_watts {
            0..=199 => Self::Low,
            200..=349 => Self::Medium,
            350..=499 => Self::High,
            _ => Self::Extreme,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EnergyCost {
    pub daily_kwh: f64,
    pub monthly_kwh: f64,
    pub yearly_kwh: f64,
    pub monthly_cost: f64,
    pub yearly_cost: f64,
    pub hours_per_day: f64,
    pub cost_per_kwh: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PowerAnalysis {
    pub cpu_tdp: u32,
    pub gpu_tdp: u32,
    /// Whether each TDP came from the record or was estimated.
    pub cpu_tdp_estimated: bool,
    pub gpu_tdp_estimated: bool,
    pub system_overhead: u32,
    pub total_tdp: u32,
    pub recommended_psu: u32,
    pub recommended_psu_range: String,
    pub heat_class: HeatClass,
    pub cooling_recommendation: &'static str,
    pub efficiency_rating: &'static str,
    pub estimated_idle_power: u32,
    pub estimated_gaming_power: u32,
    pub estimated_max_power: u32,
    pub energy_cost: EnergyCost,
}

/// Rough TDP for a record without one, from its tier and score.
pub fn estimate_tdp(component: &ComponentRecord) -> u32 {
    let score = component.normalized_score;
    let tdp = match component.kind {
        ComponentType::Cpu => {
            let base = match component.tier {
                Tier::Low => 35,
                Tier::Mid => 65,
                Tier::High => 105,
                Tier::Ultra => 125,
            };
            base + match score {
                81..=u8::MAX => 20,
                61..=80 => 10,
                _ => 0,
            }
        }
        ComponentType::Gpu => {
            let base = match component.tier {
                Tier::Low => 75,
                Tier::Mid => 150,
                Tier::High => 250,
                Tier::Ultra => 350,
            };
            base + match score {
                91..=u8::MAX => 50,
                71..=90 => 30,
                _ => 0,
            }
        }
    };
    debug!("Estimated TDP for '{}': {}W", component.name, tdp);
    tdp
}

/// Smallest common PSU wattage that covers `watts`.
pub fn round_to_common_psu(watts: u32) -> u32 {
    COMMON_PSU_WATTAGES
        .iter()
        .copied()
        .find(|&w| watts <= w)
        .unwrap_or(COMMON_PSU_WATTAGES[COMMON_PSU_WATTAGES.len() - 1])
}

fn cooling_recommendation(cpu_tdp: u32) -> &'static str {
    match cpu_tdp {
        0..=64 => "Stock cooler sufficient",
        65..=104 => "Good tower air cooler or 120mm AIO",
        105..=124 => "High-end tower cooler or 240mm AIO",
        125..=149 => "240-280mm AIO recommended",
        _ => "360mm AIO or custom loop recommended",
    }
}

fn efficiency_rating(psu_watts: u32) -> &'static str {
    match psu_watts {
        0..=550 => "80+ Bronze minimum, 80+ Gold recommended",
        551..=750 => "80+ Gold recommended",
        751..=1000 => "80+ Gold or 80+ Platinum recommended",
        _ => "80+ Platinum or 80+ Titanium recommended",
    }
}

/// `watts * percent / 100` without overflowing; never exceeds `watts` for `percent <= 100`.
fn percent_of(watts: u32, percent: u32) -> u32 {
    (u64::from(watts) * u64::from(percent) / 100) as u32
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn energy_cost(watts: u32, settings: &PowerSettings) -> EnergyCost {
    let daily_kwh = f64::from(watts) / 1000.0 * settings.hours_per_day;
    let monthly_kwh = daily_kwh * 30.0;
    let yearly_kwh = daily_kwh * 365.0;
    EnergyCost {
        daily_kwh: round2(daily_kwh),
        monthly_kwh: round2(monthly_kwh),
        yearly_kwh: round2(yearly_kwh),
        monthly_cost: round2(monthly_kwh * settings.cost_per_kwh),
        yearly_cost: round2(yearly_kwh * settings.cost_per_kwh),
        hours_per_day: settings.hours_per_day,
        cost_per_kwh: settings.cost_per_kwh,
    }
}

pub fn analyze_power(
    cpu: &ComponentRecord,
    gpu: &ComponentRecord,
    settings: &PowerSettings,
) -> PowerAnalysis {
    let tdp = |record: &ComponentRecord| match record.tdp_watts {
        Some(watts) if watts > 0 => (watts, false),
        _ => (estimate_tdp(record), true),
    };
    let (cpu_tdp, cpu_tdp_estimated) = tdp(cpu);
    let (gpu_tdp, gpu_tdp_estimated) = tdp(gpu);

    let total_tdp = cpu_tdp
        .saturating_add(gpu_tdp)
        .saturating_add(settings.system_overhead_watts);
    let with_headroom = f64::from(total_tdp) * (1.0 + settings.psu_overhead_percent / 100.0);
    let recommended_psu = round_to_common_psu(with_headroom as u32);
    // gaming load sits around 80% of the combined TDP
    let estimated_gaming_power = percent_of(total_tdp, 80);

    PowerAnalysis {
        cpu_tdp,
        gpu_tdp,
        cpu_tdp_estimated,
        gpu_tdp_estimated,
        system_overhead: settings.system_overhead_watts,
        total_tdp,
        recommended_psu,
        recommended_psu_range: format!(
            "{}-{}W",
            recommended_psu.saturating_sub(100).max(450),
            recommended_psu + 100
        ),
        heat_class: HeatClass::from_total(total_tdp),
        cooling_recommendation: cooling_recommendation(cpu_tdp),
        efficiency_rating: efficiency_rating(recommended_psu),
        estimated_idle_power: percent_of(cpu_tdp, 12)
            .saturating_add(gpu_tdp / 10)
            .saturating_add(IDLE_SYSTEM_WATTS),
        estimated_gaming_power,
        estimated_max_power: total_tdp,
        energy_cost: energy_cost(estimated_gaming_power, settings),
    }
}
