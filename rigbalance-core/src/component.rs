use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt::Display, str::FromStr};

use crate::error::{Error, Result};

/// Upper bound on a plausible per-component TDP.
pub const MAX_TDP_WATTS: u32 = 2_000;

/// Which side of a pairing a component sits on.
#[derive(SerializeDisplay, DeserializeFromStr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Cpu,
    Gpu,
}

impl ComponentType {
    /// The type a recommendation for this component searches for.
    pub fn opposite(self) -> Self {
        match self {
            Self::Cpu => Self::Gpu,
            Self::Gpu => Self::Cpu,
        }
    }

    /// Only considers alphabetic characters, case-insensitively.
    pub fn from_abbreviation<S: AsRef<str>>(s: S) -> Option<Self> {
        match s
            .as_ref()
            .chars()
            .flat_map(char::to_lowercase)
            .filter(|c| c.is_alphabetic())
            .collect::<String>()
            .as_str()
        {
            "cpu" | "processor" => Some(Self::Cpu),
            "gpu" | "graphics" | "videocard" => Some(Self::Gpu),
            _ => None,
        }
    }
}

impl FromStr for ComponentType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::from_abbreviation(s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown component type '{}'", s)))
    }
}

impl Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Cpu => "CPU",
                Self::Gpu => "GPU",
            }
        )
    }
}

/// Coarse performance bucket, ordered `Low < Mid < High < Ultra`.
#[derive(
    SerializeDisplay, DeserializeFromStr, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Tier {
    Low,
    Mid,
    High,
    Ultra,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Low, Tier::Mid, Tier::High, Tier::Ultra];

    /// `low = 1` through `ultra = 4`.
    pub fn index(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Mid => 2,
            Self::High => 3,
            Self::Ultra => 4,
        }
    }

    /// Inverse of [`Tier::index`], clamping anything outside `1..=4`.
    pub fn from_index(index: i32) -> Self {
        match index {
            i32::MIN..=1 => Self::Low,
            2 => Self::Mid,
            3 => Self::High,
            _ => Self::Ultra,
        }
    }
}

impl FromStr for Tier {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "mid" | "medium" => Ok(Self::Mid),
            "high" => Ok(Self::High),
            "ultra" => Ok(Self::Ultra),
            _ => Err(Error::InvalidInput(format!("unknown tier '{}'", s))),
        }
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Low => "low",
                Self::Mid => "mid",
                Self::High => "high",
                Self::Ultra => "ultra",
            }
        )
    }
}

/// A resolved, normalized benchmark record.
///
/// Produced by the normalization pipeline and never mutated by the engine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ComponentRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ComponentType,
    pub passmark_score: u32,
    pub normalized_score: u8,
    pub tier: Tier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_count: Option<u32>,
    /// GPU VRAM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_size_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_thread_rating: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tdp_watts: Option<u32>,
}

impl ComponentRecord {
    /// A record with only the required fields set.
    pub fn new<S: Into<String>>(
        name: S,
        kind: ComponentType,
        passmark_score: u32,
        normalized_score: u8,
        tier: Tier,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            passmark_score,
            normalized_score,
            tier,
            core_count: None,
            thread_count: None,
            memory_size_gb: None,
            single_thread_rating: None,
            tdp_watts: None,
        }
    }

    /// Rejects records whose numeric fields can't be scored.
    ///
    /// # Errors
    /// [`Error::MalformedComponent`] for a zero PassMark score, a normalized score above 100,
    /// a negative/non-finite VRAM size, or a TDP above [`MAX_TDP_WATTS`].
    pub fn check(&self) -> Result<()> {
        if self.passmark_score == 0 {
            return Err(Error::malformed(&self.name, "passmark_score must be positive"));
        }
        if self.normalized_score > 100 {
            return Err(Error::malformed(
                &self.name,
                format!("normalized_score {} is outside 0..=100", self.normalized_score),
            ));
        }
        if let Some(watts) = self.tdp_watts {
            if watts > MAX_TDP_WATTS {
                return Err(Error::malformed(
                    &self.name,
                    format!("tdp_watts {} is above {}W", watts, MAX_TDP_WATTS),
                ));
            }
        }
        if let Some(memory) = self.memory_size_gb {
            if !memory.is_finite() || memory < 0.0 {
                return Err(Error::malformed(&self.name, "memory_size_gb must be non-negative"));
            }
        }
        Ok(())
    }

    /// Like [`ComponentRecord::check`], but also insists on the expected side.
    pub fn check_as(&self, kind: ComponentType) -> Result<()> {
        if self.kind != kind {
            return Err(Error::InvalidInput(format!(
                "'{}' is a {}, expected a {}",
                self.name, self.kind, kind
            )));
        }
        self.check()
    }
}

#[cfg(test)]
mod tests {
    use super::{ComponentRecord, ComponentType, Tier, MAX_TDP_WATTS};

    #[test]
    fn test_component_type_from_str() {
        assert_eq!("CPU".parse::<ComponentType>().unwrap(), ComponentType::Cpu);
        assert_eq!("gpu".parse::<ComponentType>().unwrap(), ComponentType::Gpu);
        assert_eq!(ComponentType::from_abbreviation("Video Card"), Some(ComponentType::Gpu));
        assert!("ram".parse::<ComponentType>().is_err());
        assert_eq!(ComponentType::Cpu.opposite(), ComponentType::Gpu);
    }

    #[test]
    fn test_tier_order_and_index() {
        assert!(Tier::Low < Tier::Mid && Tier::Mid < Tier::High && Tier::High < Tier::Ultra);
        for tier in Tier::ALL {
            assert_eq!(Tier::from_index(tier.index() as i32), tier);
        }
        assert_eq!(Tier::from_index(-2), Tier::Low);
        assert_eq!(Tier::from_index(9), Tier::Ultra);
        assert_eq!("Ultra".parse::<Tier>().unwrap(), Tier::Ultra);
        assert_eq!(Tier::High.to_string(), "high");
    }

    #[test]
    fn test_check_rejects_malformed() {
        let good = ComponentRecord::new("Ryzen 5 7600X", ComponentType::Cpu, 28_000, 92, Tier::Ultra);
        assert!(good.check().is_ok());

        let zero = ComponentRecord { passmark_score: 0, ..good.clone() };
        assert!(zero.check().is_err());

        let overflow = ComponentRecord { normalized_score: 101, ..good.clone() };
        assert!(overflow.check().is_err());

        let plausible = ComponentRecord { tdp_watts: Some(MAX_TDP_WATTS), ..good.clone() };
        assert!(plausible.check().is_ok());
        let runaway = ComponentRecord { tdp_watts: Some(u32::MAX), ..good.clone() };
        assert!(runaway.check().is_err());

        assert!(good.check_as(ComponentType::Gpu).is_err());
    }

    #[test]
    fn test_record_serde() {
        let json = r#"{"name":"RTX 4070","type":"GPU","passmark_score":26900,"normalized_score":92,"tier":"ultra","memory_size_gb":12.0}"#;
        let record: ComponentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.kind, ComponentType::Gpu);
        assert_eq!(record.tier, Tier::Ultra);
        assert_eq!(record.memory_size_gb, Some(12.0));
        assert_eq!(record.core_count, None);
    }
}
