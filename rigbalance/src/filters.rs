//! Market segmentation and the scan filter built on it.

use lazy_static::lazy_static;
use regex::Regex;
use rigbalance_core::component::{ComponentRecord, ComponentType};
use serde::Deserialize;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt::Display, str::FromStr};

#[derive(SerializeDisplay, DeserializeFromStr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Consumer,
    Mobile,
    Workstation,
    Server,
}

impl Segment {
    /// Classify a part from its name, falling back on PassMark's own category
    /// field (e.g. `"Desktop"`, `"Laptop"`, `"Server"`) when the name is inconclusive.
    pub fn classify(name: &str, kind: ComponentType, passmark_category: Option<&str>) -> Self {
        let by_name = match kind {
            ComponentType::Cpu => Self::classify_cpu_name(&name.to_lowercase()),
            ComponentType::Gpu => Self::classify_gpu_name(&name.to_lowercase()),
        };
        match (by_name, passmark_category) {
            (Self::Consumer, Some(cat)) => Self::from_passmark_category(cat),
            (segment, _) => segment,
        }
    }

    fn classify_cpu_name(name: &str) -> Self {
        lazy_static! {
            static ref RE_APPLE: Regex = Regex::new(r"^(apple\b|m[1-4] )").unwrap();
            static ref RE_MOBILE_SUFFIX: Regex = Regex::new(r"\d+(hx|hs|hq|h|p|u)\b|(hx|hs|hq|u|p)@").unwrap();
        }
        const SERVER: [&str; 6] = ["epyc", "xeon", "opteron", "ampere altra", "graviton", "neoverse"];
        const MOBILE: [&str; 5] = ["mobile", "laptop", "ultra 5", "ultra 7", "ultra 9"];

        if name.contains("apple") || RE_APPLE.is_match(name) {
            Self::Mobile
        } else if SERVER.iter().any(|k| name.contains(k)) {
            Self::Server
        } else if name.contains("threadripper") {
            Self::Workstation
        } else if RE_MOBILE_SUFFIX.is_match(name) || MOBILE.iter().any(|k| name.contains(k)) {
            Self::Mobile
        } else {
            Self::Consumer
        }
    }

    fn classify_gpu_name(name: &str) -> Self {
        lazy_static! {
            static ref RE_OLD_MOBILE: Regex = Regex::new(r"\b(gtx|rtx)\s*\d{3,4}m\b").unwrap();
        }
        const SERVER: [&str; 5] = ["tesla", "a100", "h100", "a40", "a30"];
        const WORKSTATION: [&str; 12] = [
            "rtx pro",
            "rtx 6000",
            "rtx 5000",
            "rtx 4000",
            "rtx 4500",
            "rtx 3500",
            "quadro",
            "pro w",
            "ada generation",
            "radeon pro",
            "firepro",
            "ai pro",
        ];
        const MOBILE: [&str; 3] = ["mobile", "laptop", "max-q"];

        if SERVER.iter().any(|k| name.contains(k)) {
            Self::Server
        } else if WORKSTATION.iter().any(|k| name.contains(k)) {
            Self::Workstation
        } else if MOBILE.iter().any(|k| name.contains(k)) || RE_OLD_MOBILE.is_match(name) {
            Self::Mobile
        } else {
            Self::Consumer
        }
    }

    fn from_passmark_category(cat: &str) -> Self {
        let cat = cat.to_lowercase();
        if cat.is_empty() || cat.contains("desktop") {
            Self::Consumer
        } else if cat.contains("server") {
            Self::Server
        } else if cat.contains("laptop") || cat.contains("mobile") {
            Self::Mobile
        } else if cat.contains("workstation") {
            Self::Workstation
        } else {
            Self::Consumer
        }
    }
}

impl FromStr for Segment {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "consumer" | "desktop" => Ok(Self::Consumer),
            "mobile" | "laptop" => Ok(Self::Mobile),
            "workstation" => Ok(Self::Workstation),
            "server" => Ok(Self::Server),
            _ => anyhow::bail!("unknown segment '{}'", s),
        }
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Consumer => "consumer",
                Self::Mobile => "mobile",
                Self::Workstation => "workstation",
                Self::Server => "server",
            }
        )
    }
}

/// Which catalog entries a recommendation scan may consider.
///
/// The default admits desktop consumer parts only.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ScanFilter {
    pub include_workstation: bool,
    pub include_mobile: bool,
    pub include_server: bool,
    pub min_normalized_score: Option<u8>,
    pub max_tdp_watts: Option<u32>,
}

impl ScanFilter {
    pub fn admits(&self, segment: Segment, record: &ComponentRecord) -> bool {
        let segment_ok = match segment {
            Segment::Consumer => true,
            Segment::Workstation => self.include_workstation,
            Segment::Mobile => self.include_mobile,
            Segment::Server => self.include_server,
        };
        let score_ok = self
            .min_normalized_score
            .map_or(true, |min| record.normalized_score >= min);
        // parts without a known TDP are never excluded by the power cap
        let tdp_ok = match (self.max_tdp_watts, record.tdp_watts) {
            (Some(max), Some(tdp)) => tdp <= max,
            _ => true,
        };
        segment_ok && score_ok && tdp_ok
    }
}
