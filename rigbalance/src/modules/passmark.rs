use anyhow::{anyhow, Context};
use chrono::{DateTime, Duration, Utc};
use rigbalance_core::component::{ComponentRecord, ComponentType};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError, DisplayFromStr, PickFirst};
use std::{convert::TryFrom, path::Path};

use crate::{common::IgnoreComma, filters::Segment, normalize};

/// One row of PassMark's CPU mega list.
///
/// Numbers arrive either as JSON numbers or as strings with thousands
/// separators; unparsable optional values are dropped rather than failing the row.
#[serde_as]
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RawCpu {
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<DisplayFromStr>)>>")]
    pub id: Option<u32>,
    pub name: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<IgnoreComma<u32>>)>>")]
    pub cpumark: Option<u32>,
    /// Single-thread mark.
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<IgnoreComma<u32>>)>>")]
    pub thread: Option<u32>,
    #[serde(default)]
    pub socket: String,
    #[serde(default)]
    pub cat: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<DisplayFromStr>)>>")]
    pub cores: Option<u32>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<DisplayFromStr>)>>")]
    pub logicals: Option<u32>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<IgnoreComma<f64>>)>>")]
    pub tdp: Option<f64>,
}

/// One row of PassMark's video card list.
#[serde_as]
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RawGpu {
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<DisplayFromStr>)>>")]
    pub id: Option<u32>,
    pub name: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<IgnoreComma<u32>>)>>")]
    pub g3d: Option<u32>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<IgnoreComma<u32>>)>>")]
    pub g2d: Option<u32>,
    /// VRAM in GB.
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<IgnoreComma<f64>>)>>")]
    pub memory_size: Option<f64>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<IgnoreComma<f64>>)>>")]
    pub tdp: Option<f64>,
    #[serde(default)]
    pub cat: String,
}

fn watts(tdp: Option<f64>) -> Option<u32> {
    tdp.filter(|w| w.is_finite() && *w > 0.0)
        .map(|w| w.round() as u32)
}

fn passmark_category(cat: &str) -> Option<&str> {
    (!cat.trim().is_empty()).then(|| cat)
}

/// A normalized record together with its market segment.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub record: ComponentRecord,
    pub segment: Segment,
}

impl TryFrom<RawCpu> for CatalogEntry {
    type Error = anyhow::Error;
    fn try_from(raw: RawCpu) -> anyhow::Result<Self> {
        let mark = raw
            .cpumark
            .filter(|m| *m > 0)
            .ok_or_else(|| anyhow!("CPU '{}' has no CPU Mark", raw.name))?;
        let normalized_score = normalize::normalized_score(ComponentType::Cpu, mark);
        let segment = Segment::classify(&raw.name, ComponentType::Cpu, passmark_category(&raw.cat));

        let mut record = ComponentRecord::new(
            raw.name,
            ComponentType::Cpu,
            mark,
            normalized_score,
            normalize::tier(normalized_score),
        );
        record.core_count = raw.cores;
        record.thread_count = raw.logicals;
        record.single_thread_rating = raw.thread;
        record.tdp_watts = watts(raw.tdp);
        Ok(Self { record, segment })
    }
}

impl TryFrom<RawGpu> for CatalogEntry {
    type Error = anyhow::Error;
    fn try_from(raw: RawGpu) -> anyhow::Result<Self> {
        let mark = raw
            .g3d
            .filter(|m| *m > 0)
            .ok_or_else(|| anyhow!("GPU '{}' has no G3D Mark", raw.name))?;
        let normalized_score = normalize::normalized_score(ComponentType::Gpu, mark);
        let segment = Segment::classify(&raw.name, ComponentType::Gpu, passmark_category(&raw.cat));

        let mut record = ComponentRecord::new(
            raw.name,
            ComponentType::Gpu,
            mark,
            normalized_score,
            normalize::tier(normalized_score),
        );
        record.memory_size_gb = raw.memory_size.filter(|gb| gb.is_finite() && *gb > 0.0);
        record.tdp_watts = watts(raw.tdp);
        Ok(Self { record, segment })
    }
}

/// A dump of both PassMark lists at one point in time.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cpus: Vec<RawCpu>,
    #[serde(default)]
    pub gpus: Vec<RawGpu>,
}

impl CatalogSnapshot {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        serde_json::from_str(s).context("could not parse catalog snapshot")
    }

    /// Read a snapshot file.
    ///
    /// # Errors
    /// Errors if the file can't be read or isn't a snapshot document.
    pub async fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("could not read catalog snapshot {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("could not parse catalog snapshot {}", path.display()))
    }

    /// How old the snapshot was at `now`, if it carries a timestamp.
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.generated_at.map(|at| now - at)
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogEntry, CatalogSnapshot};
    use crate::filters::Segment;
    use chrono::{Duration, TimeZone, Utc};
    use rigbalance_core::component::Tier;
    use std::convert::TryFrom;

    const SNAPSHOT: &str = r#"{
        "generated_at": "2024-05-01T00:00:00Z",
        "cpus": [
            {"id": "5031", "name": "AMD Ryzen 7 7700X", "cpumark": "36,012", "thread": "4,163",
             "socket": "AM5", "cat": "Desktop", "cores": "8", "logicals": "16", "tdp": "105"},
            {"id": 3, "name": "Mystery CPU", "cpumark": "NA", "cat": "Desktop"}
        ],
        "gpus": [
            {"id": "4759", "name": "GeForce RTX 4070", "g3d": 26914, "memory_size": "12", "tdp": "200", "cat": "Desktop"},
            {"name": "GeForce RTX 4060 Laptop GPU", "g3d": "17,030", "cat": "Mobile"}
        ]
    }"#;

    #[test]
    fn test_parse_snapshot() {
        let snapshot = CatalogSnapshot::from_json(SNAPSHOT).unwrap();
        assert_eq!(snapshot.cpus.len(), 2);
        assert_eq!(snapshot.cpus[0].cpumark, Some(36_012));
        assert_eq!(snapshot.cpus[0].id, Some(5031));
        assert_eq!(snapshot.cpus[0].tdp, Some(105.0));
        // unparsable marks don't fail the document
        assert_eq!(snapshot.cpus[1].cpumark, None);
        assert_eq!(snapshot.gpus[0].g3d, Some(26_914));
        assert_eq!(snapshot.gpus[1].g3d, Some(17_030));
    }

    #[test]
    fn test_rows_to_entries() {
        let snapshot = CatalogSnapshot::from_json(SNAPSHOT).unwrap();

        let cpu = CatalogEntry::try_from(snapshot.cpus[0].clone()).unwrap();
        assert_eq!(cpu.record.normalized_score, 92);
        assert_eq!(cpu.record.tier, Tier::Ultra);
        assert_eq!(cpu.record.core_count, Some(8));
        assert_eq!(cpu.record.single_thread_rating, Some(4_163));
        assert_eq!(cpu.record.tdp_watts, Some(105));
        assert_eq!(cpu.segment, Segment::Consumer);

        assert!(CatalogEntry::try_from(snapshot.cpus[1].clone()).is_err());

        let gpu = CatalogEntry::try_from(snapshot.gpus[0].clone()).unwrap();
        assert_eq!(gpu.record.normalized_score, 92);
        assert_eq!(gpu.record.memory_size_gb, Some(12.0));

        let laptop = CatalogEntry::try_from(snapshot.gpus[1].clone()).unwrap();
        assert_eq!(laptop.segment, Segment::Mobile);
    }

    #[test]
    fn test_age() {
        let snapshot = CatalogSnapshot::from_json(SNAPSHOT).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 31, 0, 0, 0).unwrap();
        assert_eq!(snapshot.age(now), Some(Duration::days(30)));
        assert_eq!(CatalogSnapshot::default().age(now), None);
    }
}
