//! In-memory catalog serving the engine's lookup and scan traits.

use chrono::{DateTime, Duration, Utc};
use rigbalance_core::{
    catalog::{CatalogScan, ComponentLookup},
    component::{ComponentRecord, ComponentType},
};
use std::{collections::HashMap, convert::TryFrom, path::Path};
use tracing::{info, warn};

use crate::{
    common::normalize_name,
    filters::{ScanFilter, Segment},
    modules::passmark::{CatalogEntry, CatalogSnapshot},
};

/// Snapshots older than this are still served, with a warning.
pub const STALE_AFTER_DAYS: i64 = 30;

#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    entries: Vec<CatalogEntry>,
    /// (type, lowercase name) -> index
    by_name: HashMap<(ComponentType, String), usize>,
    /// (type, vendor-free name) -> index
    by_key: HashMap<(ComponentType, String), usize>,
    generated_at: Option<DateTime<Utc>>,
}

impl MemoryCatalog {
    /// Normalize every row of a snapshot. Rows without a usable mark are skipped.
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        let generated_at = snapshot.generated_at;
        let rows = snapshot.cpus.len() + snapshot.gpus.len();
        let entries = snapshot
            .cpus
            .into_iter()
            .map(CatalogEntry::try_from)
            .chain(snapshot.gpus.into_iter().map(CatalogEntry::try_from))
            .filter_map(|result| match result {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping catalog row: {}", e);
                    None
                }
            });

        let mut catalog = Self::from_entries(entries);
        catalog.generated_at = generated_at;
        info!(
            "Loaded {} of {} catalog rows ({} skipped)",
            catalog.len(),
            rows,
            rows - catalog.len()
        );
        catalog.warn_if_stale(Utc::now());
        catalog
    }

    /// Build a catalog from already-normalized records, segmenting them by name.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ComponentRecord>,
    {
        Self::from_entries(records.into_iter().map(|record| CatalogEntry {
            segment: Segment::classify(&record.name, record.kind, None),
            record,
        }))
    }

    fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = CatalogEntry>,
    {
        let mut catalog = Self::default();
        for entry in entries {
            if let Err(e) = entry.record.check() {
                warn!("Skipping catalog entry: {}", e);
                continue;
            }
            let kind = entry.record.kind;
            let name = (kind, entry.record.name.to_lowercase());
            if catalog.by_name.contains_key(&name) {
                warn!("Duplicate {} '{}' in catalog, keeping the first", kind, entry.record.name);
                continue;
            }
            let index = catalog.entries.len();
            catalog.by_name.insert(name, index);
            catalog
                .by_key
                .entry((kind, normalize_name(&entry.record.name)))
                .or_insert(index);
            catalog.entries.push(entry);
        }
        catalog
    }

    /// Read and normalize a snapshot file.
    pub async fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self::from_snapshot(CatalogSnapshot::load(path).await?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        self.generated_at
    }

    /// A snapshot without a timestamp is never considered stale.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.generated_at
            .map_or(false, |at| now - at > Duration::days(STALE_AFTER_DAYS))
    }

    fn warn_if_stale(&self, now: DateTime<Utc>) {
        if let (true, Some(at)) = (self.is_stale(now), self.generated_at) {
            warn!(
                "Catalog snapshot is {} days old (generated {}); scores may be outdated",
                (now - at).num_days(),
                at.to_rfc3339()
            );
        }
    }
}

impl ComponentLookup for MemoryCatalog {
    /// Exact name (case-insensitive) first, then the vendor-free key.
    fn find(&self, name: &str, kind: ComponentType) -> Option<ComponentRecord> {
        self.by_name
            .get(&(kind, name.trim().to_lowercase()))
            .or_else(|| self.by_key.get(&(kind, normalize_name(name))))
            .map(|&index| self.entries[index].record.clone())
    }
}

impl CatalogScan for MemoryCatalog {
    type Filter = ScanFilter;

    fn scan(&self, kind: ComponentType, filter: &ScanFilter) -> Vec<ComponentRecord> {
        self.entries
            .iter()
            .filter(|e| e.record.kind == kind && filter.admits(e.segment, &e.record))
            .map(|e| e.record.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryCatalog;
    use crate::{filters::ScanFilter, modules::passmark::CatalogSnapshot};
    use chrono::{Duration, Utc};
    use rigbalance_core::{
        catalog::{CatalogScan, ComponentLookup},
        component::{ComponentRecord, ComponentType, Tier},
    };
    use std::io::Write;

    fn records() -> Vec<ComponentRecord> {
        vec![
            ComponentRecord::new("AMD Ryzen 5 7600X", ComponentType::Cpu, 28_600, 92, Tier::Ultra),
            ComponentRecord::new("AMD Ryzen 5 7600X", ComponentType::Cpu, 1, 10, Tier::Low),
            ComponentRecord::new("GeForce RTX 4070", ComponentType::Gpu, 26_900, 92, Tier::Ultra),
            ComponentRecord::new("RTX 6000 Ada Generation", ComponentType::Gpu, 37_000, 100, Tier::Ultra),
            ComponentRecord::new("broken", ComponentType::Gpu, 0, 10, Tier::Low),
        ]
    }

    #[test]
    fn test_lookup() {
        let catalog = MemoryCatalog::from_records(records());
        // duplicate and malformed rows are dropped
        assert_eq!(catalog.len(), 3);

        let cpu = catalog.find("amd ryzen 5 7600x", ComponentType::Cpu).unwrap();
        assert_eq!(cpu.passmark_score, 28_600);
        let gpu = catalog.find("NVIDIA RTX 4070", ComponentType::Gpu).unwrap();
        assert_eq!(gpu.name, "GeForce RTX 4070");

        assert!(catalog.find("GeForce RTX 4070", ComponentType::Cpu).is_none());
        assert!(catalog.find("RTX 4090", ComponentType::Gpu).is_none());
    }

    #[test]
    fn test_scan_applies_filter() {
        let catalog = MemoryCatalog::from_records(records());
        let consumer = catalog.scan(ComponentType::Gpu, &ScanFilter::default());
        assert_eq!(consumer.len(), 1);
        assert_eq!(consumer[0].name, "GeForce RTX 4070");

        let filter = ScanFilter {
            include_workstation: true,
            ..ScanFilter::default()
        };
        assert_eq!(catalog.scan(ComponentType::Gpu, &filter).len(), 2);
    }

    #[test]
    fn test_staleness() {
        let mut snapshot = CatalogSnapshot::default();
        snapshot.generated_at = Some(Utc::now() - Duration::days(45));
        let catalog = MemoryCatalog::from_snapshot(snapshot);
        assert!(catalog.is_stale(Utc::now()));
        assert!(!catalog.is_stale(Utc::now() - Duration::days(20)));
        assert!(!MemoryCatalog::default().is_stale(Utc::now()));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "cpus": [{{"name": "Intel Core i5-12400F", "cpumark": "19,508", "cores": "6", "logicals": "12"}}],
                "gpus": [
                    {{"name": "Radeon RX 7600", "g3d": "11,034", "memory_size": "8"}},
                    {{"name": "No Mark GPU"}}
                ]
            }}"#
        )
        .unwrap();

        let catalog = MemoryCatalog::load(file.path()).await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.generated_at(), None);
        let cpu = catalog.find("Intel Core i5-12400F", ComponentType::Cpu).unwrap();
        assert_eq!(cpu.normalized_score, 65);
        assert_eq!(cpu.thread_count, Some(12));

        assert!(MemoryCatalog::load(file.path().with_extension("missing")).await.is_err());
    }
}
