//! The two narrow interfaces the engine needs from whatever stores components.

use crate::component::{ComponentRecord, ComponentType};

/// Resolve an already-matched component name to its record.
pub trait ComponentLookup {
    fn find(&self, name: &str, kind: ComponentType) -> Option<ComponentRecord>;
}

/// Enumerate every record of one type.
///
/// The filter is opaque to the engine: it is handed through from the caller
/// untouched, so exclusions are entirely up to the catalog.
pub trait CatalogScan {
    type Filter;

    fn scan(&self, kind: ComponentType, filter: &Self::Filter) -> Vec<ComponentRecord>;
}

/// A plain list of records is the smallest possible catalog.
impl ComponentLookup for Vec<ComponentRecord> {
    fn find(&self, name: &str, kind: ComponentType) -> Option<ComponentRecord> {
        self.iter()
            .find(|r| r.kind == kind && r.name.eq_ignore_ascii_case(name.trim()))
            .cloned()
    }
}

impl CatalogScan for Vec<ComponentRecord> {
    type Filter = ();

    fn scan(&self, kind: ComponentType, _filter: &()) -> Vec<ComponentRecord> {
        self.iter().filter(|r| r.kind == kind).cloned().collect()
    }
}
