//! PassMark-backed component catalog for the pairing engine.

pub mod catalog;
pub mod common;
pub mod filters;
pub mod normalize;

pub mod modules {
    pub mod passmark;
}

pub use catalog::MemoryCatalog;
pub use rigbalance_core as engine;
