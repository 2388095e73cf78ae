//! CPU/GPU pairing engine: compatibility, balance, bottlenecks and recommendations.
//!
//! Everything here is pure computation over [`component::ComponentRecord`]s.
//! Resolving names and listing candidates is delegated to a catalog through
//! the traits in [`catalog`].

pub mod advisor;
pub mod analysis;
pub mod bottleneck;
pub mod catalog;
pub mod category;
pub mod component;
pub mod error;
pub mod estimate;
pub mod power;
pub mod recommend;
pub mod score;
pub mod settings;
pub mod validate;

pub use advisor::Advisor;
pub use error::{Error, Result};
