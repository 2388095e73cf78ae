use serde::Deserialize;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

use super::{CategoryId, GameCategory};
use crate::error::{Error, Result};

const BUILTIN_CATEGORIES: &str = include_str!("default_categories.toml");

/// Tolerance for the weight sums.
const WEIGHT_EPSILON: f64 = 1e-6;

#[derive(Deserialize)]
struct CategoryTable {
    #[serde(rename = "category", default)]
    categories: Vec<GameCategory>,
}

/// The validated set of workload categories.
///
/// Construction is the only place the invariants are checked; a registry that
/// exists is consistent, so request-time code never re-validates weights.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRegistry {
    categories: Vec<GameCategory>,
}

impl CategoryRegistry {
    /// The table shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATEGORIES)
    }

    /// Parse a document made of `[[category]]` tables.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let table: CategoryTable = toml::from_str(s)?;
        Self::from_categories(table.categories)
    }

    /// Validate and order a set of categories.
    ///
    /// # Errors
    /// [`Error::ConfigurationInvariantViolation`] if a category is missing or duplicated,
    /// if importances don't sum to 1.0, if the overall weights don't sum to 1.0, or if
    /// any threshold is out of range.
    pub fn from_categories(categories: Vec<GameCategory>) -> Result<Self> {
        let mut ordered = Vec::with_capacity(CategoryId::ALL.len());
        for id in CategoryId::ALL {
            let mut matching = categories.iter().filter(|c| c.id == id);
            let category = matching
                .next()
                .ok_or_else(|| Error::invariant(format!("category '{}' is missing", id)))?;
            if matching.next().is_some() {
                return Err(Error::invariant(format!("category '{}' is defined twice", id)));
            }
            check_category(category)?;
            ordered.push(category.clone());
        }

        let weight_sum: f64 = ordered.iter().map(|c| c.weight_in_overall).sum();
        if (weight_sum - 1.0).abs() > WEIGHT_EPSILON {
            return Err(Error::invariant(format!(
                "weight_in_overall values sum to {}, expected 1.0",
                weight_sum
            )));
        }

        info!("Category registry loaded with {} categories", ordered.len());
        Ok(Self { categories: ordered })
    }

    /// Categories in their canonical order.
    pub fn categories(&self) -> &[GameCategory] {
        &self.categories
    }

    pub fn category(&self, id: CategoryId) -> Result<&GameCategory> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::InvalidCategory(id.to_string()))
    }

    /// Look a category up by its string id.
    pub fn category_named(&self, name: &str) -> Result<&GameCategory> {
        self.category(name.parse()?)
    }
}

fn check_category(category: &GameCategory) -> Result<()> {
    let id = category.id;
    let unit = |name: &str, value: f64| -> Result<()> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(Error::invariant(format!(
                "{}: {} = {} is outside [0, 1]",
                id, name, value
            )))
        }
    };
    unit("cpu_importance", category.cpu_importance)?;
    unit("gpu_importance", category.gpu_importance)?;
    unit("weight_in_overall", category.weight_in_overall)?;

    let importance = category.cpu_importance + category.gpu_importance;
    if (importance - 1.0).abs() > WEIGHT_EPSILON {
        return Err(Error::invariant(format!(
            "{}: cpu_importance + gpu_importance = {}, expected 1.0",
            id, importance
        )));
    }

    let minimum = &category.minimum;
    if minimum.cpu_score > 100 || minimum.gpu_score > 100 {
        return Err(Error::invariant(format!("{}: minimum scores must be within 0..=100", id)));
    }
    if let Some(memory) = minimum.gpu_memory_gb {
        if !memory.is_finite() || memory < 0.0 {
            return Err(Error::invariant(format!("{}: gpu_memory_gb must be non-negative", id)));
        }
    }
    if category.max_score_diff > 100 {
        return Err(Error::invariant(format!("{}: max_score_diff must be within 0..=100", id)));
    }
    if category.max_tier_diff > 3 {
        return Err(Error::invariant(format!("{}: max_tier_diff must be within 0..=3", id)));
    }

    let bounds = &category.bottleneck;
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !(positive(bounds.cpu_bound) && positive(bounds.gpu_bound) && positive(bounds.ideal_ratio))
    {
        return Err(Error::invariant(format!("{}: bottleneck ratios must be positive", id)));
    }
    if !(bounds.gpu_bound < bounds.ideal_ratio && bounds.ideal_ratio < bounds.cpu_bound) {
        return Err(Error::invariant(format!(
            "{}: expected gpu_bound < ideal_ratio < cpu_bound, got {} / {} / {}",
            id, bounds.gpu_bound, bounds.ideal_ratio, bounds.cpu_bound
        )));
    }

    Ok(())
}

/// Shared, swappable reference to the current registry.
///
/// Requests take one [`RegistryHandle::snapshot`] and use it throughout, so a
/// concurrent [`RegistryHandle::replace`] never shows them a half-updated table.
#[derive(Debug)]
pub struct RegistryHandle {
    current: RwLock<Arc<CategoryRegistry>>,
}

impl RegistryHandle {
    pub fn new(registry: CategoryRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    pub fn snapshot(&self) -> Arc<CategoryRegistry> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Publish a new registry, returning the one it replaced.
    pub fn replace(&self, registry: CategoryRegistry) -> Arc<CategoryRegistry> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        info!("Category registry replaced");
        std::mem::replace(&mut *current, Arc::new(registry))
    }
}
