use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use super::{canonicalize, EntityId, Rating};

/// Offline ratings shipped with the binary.
const BUILTIN_RATINGS: &[(&str, Rating)] = &[("BLADE", 1531.0), ("LAW", 1454.0)];

/// Immutable canonical-identifier → rating map used when the remote
/// lookup is unavailable or does not know an identifier.
#[derive(Debug, Clone, Default)]
pub struct RatingTable {
    ratings: HashMap<String, Rating>,
}

impl RatingTable {
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_RATINGS.iter().map(|(k, v)| (k.to_string(), *v)))
    }

    /// Build a table from arbitrary labels; keys are canonicalized, later
    /// duplicates win.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Rating)>,
    {
        let ratings = entries
            .into_iter()
            .map(|(k, v)| (canonicalize(&k), v))
            .collect();
        RatingTable { ratings }
    }

    /// Parse a JSON object of `{"LABEL": rating, ...}`.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let parsed: HashMap<String, Rating> =
            serde_json::from_str(raw).context("Ratings file must be a JSON object of numbers")?;
        Ok(Self::from_entries(parsed))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ratings file {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("Failed to parse ratings file {}", path.display()))
    }

    pub fn get(&self, id: &EntityId) -> Option<Rating> {
        self.ratings.get(id.as_str()).copied()
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }
}
