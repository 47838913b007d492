pub mod resolver;
pub mod source;
pub mod table;

pub use resolver::RatingResolver;
pub use source::{HttpRatingSource, RatingSource};
pub use table::RatingTable;

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Elo-style skill rating. Unbounded; integral in practice.
pub type Rating = f64;

/// Rating used when no source knows an identifier.
pub const DEFAULT_RATING: Rating = 1500.0;

/// Upper bound on one remote lookup, in milliseconds.
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 3000;

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(DEFAULT_LOOKUP_TIMEOUT_MS);

/// Canonical (trimmed, upper-case) competitor identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Normalize a free-text label. Returns `None` for blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let canonical = canonicalize(raw);
        if canonical.is_empty() {
            None
        } else {
            Some(EntityId(canonical))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Case-fold a label into its lookup-key form.
pub fn canonicalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}
