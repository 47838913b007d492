//! Two-stage rating resolution: remote source first, static table second.
//!
//! [`RatingResolver::resolve`] always yields a rating. Remote failures of any
//! kind (transport, status, body, timeout) are logged and absorbed; callers
//! cannot tell which stage produced the value.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::{EntityId, Rating, RatingSource, RatingTable, DEFAULT_LOOKUP_TIMEOUT, DEFAULT_RATING};

#[derive(Clone)]
pub struct RatingResolver {
    remote: Option<Arc<dyn RatingSource>>,
    table: Arc<RatingTable>,
    default_rating: Rating,
    timeout: Duration,
}

impl RatingResolver {
    pub fn new(remote: Option<Arc<dyn RatingSource>>, table: Arc<RatingTable>) -> Self {
        RatingResolver {
            remote,
            table,
            default_rating: DEFAULT_RATING,
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_default_rating(mut self, rating: Rating) -> Self {
        self.default_rating = rating;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub async fn resolve(&self, id: &EntityId) -> Rating {
        match self.remote_rating(id).await {
            Some(rating) => rating,
            None => self.local_rating(id),
        }
    }

    async fn remote_rating(&self, id: &EntityId) -> Option<Rating> {
        let source = self.remote.as_ref()?;
        let fetched = tokio::time::timeout(self.timeout, source.fetch_rating(id)).await;
        match fetched {
            Ok(Ok(rating)) => {
                debug!("Rating for {} from {}: {}", id, source.name(), rating);
                Some(rating)
            }
            Ok(Err(e)) => {
                warn!("{} lookup for {} failed, using fallback: {}", source.name(), id, e);
                None
            }
            Err(_) => {
                warn!(
                    "{} lookup for {} timed out after {:?}, using fallback",
                    source.name(),
                    id,
                    self.timeout
                );
                None
            }
        }
    }

    fn local_rating(&self, id: &EntityId) -> Rating {
        match self.table.get(id) {
            Some(rating) => {
                debug!("Rating for {} from static table: {}", id, rating);
                rating
            }
            None => {
                debug!("No rating known for {}, defaulting to {}", id, self.default_rating);
                self.default_rating
            }
        }
    }
}
