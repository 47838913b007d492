use chrono::{DateTime, Utc};
use futures_util::future::join;
use serde::Serialize;
use tracing::info;

use super::elo::{win_probability, Side};
use crate::rating::{EntityId, Rating, RatingResolver};

/// Outcome of one head-to-head calculation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub team_a: EntityId,
    pub team_b: EntityId,
    pub rating_a: Rating,
    pub rating_b: Rating,
    pub prob_a: f64,
    pub prob_b: f64,
    /// prob_a as a percentage, one decimal place
    pub pct_a: f64,
    /// prob_b as a percentage, one decimal place
    pub pct_b: f64,
    pub winner_side: Side,
    /// Canonical identifier of the likely winner
    pub winner: EntityId,
    pub computed_at: DateTime<Utc>,
}

impl Prediction {
    pub fn from_ratings(team_a: EntityId, rating_a: Rating, team_b: EntityId, rating_b: Rating) -> Self {
        let p = win_probability(rating_a, rating_b);
        let winner_side = p.likely_winner();
        let winner = match winner_side {
            Side::First => team_a.clone(),
            Side::Second => team_b.clone(),
        };
        Prediction {
            team_a,
            team_b,
            rating_a,
            rating_b,
            prob_a: p.prob_a,
            prob_b: p.prob_b,
            pct_a: as_percent(p.prob_a),
            pct_b: as_percent(p.prob_b),
            winner_side,
            winner,
            computed_at: Utc::now(),
        }
    }
}

fn as_percent(p: f64) -> f64 {
    (p * 1000.0).round() / 10.0
}

/// Both identifiers normalized, or `None` if either is blank.
pub fn matchup_ids(raw_a: &str, raw_b: &str) -> Option<(EntityId, EntityId)> {
    Some((EntityId::new(raw_a)?, EntityId::new(raw_b)?))
}

/// Resolve both ratings concurrently, then compute the prediction.
pub async fn predict_matchup(resolver: &RatingResolver, team_a: EntityId, team_b: EntityId) -> Prediction {
    let (rating_a, rating_b) = join(resolver.resolve(&team_a), resolver.resolve(&team_b)).await;
    let prediction = Prediction::from_ratings(team_a, rating_a, team_b, rating_b);
    info!(
        "Prediction {} ({}) vs {} ({}): {:.1}% / {:.1}%, winner {}",
        prediction.team_a,
        prediction.rating_a,
        prediction.team_b,
        prediction.rating_b,
        prediction.pct_a,
        prediction.pct_b,
        prediction.winner
    );
    prediction
}
