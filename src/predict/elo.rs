//! Logistic Elo expected-score model.
//!
//! Standard formula:
//!   P(A) = 1 / (1 + 10^((R_B − R_A) / 400))
//!   P(B) = 1 − P(A)
//!
//! P(B) is derived from P(A) rather than computed independently so the
//! pair always sums to exactly 1.0.
use serde::Serialize;

use crate::rating::Rating;

/// Rating difference that multiplies the odds by ten.
const ELO_SCALE: f64 = 400.0;

/// Which of the two named competitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    First,
    Second,
}

/// Win probabilities for a head-to-head pairing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WinProbability {
    pub prob_a: f64,
    pub prob_b: f64,
}

impl WinProbability {
    /// The side more likely to win. An exact 50/50 goes to the first-named
    /// side.
    pub fn likely_winner(&self) -> Side {
        if self.prob_a >= 0.5 {
            Side::First
        } else {
            Side::Second
        }
    }
}

/// Compute the head-to-head win probability pair from two ratings.
///
/// Total over finite inputs: extreme gaps saturate toward 0.0 / 1.0.
pub fn win_probability(rating_a: Rating, rating_b: Rating) -> WinProbability {
    let prob_a = 1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / ELO_SCALE));
    WinProbability {
        prob_a,
        prob_b: 1.0 - prob_a,
    }
}
