pub mod elo;
pub mod holder;
pub mod matchup;

pub use holder::{PredictionState, ResultHolder};
pub use matchup::{matchup_ids, predict_matchup};
