use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::matchup::Prediction;

/// What the form currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PredictionState {
    Idle,
    Resolving,
    Ready { prediction: Arc<Prediction> },
}

/// Ticket for one in-flight calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

struct Slot {
    generation: u64,
    state: PredictionState,
}

/// Last-result-wins holder for the transient prediction.
///
/// Every `begin` or `clear` bumps the generation; `complete` only lands if
/// its ticket is still current, so a slow lookup can never overwrite a
/// newer request or a cleared form.
#[derive(Clone)]
pub struct ResultHolder {
    inner: Arc<RwLock<Slot>>,
}

impl Default for ResultHolder {
    fn default() -> Self {
        ResultHolder {
            inner: Arc::new(RwLock::new(Slot {
                generation: 0,
                state: PredictionState::Idle,
            })),
        }
    }
}

impl ResultHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self) -> PredictionState {
        self.inner.read().await.state.clone()
    }

    /// Enter `Resolving` for a new request.
    pub async fn begin(&self) -> Generation {
        let mut slot = self.inner.write().await;
        slot.generation += 1;
        slot.state = PredictionState::Resolving;
        Generation(slot.generation)
    }

    /// Publish a finished prediction. Returns false if superseded.
    pub async fn complete(&self, ticket: Generation, prediction: Arc<Prediction>) -> bool {
        let mut slot = self.inner.write().await;
        if slot.generation != ticket.0 {
            return false;
        }
        slot.state = PredictionState::Ready { prediction };
        true
    }

    /// Back to `Idle`, discarding any in-flight result.
    pub async fn clear(&self) {
        let mut slot = self.inner.write().await;
        slot.generation += 1;
        slot.state = PredictionState::Idle;
    }
}
