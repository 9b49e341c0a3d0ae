use serde::{Deserialize, Serialize};

use crate::injury::{EvolutionForecast, PerformanceImpact, Recommendation};
use crate::model::{MatchId, PlayerId};

/// Win probabilities of the injured player and the opponent, in [0, 1].
///
/// The two values are independent and do not have to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityPair {
    pub injured: f64,
    pub opponent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentReport {
    pub match_id: MatchId,
    pub injured_player_id: PlayerId,
    pub opponent_id: PlayerId,
    pub before: ProbabilityPair,
    pub after: ProbabilityPair,
    pub adjustment: f64,
    pub impact: PerformanceImpact,
    pub evolution: EvolutionForecast,
    pub recommendations: Vec<Recommendation>,
    pub confidence: u8,
}

impl AdjustmentReport {
    /// Probability points moved away from the injured player (after clamping).
    pub fn injured_delta(&self) -> f64 {
        self.after.injured - self.before.injured
    }

    pub fn opponent_delta(&self) -> f64 {
        self.after.opponent - self.before.opponent
    }
}
