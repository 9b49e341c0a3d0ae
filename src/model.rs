use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AdjustError, Result};

pub type PlayerId = u32;
pub type MatchId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub fn other(self) -> Self {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Hard,
    Clay,
    Grass,
    Carpet,
}

impl Surface {
    pub fn label(self) -> &'static str {
        match self {
            Surface::Hard => "hard",
            Surface::Clay => "clay",
            Surface::Grass => "grass",
            Surface::Carpet => "carpet",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hard" => Some(Surface::Hard),
            "clay" => Some(Surface::Clay),
            "grass" => Some(Surface::Grass),
            "carpet" => Some(Surface::Carpet),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub ranking: Option<u32>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TennisMatch {
    pub id: MatchId,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    // Stored pre-injury win probabilities, one per slot.
    #[serde(default)]
    pub probability_player1: Option<f64>,
    #[serde(default)]
    pub probability_player2: Option<f64>,
    #[serde(default)]
    pub winner_id: Option<PlayerId>,
    #[serde(default)]
    pub tournament: Option<String>,
    #[serde(default)]
    pub round: Option<String>,
    #[serde(default)]
    pub surface: Option<Surface>,
    #[serde(default = "default_best_of")]
    pub best_of: u8,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

pub(crate) fn default_best_of() -> u8 {
    3
}

impl TennisMatch {
    pub fn new(id: MatchId, player1_id: PlayerId, player2_id: PlayerId) -> Result<Self> {
        let out = Self {
            id,
            player1_id,
            player2_id,
            probability_player1: None,
            probability_player2: None,
            winner_id: None,
            tournament: None,
            round: None,
            surface: None,
            best_of: default_best_of(),
            scheduled_at: None,
        };
        out.validate()?;
        Ok(out)
    }

    pub fn with_probabilities(mut self, player1: Option<f64>, player2: Option<f64>) -> Self {
        self.probability_player1 = player1;
        self.probability_player2 = player2;
        self
    }

    /// Rejects matches whose two slots hold the same player, or whose stored
    /// baselines are not probabilities.
    pub fn validate(&self) -> Result<()> {
        if self.player1_id == self.player2_id {
            return Err(AdjustError::InvalidMatch(format!(
                "match {} lists player {} in both slots",
                self.id, self.player1_id
            )));
        }
        for (slot, value) in [
            (1, self.probability_player1),
            (2, self.probability_player2),
        ] {
            // NaN fails the range check too.
            if let Some(p) = value
                && !(0.0..=1.0).contains(&p)
            {
                return Err(AdjustError::InvalidMatch(format!(
                    "match {} has probability_player{slot} {p} outside [0, 1]",
                    self.id
                )));
            }
        }
        Ok(())
    }

    pub fn participants(&self) -> (PlayerId, PlayerId) {
        (self.player1_id, self.player2_id)
    }

    pub fn player_in(&self, slot: PlayerSlot) -> PlayerId {
        match slot {
            PlayerSlot::One => self.player1_id,
            PlayerSlot::Two => self.player2_id,
        }
    }

    pub fn slot_of(&self, player_id: PlayerId) -> Option<PlayerSlot> {
        if player_id == self.player1_id {
            Some(PlayerSlot::One)
        } else if player_id == self.player2_id {
            Some(PlayerSlot::Two)
        } else {
            None
        }
    }

    pub fn stored_probability(&self, slot: PlayerSlot) -> Option<f64> {
        match slot {
            PlayerSlot::One => self.probability_player1,
            PlayerSlot::Two => self.probability_player2,
        }
    }

    pub fn loser_id(&self) -> Result<PlayerId> {
        let Some(winner) = self.winner_id else {
            return Err(AdjustError::InvalidMatch(format!(
                "match {} has no recorded winner",
                self.id
            )));
        };
        match self.slot_of(winner) {
            Some(slot) => Ok(self.player_in(slot.other())),
            None => Err(AdjustError::InvalidRelationship {
                player_id: winner,
                match_id: self.id,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_player_in_both_slots_is_rejected() {
        let err = TennisMatch::new(1, 7, 7).unwrap_err();
        assert!(matches!(err, AdjustError::InvalidMatch(_)));
    }

    #[test]
    fn baselines_outside_unit_range_are_rejected() {
        let base = TennisMatch::new(1, 10, 20).unwrap();
        for (p1, p2) in [
            (Some(1.7), None),
            (None, Some(-0.1)),
            (Some(f64::NAN), Some(0.5)),
        ] {
            let m = base.clone().with_probabilities(p1, p2);
            assert!(
                matches!(m.validate(), Err(AdjustError::InvalidMatch(_))),
                "{p1:?}/{p2:?} accepted"
            );
        }

        let edges = base.with_probabilities(Some(0.0), Some(1.0));
        assert!(edges.validate().is_ok());
    }

    #[test]
    fn loser_is_the_other_participant() {
        let mut m = TennisMatch::new(1, 10, 20).unwrap();
        m.winner_id = Some(20);
        assert_eq!(m.loser_id().unwrap(), 10);
        m.winner_id = Some(10);
        assert_eq!(m.loser_id().unwrap(), 20);
    }

    #[test]
    fn loser_requires_a_recorded_winner() {
        let m = TennisMatch::new(1, 10, 20).unwrap();
        assert!(matches!(m.loser_id(), Err(AdjustError::InvalidMatch(_))));

        let mut m = m;
        m.winner_id = Some(99);
        assert!(matches!(
            m.loser_id(),
            Err(AdjustError::InvalidRelationship { player_id: 99, .. })
        ));
    }

    #[test]
    fn surface_parse_is_case_insensitive() {
        assert_eq!(Surface::parse(" Clay "), Some(Surface::Clay));
        assert_eq!(Surface::parse("ice"), None);
    }
}
