use std::collections::HashMap;

use crate::error::{AdjustError, Result};
use crate::model::{MatchId, PlayerId, PlayerSlot, TennisMatch};

/// Read access to the matches an injury can refer to.
pub trait MatchContext {
    fn participants(&self, match_id: MatchId) -> Result<(PlayerId, PlayerId)>;
    fn stored_probability(&self, match_id: MatchId, slot: PlayerSlot) -> Result<Option<f64>>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryMatches {
    matches: HashMap<MatchId, TennisMatch>,
}

impl InMemoryMatches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, m: TennisMatch) -> Result<()> {
        m.validate()?;
        self.matches.insert(m.id, m);
        Ok(())
    }

    pub fn get(&self, match_id: MatchId) -> Option<&TennisMatch> {
        self.matches.get(&match_id)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    fn require(&self, match_id: MatchId) -> Result<&TennisMatch> {
        self.matches
            .get(&match_id)
            .ok_or_else(|| AdjustError::MissingDependency(format!("match {match_id} not found")))
    }
}

impl FromIterator<TennisMatch> for InMemoryMatches {
    fn from_iter<I: IntoIterator<Item = TennisMatch>>(iter: I) -> Self {
        let matches = iter.into_iter().map(|m| (m.id, m)).collect();
        Self { matches }
    }
}

impl MatchContext for InMemoryMatches {
    fn participants(&self, match_id: MatchId) -> Result<(PlayerId, PlayerId)> {
        Ok(self.require(match_id)?.participants())
    }

    fn stored_probability(&self, match_id: MatchId, slot: PlayerSlot) -> Result<Option<f64>> {
        Ok(self.require(match_id)?.stored_probability(slot))
    }
}
