use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::injury::InjuryRecord;
use crate::match_context::InMemoryMatches;
use crate::model::{Player, PlayerId, TennisMatch};

/// A self-contained snapshot of players, matches and injuries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseFile {
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub matches: Vec<TennisMatch>,
    #[serde(default)]
    pub injuries: Vec<InjuryRecord>,
}

impl CaseFile {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut case =
            serde_json::from_str::<CaseFile>(raw).context("parse injury case json")?;
        for m in &case.matches {
            m.validate()?;
        }
        for injury in &mut case.injuries {
            if let Some(m) = case.matches.iter().find(|m| m.id == injury.match_id) {
                injury.best_of = m.best_of;
            }
        }
        Ok(case)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read case file {}", path.display()))?;
        Self::parse(&raw)
    }

    pub fn match_context(&self) -> InMemoryMatches {
        self.matches.iter().cloned().collect()
    }

    pub fn player_name(&self, id: PlayerId) -> Option<&str> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.as_str())
    }
}
