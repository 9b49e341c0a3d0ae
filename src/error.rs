use thiserror::Error;

use crate::model::{MatchId, PlayerId};

#[derive(Error, Debug)]
pub enum AdjustError {
    /// The injured player does not take part in the referenced match.
    #[error("player {player_id} is not a participant of match {match_id}")]
    InvalidRelationship { player_id: PlayerId, match_id: MatchId },

    /// A value the adjustment needs could not be produced upstream.
    #[error("missing dependency: {0}")]
    MissingDependency(String),

    #[error("invalid match: {0}")]
    InvalidMatch(String),

    #[error("invalid adjuster config: {0}")]
    InvalidConfig(String),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AdjustError>;
