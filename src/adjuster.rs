use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{AdjustError, Result};
use crate::injury::InjuryAssessment;
use crate::match_context::MatchContext;
use crate::model::{MatchId, PlayerId, PlayerSlot};
use crate::report::{AdjustmentReport, ProbabilityPair};

/// Constants of the injury heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjusterConfig {
    pub base_confidence: i32,
    pub validated_bonus: i32,
    pub treatment_bonus: i32,
    pub low_severity_penalty: i32,
    // Severities at or below this are treated as poorly characterised.
    pub low_severity_threshold: u8,
    pub confidence_min: u8,
    pub confidence_max: u8,
    pub injured_floor: f64,
    pub opponent_ceiling: f64,
    pub default_baseline: f64,
}

impl AdjusterConfig {
    /// Rejects bounds the heuristic cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.confidence_min > self.confidence_max {
            return Err(AdjustError::InvalidConfig(format!(
                "confidence_min {} exceeds confidence_max {}",
                self.confidence_min, self.confidence_max
            )));
        }
        for (name, value) in [
            ("injured_floor", self.injured_floor),
            ("opponent_ceiling", self.opponent_ceiling),
            ("default_baseline", self.default_baseline),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AdjustError::InvalidConfig(format!(
                    "{name} {value} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

impl Default for AdjusterConfig {
    fn default() -> Self {
        Self {
            base_confidence: 5,
            validated_bonus: 3,
            treatment_bonus: 2,
            low_severity_penalty: 1,
            low_severity_threshold: 2,
            confidence_min: 1,
            confidence_max: 10,
            injured_floor: 0.05,
            opponent_ceiling: 0.95,
            default_baseline: 0.5,
        }
    }
}

/// Where the two sides of an injury sit in its match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpponentResolution {
    pub injured_slot: PlayerSlot,
    pub opponent_slot: PlayerSlot,
    pub opponent_id: PlayerId,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InjuryAdjuster {
    cfg: AdjusterConfig,
}

impl InjuryAdjuster {
    pub fn new(cfg: AdjusterConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &AdjusterConfig {
        &self.cfg
    }

    pub fn adjust_for_injury<C, I>(&self, ctx: &C, injury: &I) -> Result<AdjustmentReport>
    where
        C: MatchContext + ?Sized,
        I: InjuryAssessment + ?Sized,
    {
        let match_id = injury.match_id();
        let injured_id = injury.injured_player_id();

        let participants = ctx.participants(match_id)?;
        let resolved = resolve_opponent(match_id, participants, injured_id).inspect_err(|err| {
            warn!(match_id, injured_id, "rejecting injury: {err}");
        })?;

        let before = ProbabilityPair {
            injured: ctx
                .stored_probability(match_id, resolved.injured_slot)?
                .unwrap_or(self.cfg.default_baseline),
            opponent: ctx
                .stored_probability(match_id, resolved.opponent_slot)?
                .unwrap_or(self.cfg.default_baseline),
        };

        let adjustment = injury.adjustment_magnitude()?;
        let impact = injury.performance_impact()?;
        let after = self.shift(before, adjustment);
        let evolution = injury.evolution_forecast()?;
        let recommendations = injury.recommendations()?;
        let confidence = self.compute_confidence(injury);

        debug!(
            match_id,
            injured_id,
            opponent_id = resolved.opponent_id,
            adjustment,
            before_injured = before.injured,
            after_injured = after.injured,
            before_opponent = before.opponent,
            after_opponent = after.opponent,
            confidence,
            "injury adjustment computed"
        );

        Ok(AdjustmentReport {
            match_id,
            injured_player_id: injured_id,
            opponent_id: resolved.opponent_id,
            before,
            after,
            adjustment,
            impact,
            evolution,
            recommendations,
            confidence,
        })
    }

    /// Moves `adjustment` from the injured player to the opponent.
    ///
    /// Each side is clamped on its own (floor for the injured player, ceiling for the
    /// opponent); the result is not renormalised.
    pub fn shift(&self, before: ProbabilityPair, adjustment: f64) -> ProbabilityPair {
        ProbabilityPair {
            injured: (before.injured - adjustment).max(self.cfg.injured_floor),
            opponent: (before.opponent + adjustment).min(self.cfg.opponent_ceiling),
        }
    }

    pub fn compute_confidence<I>(&self, injury: &I) -> u8
    where
        I: InjuryAssessment + ?Sized,
    {
        let cfg = &self.cfg;
        let mut score = cfg.base_confidence;
        if injury.is_medically_validated() {
            score += cfg.validated_bonus;
        }
        if injury.treatment_minutes() > 0 {
            score += cfg.treatment_bonus;
        }
        if injury.severity() <= cfg.low_severity_threshold {
            score -= cfg.low_severity_penalty;
        }
        score.clamp(i32::from(cfg.confidence_min), i32::from(cfg.confidence_max)) as u8
    }

    /// Adjusts every injury independently, in parallel. Output order matches input order.
    pub fn adjust_batch<C, I>(&self, ctx: &C, injuries: &[I]) -> Vec<Result<AdjustmentReport>>
    where
        C: MatchContext + Sync + ?Sized,
        I: InjuryAssessment + Sync,
    {
        injuries
            .par_iter()
            .map(|injury| self.adjust_for_injury(ctx, injury))
            .collect()
    }
}

pub fn adjust_for_injury<C, I>(ctx: &C, injury: &I) -> Result<AdjustmentReport>
where
    C: MatchContext + ?Sized,
    I: InjuryAssessment + ?Sized,
{
    InjuryAdjuster::default().adjust_for_injury(ctx, injury)
}

pub fn compute_confidence<I>(injury: &I) -> u8
where
    I: InjuryAssessment + ?Sized,
{
    InjuryAdjuster::default().compute_confidence(injury)
}

/// Finds the opponent of `injured_id`, failing when the player is not in the match.
pub fn resolve_opponent(
    match_id: MatchId,
    participants: (PlayerId, PlayerId),
    injured_id: PlayerId,
) -> Result<OpponentResolution> {
    let (p1, p2) = participants;
    if p1 == p2 {
        return Err(AdjustError::InvalidMatch(format!(
            "match {match_id} lists player {p1} in both slots"
        )));
    }
    let (injured_slot, opponent_id) = if injured_id == p1 {
        (PlayerSlot::One, p2)
    } else if injured_id == p2 {
        (PlayerSlot::Two, p1)
    } else {
        return Err(AdjustError::InvalidRelationship {
            player_id: injured_id,
            match_id,
        });
    };
    Ok(OpponentResolution {
        injured_slot,
        opponent_slot: injured_slot.other(),
        opponent_id,
    })
}

/// Runs `action` on a dedicated pool of `threads` workers, or inline if the pool
/// cannot be built.
pub fn with_batch_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
    {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}
