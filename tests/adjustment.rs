use tennis_injury::injury::{
    BodyArea, EvolutionForecast, PerformanceImpact, Recommendation, Trend,
};
use tennis_injury::model::{MatchId, PlayerId, TennisMatch};
use tennis_injury::{
    AdjustError, InMemoryMatches, InjuryAssessment, InjuryRecord, Result, adjust_for_injury,
};

/// Injury with a fixed adjustment magnitude, so probabilities can be checked exactly.
struct FixedInjury {
    match_id: MatchId,
    player_id: PlayerId,
    magnitude: f64,
}

impl InjuryAssessment for FixedInjury {
    fn match_id(&self) -> MatchId {
        self.match_id
    }
    fn injured_player_id(&self) -> PlayerId {
        self.player_id
    }
    fn severity(&self) -> u8 {
        5
    }
    fn is_medically_validated(&self) -> bool {
        false
    }
    fn treatment_minutes(&self) -> u32 {
        0
    }
    fn adjustment_magnitude(&self) -> Result<f64> {
        Ok(self.magnitude)
    }
    fn performance_impact(&self) -> Result<PerformanceImpact> {
        Ok(PerformanceImpact {
            serve: 0.0,
            return_game: 0.0,
            movement: 0.0,
            endurance: 0.0,
            overall: 0.0,
        })
    }
    fn evolution_forecast(&self) -> Result<EvolutionForecast> {
        Ok(EvolutionForecast {
            trend: Trend::Stable,
            per_set_impact: vec![0.0],
            recovery_days: None,
        })
    }
    fn recommendations(&self) -> Result<Vec<Recommendation>> {
        Ok(Vec::new())
    }
}

fn single_match(p1: Option<f64>, p2: Option<f64>) -> InMemoryMatches {
    let m = TennisMatch::new(1, 10, 20)
        .expect("valid match")
        .with_probabilities(p1, p2);
    [m].into_iter().collect()
}

#[test]
fn shifts_probability_from_injured_to_opponent() {
    let ctx = single_match(Some(0.6), Some(0.4));
    let injury = FixedInjury {
        match_id: 1,
        player_id: 10,
        magnitude: 0.15,
    };
    let report = adjust_for_injury(&ctx, &injury).expect("report");
    assert_eq!(report.opponent_id, 20);
    assert_eq!(report.before.injured, 0.6);
    assert_eq!(report.before.opponent, 0.4);
    assert!((report.after.injured - 0.45).abs() < 1e-12);
    assert!((report.after.opponent - 0.55).abs() < 1e-12);
    assert_eq!(report.adjustment, 0.15);
}

#[test]
fn baselines_follow_the_injured_players_slot() {
    // Player two is injured: its baseline comes from the second slot.
    let ctx = single_match(Some(0.7), Some(0.3));
    let injury = FixedInjury {
        match_id: 1,
        player_id: 20,
        magnitude: 0.1,
    };
    let report = adjust_for_injury(&ctx, &injury).expect("report");
    assert_eq!(report.opponent_id, 10);
    assert_eq!(report.before.injured, 0.3);
    assert_eq!(report.before.opponent, 0.7);
    assert!((report.after.injured - 0.2).abs() < 1e-12);
    assert!((report.after.opponent - 0.8).abs() < 1e-12);
}

#[test]
fn missing_baselines_default_to_even() {
    let ctx = single_match(None, Some(0.35));
    let injury = FixedInjury {
        match_id: 1,
        player_id: 10,
        magnitude: 0.0,
    };
    let report = adjust_for_injury(&ctx, &injury).expect("report");
    assert_eq!(report.before.injured, 0.5);
    assert_eq!(report.before.opponent, 0.35);
    assert_eq!(report.after, report.before);
}

#[test]
fn clamps_are_applied_per_side() {
    let ctx = single_match(Some(0.08), Some(0.9));
    let injury = FixedInjury {
        match_id: 1,
        player_id: 10,
        magnitude: 0.5,
    };
    let report = adjust_for_injury(&ctx, &injury).expect("report");
    assert_eq!(report.after.injured, 0.05);
    assert_eq!(report.after.opponent, 0.95);
}

#[test]
fn probabilities_are_not_renormalised() {
    let ctx = single_match(Some(0.3), Some(0.3));
    let injury = FixedInjury {
        match_id: 1,
        player_id: 10,
        magnitude: 0.1,
    };
    let report = adjust_for_injury(&ctx, &injury).expect("report");
    assert!((report.after.injured - 0.2).abs() < 1e-12);
    assert!((report.after.opponent - 0.4).abs() < 1e-12);
    assert!((report.after.injured + report.after.opponent - 0.6).abs() < 1e-12);
}

#[test]
fn clamp_bounds_hold_across_inputs() {
    let steps = [0.0, 0.01, 0.05, 0.1, 0.25, 0.5, 0.75, 0.9, 0.99, 1.0];
    for &p in &steps {
        for &q in &steps {
            for &a in &steps {
                let ctx = single_match(Some(p), Some(q));
                let injury = FixedInjury {
                    match_id: 1,
                    player_id: 10,
                    magnitude: a,
                };
                let report = adjust_for_injury(&ctx, &injury).expect("report");
                assert_eq!(report.after.injured, (p - a).max(0.05));
                assert_eq!(report.after.opponent, (q + a).min(0.95));
                assert!(report.after.injured >= 0.05);
                assert!(report.after.opponent <= 0.95);
                assert!((1..=10).contains(&report.confidence));
            }
        }
    }
}

#[test]
fn outsider_is_an_invalid_relationship() {
    let ctx = single_match(Some(0.6), Some(0.4));
    let injury = FixedInjury {
        match_id: 1,
        player_id: 99,
        magnitude: 0.1,
    };
    let err = adjust_for_injury(&ctx, &injury).expect_err("outsider must fail");
    assert!(matches!(
        err,
        AdjustError::InvalidRelationship {
            player_id: 99,
            match_id: 1
        }
    ));
}

#[test]
fn unknown_match_is_a_missing_dependency() {
    let ctx = single_match(Some(0.6), Some(0.4));
    let injury = FixedInjury {
        match_id: 404,
        player_id: 10,
        magnitude: 0.1,
    };
    let err = adjust_for_injury(&ctx, &injury).expect_err("unknown match must fail");
    assert!(matches!(err, AdjustError::MissingDependency(_)));
}

#[test]
fn heuristic_record_end_to_end() {
    let ctx = single_match(Some(0.6), Some(0.4));
    let injury = InjuryRecord::new(7, 1, 10, BodyArea::Knee, 5).validated(true);
    let before = injury.clone();

    let report = adjust_for_injury(&ctx, &injury).expect("report");
    assert!((report.adjustment - 0.15).abs() < 1e-12);
    assert!((report.after.injured - 0.45).abs() < 1e-12);
    assert!((report.after.opponent - 0.55).abs() < 1e-12);
    assert_eq!(report.confidence, 8);
    assert_eq!(report.evolution.trend, Trend::Stable);
    assert_eq!(report.evolution.recovery_days, Some(13));
    assert!(!report.recommendations.is_empty());
    assert_eq!(injury, before);
}

#[test]
fn off_scale_severity_propagates() {
    let ctx = single_match(Some(0.6), Some(0.4));
    let injury = InjuryRecord::new(7, 1, 10, BodyArea::Knee, 0);
    let err = adjust_for_injury(&ctx, &injury).expect_err("severity 0 must fail");
    assert!(matches!(err, AdjustError::MissingDependency(_)));
}
