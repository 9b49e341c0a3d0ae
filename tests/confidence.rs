use tennis_injury::injury::BodyArea;
use tennis_injury::{AdjusterConfig, InjuryAdjuster, InjuryRecord, compute_confidence};

fn record(validated: bool, treatment_minutes: u32, severity: u8) -> InjuryRecord {
    InjuryRecord::new(1, 1, 10, BodyArea::Hamstring, severity)
        .validated(validated)
        .with_treatment_minutes(treatment_minutes)
}

#[test]
fn documented_scenarios() {
    assert_eq!(compute_confidence(&record(false, 0, 5)), 5);
    assert_eq!(compute_confidence(&record(true, 0, 5)), 8);
    assert_eq!(compute_confidence(&record(true, 30, 5)), 10);
    assert_eq!(compute_confidence(&record(true, 30, 1)), 9);
    assert_eq!(compute_confidence(&record(false, 0, 1)), 4);
}

#[test]
fn confidence_stays_in_range_for_every_combination() {
    for validated in [false, true] {
        for minutes in [0, 1, 30, 240] {
            for severity in 0..=u8::MAX {
                let c = compute_confidence(&record(validated, minutes, severity));
                assert!((1..=10).contains(&c), "confidence {c} out of range");
            }
        }
    }
}

#[test]
fn severity_threshold_is_inclusive() {
    assert_eq!(compute_confidence(&record(false, 0, 2)), 4);
    assert_eq!(compute_confidence(&record(false, 0, 3)), 5);
}

#[test]
fn custom_config_changes_the_heuristic() {
    let adjuster = InjuryAdjuster::new(AdjusterConfig {
        validated_bonus: 1,
        ..AdjusterConfig::default()
    })
    .expect("valid config");
    assert_eq!(adjuster.compute_confidence(&record(true, 0, 5)), 6);
    assert_eq!(adjuster.config().base_confidence, 5);
}
