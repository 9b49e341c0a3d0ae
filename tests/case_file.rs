use std::path::PathBuf;

use tennis_injury::case_file::CaseFile;
use tennis_injury::injury::RecommendationKind;
use tennis_injury::{AdjustError, InjuryAdjuster, InjuryRecord};

fn fixture() -> CaseFile {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/injury_case.json");
    CaseFile::load(&path).expect("fixture loads")
}

#[test]
fn fixture_batch_produces_reports_in_order() {
    let case = fixture();
    let ctx = case.match_context();
    let results = InjuryAdjuster::default().adjust_batch(&ctx, &case.injuries);
    assert_eq!(results.len(), 2);

    let first = results[0].as_ref().expect("first report");
    assert_eq!(first.match_id, 9001);
    assert_eq!(first.opponent_id, 102);
    assert!((first.after.injured - 0.45).abs() < 1e-12);
    assert!((first.after.opponent - 0.55).abs() < 1e-12);
    assert_eq!(first.confidence, 8);

    let second = results[1].as_ref().expect("second report");
    assert_eq!(second.opponent_id, 201);
    assert_eq!(second.before.injured, 0.5);
    assert_eq!(second.before.opponent, 0.5);
    assert!((second.adjustment - 0.03825).abs() < 1e-12);
    assert_eq!(second.confidence, 6);
    let kinds = second
        .recommendations
        .iter()
        .map(|r| r.kind)
        .collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![
            RecommendationKind::SeekMedicalValidation,
            RecommendationKind::ReduceServeLoad,
            RecommendationKind::ReviewTreatment,
        ]
    );
}

#[test]
fn batch_keeps_failures_in_place() {
    let case = fixture();
    let ctx = case.match_context();
    let mut injuries = case.injuries.clone();
    let mut stray: InjuryRecord = injuries[0].clone();
    stray.id = 3;
    stray.player_id = 202;
    injuries.insert(1, stray);

    let results = InjuryAdjuster::default().adjust_batch(&ctx, &injuries);
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(AdjustError::InvalidRelationship {
            player_id: 202,
            match_id: 9001
        })
    ));
    assert!(results[2].is_ok());
}

#[test]
fn fixture_names_resolve() {
    let case = fixture();
    assert_eq!(case.player_name(101), Some("Carlos Alcaraz"));
    assert_eq!(case.matches[1].best_of, 3);
}

#[test]
fn five_set_final_forecasts_five_sets() {
    let case = fixture();
    let ctx = case.match_context();
    let results = InjuryAdjuster::default().adjust_batch(&ctx, &case.injuries);

    let final_report = results[0].as_ref().expect("final report");
    assert_eq!(final_report.match_id, 9001);
    assert_eq!(final_report.evolution.per_set_impact.len(), 5);

    let semi_report = results[1].as_ref().expect("semi report");
    assert_eq!(semi_report.evolution.per_set_impact.len(), 3);
}
