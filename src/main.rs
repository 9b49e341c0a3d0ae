use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing::warn;

use tennis_injury::adjuster::{InjuryAdjuster, with_batch_pool};
use tennis_injury::case_file::CaseFile;
use tennis_injury::cli_args::{positional_arg, value_arg};
use tennis_injury::report::AdjustmentReport;
use tennis_injury::{config, export, logging, store};

const DEFAULT_CASE: &str = "tests/fixtures/injury_case.json";
const VALUE_FLAGS: &[&str] = &["--db", "--injury", "--export"];

fn main() -> Result<()> {
    config::load_env_files();
    let cfg = config::app_config();
    logging::init_logging(cfg.log_filter.as_deref());

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let as_json = args.iter().any(|a| a == "--json");
    let adjuster = InjuryAdjuster::default();

    let (reports, names) = if let Some(raw_id) = value_arg(&args, "--injury") {
        let injury_id = raw_id
            .trim()
            .parse::<u64>()
            .with_context(|| format!("invalid injury id {raw_id:?}"))?;
        let db_path = value_arg(&args, "--db")
            .map(PathBuf::from)
            .or_else(|| cfg.resolved_db_path())
            .context("unable to resolve sqlite path")?;
        let db = store::open_db(&db_path)?;
        let injury = db
            .load_injury(injury_id)?
            .ok_or_else(|| anyhow!("injury {injury_id} not found in {}", db_path.display()))?;
        let report = adjuster.adjust_for_injury(&db, &injury)?;
        db.save_prediction(injury_id, &report)?;

        let mut names = Vec::new();
        for id in [report.injured_player_id, report.opponent_id] {
            if let Some(p) = db.load_player(id)? {
                names.push((id, p.name));
            }
        }
        (vec![report], names)
    } else {
        let path = positional_arg(&args, VALUE_FLAGS)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CASE));
        let case = CaseFile::load(&path)?;
        let ctx = case.match_context();
        let results = with_batch_pool(cfg.batch_threads, || {
            adjuster.adjust_batch(&ctx, &case.injuries)
        });

        let mut reports = Vec::with_capacity(results.len());
        for (injury, result) in case.injuries.iter().zip(results) {
            match result {
                Ok(report) => reports.push(report),
                Err(err) => {
                    warn!(injury_id = injury.id, "injury skipped: {err}");
                    eprintln!("injury {}: {err}", injury.id);
                }
            }
        }
        let names = case
            .players
            .iter()
            .map(|p| (p.id, p.name.clone()))
            .collect::<Vec<_>>();
        (reports, names)
    };

    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&reports).context("serialize reports")?
        );
    } else {
        for report in &reports {
            print_report(report, &names);
        }
    }

    if let Some(raw) = value_arg(&args, "--export") {
        let mut path = PathBuf::from(raw);
        if path.is_relative()
            && let Some(dir) = cfg.export_dir.as_ref()
        {
            path = dir.join(path);
        }
        let summary = export::export_reports(&path, &reports)?;
        println!(
            "Exported {} reports ({} recommendations) to {}",
            summary.reports,
            summary.recommendations,
            path.display()
        );
    }

    Ok(())
}

fn print_report(report: &AdjustmentReport, names: &[(u32, String)]) {
    let name = |id: u32| {
        names
            .iter()
            .find(|(pid, _)| *pid == id)
            .map(|(_, n)| n.clone())
            .unwrap_or_else(|| format!("#{id}"))
    };
    println!(
        "Match {}: {} (injured) vs {}",
        report.match_id,
        name(report.injured_player_id),
        name(report.opponent_id)
    );
    println!(
        "  Injured:  {:.1}% -> {:.1}% ({:+.1} pts)",
        report.before.injured * 100.0,
        report.after.injured * 100.0,
        report.injured_delta() * 100.0
    );
    println!(
        "  Opponent: {:.1}% -> {:.1}% ({:+.1} pts)",
        report.before.opponent * 100.0,
        report.after.opponent * 100.0,
        report.opponent_delta() * 100.0
    );
    println!("  Adjustment: {:.3}", report.adjustment);
    println!(
        "  Impact: serve {:.2} return {:.2} movement {:.2} endurance {:.2}",
        report.impact.serve,
        report.impact.return_game,
        report.impact.movement,
        report.impact.endurance
    );
    println!("  Trend: {:?}", report.evolution.trend);
    println!("  Confidence: {}/10", report.confidence);
    for rec in &report.recommendations {
        println!("   - {}", rec.message);
    }
}
