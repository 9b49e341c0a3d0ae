use std::path::PathBuf;

use anyhow::{Context, Result};

use tennis_injury::case_file::CaseFile;
use tennis_injury::cli_args::{positional_arg, value_arg};
use tennis_injury::{config, logging, store};

const DEFAULT_CASE: &str = "tests/fixtures/injury_case.json";

fn main() -> Result<()> {
    config::load_env_files();
    let cfg = config::app_config();
    logging::init_logging(cfg.log_filter.as_deref());

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let case_path = positional_arg(&args, &["--db"])
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CASE));
    let db_path = value_arg(&args, "--db")
        .map(PathBuf::from)
        .or_else(|| cfg.resolved_db_path())
        .context("unable to resolve sqlite path")?;

    let case = CaseFile::load(&case_path)?;
    let mut db = store::open_db(&db_path)?;
    let summary = db
        .ingest_case(&case)
        .with_context(|| format!("ingest {}", case_path.display()))?;

    println!("Injury ingest complete");
    println!("DB: {}", db_path.display());
    println!("Players upserted: {}", summary.players);
    println!("Matches upserted: {}", summary.matches);
    println!("Injuries upserted: {}", summary.injuries);
    Ok(())
}
