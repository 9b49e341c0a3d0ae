use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::info;

use crate::case_file::CaseFile;
use crate::config::app_cache_dir;
use crate::error::{AdjustError, Result};
use crate::injury::{BodyArea, InjuryId, InjuryRecord};
use crate::match_context::MatchContext;
use crate::model::{MatchId, Player, PlayerId, PlayerSlot, Surface, TennisMatch};
use crate::report::AdjustmentReport;

const DB_FILE: &str = "injuries.sqlite";

#[derive(Debug, Clone)]
pub struct StoredPrediction {
    pub prediction_id: i64,
    pub injury_id: InjuryId,
    pub after_injured: f64,
    pub after_opponent: f64,
    pub confidence: u8,
    pub created_at: String,
    pub report: AdjustmentReport,
}

pub struct SqliteStore {
    conn: Connection,
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(DB_FILE))
}

pub fn open_db(path: &Path) -> anyhow::Result<SqliteStore> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn).context("create sqlite schema")?;
    Ok(SqliteStore { conn })
}

pub fn open_in_memory() -> Result<SqliteStore> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(SqliteStore { conn })
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;
        CREATE TABLE IF NOT EXISTS players (
            player_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            ranking INTEGER NULL,
            country TEXT NULL
        );

        CREATE TABLE IF NOT EXISTS matches (
            match_id INTEGER PRIMARY KEY,
            player1_id INTEGER NOT NULL,
            player2_id INTEGER NOT NULL,
            probability_player1 REAL NULL,
            probability_player2 REAL NULL,
            winner_id INTEGER NULL,
            tournament TEXT NULL,
            round TEXT NULL,
            surface TEXT NULL,
            best_of INTEGER NOT NULL,
            scheduled_at TEXT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS injuries (
            injury_id INTEGER PRIMARY KEY,
            match_id INTEGER NOT NULL REFERENCES matches(match_id),
            player_id INTEGER NOT NULL,
            body_area TEXT NOT NULL,
            severity INTEGER NOT NULL,
            medically_validated INTEGER NOT NULL,
            treatment_minutes INTEGER NOT NULL,
            reported_at TEXT NULL,
            notes TEXT NULL
        );

        CREATE TABLE IF NOT EXISTS injury_predictions (
            prediction_id INTEGER PRIMARY KEY AUTOINCREMENT,
            injury_id INTEGER NOT NULL REFERENCES injuries(injury_id),
            match_id INTEGER NOT NULL,
            injured_player_id INTEGER NOT NULL,
            opponent_id INTEGER NOT NULL,
            before_injured REAL NOT NULL,
            before_opponent REAL NOT NULL,
            after_injured REAL NOT NULL,
            after_opponent REAL NOT NULL,
            adjustment REAL NOT NULL,
            confidence INTEGER NOT NULL,
            report_json TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Row counts written by [`SqliteStore::ingest_case`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub players: usize,
    pub matches: usize,
    pub injuries: usize,
}

impl SqliteStore {
    /// Writes a whole case file in one transaction. A failing row rolls back
    /// every row written before it.
    pub fn ingest_case(&mut self, case: &CaseFile) -> Result<IngestSummary> {
        let tx = self.conn.transaction()?;
        for player in &case.players {
            upsert_player(&tx, player)?;
        }
        for m in &case.matches {
            upsert_match(&tx, m)?;
        }
        for injury in &case.injuries {
            upsert_injury(&tx, injury)?;
        }
        tx.commit()?;

        let summary = IngestSummary {
            players: case.players.len(),
            matches: case.matches.len(),
            injuries: case.injuries.len(),
        };
        info!(
            players = summary.players,
            matches = summary.matches,
            injuries = summary.injuries,
            "ingested injury case"
        );
        Ok(summary)
    }

    pub fn upsert_player(&self, player: &Player) -> Result<()> {
        upsert_player(&self.conn, player)
    }

    pub fn load_player(&self, player_id: PlayerId) -> Result<Option<Player>> {
        let player = self
            .conn
            .query_row(
                "SELECT player_id, name, ranking, country FROM players WHERE player_id = ?1",
                params![player_id as i64],
                |row| {
                    Ok(Player {
                        id: row.get::<_, i64>(0)? as PlayerId,
                        name: row.get(1)?,
                        ranking: row.get::<_, Option<i64>>(2)?.map(|r| r as u32),
                        country: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(player)
    }

    pub fn upsert_match(&self, m: &TennisMatch) -> Result<()> {
        upsert_match(&self.conn, m)
    }

    pub fn load_match(&self, match_id: MatchId) -> Result<Option<TennisMatch>> {
        let m = self
            .conn
            .query_row(
                "SELECT match_id, player1_id, player2_id, probability_player1, probability_player2,
                    winner_id, tournament, round, surface, best_of, scheduled_at
                 FROM matches WHERE match_id = ?1",
                params![match_id as i64],
                match_from_row,
            )
            .optional()?;
        Ok(m)
    }

    pub fn upsert_injury(&self, injury: &InjuryRecord) -> Result<()> {
        upsert_injury(&self.conn, injury)
    }

    pub fn load_injury(&self, injury_id: InjuryId) -> Result<Option<InjuryRecord>> {
        let injury = self
            .conn
            .query_row(
                "SELECT i.injury_id, i.match_id, i.player_id, i.body_area, i.severity,
                    i.medically_validated, i.treatment_minutes, i.reported_at, i.notes, m.best_of
                 FROM injuries i JOIN matches m ON m.match_id = i.match_id
                 WHERE i.injury_id = ?1",
                params![injury_id as i64],
                injury_from_row,
            )
            .optional()?;
        Ok(injury)
    }

    pub fn injuries_for_match(&self, match_id: MatchId) -> Result<Vec<InjuryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT i.injury_id, i.match_id, i.player_id, i.body_area, i.severity,
                i.medically_validated, i.treatment_minutes, i.reported_at, i.notes, m.best_of
             FROM injuries i JOIN matches m ON m.match_id = i.match_id
             WHERE i.match_id = ?1 ORDER BY i.injury_id",
        )?;
        let rows = stmt.query_map(params![match_id as i64], injury_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Persists a computed report against the injury it was produced for.
    pub fn save_prediction(&self, injury_id: InjuryId, report: &AdjustmentReport) -> Result<i64> {
        let report_json = serde_json::to_string(report)?;
        self.conn.execute(
            "INSERT INTO injury_predictions(injury_id, match_id, injured_player_id, opponent_id,
                before_injured, before_opponent, after_injured, after_opponent, adjustment,
                confidence, report_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                injury_id as i64,
                report.match_id as i64,
                report.injured_player_id as i64,
                report.opponent_id as i64,
                report.before.injured,
                report.before.opponent,
                report.after.injured,
                report.after.opponent,
                report.adjustment,
                report.confidence as i64,
                report_json,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let prediction_id = self.conn.last_insert_rowid();
        info!(
            prediction_id,
            injury_id,
            match_id = report.match_id,
            "stored injury prediction"
        );
        Ok(prediction_id)
    }

    pub fn latest_prediction(&self, injury_id: InjuryId) -> Result<Option<StoredPrediction>> {
        let row = self
            .conn
            .query_row(
                "SELECT prediction_id, injury_id, after_injured, after_opponent, confidence,
                    created_at, report_json
                 FROM injury_predictions WHERE injury_id = ?1
                 ORDER BY prediction_id DESC LIMIT 1",
                params![injury_id as i64],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, f64>(2)?,
                        row.get::<_, f64>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .optional()?;
        let Some((prediction_id, injury_id, after_injured, after_opponent, confidence, created_at, raw)) =
            row
        else {
            return Ok(None);
        };
        let report = serde_json::from_str::<AdjustmentReport>(&raw)?;
        Ok(Some(StoredPrediction {
            prediction_id,
            injury_id: injury_id as InjuryId,
            after_injured,
            after_opponent,
            confidence: confidence as u8,
            created_at,
            report,
        }))
    }
}

impl MatchContext for SqliteStore {
    fn participants(&self, match_id: MatchId) -> Result<(PlayerId, PlayerId)> {
        let m = self.load_match(match_id)?.ok_or_else(|| {
            AdjustError::MissingDependency(format!("match {match_id} not found in store"))
        })?;
        Ok(m.participants())
    }

    fn stored_probability(&self, match_id: MatchId, slot: PlayerSlot) -> Result<Option<f64>> {
        let column = match slot {
            PlayerSlot::One => "probability_player1",
            PlayerSlot::Two => "probability_player2",
        };
        let sql = format!("SELECT {column} FROM matches WHERE match_id = ?1");
        let value = self
            .conn
            .query_row(&sql, params![match_id as i64], |row| {
                row.get::<_, Option<f64>>(0)
            })
            .optional()?;
        match value {
            Some(p) => Ok(p),
            None => Err(AdjustError::MissingDependency(format!(
                "match {match_id} not found in store"
            ))),
        }
    }
}

fn upsert_player(conn: &Connection, player: &Player) -> Result<()> {
    conn.execute(
        "INSERT INTO players(player_id, name, ranking, country)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(player_id) DO UPDATE SET
            name = excluded.name,
            ranking = excluded.ranking,
            country = excluded.country",
        params![
            player.id as i64,
            player.name,
            player.ranking.map(|r| r as i64),
            player.country,
        ],
    )?;
    Ok(())
}

fn upsert_match(conn: &Connection, m: &TennisMatch) -> Result<()> {
    m.validate()?;
    conn.execute(
        "INSERT INTO matches(match_id, player1_id, player2_id, probability_player1, probability_player2,
            winner_id, tournament, round, surface, best_of, scheduled_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
         ON CONFLICT(match_id) DO UPDATE SET
            player1_id = excluded.player1_id,
            player2_id = excluded.player2_id,
            probability_player1 = excluded.probability_player1,
            probability_player2 = excluded.probability_player2,
            winner_id = excluded.winner_id,
            tournament = excluded.tournament,
            round = excluded.round,
            surface = excluded.surface,
            best_of = excluded.best_of,
            scheduled_at = excluded.scheduled_at,
            updated_at = excluded.updated_at",
        params![
            m.id as i64,
            m.player1_id as i64,
            m.player2_id as i64,
            m.probability_player1,
            m.probability_player2,
            m.winner_id.map(|w| w as i64),
            m.tournament,
            m.round,
            m.surface.map(Surface::label),
            m.best_of as i64,
            m.scheduled_at.map(|t| t.to_rfc3339()),
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn upsert_injury(conn: &Connection, injury: &InjuryRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO injuries(injury_id, match_id, player_id, body_area, severity,
            medically_validated, treatment_minutes, reported_at, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(injury_id) DO UPDATE SET
            match_id = excluded.match_id,
            player_id = excluded.player_id,
            body_area = excluded.body_area,
            severity = excluded.severity,
            medically_validated = excluded.medically_validated,
            treatment_minutes = excluded.treatment_minutes,
            reported_at = excluded.reported_at,
            notes = excluded.notes",
        params![
            injury.id as i64,
            injury.match_id as i64,
            injury.player_id as i64,
            injury.body_area.label(),
            injury.severity as i64,
            injury.medically_validated,
            injury.treatment_minutes as i64,
            injury.reported_at.map(|t| t.to_rfc3339()),
            injury.notes,
        ],
    )?;
    Ok(())
}

fn match_from_row(row: &Row<'_>) -> rusqlite::Result<TennisMatch> {
    let surface = row.get::<_, Option<String>>(8)?;
    let scheduled_at = row.get::<_, Option<String>>(10)?;
    Ok(TennisMatch {
        id: row.get::<_, i64>(0)? as MatchId,
        player1_id: row.get::<_, i64>(1)? as PlayerId,
        player2_id: row.get::<_, i64>(2)? as PlayerId,
        probability_player1: row.get(3)?,
        probability_player2: row.get(4)?,
        winner_id: row.get::<_, Option<i64>>(5)?.map(|w| w as PlayerId),
        tournament: row.get(6)?,
        round: row.get(7)?,
        surface: surface.as_deref().and_then(Surface::parse),
        best_of: row.get::<_, i64>(9)? as u8,
        scheduled_at: scheduled_at.as_deref().and_then(parse_timestamp),
    })
}

fn injury_from_row(row: &Row<'_>) -> rusqlite::Result<InjuryRecord> {
    let body_area = row.get::<_, String>(3)?;
    let reported_at = row.get::<_, Option<String>>(7)?;
    Ok(InjuryRecord {
        id: row.get::<_, i64>(0)? as InjuryId,
        match_id: row.get::<_, i64>(1)? as MatchId,
        player_id: row.get::<_, i64>(2)? as PlayerId,
        body_area: BodyArea::parse(&body_area),
        severity: row.get::<_, i64>(4)?.clamp(0, u8::MAX as i64) as u8,
        medically_validated: row.get(5)?,
        treatment_minutes: row.get::<_, i64>(6)?.max(0) as u32,
        reported_at: reported_at.as_deref().and_then(parse_timestamp),
        notes: row.get(8)?,
        best_of: row.get::<_, i64>(9)? as u8,
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
