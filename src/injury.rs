use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AdjustError, Result};
use crate::model::{MatchId, PlayerId, TennisMatch, default_best_of};

pub type InjuryId = u64;

pub const SEVERITY_MIN: u8 = 1;
pub const SEVERITY_MAX: u8 = 10;

const MAX_MAGNITUDE: f64 = 0.30;
const UNVALIDATED_DISCOUNT: f64 = 0.75;
const FORECAST_SET_STEP: f64 = 0.10;
const LONG_TREATMENT_MINUTES: u32 = 10;
const WITHDRAWAL_SEVERITY: u8 = 8;

/// Everything the adjuster reads from an injury record.
///
/// The four derived calculations are opaque to the adjuster: it only forwards
/// their output into the report and propagates their failures.
pub trait InjuryAssessment {
    fn match_id(&self) -> MatchId;
    fn injured_player_id(&self) -> PlayerId;
    fn severity(&self) -> u8;
    fn is_medically_validated(&self) -> bool;
    fn treatment_minutes(&self) -> u32;

    fn adjustment_magnitude(&self) -> Result<f64>;
    fn performance_impact(&self) -> Result<PerformanceImpact>;
    fn evolution_forecast(&self) -> Result<EvolutionForecast>;
    fn recommendations(&self) -> Result<Vec<Recommendation>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyArea {
    Ankle,
    Knee,
    Hamstring,
    Foot,
    Back,
    Abdominal,
    Shoulder,
    Elbow,
    Wrist,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRegion {
    Lower,
    Trunk,
    Upper,
    Unspecified,
}

/// Relative damage of an injury to each part of a player's game, in [0, 1].
#[derive(Debug, Clone, Copy)]
struct StrokeProfile {
    serve: f64,
    return_game: f64,
    movement: f64,
    endurance: f64,
}

impl BodyArea {
    pub fn label(self) -> &'static str {
        match self {
            BodyArea::Ankle => "ankle",
            BodyArea::Knee => "knee",
            BodyArea::Hamstring => "hamstring",
            BodyArea::Foot => "foot",
            BodyArea::Back => "back",
            BodyArea::Abdominal => "abdominal",
            BodyArea::Shoulder => "shoulder",
            BodyArea::Elbow => "elbow",
            BodyArea::Wrist => "wrist",
            BodyArea::Other => "other",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ankle" => BodyArea::Ankle,
            "knee" => BodyArea::Knee,
            "hamstring" | "thigh" => BodyArea::Hamstring,
            "foot" | "heel" => BodyArea::Foot,
            "back" | "lower back" => BodyArea::Back,
            "abdominal" | "abs" | "core" => BodyArea::Abdominal,
            "shoulder" => BodyArea::Shoulder,
            "elbow" => BodyArea::Elbow,
            "wrist" | "hand" => BodyArea::Wrist,
            _ => BodyArea::Other,
        }
    }

    pub fn region(self) -> BodyRegion {
        match self {
            BodyArea::Ankle | BodyArea::Knee | BodyArea::Hamstring | BodyArea::Foot => {
                BodyRegion::Lower
            }
            BodyArea::Back | BodyArea::Abdominal => BodyRegion::Trunk,
            BodyArea::Shoulder | BodyArea::Elbow | BodyArea::Wrist => BodyRegion::Upper,
            BodyArea::Other => BodyRegion::Unspecified,
        }
    }

    fn magnitude_weight(self) -> f64 {
        match self.region() {
            BodyRegion::Lower => 1.0,
            BodyRegion::Trunk => 0.9,
            BodyRegion::Upper => 0.85,
            BodyRegion::Unspecified => 0.6,
        }
    }

    fn profile(self) -> StrokeProfile {
        let (serve, return_game, movement, endurance) = match self {
            BodyArea::Ankle | BodyArea::Knee | BodyArea::Foot => (0.3, 0.6, 1.0, 0.5),
            BodyArea::Hamstring => (0.4, 0.5, 0.9, 0.6),
            BodyArea::Back => (0.9, 0.5, 0.6, 0.6),
            BodyArea::Abdominal => (1.0, 0.4, 0.5, 0.5),
            BodyArea::Shoulder => (1.0, 0.6, 0.2, 0.3),
            BodyArea::Elbow => (0.8, 0.7, 0.1, 0.3),
            BodyArea::Wrist => (0.6, 0.9, 0.1, 0.2),
            BodyArea::Other => (0.4, 0.4, 0.4, 0.4),
        };
        StrokeProfile {
            serve,
            return_game,
            movement,
            endurance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceImpact {
    pub serve: f64,
    #[serde(rename = "return")]
    pub return_game: f64,
    pub movement: f64,
    pub endurance: f64,
    pub overall: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Worsening,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionForecast {
    pub trend: Trend,
    // Expected overall impact for the current set and the ones after it.
    pub per_set_impact: Vec<f64>,
    #[serde(default)]
    pub recovery_days: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    SeekMedicalValidation,
    ConsiderWithdrawal,
    MonitorMobility,
    ReduceServeLoad,
    ReviewTreatment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuryRecord {
    pub id: InjuryId,
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub body_area: BodyArea,
    pub severity: u8,
    #[serde(default)]
    pub medically_validated: bool,
    #[serde(default)]
    pub treatment_minutes: u32,
    #[serde(default)]
    pub reported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    // Format of the match the injury belongs to; bounds the set forecast.
    #[serde(default = "default_best_of")]
    pub best_of: u8,
}

impl InjuryRecord {
    pub fn new(
        id: InjuryId,
        match_id: MatchId,
        player_id: PlayerId,
        body_area: BodyArea,
        severity: u8,
    ) -> Self {
        Self {
            id,
            match_id,
            player_id,
            body_area,
            severity,
            medically_validated: false,
            treatment_minutes: 0,
            reported_at: None,
            notes: None,
            best_of: default_best_of(),
        }
    }

    /// Takes the match format from the match the injury was reported in.
    pub fn in_match(mut self, m: &TennisMatch) -> Self {
        self.best_of = m.best_of;
        self
    }

    pub fn validated(mut self, validated: bool) -> Self {
        self.medically_validated = validated;
        self
    }

    pub fn with_treatment_minutes(mut self, minutes: u32) -> Self {
        self.treatment_minutes = minutes;
        self
    }

    /// Severity as a fraction of the scale, or an error when it is off the scale.
    fn severity_fraction(&self) -> Result<f64> {
        if !(SEVERITY_MIN..=SEVERITY_MAX).contains(&self.severity) {
            return Err(AdjustError::MissingDependency(format!(
                "injury {} severity {} is outside {SEVERITY_MIN}..={SEVERITY_MAX}",
                self.id, self.severity
            )));
        }
        Ok(self.severity as f64 / SEVERITY_MAX as f64)
    }

    fn trend(&self) -> Trend {
        if self.severity >= 7 && self.treatment_minutes == 0 {
            Trend::Worsening
        } else if self.treatment_minutes > 0 && self.severity <= 4 {
            Trend::Improving
        } else {
            Trend::Stable
        }
    }
}

impl InjuryAssessment for InjuryRecord {
    fn match_id(&self) -> MatchId {
        self.match_id
    }

    fn injured_player_id(&self) -> PlayerId {
        self.player_id
    }

    fn severity(&self) -> u8 {
        self.severity
    }

    fn is_medically_validated(&self) -> bool {
        self.medically_validated
    }

    fn treatment_minutes(&self) -> u32 {
        self.treatment_minutes
    }

    fn adjustment_magnitude(&self) -> Result<f64> {
        let mut a = self.severity_fraction()? * MAX_MAGNITUDE * self.body_area.magnitude_weight();
        if !self.medically_validated {
            a *= UNVALIDATED_DISCOUNT;
        }
        Ok(clamp(a, 0.0, MAX_MAGNITUDE))
    }

    fn performance_impact(&self) -> Result<PerformanceImpact> {
        let s = self.severity_fraction()?;
        let p = self.body_area.profile();
        let serve = s * p.serve;
        let return_game = s * p.return_game;
        let movement = s * p.movement;
        let endurance = s * p.endurance;
        Ok(PerformanceImpact {
            serve,
            return_game,
            movement,
            endurance,
            overall: (serve + return_game + movement + endurance) / 4.0,
        })
    }

    fn evolution_forecast(&self) -> Result<EvolutionForecast> {
        let base = self.performance_impact()?.overall;
        let trend = self.trend();
        let step = match trend {
            Trend::Improving => -FORECAST_SET_STEP,
            Trend::Stable => 0.0,
            Trend::Worsening => FORECAST_SET_STEP,
        };
        let per_set_impact = (0..self.best_of.max(1))
            .map(|k| clamp(base * (1.0 + step * k as f64), 0.0, 1.0))
            .collect();

        // Only a validated diagnosis gives a usable recovery horizon.
        let recovery_days = self.medically_validated.then(|| {
            let sev = self.severity as u32;
            (sev * sev).div_ceil(2)
        });

        Ok(EvolutionForecast {
            trend,
            per_set_impact,
            recovery_days,
        })
    }

    fn recommendations(&self) -> Result<Vec<Recommendation>> {
        self.severity_fraction()?;
        let area = self.body_area.label();
        let mut out = Vec::new();

        if !self.medically_validated {
            out.push(Recommendation {
                kind: RecommendationKind::SeekMedicalValidation,
                message: format!("Request a medical assessment of the {area} injury"),
            });
        }
        if self.severity >= WITHDRAWAL_SEVERITY {
            out.push(Recommendation {
                kind: RecommendationKind::ConsiderWithdrawal,
                message: format!(
                    "Severity {} {area} injury: consider retiring from the match",
                    self.severity
                ),
            });
        }
        match self.body_area.region() {
            BodyRegion::Lower => out.push(Recommendation {
                kind: RecommendationKind::MonitorMobility,
                message: format!("Watch lateral movement and recovery steps ({area})"),
            }),
            BodyRegion::Upper | BodyRegion::Trunk => out.push(Recommendation {
                kind: RecommendationKind::ReduceServeLoad,
                message: format!("Expect reduced first-serve pace ({area})"),
            }),
            BodyRegion::Unspecified => {}
        }
        if self.treatment_minutes > LONG_TREATMENT_MINUTES {
            out.push(Recommendation {
                kind: RecommendationKind::ReviewTreatment,
                message: format!(
                    "{} minutes of treatment documented; re-check after the next set",
                    self.treatment_minutes
                ),
            });
        }
        Ok(out)
    }
}

fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}
