use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::injury::RecommendationKind;
use crate::report::AdjustmentReport;

pub struct ExportSummary {
    pub reports: usize,
    pub recommendations: usize,
}

pub fn export_reports(path: &Path, reports: &[AdjustmentReport]) -> Result<ExportSummary> {
    let mut adjustment_rows = vec![vec![
        "Match ID".to_string(),
        "Injured ID".to_string(),
        "Opponent ID".to_string(),
        "Before (injured)".to_string(),
        "Before (opponent)".to_string(),
        "Adjustment".to_string(),
        "After (injured)".to_string(),
        "After (opponent)".to_string(),
        "Overall impact".to_string(),
        "Trend".to_string(),
        "Recovery days".to_string(),
        "Confidence".to_string(),
    ]];
    let mut recommendation_rows = vec![vec![
        "Match ID".to_string(),
        "Injured ID".to_string(),
        "Kind".to_string(),
        "Message".to_string(),
    ]];

    for report in reports {
        adjustment_rows.push(adjustment_row(report));
        for rec in &report.recommendations {
            recommendation_rows.push(vec![
                report.match_id.to_string(),
                report.injured_player_id.to_string(),
                kind_label(rec.kind).to_string(),
                rec.message.clone(),
            ]);
        }
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Adjustments")?;
        write_rows(sheet, &adjustment_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Recommendations")?;
        write_rows(sheet, &recommendation_rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportSummary {
        reports: reports.len(),
        recommendations: recommendation_rows.len() - 1,
    })
}

fn adjustment_row(report: &AdjustmentReport) -> Vec<String> {
    vec![
        report.match_id.to_string(),
        report.injured_player_id.to_string(),
        report.opponent_id.to_string(),
        format!("{:.4}", report.before.injured),
        format!("{:.4}", report.before.opponent),
        format!("{:.4}", report.adjustment),
        format!("{:.4}", report.after.injured),
        format!("{:.4}", report.after.opponent),
        format!("{:.4}", report.impact.overall),
        format!("{:?}", report.evolution.trend),
        opt_to_string(report.evolution.recovery_days),
        report.confidence.to_string(),
    ]
}

fn kind_label(kind: RecommendationKind) -> &'static str {
    match kind {
        RecommendationKind::SeekMedicalValidation => "seek_medical_validation",
        RecommendationKind::ConsiderWithdrawal => "consider_withdrawal",
        RecommendationKind::MonitorMobility => "monitor_mobility",
        RecommendationKind::ReduceServeLoad => "reduce_serve_load",
        RecommendationKind::ReviewTreatment => "review_treatment",
    }
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
