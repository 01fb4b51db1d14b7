use crate::config::ReportMode;
use crate::error::{ReconError, Result};
use crate::models::{PriceChange, ReconcileReport};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

/// CSV 导出行
#[derive(Debug, Serialize)]
struct ChangeRow<'a> {
    source: &'a str,
    score: String,
    title: &'a str,
    old_price: Option<f64>,
    new_price: f64,
}

impl<'a> From<&'a PriceChange> for ChangeRow<'a> {
    fn from(change: &'a PriceChange) -> Self {
        Self {
            source: &change.source,
            score: format!("{:.3}", change.score),
            title: &change.title,
            old_price: change.old_price,
            new_price: change.new_price,
        }
    }
}

/// 控制台汇总文本
pub fn render(report: &ReconcileReport, mode: ReportMode) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Products: {}", report.total);
    for (source, count) in &report.updated_by_source {
        let _ = writeln!(out, "Updated from {}: {}", source, count);
    }
    let _ = writeln!(out, "Skipped (no confident match): {}", report.skipped);
    let _ = writeln!(out, "Changed prices: {}", report.changes.len());

    match mode {
        ReportMode::Changed => {
            for change in &report.changes {
                let old = change.old_price.map(format_price).unwrap_or_else(|| "?".to_string());
                let _ = writeln!(
                    out,
                    "- [{} score={:.3}] {}: {} -> {}",
                    change.source,
                    change.score,
                    change.title,
                    old,
                    format_price(change.new_price)
                );
            }
        }
        ReportMode::Skipped => {
            for title in &report.skipped_titles {
                let _ = writeln!(out, "- {}", title);
            }
        }
        ReportMode::None => {}
    }
    out
}

/// 价格保留 6 位有效数字并去掉末尾的 0，例如 `50.00000000000001` -> `50`
pub fn format_price(value: f64) -> String {
    const SIGNIFICANT: i32 = 6;
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }
    let exp = value.abs().log10().floor() as i32;
    if (-4..SIGNIFICANT).contains(&exp) {
        let decimals = (SIGNIFICANT - 1 - exp).max(0) as usize;
        trim_zeros(format!("{:.*}", decimals, value))
    } else {
        let formatted = format!("{:.*e}", (SIGNIFICANT - 1) as usize, value);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) => format!("{}e{}", trim_zeros(mantissa.to_string()), exponent),
            None => formatted,
        }
    }
}

fn trim_zeros(mut text: String) -> String {
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    text
}

/// 导出变更明细
pub fn write_csv(path: &Path, changes: &[PriceChange]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for change in changes {
        writer.serialize(ChangeRow::from(change))?;
    }
    writer.flush().map_err(|source| ReconError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Exported {} changes to {}", changes.len(), path.display());
    Ok(())
}
