//! Workbook export: one CSV sheet per instrument plus a summary sheet

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::EngineResult;
use crate::projection::MonthlyRecord;
use crate::scenario::Comparison;
use super::format::format_brl;
use super::summary::{summary_rows, SummaryRow, SUMMARY_HEADERS};

/// File name of the summary sheet
pub const SUMMARY_SHEET: &str = "summary.csv";

/// File-system safe name for a sheet label ("IPCA+10.0%" -> "IPCA+10.0pct.csv")
pub fn sheet_file_name(label: &str) -> String {
    let stem: String = label
        .replace('%', "pct")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}.csv")
}

/// File names for a list of sheet labels, unique within one workbook
///
/// Repeated labels get a numeric suffix ("Bitcoin.csv", "Bitcoin_2.csv");
/// no sheet may take the summary sheet's name.
pub fn sheet_file_names<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::from([SUMMARY_SHEET.to_string()]);
    labels
        .into_iter()
        .map(|label| {
            let mut name = sheet_file_name(label);
            let mut n = 2;
            while used.contains(&name) {
                name = sheet_file_name(&format!("{label}_{n}"));
                n += 1;
            }
            used.insert(name.clone());
            name
        })
        .collect()
}

/// Write a monthly series with `month,label,balance` columns
pub fn write_sheet<W: Write>(writer: W, series: &[MonthlyRecord]) -> EngineResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if series.is_empty() {
        csv_writer.write_record(["month", "label", "balance"])?;
    }
    for record in series {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the summary table with formatted currency cells
pub fn write_summary<W: Write>(writer: W, rows: &[SummaryRow]) -> EngineResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(SUMMARY_HEADERS)?;
    for row in rows {
        csv_writer.write_record(row.cells())?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Export every sheet of a comparison into `dir`, creating it if needed
///
/// Returns the written paths, instrument sheets first.
pub fn export_workbook(dir: &Path, comparison: &Comparison) -> EngineResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(comparison.outcomes.len() + 1);

    let names = sheet_file_names(comparison.outcomes.iter().map(|o| o.sheet_name.as_str()));
    for (outcome, name) in comparison.outcomes.iter().zip(names) {
        let path = dir.join(name);
        write_sheet(File::create(&path)?, &outcome.result.series)?;
        written.push(path);
    }

    let summary_path = dir.join(SUMMARY_SHEET);
    write_summary(File::create(&summary_path)?, &summary_rows(comparison))?;
    written.push(summary_path);

    info!(
        "exported {} sheets to {} (final balances: {})",
        written.len(),
        dir.display(),
        comparison
            .outcomes
            .iter()
            .map(|o| format!("{} {}", o.label, format_brl(o.result.final_balance)))
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(written)
}
