//! Summary table across instruments

use serde::{Deserialize, Serialize};

use crate::scenario::{Comparison, InstrumentOutcome};
use super::format::{format_brl, format_tax_rate};

/// Column headers of the summary table
pub const SUMMARY_HEADERS: [&str; 7] = [
    "Investment",
    "Tax (%)",
    "Initial principal",
    "Total contributions",
    "Total contributed",
    "Total return",
    "Final balance",
];

/// One line of the summary table, unformatted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub name: String,
    pub tax_rate_percent: Option<f64>,
    pub initial_principal: f64,
    pub total_contributions: f64,
    pub total_contributed: f64,
    pub total_return: f64,
    pub final_balance: f64,
}

impl SummaryRow {
    pub fn from_outcome(outcome: &InstrumentOutcome) -> Self {
        let result = &outcome.result;
        Self {
            name: outcome.label.clone(),
            tax_rate_percent: outcome.tax_rate_percent,
            initial_principal: outcome.initial_principal,
            total_contributions: result.total_contributions,
            total_contributed: result.total_contributed,
            total_return: result.total_return,
            final_balance: result.final_balance,
        }
    }

    /// Cells with currency figures formatted as `1.234,56`
    pub fn cells(&self) -> [String; 7] {
        [
            self.name.clone(),
            format_tax_rate(self.tax_rate_percent),
            format_brl(self.initial_principal),
            format_brl(self.total_contributions),
            format_brl(self.total_contributed),
            format_brl(self.total_return),
            format_brl(self.final_balance),
        ]
    }
}

pub fn summary_rows(comparison: &Comparison) -> Vec<SummaryRow> {
    comparison.outcomes.iter().map(SummaryRow::from_outcome).collect()
}

/// Fixed-width text table; first column left aligned, the rest right aligned
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let format_line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, &w))| {
                if i == 0 {
                    format!("{cell:<w$}")
                } else {
                    format!("{cell:>w$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut out = format_line(headers.to_vec());
    out.push('\n');
    let total_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    out.push_str(&"-".repeat(total_width));
    out.push('\n');
    for row in rows {
        out.push_str(&format_line(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out
}

/// Summary table as printable text
pub fn render_summary(rows: &[SummaryRow]) -> String {
    let cells: Vec<Vec<String>> = rows.iter().map(|r| r.cells().to_vec()).collect();
    render_table(&SUMMARY_HEADERS, &cells)
}
