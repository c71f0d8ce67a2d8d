//! Presentation boundary: currency formatting, summary table and exports

mod export;
mod format;
mod summary;

pub use export::{
    export_workbook, sheet_file_name, sheet_file_names, write_sheet, write_summary, SUMMARY_SHEET,
};
pub use format::{format_brl, format_tax_rate};
pub use summary::{render_summary, render_table, summary_rows, SummaryRow, SUMMARY_HEADERS};
