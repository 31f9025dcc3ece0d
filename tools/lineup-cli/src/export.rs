//! Workbook export: one worksheet per mix

use std::path::Path;

use anyhow::{Context, Result};
use lineup_engine::SanitizedLineup;
use rust_xlsxwriter::{Workbook, Worksheet};
use serde_json::Value;

/// Excel's worksheet name limit
const MAX_SHEET_NAME: usize = 31;

/// Lineups generated for one mix
pub struct MixLineups {
    pub mix: String,
    pub lineups: Vec<SanitizedLineup>,
}

pub fn sheet_name(mix: &str) -> String {
    mix.chars().take(MAX_SHEET_NAME).collect()
}

/// Column headers for a worksheet: `Lineup` then every row column in first-seen order
pub fn column_headers(lineups: &[SanitizedLineup]) -> Vec<String> {
    let mut headers = vec!["Lineup".to_string()];
    for row in lineups.iter().flatten() {
        for key in row.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }
    headers
}

pub fn write_workbook(path: &Path, results: &[MixLineups]) -> Result<()> {
    let mut workbook = Workbook::new();
    for result in results {
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name(&result.mix))?;
        write_lineups(sheet, &result.lineups)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))
}

fn write_lineups(worksheet: &mut Worksheet, lineups: &[SanitizedLineup]) -> Result<()> {
    let headers = column_headers(lineups);
    for (col_idx, header) in headers.iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, header)
            .with_context(|| format!("write header ({col_idx})"))?;
    }

    let mut row_idx: u32 = 1;
    for (lineup_idx, lineup) in lineups.iter().enumerate() {
        for row in lineup {
            worksheet
                .write_number(row_idx, 0, (lineup_idx + 1) as f64)
                .with_context(|| format!("write cell ({row_idx},0)"))?;
            for (col_idx, header) in headers.iter().enumerate().skip(1) {
                if let Some(value) = row.get(header) {
                    write_cell(worksheet, row_idx, col_idx as u16, value)
                        .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
                }
            }
            row_idx += 1;
        }
    }
    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> Result<()> {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Value::Number(n) => {
            if let Some(n) = n.as_f64() {
                worksheet.write_number(row, col, n)?;
            }
        }
        Value::String(s) => {
            worksheet.write_string(row, col, s)?;
        }
        other => {
            worksheet.write_string(row, col, other.to_string())?;
        }
    }
    Ok(())
}
