//! Xlsx reading backed by calamine.

use super::{CellValue, SheetData, WorkbookReader};
use crate::error::InputError;
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reads sheets and columns from an xlsx workbook
pub struct XlsxReader {
    path: PathBuf,
    workbook: Xlsx<BufReader<File>>,
}

impl XlsxReader {
    /// Open a workbook for reading
    pub fn open(path: &Path) -> Result<Self, InputError> {
        if !path.is_file() {
            return Err(InputError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let workbook = open_workbook(path).map_err(|e: calamine::XlsxError| {
            InputError::OpenFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            workbook,
        })
    }

    fn range_of(&mut self, sheet: &str) -> Result<calamine::Range<Data>, InputError> {
        if !self.sheet_names().iter().any(|name| name == sheet) {
            return Err(InputError::SheetNotFound {
                sheet: sheet.to_string(),
            });
        }

        self.workbook
            .worksheet_range(sheet)
            .map_err(|e| InputError::OpenFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }
}

impl WorkbookReader for XlsxReader {
    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    fn read_sheet(&mut self, sheet: &str) -> Result<SheetData, InputError> {
        let range = self.range_of(sheet)?;

        let mut data = SheetData::new(sheet);
        for row in range.rows() {
            data.push_row(row.iter().map(to_cell).collect());
        }

        Ok(data)
    }

    fn read_column(&mut self, sheet: &str, column: &str) -> Result<Vec<String>, InputError> {
        let range = self.range_of(sheet)?;

        // "First row is a header" means row one of the sheet, not merely the
        // first populated row.
        match range.start() {
            None => {
                return Err(InputError::MissingHeader {
                    sheet: sheet.to_string(),
                })
            }
            Some((row, _)) if row != 0 => {
                return Err(InputError::MissingHeader {
                    sheet: sheet.to_string(),
                })
            }
            Some(_) => {}
        }

        let mut rows = range.rows();
        let header = rows.next().ok_or_else(|| InputError::MissingHeader {
            sheet: sheet.to_string(),
        })?;

        let index = header
            .iter()
            .position(|cell| cell_to_string(cell).as_deref() == Some(column))
            .ok_or_else(|| InputError::ColumnNotFound {
                column: column.to_string(),
                sheet: sheet.to_string(),
            })?;

        let mut values = Vec::new();
        for row in rows {
            if let Some(cell) = row.get(index) {
                if let Some(text) = cell_to_string(cell) {
                    values.push(text);
                }
            }
        }

        Ok(values)
    }
}

fn to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(Arc::from(s.as_str())),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(Arc::from(s.as_str())),
        Data::DurationIso(s) => CellValue::Text(Arc::from(s.as_str())),
        // Formula errors carry no hashable value
        Data::Error(_) => CellValue::Empty,
    }
}

/// Stringify a cell for hashing, or None for empty cells.
///
/// Integral floats print without a fractional part so a numeric ID column
/// hashes as "42", not "42.0".
fn cell_to_string(data: &Data) -> Option<String> {
    match data {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.is_finite() && f.abs() < 1e15 {
                Some(format!("{}", *f as i64))
            } else {
                Some(f.to_string())
            }
        }
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(dt.as_f64().to_string()),
        Data::DateTimeIso(s) => Some(s.clone()),
        Data::DurationIso(s) => Some(s.clone()),
    }
}
