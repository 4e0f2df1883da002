//! Xlsx writing backed by rust_xlsxwriter.

use super::{CellValue, SheetData, WorkbookWriter};
use crate::error::OutputError;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};

/// Writes output workbooks atomically.
///
/// Sheets are emitted in slice order. The workbook is saved to a temporary
/// sibling path first and renamed over the target on success.
#[derive(Debug, Default)]
pub struct XlsxWriter;

impl XlsxWriter {
    pub fn new() -> Self {
        Self
    }

    fn temp_path(path: &Path) -> PathBuf {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workbook.xlsx".to_string());
        path.with_file_name(format!(".{}.tmp", file_name))
    }
}

impl WorkbookWriter for XlsxWriter {
    fn write(&self, path: &Path, sheets: &[SheetData]) -> Result<(), OutputError> {
        let write_failed = |reason: String| OutputError::WriteFailed {
            path: path.to_path_buf(),
            reason,
        };

        let mut workbook = Workbook::new();

        for sheet in sheets {
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(&sheet.name)
                .map_err(|e| write_failed(e.to_string()))?;

            for (row_idx, row) in sheet.rows.iter().enumerate() {
                let row_num = row_idx as u32;
                for (col_idx, cell) in row.iter().enumerate() {
                    let col_num = col_idx as u16;
                    match cell {
                        CellValue::Empty => {}
                        CellValue::Text(text) => {
                            worksheet
                                .write_string(row_num, col_num, text.as_ref())
                                .map_err(|e| write_failed(e.to_string()))?;
                        }
                        CellValue::Number(value) => {
                            worksheet
                                .write_number(row_num, col_num, *value)
                                .map_err(|e| write_failed(e.to_string()))?;
                        }
                        CellValue::Bool(value) => {
                            worksheet
                                .write_boolean(row_num, col_num, *value)
                                .map_err(|e| write_failed(e.to_string()))?;
                        }
                        CellValue::DateTime(serial) => {
                            worksheet
                                .write_number(row_num, col_num, *serial)
                                .map_err(|e| write_failed(e.to_string()))?;
                        }
                    }
                }
            }
        }

        let temp = Self::temp_path(path);
        workbook.save(&temp).map_err(|e| write_failed(e.to_string()))?;

        std::fs::rename(&temp, path).map_err(|e| OutputError::RenameFailed {
            from: temp,
            to: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::workbook::{WorkbookReader, XlsxReader};
    use tempfile::TempDir;

    #[test]
    fn written_workbook_reads_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.xlsx");

        let mut sheet = SheetData::new("Data");
        sheet.push_row(vec![CellValue::text("Plaintext"), CellValue::text("Hashvalue")]);
        sheet.push_row(vec![CellValue::text("Alice"), CellValue::text("3bc5")]);
        sheet.push_row(vec![CellValue::Number(7.0), CellValue::Bool(true)]);

        XlsxWriter::new().write(&path, &[sheet]).unwrap();

        let mut reader = XlsxReader::open(&path).unwrap();
        assert_eq!(reader.sheet_names(), vec!["Data".to_string()]);

        let read_back = reader.read_sheet("Data").unwrap();
        assert_eq!(read_back.rows.len(), 3);
        assert_eq!(read_back.rows[1][0], CellValue::text("Alice"));
        assert_eq!(read_back.rows[2][0], CellValue::Number(7.0));
        assert_eq!(read_back.rows[2][1], CellValue::Bool(true));
    }

    #[test]
    fn no_temp_file_survives_a_successful_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.xlsx");

        let mut sheet = SheetData::new("Data");
        sheet.push_row(vec![CellValue::text("only")]);

        XlsxWriter::new().write(&path, &[sheet]).unwrap();

        assert!(path.exists());
        assert!(!XlsxWriter::temp_path(&path).exists());
    }

    #[test]
    fn unwritable_destination_is_an_output_error() {
        let result = XlsxWriter::new().write(
            Path::new("/nonexistent-dir/out.xlsx"),
            &[SheetData::new("Data")],
        );
        assert!(result.is_err());
    }
}
