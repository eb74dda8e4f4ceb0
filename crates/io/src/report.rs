// Verdict report: external rows with match columns appended, as CSV or XLSX

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use rosterlink_linkage::model::{format_score, ExternalRecord, MatchVerdict};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use crate::error::IoError;

/// Columns appended after the external roster's own columns.
pub const VERDICT_HEADERS: [&str; 7] = [
    "rlink_id",
    "birth_date",
    "match_score",
    "match_count",
    "partial_match",
    "same_birth_date",
    "match_info",
];

const SHEET_NAME: &str = "matches";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Xlsx,
}

impl ReportFormat {
    /// `.xlsx` selects Excel; anything else is written as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => Self::Xlsx,
            _ => Self::Csv,
        }
    }
}

pub fn report_headers(external_headers: &[String]) -> Vec<String> {
    external_headers
        .iter()
        .cloned()
        .chain(VERDICT_HEADERS.iter().map(|h| h.to_string()))
        .collect()
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.to_string()
}

pub fn report_row(record: &ExternalRecord, verdict: &MatchVerdict) -> Vec<String> {
    let matched = verdict.distinct_match_count > 0;
    let mut row = Vec::with_capacity(3 + record.extra.len() + VERDICT_HEADERS.len());
    row.push(record.employer.clone());
    row.push(record.first_name.clone());
    row.push(record.last_name.clone());
    row.extend(record.extra.iter().cloned());

    row.push(verdict.best.to_string());
    row.push(verdict.best_birth_date.clone().unwrap_or_default());
    row.push(if matched { format_score(verdict.best_score) } else { String::new() });
    row.push(verdict.distinct_match_count.to_string());
    row.push(if matched && verdict.partial { "yes".into() } else { String::new() });
    // Only meaningful when several identities matched.
    row.push(if verdict.distinct_match_count > 1 {
        yes_no(verdict.same_birth_date)
    } else {
        String::new()
    });
    row.push(verdict.match_info());
    row
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

pub struct CsvReport {
    path: PathBuf,
    file: File,
    encoding: &'static Encoding,
    /// Bytes on disk, header included.
    len: u64,
}

pub struct XlsxReport {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

pub enum ReportWriter {
    Csv(CsvReport),
    Xlsx(XlsxReport),
}

impl ReportWriter {
    /// Open the report. With `append`, CSV output continues an existing file
    /// and the header is not written again.
    pub fn create(
        path: &Path,
        headers: Vec<String>,
        encoding: &'static Encoding,
        append: bool,
    ) -> Result<Self, IoError> {
        match ReportFormat::from_path(path) {
            ReportFormat::Xlsx => Ok(Self::Xlsx(XlsxReport {
                path: path.to_path_buf(),
                headers,
                rows: Vec::new(),
            })),
            ReportFormat::Csv => {
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .append(append)
                    .truncate(!append)
                    .open(path)
                    .map_err(|e| write_error(path, e))?;
                let len = file.metadata().map_err(|e| write_error(path, e))?.len();
                let mut report = CsvReport {
                    path: path.to_path_buf(),
                    file,
                    encoding,
                    len,
                };
                if !append {
                    report.append(std::slice::from_ref(&headers))?;
                }
                Ok(Self::Csv(report))
            }
        }
    }

    pub fn format(&self) -> ReportFormat {
        match self {
            Self::Csv(_) => ReportFormat::Csv,
            Self::Xlsx(_) => ReportFormat::Xlsx,
        }
    }

    /// Length of the CSV report synced so far. XLSX reports have nothing on
    /// disk until `finish`.
    pub fn synced_len(&self) -> u64 {
        match self {
            Self::Csv(report) => report.len,
            Self::Xlsx(_) => 0,
        }
    }

    /// CSV rows reach the disk immediately; XLSX rows wait for `finish`.
    pub fn write_rows(&mut self, rows: Vec<Vec<String>>) -> Result<(), IoError> {
        match self {
            Self::Csv(report) => report.append(&rows),
            Self::Xlsx(report) => {
                report.rows.extend(rows);
                Ok(())
            }
        }
    }

    pub fn finish(self) -> Result<(), IoError> {
        match self {
            Self::Csv(report) => report.file.sync_all().map_err(|e| write_error(&report.path, e)),
            Self::Xlsx(report) => report.save(),
        }
    }
}

/// Cut a CSV report back to `len` bytes, dropping rows written after the last
/// checkpoint. Returns the number of bytes removed.
pub fn truncate_report(path: &Path, len: u64) -> Result<u64, IoError> {
    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| write_error(path, e))?;
    let current = file.metadata().map_err(|e| write_error(path, e))?.len();
    if current < len {
        return Err(IoError::Checkpoint(format!(
            "report {} has {current} bytes but its checkpoint expects {len}",
            path.display()
        )));
    }
    if current > len {
        file.set_len(len).map_err(|e| write_error(path, e))?;
        file.sync_all().map_err(|e| write_error(path, e))?;
    }
    Ok(current - len)
}

fn write_error(path: &Path, e: impl std::fmt::Display) -> IoError {
    IoError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

impl CsvReport {
    fn append(&mut self, rows: &[Vec<String>]) -> Result<(), IoError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in rows {
            writer.write_record(row).map_err(|e| write_error(&self.path, e))?;
        }
        let buf = writer.into_inner().map_err(|e| write_error(&self.path, e))?;
        let text = String::from_utf8(buf).map_err(|e| write_error(&self.path, e))?;

        let (bytes, _, unmappable) = self.encoding.encode(&text);
        if unmappable {
            log::warn!(
                "{}: some characters have no {} form and were written as numeric references",
                self.path.display(),
                self.encoding.name()
            );
        }
        self.file.write_all(&bytes).map_err(|e| write_error(&self.path, e))?;
        // Rows must be durable before a checkpoint claims them.
        self.file.sync_data().map_err(|e| write_error(&self.path, e))?;
        self.len += bytes.len() as u64;
        Ok(())
    }
}

impl XlsxReport {
    fn save(self) -> Result<(), IoError> {
        let xlsx_err = |e: rust_xlsxwriter::XlsxError| IoError::Xlsx(format!("{}: {e}", self.path.display()));

        let mut workbook = XlsxWorkbook::new();
        let bold = Format::new().set_bold();
        let wrap = Format::new().set_text_wrap();
        let first_verdict_col = self.headers.len().saturating_sub(VERDICT_HEADERS.len());
        let score_col = first_verdict_col + 2;
        let count_col = first_verdict_col + 3;
        let info_col = first_verdict_col + 6;

        let worksheet = workbook.add_worksheet().set_name(SHEET_NAME).map_err(xlsx_err)?;

        for (col, header) in self.headers.iter().enumerate() {
            worksheet
                .write_string_with_format(0, to_col(col)?, header, &bold)
                .map_err(xlsx_err)?;
        }

        for (r, row) in self.rows.iter().enumerate() {
            let row_idx = u32::try_from(r + 1)
                .map_err(|_| IoError::Xlsx(format!("row {} is beyond the sheet", r + 1)))?;
            for (col, value) in row.iter().enumerate() {
                let col_idx = to_col(col)?;
                let number = if col == score_col || col == count_col {
                    value.parse::<f64>().ok()
                } else {
                    None
                };
                let written = match number {
                    Some(n) => worksheet.write_number(row_idx, col_idx, n).map(|_| ()),
                    None if col == info_col => worksheet
                        .write_string_with_format(row_idx, col_idx, value, &wrap)
                        .map(|_| ()),
                    None => worksheet.write_string(row_idx, col_idx, value).map(|_| ()),
                };
                written.map_err(xlsx_err)?;
            }
        }

        worksheet.set_freeze_panes(1, 0).map_err(xlsx_err)?;
        workbook.save(&self.path).map_err(xlsx_err)?;
        log::debug!("wrote {} rows to {}", self.rows.len(), self.path.display());
        Ok(())
    }
}

fn to_col(col: usize) -> Result<u16, IoError> {
    u16::try_from(col).map_err(|_| IoError::Xlsx(format!("column {col} is beyond the sheet")))
}
