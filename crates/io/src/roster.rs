//! Registry and external roster loading.
//!
//! Columns are positional. The registry comes in two layouts: the basic
//! five-column export and the lineage export that adds parent and previous
//! employer lists. The external roster starts with employer, first name and
//! last name; every further column passes through to the report.

use std::path::Path;

use encoding_rs::Encoding;
use rosterlink_linkage::model::{ExternalRecord, RegistryRecord};

use crate::csv::{check_size, decode, parse_table, read_bytes, SizeLimits, Table};
use crate::error::IoError;

pub const REGISTRY_BASIC_COLUMNS: usize = 5;
pub const REGISTRY_LINEAGE_COLUMNS: usize = 7;
pub const EXTERNAL_MIN_COLUMNS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryLayout {
    /// first_name, last_name, id, birth_date, employer
    Basic,
    /// Basic plus parent_employers, previous_employers
    Lineage,
}

impl RegistryLayout {
    pub fn detect(table: &Table) -> Result<Self, IoError> {
        match table.headers.len() {
            n if n >= REGISTRY_LINEAGE_COLUMNS => Ok(Self::Lineage),
            n if n >= REGISTRY_BASIC_COLUMNS => Ok(Self::Basic),
            n => Err(IoError::Header {
                source: table.source.clone(),
                message: format!(
                    "registry needs at least {REGISTRY_BASIC_COLUMNS} columns \
                     (first_name, last_name, id, birth_date, employer), found {n}"
                ),
            }),
        }
    }

    pub fn columns(self) -> usize {
        match self {
            Self::Basic => REGISTRY_BASIC_COLUMNS,
            Self::Lineage => REGISTRY_LINEAGE_COLUMNS,
        }
    }
}

/// Options shared by both roster loaders.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub encoding: &'static Encoding,
    /// `None` sniffs the delimiter from the first lines.
    pub delimiter: Option<u8>,
    pub list_separator: String,
    pub limits: SizeLimits,
    pub ignore_size_limits: bool,
}

impl LoadOptions {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            encoding,
            delimiter: None,
            list_separator: ";".into(),
            limits: SizeLimits::default(),
            ignore_size_limits: false,
        }
    }
}

/// Records loaded from one file, with its header and a digest of the raw bytes.
#[derive(Debug, Clone)]
pub struct Roster<T> {
    pub source: String,
    pub headers: Vec<String>,
    pub records: Vec<T>,
    pub fingerprint: String,
}

impl<T> Roster<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Layout adapters
// ---------------------------------------------------------------------------

/// Split a delimited employer list, trimming and dropping blanks.
pub fn split_list(value: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        let v = value.trim();
        return if v.is_empty() { Vec::new() } else { vec![v.to_string()] };
    }
    value
        .split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn require_width(table: &Table, index: usize, row: &[String], expected: usize) -> Result<(), IoError> {
    if row.len() < expected {
        return Err(IoError::ShortRow {
            source: table.source.clone(),
            line: table.lines.get(index).copied().unwrap_or(0),
            expected,
            found: row.len(),
        });
    }
    Ok(())
}

pub fn registry_from_table(
    table: &Table,
    separator: &str,
) -> Result<(RegistryLayout, Vec<RegistryRecord>), IoError> {
    let layout = RegistryLayout::detect(table)?;
    let width = layout.columns();

    let mut records = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        require_width(table, i, row, width)?;
        let (parent_employers, previous_employers) = match layout {
            RegistryLayout::Basic => (Vec::new(), Vec::new()),
            RegistryLayout::Lineage => (split_list(&row[5], separator), split_list(&row[6], separator)),
        };
        records.push(RegistryRecord {
            first_name: row[0].clone(),
            last_name: row[1].clone(),
            id: row[2].trim().to_string(),
            birth_date: row[3].trim().to_string(),
            employer: row[4].clone(),
            parent_employers,
            previous_employers,
        });
    }
    Ok((layout, records))
}

pub fn external_from_table(table: &Table) -> Result<Vec<ExternalRecord>, IoError> {
    if table.headers.len() < EXTERNAL_MIN_COLUMNS {
        return Err(IoError::Header {
            source: table.source.clone(),
            message: format!(
                "external roster needs at least {EXTERNAL_MIN_COLUMNS} columns \
                 (employer, first_name, last_name), found {}",
                table.headers.len()
            ),
        });
    }

    let mut records = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        require_width(table, i, row, EXTERNAL_MIN_COLUMNS)?;
        // Pass-through fields are padded to the header width.
        let mut extra: Vec<String> = row[EXTERNAL_MIN_COLUMNS..].to_vec();
        extra.resize(table.headers.len() - EXTERNAL_MIN_COLUMNS, String::new());
        records.push(ExternalRecord {
            employer: row[0].clone(),
            first_name: row[1].clone(),
            last_name: row[2].clone(),
            extra,
        });
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// File loaders
// ---------------------------------------------------------------------------

fn load_table(path: &Path, options: &LoadOptions, min_columns: usize) -> Result<(Table, String), IoError> {
    let bytes = read_bytes(path)?;
    let fingerprint = crate::checkpoint::fingerprint(&bytes);
    let content = decode(&bytes, options.encoding);
    let table = parse_table(&path.display().to_string(), &content, options.delimiter, min_columns)?;
    check_size(&table, options.limits, options.ignore_size_limits)?;
    Ok((table, fingerprint))
}

pub fn load_registry(path: &Path, options: &LoadOptions) -> Result<Roster<RegistryRecord>, IoError> {
    let (table, fingerprint) = load_table(path, options, REGISTRY_BASIC_COLUMNS)?;
    let (layout, records) = registry_from_table(&table, &options.list_separator)?;
    log::info!(
        "registry {}: {} records ({:?} layout)",
        table.source,
        records.len(),
        layout
    );
    Ok(Roster {
        source: table.source,
        headers: table.headers,
        records,
        fingerprint,
    })
}

pub fn load_external(path: &Path, options: &LoadOptions) -> Result<Roster<ExternalRecord>, IoError> {
    let (table, fingerprint) = load_table(path, options, EXTERNAL_MIN_COLUMNS)?;
    let records = external_from_table(&table)?;
    log::info!("external {}: {} records", table.source, records.len());
    Ok(Roster {
        source: table.source,
        headers: table.headers,
        records,
        fingerprint,
    })
}
