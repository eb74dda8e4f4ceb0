// CSV/TSV reading with encoding and delimiter detection

use std::path::Path;

use encoding_rs::Encoding;

use crate::error::IoError;

/// Spreadsheet row limit; larger inputs cannot be reported back as XLSX.
pub const MAX_ROWS: usize = 1_048_576;
/// Spreadsheet column limit.
pub const MAX_COLS: usize = 16_384;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimits {
    pub max_rows: usize,
    pub max_cols: usize,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            max_rows: MAX_ROWS,
            max_cols: MAX_COLS,
        }
    }
}

/// Header row plus data rows of one delimited file.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// 1-based source line of each row, for error messages.
    pub lines: Vec<u64>,
}

impl Table {
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }
}

/// Look up an encoding by WHATWG label ("utf-8", "cp1252", "latin1", ...).
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, IoError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| IoError::UnknownEncoding(label.to_string()))
}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>, IoError> {
    std::fs::read(path).map_err(|e| IoError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Decode with the given encoding; a byte-order mark overrides it.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (decoded, actual, had_errors) = encoding.decode(bytes);
    if actual != encoding {
        log::debug!("byte-order mark selects {} over {}", actual.name(), encoding.name());
    }
    if had_errors {
        log::warn!(
            "input is not valid {}; undecodable bytes were replaced",
            actual.name()
        );
    }
    decoded.into_owned()
}

const DELIMITERS: [u8; 4] = [b';', b',', b'\t', b'|'];
const SNIFF_LINES: usize = 20;

fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map_or(1, |r| r.len())
}

/// Pick the delimiter for a roster whose header has at least `min_fields`
/// columns. Among delimiters that split the header that wide, the one whose
/// sample rows most often match the header width wins, then the wider split.
/// Falls back to `,` when nothing qualifies.
pub fn sniff_delimiter(content: &str, min_fields: usize) -> u8 {
    let mut lines = content.lines().filter(|l| !l.trim().is_empty()).take(SNIFF_LINES);
    let Some(header) = lines.next() else {
        return b',';
    };
    let rows: Vec<&str> = lines.collect();

    let mut best = (b',', 0usize, 0usize);
    for delimiter in DELIMITERS {
        let width = field_count(header, delimiter);
        if width < min_fields.max(2) {
            continue;
        }
        let agreeing = rows.iter().filter(|row| field_count(row, delimiter) == width).count();
        if (agreeing, width) > (best.1, best.2) {
            best = (delimiter, agreeing, width);
        }
    }
    best.0
}

/// Parse delimited text whose first row is a header. Blank rows are skipped.
/// `min_fields` guides delimiter sniffing when no delimiter is given.
pub fn parse_table(
    source: &str,
    content: &str,
    delimiter: Option<u8>,
    min_fields: usize,
) -> Result<Table, IoError> {
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(content, min_fields));
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let csv_err = |e: csv::Error| IoError::Csv {
        source: source.to_string(),
        message: e.to_string(),
    };

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(IoError::Header {
            source: source.to_string(),
            message: "file is empty or has a blank header row".into(),
        });
    }

    let mut rows = Vec::new();
    let mut lines = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        lines.push(record.position().map(|p| p.line()).unwrap_or(0));
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }

    Ok(Table {
        source: source.to_string(),
        headers,
        rows,
        lines,
    })
}

/// Reject tables beyond `limits` unless `ignore` is set.
pub fn check_size(table: &Table, limits: SizeLimits, ignore: bool) -> Result<(), IoError> {
    // Header row counts toward the spreadsheet limit.
    let rows = table.rows.len() + 1;
    let cols = table.width();
    if rows <= limits.max_rows && cols <= limits.max_cols {
        return Ok(());
    }
    if ignore {
        log::warn!(
            "{}: {rows} rows x {cols} columns exceeds {} x {}; continuing as requested",
            table.source,
            limits.max_rows,
            limits.max_cols
        );
        return Ok(());
    }
    Err(IoError::Oversize {
        source: table.source.clone(),
        rows,
        cols,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Name;Age;City\nAlice;30;Paris\nBob;25;London\n";
        assert_eq!(sniff_delimiter(content, 3), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "Name,Age,City\nAlice,30,Paris\nBob,25,London\n";
        assert_eq!(sniff_delimiter(content, 3), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Name\tAge\tCity\nAlice\t30\tParis\nBob\t25\tLondon\n";
        assert_eq!(sniff_delimiter(content, 3), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        let content = "Name;Address;City\n\"Doe, Jane\";\"123 Main St, Apt 4\";Paris\nBob;\"456 Elm\";London\n";
        assert_eq!(sniff_delimiter(content, 3), b';');
    }

    #[test]
    fn test_sniff_prefers_agreeing_rows_over_width() {
        // Unquoted commas make the header look eight columns wide.
        let content = "employer (name, division, region, district, code, branch, unit, sector);first;last\n\
                       Roy Électrique;Marc;Roy\n";
        assert_eq!(sniff_delimiter(content, 3), b';');
    }

    #[test]
    fn test_sniff_requires_roster_width() {
        let content = "\nname|badge\nRoy|1\n";
        assert_eq!(sniff_delimiter(content, 2), b'|');
        assert_eq!(sniff_delimiter(content, 3), b',');
        assert_eq!(sniff_delimiter("", 3), b',');

        // Five registry columns split by tabs, with commas inside two of them.
        let registry = "first\tlast\tid\tbirth\temployer\n\
                        Jean\tTremblay\t7\t1980-01-01\tACME, Construction, Inc\n";
        assert_eq!(sniff_delimiter(registry, 5), b'\t');
    }

    #[test]
    fn test_resolve_encoding_labels() {
        assert_eq!(resolve_encoding("utf-8").unwrap(), encoding_rs::UTF_8);
        assert_eq!(resolve_encoding("cp1252").unwrap(), encoding_rs::WINDOWS_1252);
        assert_eq!(resolve_encoding(" latin1 ").unwrap(), encoding_rs::WINDOWS_1252);
        assert!(matches!(
            resolve_encoding("klingon"),
            Err(IoError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_decode_windows_1252() {
        // "Côté" in Windows-1252
        let bytes = [0x43, 0xF4, 0x74, 0xE9];
        assert_eq!(decode(&bytes, encoding_rs::WINDOWS_1252), "Côté");
    }

    #[test]
    fn test_decode_bom_overrides_label() {
        let bytes = b"\xEF\xBB\xBFC\xC3\xB4t\xC3\xA9";
        assert_eq!(decode(bytes, encoding_rs::WINDOWS_1252), "Côté");
    }

    #[test]
    fn test_parse_table_skips_blank_rows() {
        let content = "a,b,c\n1,2,3\n,,\n4,5,6\n";
        let table = parse_table("t.csv", content, None, 3).unwrap();
        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["4", "5", "6"]);
        assert_eq!(table.lines, vec![2, 4]);
    }

    #[test]
    fn test_parse_table_empty_file() {
        let err = parse_table("t.csv", "", Some(b','), 3).unwrap_err();
        assert!(matches!(err, IoError::Header { .. }));
    }

    #[test]
    fn test_check_size_limits() {
        let table = parse_table("t.csv", "a,b,c\n1,2,3\n4,5,6\n", None, 3).unwrap();
        let small = SizeLimits { max_rows: 2, max_cols: 10 };
        let err = check_size(&table, small, false).unwrap_err();
        assert!(matches!(err, IoError::Oversize { rows: 3, cols: 3, .. }));
        assert!(check_size(&table, small, true).is_ok());
        assert!(check_size(&table, SizeLimits::default(), false).is_ok());

        let narrow = SizeLimits { max_rows: 10, max_cols: 2 };
        assert!(check_size(&table, narrow, false).is_err());
    }
}
