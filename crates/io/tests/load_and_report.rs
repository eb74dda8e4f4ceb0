use std::path::{Path, PathBuf};

use rosterlink_io::checkpoint::{checkpoint_path, config_fingerprint, Checkpoint};
use rosterlink_io::report::{report_headers, report_row, ReportWriter};
use rosterlink_io::roster::{load_external, load_registry, LoadOptions};
use rosterlink_linkage::{MatchConfig, Matcher};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

#[test]
fn lineage_registry_loads_lists() {
    let registry = load_registry(&fixture("registry_lineage.csv"), &LoadOptions::new(encoding_rs::UTF_8)).unwrap();
    assert_eq!(registry.len(), 3);
    let sophie = &registry.records[1];
    assert_eq!(sophie.employer, "Hydro Québec");
    assert_eq!(sophie.parent_employers, vec!["Hydro Holdings"]);
    assert_eq!(sophie.previous_employers, vec!["Kiewit", "SNC-Lavalin"]);
    assert!(registry.records[0].previous_employers.is_empty());
}

#[test]
fn match_and_write_csv_report() {
    let registry = load_registry(&fixture("registry_lineage.csv"), &LoadOptions::new(encoding_rs::UTF_8)).unwrap();
    let external = load_external(&fixture("external.csv"), &LoadOptions::new(encoding_rs::WINDOWS_1252)).unwrap();
    assert_eq!(external.headers, vec!["company", "firstname", "lastname", "badge"]);

    let matcher = Matcher::new(&MatchConfig::default(), &registry.records).unwrap();
    let verdicts = matcher.match_all(&external.records);

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.csv");
    let mut writer = ReportWriter::create(&out, report_headers(&external.headers), encoding_rs::UTF_8, false).unwrap();
    let rows = external
        .records
        .iter()
        .zip(&verdicts)
        .map(|(record, verdict)| report_row(record, verdict))
        .collect();
    writer.write_rows(rows).unwrap();
    writer.finish().unwrap();

    let mut reader = csv::Reader::from_path(&out).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[4], "rlink_id");
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);

    assert_eq!(&rows[0][3], "A-1");
    assert_eq!(&rows[0][4], "7");
    assert_eq!(&rows[0][5], "1980-01-01");

    assert_eq!(&rows[1][4], "11");
    assert_eq!(
        &rows[1][10],
        "11, Sophie Roy, 1988-08-08 --> Hydro Québec [parents: Hydro Holdings] [previous: Kiewit; SNC-Lavalin]: 100"
    );

    assert_eq!(&rows[2][4], "");
    assert_eq!(&rows[2][7], "0");
}

#[test]
fn checkpoint_round_trip_next_to_report() {
    let registry_bytes = std::fs::read(fixture("registry_lineage.csv")).unwrap();
    let registry = load_registry(&fixture("registry_lineage.csv"), &LoadOptions::new(encoding_rs::UTF_8)).unwrap();
    assert_eq!(registry.fingerprint, rosterlink_io::checkpoint::fingerprint(&registry_bytes));

    let dir = tempfile::tempdir().unwrap();
    let path = checkpoint_path(&dir.path().join("report.csv"));
    let config = config_fingerprint(&MatchConfig::default()).unwrap();
    let mut cp = Checkpoint::new(&registry.fingerprint, "ext", &config);
    cp.next_index = 2;
    cp.save(&path).unwrap();

    let loaded = Checkpoint::load(&path).unwrap().unwrap();
    assert_eq!(loaded.next_index, 2);
    assert_eq!(loaded.mismatch(&Checkpoint::new(&registry.fingerprint, "ext", &config)), None);
}
