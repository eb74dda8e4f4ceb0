use rosterlink_linkage::config::MatchConfig;
use rosterlink_linkage::engine::Matcher;
use rosterlink_linkage::model::{BestMatch, ExternalRecord, RegistryRecord};
use rosterlink_linkage::summary::count_verdicts;

fn registry_record(id: &str, first: &str, last: &str, birth: &str, employer: &str) -> RegistryRecord {
    RegistryRecord {
        id: id.into(),
        first_name: first.into(),
        last_name: last.into(),
        birth_date: birth.into(),
        employer: employer.into(),
        parent_employers: Vec::new(),
        previous_employers: Vec::new(),
    }
}

fn external(employer: &str, first: &str, last: &str) -> ExternalRecord {
    ExternalRecord {
        employer: employer.into(),
        first_name: first.into(),
        last_name: last.into(),
        extra: Vec::new(),
    }
}

// -------------------------------------------------------------------------
// Single registry record
// -------------------------------------------------------------------------

#[test]
fn abbreviated_employer_matches_unique_identity() {
    let registry = vec![registry_record("7", "Jean", "Tremblay", "1980-01-01", "ACME Construction Inc")];
    let matcher = Matcher::new(&MatchConfig::default(), &registry).unwrap();

    let candidates = matcher.candidates(&external("Acme Constr.", "Jean", "Tremblay"));
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id(), "7");

    let verdict = matcher.match_record(&external("Acme Constr.", "Jean", "Tremblay"));
    assert_eq!(verdict.best, BestMatch::Unique("7".into()));
    assert_eq!(verdict.best_birth_date.as_deref(), Some("1980-01-01"));
    assert_eq!(verdict.distinct_match_count, 1);
    assert!(verdict.same_birth_date);
    // Name ratios are 100, so the composite equals the company ratio:
    // "acme construction" against "acme constr".
    assert!((verdict.best_score - 79.0).abs() < 1e-9);
    assert_eq!(
        verdict.match_info(),
        "7, Jean Tremblay, 1980-01-01 --> ACME Construction Inc: 79"
    );
}

#[test]
fn abbreviated_employer_scores_100_once_trade_words_are_generic() {
    let registry = vec![registry_record("7", "Jean", "Tremblay", "1980-01-01", "ACME Construction Inc")];
    let config = MatchConfig {
        extra_company_words: vec!["construction".into(), "constr".into()],
        ..MatchConfig::default()
    };
    let matcher = Matcher::new(&config, &registry).unwrap();

    let candidates = matcher.candidates(&external("Acme Constr.", "Jean", "Tremblay"));
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id(), "7");
    assert!(!candidates[0].partial);

    let verdict = matcher.match_record(&external("Acme Constr.", "Jean", "Tremblay"));
    assert_eq!(verdict.best, BestMatch::Unique("7".into()));
    assert!((verdict.best_score - 100.0).abs() < 1e-9);
    assert_eq!(
        verdict.match_info(),
        "7, Jean Tremblay, 1980-01-01 --> ACME Construction Inc: 100"
    );
}

#[test]
fn unrelated_employer_has_no_match() {
    let registry = vec![registry_record("7", "Jean", "Tremblay", "1980-01-01", "ACME Construction Inc")];
    let matcher = Matcher::new(&MatchConfig::default(), &registry).unwrap();

    let verdict = matcher.match_record(&external("Unrelated Co", "Jean", "Tremblay"));
    assert_eq!(verdict.best, BestMatch::None);
    assert_eq!(verdict.best.to_string(), "");
    assert_eq!(verdict.best_score, 0.0);
    assert_eq!(verdict.distinct_match_count, 0);
}

#[test]
fn accents_and_case_in_names() {
    let registry = vec![registry_record("3", "Hélène", "Côté", "1970-07-07", "Béton Provincial Ltée")];
    let matcher = Matcher::new(&MatchConfig::default(), &registry).unwrap();

    let verdict = matcher.match_record(&external("BÉTON PROVINCIAL", "HÉLÈNE", "CÔTÉ"));
    assert_eq!(verdict.best, BestMatch::Unique("3".into()));
    assert!((verdict.best_score - 100.0).abs() < 1e-9);
}

// -------------------------------------------------------------------------
// Several registry records
// -------------------------------------------------------------------------

#[test]
fn namesakes_at_matching_employers_are_ambiguous() {
    let registry = vec![
        registry_record("1", "Jean", "Tremblay", "1980-01-01", "Roy Construction"),
        registry_record("2", "Jean", "Tremblay", "1991-09-09", "Roy Construction Inc"),
    ];
    let matcher = Matcher::new(&MatchConfig::default(), &registry).unwrap();

    let verdict = matcher.match_record(&external("Roy Construction", "Jean", "Tremblay"));
    assert_eq!(verdict.distinct_match_count, 2);
    assert_eq!(verdict.best, BestMatch::Ambiguous);
    assert_eq!(verdict.best.to_string(), "?");
    assert!(verdict.best_birth_date.is_none());
    assert!(!verdict.same_birth_date);
    // Equal scores keep registry order
    assert_eq!(verdict.audit[0].id, "1");
    assert_eq!(verdict.audit[1].id, "2");
}

#[test]
fn same_person_on_several_employer_rows_is_unique() {
    let registry = vec![
        registry_record("5", "Luc", "Gagnon", "1966-02-02", "Pomerleau"),
        registry_record("5", "Luc", "Gagnon", "1966-02-02", "Pomerleau Atlantique"),
        registry_record("6", "Luc", "Gagnon", "1977-03-03", "EBC"),
    ];
    let matcher = Matcher::new(&MatchConfig::default(), &registry).unwrap();

    let verdict = matcher.match_record(&external("Pomerleau", "Luc", "Gagnon"));
    assert_eq!(verdict.best, BestMatch::Unique("5".into()));
    assert_eq!(verdict.distinct_match_count, 1);
    assert_eq!(verdict.audit.len(), 2);
    assert!(verdict.audit[0].score >= verdict.audit[1].score);
}

#[test]
fn lineage_matches_through_previous_employer() {
    let mut record = registry_record("11", "Sophie", "Roy", "1988-08-08", "Hydro Québec");
    record.previous_employers = vec!["Kiewit".into()];
    let registry = vec![record];
    let matcher = Matcher::new(&MatchConfig::default(), &registry).unwrap();

    let verdict = matcher.match_record(&external("Kiewit Inc", "Sophie", "Roy"));
    assert_eq!(verdict.best, BestMatch::Unique("11".into()));
    assert_eq!(verdict.audit[0].display, "Hydro Québec [previous: Kiewit]");
}

#[test]
fn seven_candidates_keep_top_five() {
    let registry: Vec<RegistryRecord> = (0..7)
        .map(|i| registry_record(&format!("id{i}"), "Marc", "Roy", "1990-01-01", "Roy Electrique"))
        .collect();
    let matcher = Matcher::new(&MatchConfig::default(), &registry).unwrap();

    let verdict = matcher.match_record(&external("Roy Electrique", "Marc", "Roy"));
    assert_eq!(verdict.distinct_match_count, 7);
    assert_eq!(verdict.audit.len(), 5);
    let ids: Vec<&str> = verdict.audit.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["id0", "id1", "id2", "id3", "id4"]);
    assert!(verdict.same_birth_date);
}

#[test]
fn thresholds_come_from_config() {
    let registry = vec![registry_record("7", "Jean", "Tremblay", "1980-01-01", "ACME Construction Inc")];

    let strict = MatchConfig {
        min_company_match_ratio: 90,
        ..MatchConfig::default()
    };
    let matcher = Matcher::new(&strict, &registry).unwrap();
    assert_eq!(
        matcher.match_record(&external("Acme Constr.", "Jean", "Tremblay")).best,
        BestMatch::None
    );
}

#[test]
fn parallel_run_counts() {
    let registry = vec![
        registry_record("1", "Jean", "Tremblay", "1980-01-01", "Roy Construction"),
        registry_record("2", "Jean", "Tremblay", "1991-09-09", "Roy Construction"),
        registry_record("3", "Marie", "Gagnon", "1985-05-05", "Pomerleau"),
    ];
    let matcher = Matcher::new(&MatchConfig::default(), &registry).unwrap();
    let externals = vec![
        external("Roy Construction", "Jean", "Tremblay"),
        external("Pomerleau", "Marie", "Gagnon"),
        external("Pomerleau", "Marie-Eve", "Gagnon"),
        external("Kiewit", "Paul", "Nadeau"),
    ];

    let verdicts = matcher.match_all(&externals);
    let counts = count_verdicts(&verdicts);
    assert_eq!(counts.total, 4);
    assert_eq!(counts.ambiguous, 1);
    assert_eq!(counts.unique, 1);
    assert_eq!(counts.unmatched, 2);
}
