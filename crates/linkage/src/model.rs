use std::fmt;

use serde::Serialize;

/// Rendered in place of an identifier when several registry identities qualify.
pub const AMBIGUOUS_SENTINEL: &str = "?";

/// Number of candidates kept in a verdict's audit list.
pub const AUDIT_LIMIT: usize = 5;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One row of the authoritative registry.
///
/// The same `id` may appear on several rows (one per employer affiliation).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Opaque; compared verbatim, never parsed.
    pub birth_date: String,
    pub employer: String,
    pub parent_employers: Vec<String>,
    pub previous_employers: Vec<String>,
}

/// One row of the externally supplied roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalRecord {
    pub employer: String,
    pub first_name: String,
    pub last_name: String,
    /// Pass-through columns, carried to the report untouched.
    pub extra: Vec<String>,
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// A registry record that passed every gate against one external record.
#[derive(Debug, Clone)]
pub struct MatchCandidate<'r> {
    pub record: &'r RegistryRecord,
    /// Employer plus lineage annotations.
    pub display: String,
    /// Composite score in [0, 100].
    pub score: f64,
    pub partial: bool,
}

impl MatchCandidate<'_> {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn birth_date(&self) -> &str {
        &self.record.birth_date
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum BestMatch {
    None,
    Unique(String),
    Ambiguous,
}

impl BestMatch {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Unique(id) => Some(id),
            Self::None | Self::Ambiguous => None,
        }
    }
}

impl fmt::Display for BestMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Unique(id) => write!(f, "{id}"),
            Self::Ambiguous => write!(f, "{AMBIGUOUS_SENTINEL}"),
        }
    }
}

/// One line of a verdict's audit list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub display: String,
    pub score: f64,
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} {}, {} --> {}: {}",
            self.id,
            self.first_name,
            self.last_name,
            self.birth_date,
            self.display,
            format_score(self.score)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchVerdict {
    pub best: BestMatch,
    /// Set only when `best` is unique.
    pub best_birth_date: Option<String>,
    pub best_score: f64,
    pub partial: bool,
    pub same_birth_date: bool,
    pub distinct_match_count: usize,
    pub audit: Vec<AuditEntry>,
}

impl MatchVerdict {
    pub fn empty() -> Self {
        Self {
            best: BestMatch::None,
            best_birth_date: None,
            best_score: 0.0,
            partial: false,
            same_birth_date: true,
            distinct_match_count: 0,
            audit: Vec::new(),
        }
    }

    /// Audit entries, one per line.
    pub fn match_info(&self) -> String {
        self.audit
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Scores are printed with at most two decimals and no trailing zeros.
pub fn format_score(score: f64) -> String {
    let s = format!("{score:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
