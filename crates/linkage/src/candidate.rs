use crate::config::MatchConfig;
use crate::error::LinkageError;
use crate::model::{ExternalRecord, MatchCandidate, RegistryRecord};
use crate::normalize::{normalize_name, CompanyNormalizer};
use crate::similarity::{token_set_ratio, token_sort_ratio};

/// Gating thresholds, copied out of [`MatchConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub first_name: u8,
    pub last_name: u8,
    pub company: u8,
}

impl From<&MatchConfig> for Thresholds {
    fn from(config: &MatchConfig) -> Self {
        Self {
            first_name: config.min_first_name_match_ratio,
            last_name: config.min_last_name_match_ratio,
            company: config.min_company_match_ratio,
        }
    }
}

/// Per-field ratios of one (external, registry) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRatios {
    pub first_name: u8,
    pub last_name: u8,
    pub company: u8,
    pub parent: u8,
    pub previous: u8,
}

impl FieldRatios {
    /// Best employer ratio across the current employer and its lineage.
    pub fn best_company(&self) -> u8 {
        self.company.max(self.parent).max(self.previous)
    }

    /// Product of the three field ratios, scaled back to [0, 100].
    pub fn composite(&self) -> f64 {
        f64::from(self.best_company()) * f64::from(self.first_name) * f64::from(self.last_name)
            / 10_000.0
    }
}

/// Registry record with its comparison forms computed once per run.
#[derive(Debug)]
struct PreparedRecord<'r> {
    record: &'r RegistryRecord,
    first_name: String,
    last_name: String,
    /// First and last name together, for external rosters with a single name field.
    full_name: String,
    employer: String,
    parents: Vec<String>,
    previous: Vec<String>,
    display: String,
}

impl<'r> PreparedRecord<'r> {
    fn new(record: &'r RegistryRecord, companies: &CompanyNormalizer, separator: &str) -> Self {
        let employer_raw = record.employer.trim();

        let parent_aliases: Vec<&str> = record
            .parent_employers
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty() && *a != employer_raw)
            .collect();

        let previous_aliases: Vec<&str> = record
            .previous_employers
            .iter()
            .map(|a| a.trim())
            .filter(|a| {
                !a.is_empty()
                    && *a != employer_raw
                    && !record.parent_employers.iter().any(|p| p.trim() == *a)
            })
            .collect();

        let first_name = normalize_name(&record.first_name);
        let last_name = normalize_name(&record.last_name);
        let full_name = normalize_name(&format!("{} {}", record.first_name, record.last_name));

        Self {
            record,
            first_name,
            last_name,
            full_name,
            employer: companies.normalize(&record.employer),
            parents: parent_aliases.iter().map(|a| companies.normalize(a)).collect(),
            previous: previous_aliases.iter().map(|a| companies.normalize(a)).collect(),
            display: display_string(&record.employer, &parent_aliases, &previous_aliases, separator),
        }
    }
}

/// Employer name followed by bracketed lineage annotations, when any.
pub fn display_string(employer: &str, parents: &[&str], previous: &[&str], separator: &str) -> String {
    let joiner = format!("{separator} ");
    let mut display = employer.trim().to_string();
    if !parents.is_empty() {
        display.push_str(&format!(" [parents: {}]", parents.join(&joiner)));
    }
    if !previous.is_empty() {
        display.push_str(&format!(" [previous: {}]", previous.join(&joiner)));
    }
    display
}

/// Scans the registry for candidates of one external record at a time.
#[derive(Debug)]
pub struct CandidateGenerator<'r> {
    thresholds: Thresholds,
    companies: CompanyNormalizer,
    registry: Vec<PreparedRecord<'r>>,
}

impl<'r> CandidateGenerator<'r> {
    pub fn new(config: &MatchConfig, registry: &'r [RegistryRecord]) -> Result<Self, LinkageError> {
        config.validate()?;
        let companies = CompanyNormalizer::new(config.company_words())?;
        let registry = registry
            .iter()
            .map(|r| PreparedRecord::new(r, &companies, &config.list_separator))
            .collect();

        Ok(Self {
            thresholds: Thresholds::from(config),
            companies,
            registry,
        })
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn registry_len(&self) -> usize {
        self.registry.len()
    }

    /// Every registry record passing both gates, in registry order.
    pub fn generate(&self, external: &ExternalRecord) -> Vec<MatchCandidate<'r>> {
        let query = Query {
            first_name: normalize_name(&external.first_name),
            last_name: normalize_name(&external.last_name),
            employer: self.companies.normalize(&external.employer),
        };

        self.registry
            .iter()
            .filter_map(|prepared| self.score(prepared, &query))
            .collect()
    }

    fn score(&self, prepared: &PreparedRecord<'r>, query: &Query) -> Option<MatchCandidate<'r>> {
        let t = self.thresholds;

        // Absent names never match.
        if query.last_name.is_empty() {
            return None;
        }

        // A single-field external name is compared against the whole registry name.
        let (first_name, last_name, partial) = if query.first_name.is_empty() {
            if prepared.full_name.is_empty() {
                return None;
            }
            (100, token_sort_ratio(&prepared.full_name, &query.last_name), false)
        } else {
            let first = token_set_ratio(&prepared.first_name, &query.first_name);
            let last = token_sort_ratio(&prepared.last_name, &query.last_name);
            let exact_first = token_sort_ratio(&prepared.first_name, &query.first_name);
            (first, last, exact_first < t.first_name)
        };

        if first_name < t.first_name || last_name < t.last_name {
            return None;
        }

        let ratios = FieldRatios {
            first_name,
            last_name,
            company: company_ratio(&prepared.employer, &query.employer),
            parent: best_alias_ratio(&prepared.parents, &query.employer),
            previous: best_alias_ratio(&prepared.previous, &query.employer),
        };

        if ratios.best_company() < t.company {
            return None;
        }

        Some(MatchCandidate {
            record: prepared.record,
            display: prepared.display.clone(),
            score: ratios.composite(),
            partial,
        })
    }
}

/// Normalized fields of the external record being matched.
struct Query {
    first_name: String,
    last_name: String,
    employer: String,
}

/// Employers left empty by normalization (blank, or only generic words) score 0.
fn company_ratio(registry: &str, external: &str) -> u8 {
    if registry.is_empty() || external.is_empty() {
        return 0;
    }
    token_sort_ratio(registry, external)
}

fn best_alias_ratio(aliases: &[String], employer: &str) -> u8 {
    aliases
        .iter()
        .map(|alias| company_ratio(alias, employer))
        .max()
        .unwrap_or(0)
}
