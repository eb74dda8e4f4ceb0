use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LinkageError;

/// Legal and business suffixes ignored when comparing employer names.
pub const DEFAULT_GENERIC_COMPANY_WORDS: &[&str] = &[
    "inc",
    "incorporated",
    "ltd",
    "ltée",
    "ltee",
    "limited",
    "llc",
    "corp",
    "corporation",
    "co",
    "company",
    "cie",
    "enr",
    "senc",
    "sa",
    "gmbh",
    "group",
    "groupe",
    "services",
];

pub const DEFAULT_MIN_FIRST_NAME_MATCH_RATIO: u8 = 80;
pub const DEFAULT_MIN_LAST_NAME_MATCH_RATIO: u8 = 90;
pub const DEFAULT_MIN_COMPANY_MATCH_RATIO: u8 = 60;
pub const DEFAULT_LIST_SEPARATOR: &str = ";";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Thresholds and normalization settings for one matching run.
///
/// Built once and handed to [`crate::engine::Matcher::new`]; nothing in the
/// engine reads thresholds from anywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchConfig {
    #[serde(default = "default_min_first")]
    pub min_first_name_match_ratio: u8,
    #[serde(default = "default_min_last")]
    pub min_last_name_match_ratio: u8,
    #[serde(default = "default_min_company")]
    pub min_company_match_ratio: u8,
    /// Separator used to split parent / previous employer alias lists.
    #[serde(default = "default_list_separator")]
    pub list_separator: String,
    /// Replaces the built-in generic word list when present.
    #[serde(default = "default_company_words")]
    pub generic_company_words: Vec<String>,
    /// Appended to `generic_company_words`.
    #[serde(default)]
    pub extra_company_words: Vec<String>,
}

fn default_min_first() -> u8 {
    DEFAULT_MIN_FIRST_NAME_MATCH_RATIO
}

fn default_min_last() -> u8 {
    DEFAULT_MIN_LAST_NAME_MATCH_RATIO
}

fn default_min_company() -> u8 {
    DEFAULT_MIN_COMPANY_MATCH_RATIO
}

fn default_list_separator() -> String {
    DEFAULT_LIST_SEPARATOR.into()
}

fn default_company_words() -> Vec<String> {
    DEFAULT_GENERIC_COMPANY_WORDS.iter().map(|w| w.to_string()).collect()
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_first_name_match_ratio: default_min_first(),
            min_last_name_match_ratio: default_min_last(),
            min_company_match_ratio: default_min_company(),
            list_separator: default_list_separator(),
            generic_company_words: default_company_words(),
            extra_company_words: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MatchConfig {
    pub fn from_toml(input: &str) -> Result<Self, LinkageError> {
        let config: MatchConfig =
            toml::from_str(input).map_err(|e| LinkageError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, LinkageError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| LinkageError::Io(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<(), LinkageError> {
        let ratios = [
            ("min_first_name_match_ratio", self.min_first_name_match_ratio),
            ("min_last_name_match_ratio", self.min_last_name_match_ratio),
            ("min_company_match_ratio", self.min_company_match_ratio),
        ];
        for (name, value) in ratios {
            if value > 100 {
                return Err(LinkageError::ConfigValidation(format!(
                    "{name} must be between 0 and 100, got {value}"
                )));
            }
        }

        if self.list_separator.is_empty() {
            return Err(LinkageError::ConfigValidation(
                "list_separator must not be empty".into(),
            ));
        }

        if let Some(word) = self.company_words().find(|w| w.trim().is_empty()) {
            return Err(LinkageError::InvalidCompanyWord {
                word: word.to_string(),
                reason: "blank words would match everywhere".into(),
            });
        }

        Ok(())
    }

    /// All generic company words: the base list followed by the extras.
    pub fn company_words(&self) -> impl Iterator<Item = &str> + '_ {
        self.generic_company_words
            .iter()
            .chain(self.extra_company_words.iter())
            .map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
