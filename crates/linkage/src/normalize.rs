//! Canonical forms of names and employer labels used for comparison.

use regex::{Regex, RegexBuilder};

use crate::error::LinkageError;

/// Lower-case and trim a person name. Internal punctuation is kept.
pub fn normalize_name(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Employer-name normalizer with a compiled generic-word pattern.
///
/// Holds only immutable compiled state, so one instance is shared by every
/// worker of a run.
#[derive(Debug, Clone)]
pub struct CompanyNormalizer {
    parenthetical: Regex,
    generic_words: Option<Regex>,
}

impl CompanyNormalizer {
    pub fn new<'a>(words: impl IntoIterator<Item = &'a str>) -> Result<Self, LinkageError> {
        let parenthetical = Regex::new(r"\([^()]*\)").map_err(|e| LinkageError::InvalidCompanyWord {
            word: "(...)".into(),
            reason: e.to_string(),
        })?;

        let mut alternatives: Vec<String> = Vec::new();
        for word in words {
            let cleaned = strip_punctuation(&word.trim().to_lowercase());
            if cleaned.trim().is_empty() {
                return Err(LinkageError::InvalidCompanyWord {
                    word: word.to_string(),
                    reason: "word is empty once punctuation is removed".into(),
                });
            }
            alternatives.push(regex::escape(cleaned.trim()));
        }

        // Longest first so "corporation" wins over "corp" inside the alternation.
        alternatives.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        alternatives.dedup();

        let generic_words = if alternatives.is_empty() {
            None
        } else {
            let pattern = format!(r"\b(?:{})\b", alternatives.join("|"));
            let re = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| LinkageError::InvalidCompanyWord {
                    word: alternatives.join(", "),
                    reason: e.to_string(),
                })?;
            Some(re)
        };

        Ok(Self {
            parenthetical,
            generic_words,
        })
    }

    /// Lower-case, drop periods and commas, strip `(...)` groups, then remove
    /// generic words and collapse the whitespace they leave behind.
    pub fn normalize(&self, s: &str) -> String {
        let lowered = strip_punctuation(&s.to_lowercase());
        let without_parens = self.parenthetical.replace_all(&lowered, " ");
        let trimmed = without_parens.trim();

        match &self.generic_words {
            Some(re) => collapse_whitespace(&re.replace_all(trimmed, " ")),
            None => collapse_whitespace(trimmed),
        }
    }
}

fn strip_punctuation(s: &str) -> String {
    s.chars().filter(|c| *c != '.' && *c != ',').collect()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_GENERIC_COMPANY_WORDS;

    fn default_normalizer() -> CompanyNormalizer {
        CompanyNormalizer::new(DEFAULT_GENERIC_COMPANY_WORDS.iter().copied()).unwrap()
    }

    #[test]
    fn name_is_lowercased_and_trimmed() {
        assert_eq!(normalize_name("  Jean-Éric "), "jean-éric");
        assert_eq!(normalize_name("O'Neil"), "o'neil");
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn company_suffixes_and_punctuation_removed() {
        let n = default_normalizer();
        assert_eq!(n.normalize("ACME Construction Inc."), "acme construction");
        assert_eq!(n.normalize("Acme Constr."), "acme constr");
        assert_eq!(n.normalize("Les Entreprises Roy, Ltée"), "les entreprises roy");
        assert_eq!(n.normalize("Hydro Services Group"), "hydro");
    }

    #[test]
    fn company_parenthetical_removed() {
        let n = default_normalizer();
        assert_eq!(n.normalize("Pomerleau (Montreal division) Inc"), "pomerleau");
        assert_eq!(n.normalize("(old) Roy (QC)"), "roy");
    }

    #[test]
    fn generic_words_only_match_whole_words() {
        let n = default_normalizer();
        // "co" inside "coastal" and "inc" inside "incline" must survive
        assert_eq!(n.normalize("Coastal Incline Co"), "coastal incline");
    }

    #[test]
    fn generic_words_are_case_insensitive() {
        let n = CompanyNormalizer::new(["LLC"]).unwrap();
        assert_eq!(n.normalize("Widget llc"), "widget");
    }

    #[test]
    fn generic_word_with_period_matches_stripped_form() {
        let n = CompanyNormalizer::new(["inc."]).unwrap();
        assert_eq!(n.normalize("Widget Inc."), "widget");
    }

    #[test]
    fn empty_and_whitespace_inputs() {
        let n = default_normalizer();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("   "), "");
        assert_eq!(n.normalize("Inc."), "");
        assert_eq!(n.normalize("()"), "");
    }

    #[test]
    fn no_words_configured() {
        let n = CompanyNormalizer::new(std::iter::empty()).unwrap();
        assert_eq!(n.normalize("Widget, Inc."), "widget inc");
    }

    #[test]
    fn punctuation_only_word_rejected() {
        let err = CompanyNormalizer::new([".,"]).unwrap_err();
        assert!(matches!(err, LinkageError::InvalidCompanyWord { .. }));
    }
}
