use std::collections::HashSet;

use crate::model::{AuditEntry, BestMatch, MatchCandidate, MatchVerdict, AUDIT_LIMIT};

/// Rank the candidates of one external record and derive its verdict.
///
/// Candidates are ordered by score, highest first; equal scores keep their
/// input (registry scan) order.
pub fn resolve(mut candidates: Vec<MatchCandidate<'_>>) -> MatchVerdict {
    if candidates.is_empty() {
        return MatchVerdict::empty();
    }

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut seen: HashSet<&str> = HashSet::new();
    let distinct_ids: Vec<&str> = candidates
        .iter()
        .map(|c| c.id())
        .filter(|id| seen.insert(*id))
        .collect();

    let top = &candidates[0];

    let best = match distinct_ids.as_slice() {
        [] => BestMatch::None,
        [only] => BestMatch::Unique(only.to_string()),
        _ => BestMatch::Ambiguous,
    };

    let best_birth_date = match best {
        BestMatch::Unique(_) => Some(top.birth_date().to_string()),
        BestMatch::None | BestMatch::Ambiguous => None,
    };

    let same_birth_date = distinct_ids.len() <= 1
        || candidates
            .iter()
            .all(|c| c.birth_date() == top.birth_date());

    let audit = candidates
        .iter()
        .take(AUDIT_LIMIT)
        .map(|c| AuditEntry {
            id: c.record.id.clone(),
            first_name: c.record.first_name.clone(),
            last_name: c.record.last_name.clone(),
            birth_date: c.record.birth_date.clone(),
            display: c.display.clone(),
            score: c.score,
        })
        .collect();

    MatchVerdict {
        best,
        best_birth_date,
        best_score: top.score,
        partial: top.partial,
        same_birth_date,
        distinct_match_count: distinct_ids.len(),
        audit,
    }
}
