//! Free-text query resolution against the inverted index.

use std::collections::{BTreeMap, HashSet};

use regex::Regex;

/// Which documents a lane's query admits into aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    /// Empty query: every document passes. The wildcard default is
    /// deliberate, not a fallback.
    All,
    Ids(HashSet<String>),
}

impl Membership {
    pub fn contains(&self, item_id: &str) -> bool {
        match self {
            Membership::All => true,
            Membership::Ids(ids) => ids.contains(item_id),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Membership::All)
    }
}

/// Resolve a query in two phases per term: an exact index hit, then a
/// pattern sweep over every index key. Terms combine with OR semantics, so
/// the result is the union of all matched postings. A non-empty query that
/// matches no term yields an empty set, which zeroes that lane's series.
pub fn resolve_query(text: &str, index: &BTreeMap<String, Vec<String>>) -> Membership {
    let terms: Vec<&str> = text.split_whitespace().collect();
    if terms.is_empty() {
        return Membership::All;
    }

    let mut matched_keys: HashSet<&str> = HashSet::new();
    for term in terms {
        if index.contains_key(term) {
            matched_keys.insert(term);
            continue;
        }
        // Unanchored pattern sweep; a term that fails to compile matches
        // nothing rather than erroring.
        if let Ok(pattern) = Regex::new(term) {
            for key in index.keys() {
                if pattern.is_match(key) {
                    matched_keys.insert(key.as_str());
                }
            }
        }
    }

    let mut ids = HashSet::new();
    for key in matched_keys {
        if let Some(postings) = index.get(key) {
            ids.extend(postings.iter().cloned());
        }
    }
    Membership::Ids(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> BTreeMap<String, Vec<String>> {
        let mut index = BTreeMap::new();
        index.insert("strike".to_string(), vec!["a".to_string(), "b".to_string()]);
        index.insert("striker".to_string(), vec!["c".to_string()]);
        index.insert("union".to_string(), vec!["d".to_string()]);
        index
    }

    #[test]
    fn empty_query_is_wildcard() {
        assert_eq!(resolve_query("", &index()), Membership::All);
        assert_eq!(resolve_query("   ", &index()), Membership::All);
    }

    #[test]
    fn exact_term_skips_the_pattern_sweep() {
        // "strike" is an exact key, so "striker" postings stay out.
        let membership = resolve_query("strike", &index());
        assert!(membership.contains("a"));
        assert!(membership.contains("b"));
        assert!(!membership.contains("c"));
    }

    #[test]
    fn unmatched_terms_fall_back_to_patterns() {
        // "stri." is not a key; as a pattern it matches both strike keys.
        let membership = resolve_query("stri.", &index());
        assert!(membership.contains("a"));
        assert!(membership.contains("c"));
        assert!(!membership.contains("d"));
    }

    #[test]
    fn terms_union_with_or_semantics() {
        let membership = resolve_query("striker union", &index());
        assert!(membership.contains("c"));
        assert!(membership.contains("d"));
        assert!(!membership.contains("a"));
    }

    #[test]
    fn hopeless_query_yields_empty_set_not_wildcard() {
        let membership = resolve_query("zzz", &index());
        assert_eq!(membership, Membership::Ids(HashSet::new()));
        assert!(!membership.contains("a"));
    }

    #[test]
    fn invalid_pattern_matches_nothing() {
        let membership = resolve_query("(unclosed", &index());
        assert_eq!(membership, Membership::Ids(HashSet::new()));
    }
}
