//! Search term types shared by the term store and the collectors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LitscanError;

// ---------------------------------------------------------------------------
// Dimension
// ---------------------------------------------------------------------------

/// Axis of a count or co-occurrence query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dim {
    A,
    B,
}

impl Dim {
    pub const ALL: [Dim; 2] = [Dim::A, Dim::B];

    pub fn index(self) -> usize {
        match self {
            Dim::A => 0,
            Dim::B => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Dim> {
        match index {
            0 => Some(Dim::A),
            1 => Some(Dim::B),
            _ => None,
        }
    }

    pub fn other(self) -> Dim {
        match self {
            Dim::A => Dim::B,
            Dim::B => Dim::A,
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::A => f.write_str("A"),
            Dim::B => f.write_str("B"),
        }
    }
}

impl FromStr for Dim {
    type Err = LitscanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Dim::A),
            "B" | "b" => Ok(Dim::B),
            other => Err(LitscanError::Validation(format!("Unknown dimension '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Term lists
// ---------------------------------------------------------------------------

/// Which list of a dimension a set of synonym groups belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermKind {
    Terms,
    Inclusions,
    Exclusions,
}

impl TermKind {
    /// Blank lines are positional placeholders only in inclusion/exclusion lists.
    pub fn allows_blank(self) -> bool {
        !matches!(self, TermKind::Terms)
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermKind::Terms => f.write_str("terms"),
            TermKind::Inclusions => f.write_str("inclusions"),
            TermKind::Exclusions => f.write_str("exclusions"),
        }
    }
}

/// A search concept: its synonyms plus optional inclusion/exclusion words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Canonical label (the first synonym)
    pub label: String,
    pub search: Vec<String>,
    #[serde(default)]
    pub inclusions: Vec<String>,
    #[serde(default)]
    pub exclusions: Vec<String>,
}

impl Term {
    pub fn new(search: Vec<String>, inclusions: Vec<String>, exclusions: Vec<String>) -> Self {
        let label = search.first().cloned().unwrap_or_default();
        Self { label, search, inclusions, exclusions }
    }

    /// E-utilities query for this term: synonyms OR'ed, inclusions AND'ed in, exclusions NOT'ed out.
    ///
    /// `["language", "speech"]` with exclusion `["protein"]` becomes
    /// `("language"OR"speech")NOT("protein")`.
    pub fn search_query(&self) -> String {
        let mut query = join_group(&self.search, "OR", "");
        query.push_str(&join_group(&self.inclusions, "OR", "AND"));
        query.push_str(&join_group(&self.exclusions, "OR", "NOT"));
        query
    }
}

/// Query matching documents that satisfy both terms.
pub fn pair_query(first: &Term, second: &Term) -> String {
    format!("({})AND({})", first.search_query(), second.search_query())
}

fn join_group(words: &[String], joiner: &str, prefix: &str) -> String {
    if words.is_empty() {
        return String::new();
    }
    let quoted: Vec<String> = words.iter().map(|w| format!("\"{w}\"")).collect();
    format!("{prefix}({})", quoted.join(joiner))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_label_is_first_synonym() {
        let term = Term::new(strings(&["brain", "cortex"]), vec![], vec![]);
        assert_eq!(term.label, "brain");
    }

    #[test]
    fn test_search_query_with_all_parts() {
        let term = Term::new(
            strings(&["language", "speech"]),
            strings(&["human"]),
            strings(&["protein", "gene"]),
        );
        assert_eq!(
            term.search_query(),
            r#"("language"OR"speech")AND("human")NOT("protein"OR"gene")"#
        );
    }

    #[test]
    fn test_pair_query_wraps_both_terms() {
        let a = Term::new(strings(&["memory"]), vec![], strings(&["protein"]));
        let b = Term::new(strings(&["cognition"]), vec![], vec![]);
        assert_eq!(
            pair_query(&a, &b),
            r#"(("memory")NOT("protein"))AND(("cognition"))"#
        );
    }

    #[test]
    fn test_dim_parsing_and_index() {
        assert_eq!("A".parse::<Dim>().unwrap(), Dim::A);
        assert_eq!("b".parse::<Dim>().unwrap(), Dim::B);
        assert!("C".parse::<Dim>().is_err());
        assert_eq!(Dim::from_index(1), Some(Dim::B));
        assert_eq!(Dim::from_index(2), None);
        assert_eq!(Dim::A.other(), Dim::B);
    }
}
