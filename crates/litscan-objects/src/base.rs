//! Term store: search terms of up to two dimensions.
//!
//! Each dimension holds an ordered list of term groups (synonym sets). An
//! inclusion or exclusion list, when present, lines up position by position
//! with the term list; an empty group means "none for this term".

use std::collections::BTreeMap;
use std::fmt::Write as _;

use litscan_common::error::{LitscanError, Result};
use litscan_common::{Dim, Term, TermKind, TermsDirectory};
use tracing::debug;

use crate::io::load_terms_file;

/// One term as given by a caller: a single word or a set of synonyms.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TermGroup(pub Vec<String>);

impl TermGroup {
    fn normalised(self) -> Vec<String> {
        self.0
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl From<&str> for TermGroup {
    fn from(s: &str) -> Self { TermGroup(vec![s.to_string()]) }
}

impl From<String> for TermGroup {
    fn from(s: String) -> Self { TermGroup(vec![s]) }
}

impl From<Vec<String>> for TermGroup {
    fn from(v: Vec<String>) -> Self { TermGroup(v) }
}

impl From<Vec<&str>> for TermGroup {
    fn from(v: Vec<&str>) -> Self { TermGroup(v.into_iter().map(String::from).collect()) }
}

impl From<&[&str]> for TermGroup {
    fn from(v: &[&str]) -> Self { TermGroup(v.iter().map(|s| s.to_string()).collect()) }
}

impl<const N: usize> From<[&str; N]> for TermGroup {
    fn from(v: [&str; N]) -> Self { TermGroup(v.iter().map(|s| s.to_string()).collect()) }
}

#[derive(Debug, Clone, Default)]
struct DimTerms {
    terms: Vec<Vec<String>>,
    inclusions: Option<Vec<Vec<String>>>,
    exclusions: Option<Vec<Vec<String>>>,
}

#[derive(Debug, Clone, Default)]
pub struct TermStore {
    dims: BTreeMap<Dim, DimTerms>,
}

impl TermStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_dim(&self, dim: Dim) -> bool {
        self.dims.get(&dim).is_some_and(|d| !d.terms.is_empty())
    }

    /// Dimensions that hold terms, A first.
    pub fn dims(&self) -> Vec<Dim> {
        Dim::ALL.into_iter().filter(|d| self.has_dim(*d)).collect()
    }

    pub fn n_terms(&self, dim: Dim) -> usize {
        self.dims.get(&dim).map_or(0, |d| d.terms.len())
    }

    pub fn terms(&self, dim: Dim) -> &[Vec<String>] {
        self.dims.get(&dim).map(|d| d.terms.as_slice()).unwrap_or(&[])
    }

    pub fn inclusions(&self, dim: Dim) -> Option<&[Vec<String>]> {
        self.dims.get(&dim).and_then(|d| d.inclusions.as_deref())
    }

    pub fn exclusions(&self, dim: Dim) -> Option<&[Vec<String>]> {
        self.dims.get(&dim).and_then(|d| d.exclusions.as_deref())
    }

    /// Canonical label (first synonym) of every term.
    pub fn labels(&self, dim: Dim) -> Vec<&str> {
        self.terms(dim)
            .iter()
            .map(|group| group.first().map_or("", String::as_str))
            .collect()
    }

    /// Term `index` of `dim` with its inclusions and exclusions attached.
    pub fn term(&self, dim: Dim, index: usize) -> Option<Term> {
        let d = self.dims.get(&dim)?;
        let search = d.terms.get(index)?.clone();
        let pick = |list: &Option<Vec<Vec<String>>>| {
            list.as_ref().and_then(|l| l.get(index).cloned()).unwrap_or_default()
        };
        Some(Term::new(search, pick(&d.inclusions), pick(&d.exclusions)))
    }

    pub fn all_terms(&self, dim: Dim) -> Vec<Term> {
        (0..self.n_terms(dim)).filter_map(|i| self.term(dim, i)).collect()
    }

    /// Append terms to `dim`, creating it if needed.
    pub fn add_terms<I, T>(&mut self, terms: I, dim: Dim) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<TermGroup>,
    {
        let groups: Vec<Vec<String>> =
            terms.into_iter().map(|t| t.into().normalised()).collect();

        if groups.is_empty() {
            return Err(LitscanError::Validation(format!("No terms given for dimension {dim}")));
        }
        if let Some(pos) = groups.iter().position(Vec::is_empty) {
            return Err(LitscanError::Validation(format!(
                "Term {pos} for dimension {dim} has no search words"
            )));
        }
        if dim == Dim::B && !self.has_dim(Dim::A) {
            return Err(LitscanError::Validation(
                "Dimension A must have terms before adding dimension B".to_string(),
            ));
        }

        let existing = self.dims.get(&dim);
        let new_len = existing.map_or(0, |d| d.terms.len()) + groups.len();
        if let Some(d) = existing {
            for (kind, list) in [
                (TermKind::Inclusions, &d.inclusions),
                (TermKind::Exclusions, &d.exclusions),
            ] {
                if let Some(list) = list {
                    if list.len() != new_len {
                        return Err(LitscanError::Validation(format!(
                            "Dimension {dim} would have {new_len} terms but {} {kind}",
                            list.len()
                        )));
                    }
                }
            }
        }

        debug!(%dim, added = groups.len(), total = new_len, "Adding terms");
        self.dims.entry(dim).or_default().terms.extend(groups);
        Ok(())
    }

    pub fn add_inclusions<I, T>(&mut self, terms: I, dim: Dim) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<TermGroup>,
    {
        self.add_aligned(terms, dim, TermKind::Inclusions)
    }

    pub fn add_exclusions<I, T>(&mut self, terms: I, dim: Dim) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<TermGroup>,
    {
        self.add_aligned(terms, dim, TermKind::Exclusions)
    }

    fn add_aligned<I, T>(&mut self, terms: I, dim: Dim, kind: TermKind) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<TermGroup>,
    {
        let groups: Vec<Vec<String>> =
            terms.into_iter().map(|t| t.into().normalised()).collect();

        let n_terms = self.n_terms(dim);
        if groups.len() != n_terms {
            return Err(LitscanError::Validation(format!(
                "Got {} {kind} for dimension {dim}, which has {n_terms} terms",
                groups.len()
            )));
        }

        // n_terms > 0 here, so the dimension exists
        if let Some(d) = self.dims.get_mut(&dim) {
            match kind {
                TermKind::Inclusions => d.inclusions = Some(groups),
                TermKind::Exclusions => d.exclusions = Some(groups),
                TermKind::Terms => unreachable!("terms are not an aligned list"),
            }
        }
        Ok(())
    }

    /// Add terms, inclusions or exclusions from a term file.
    pub fn add_terms_file<D>(
        &mut self,
        filename: &str,
        kind: TermKind,
        dim: Dim,
        directory: &D,
    ) -> Result<()>
    where
        D: TermsDirectory + ?Sized,
    {
        let path = directory.get_file_path("terms", filename);
        let groups = load_terms_file(&path, kind)?;
        debug!(path = %path.display(), %kind, lines = groups.len(), "Loaded term file");
        match kind {
            TermKind::Terms => self.add_terms(groups, dim),
            TermKind::Inclusions => self.add_inclusions(groups, dim),
            TermKind::Exclusions => self.add_exclusions(groups, dim),
        }
    }

    /// Remove a list from `dim`. Unloading the terms removes the whole dimension.
    pub fn unload_terms(&mut self, dim: Dim, kind: TermKind) -> Result<()> {
        match kind {
            TermKind::Terms => {
                if dim == Dim::A && self.has_dim(Dim::B) {
                    return Err(LitscanError::Validation(
                        "Unload dimension B before dimension A".to_string(),
                    ));
                }
                self.dims.remove(&dim);
            }
            TermKind::Inclusions => {
                if let Some(d) = self.dims.get_mut(&dim) {
                    d.inclusions = None;
                }
            }
            TermKind::Exclusions => {
                if let Some(d) = self.dims.get_mut(&dim) {
                    d.exclusions = None;
                }
            }
        }
        Ok(())
    }

    /// Listing of terms with their synonym counts, for one dimension or all.
    pub fn check_terms(&self, dim: Option<Dim>) -> String {
        let dims = match dim {
            Some(d) => vec![d],
            None => self.dims(),
        };

        let mut out = String::new();
        for dim in dims {
            let _ = writeln!(out, "List of terms for dimension {dim}:\n");
            let labels = self.labels(dim);
            let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
            for term in self.all_terms(dim) {
                let n = term.search.len();
                let _ = write!(
                    out,
                    "  {:<width$} ({} synonym{}) : {}",
                    term.label,
                    n,
                    if n == 1 { "" } else { "s" },
                    term.search.join(", ")
                );
                if !term.inclusions.is_empty() {
                    let _ = write!(out, " | including: {}", term.inclusions.join(", "));
                }
                if !term.exclusions.is_empty() {
                    let _ = write!(out, " | excluding: {}", term.exclusions.join(", "));
                }
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_add_terms_keeps_order_and_length() {
        let mut store = TermStore::new();
        store.add_terms(["language", "memory"], Dim::A).unwrap();
        store.add_terms([vec!["attention", "focus"]], Dim::A).unwrap();

        assert_eq!(store.n_terms(Dim::A), 3);
        assert_eq!(store.labels(Dim::A), vec!["language", "memory", "attention"]);
        assert_eq!(store.terms(Dim::A)[2], vec!["attention", "focus"]);
    }

    #[test]
    fn test_dimension_b_requires_a() {
        let mut store = TermStore::new();
        let err = store.add_terms(["cognition"], Dim::B).unwrap_err();
        assert!(matches!(err, LitscanError::Validation(_)));
        assert!(!store.has_dim(Dim::B));
    }

    #[test]
    fn test_exclusion_length_mismatch_fails() {
        let mut store = TermStore::new();
        store.add_terms(["language", "memory"], Dim::A).unwrap();

        let err = store.add_exclusions(["protein"], Dim::A).unwrap_err();
        assert!(matches!(err, LitscanError::Validation(_)));
        assert!(store.exclusions(Dim::A).is_none());

        let err = store.add_inclusions(["a", "b", "c"], Dim::A).unwrap_err();
        assert!(matches!(err, LitscanError::Validation(_)));
    }

    #[test]
    fn test_add_terms_after_exclusions_must_stay_aligned() {
        let mut store = TermStore::new();
        store.add_terms(["language", "memory"], Dim::A).unwrap();
        store.add_exclusions(["protein", ""], Dim::A).unwrap();

        let err = store.add_terms(["attention"], Dim::A).unwrap_err();
        assert!(matches!(err, LitscanError::Validation(_)));
        assert_eq!(store.n_terms(Dim::A), 2);
    }

    #[test]
    fn test_blank_exclusion_means_none_for_that_term() {
        let mut store = TermStore::new();
        store.add_terms(["language", "memory"], Dim::A).unwrap();
        store.add_exclusions(["protein", ""], Dim::A).unwrap();

        assert_eq!(store.term(Dim::A, 0).unwrap().exclusions, vec!["protein"]);
        assert!(store.term(Dim::A, 1).unwrap().exclusions.is_empty());
        assert_eq!(store.term(Dim::A, 1).unwrap().search_query(), r#"("memory")"#);
    }

    #[test]
    fn test_empty_term_rejected() {
        let mut store = TermStore::new();
        let err = store.add_terms(["language", "  "], Dim::A).unwrap_err();
        assert!(matches!(err, LitscanError::Validation(_)));
        assert_eq!(store.n_terms(Dim::A), 0);
    }

    #[test]
    fn test_unload_terms() {
        let mut store = TermStore::new();
        store.add_terms(["language"], Dim::A).unwrap();
        store.add_terms(["cognition"], Dim::B).unwrap();
        store.add_exclusions(["protein"], Dim::A).unwrap();

        assert!(store.unload_terms(Dim::A, TermKind::Terms).is_err());
        store.unload_terms(Dim::A, TermKind::Exclusions).unwrap();
        assert!(store.exclusions(Dim::A).is_none());
        store.unload_terms(Dim::B, TermKind::Terms).unwrap();
        assert_eq!(store.dims(), vec![Dim::A]);
    }

    #[test]
    fn test_check_terms_lists_synonym_counts() {
        let mut store = TermStore::new();
        store.add_terms([vec!["brain", "cortex"], vec!["body"]], Dim::A).unwrap();
        store.add_exclusions([vec!["protein"], vec![]], Dim::A).unwrap();

        let listing = store.check_terms(None);
        assert_eq!(
            listing,
            "List of terms for dimension A:\n\n  \
             brain (2 synonyms) : brain, cortex | excluding: protein\n  \
             body  (1 synonym) : body\n\n"
        );
    }

    #[test]
    fn test_check_terms_aligns_non_ascii_labels() {
        let mut store = TermStore::new();
        store.add_terms(["névrose", "memory"], Dim::A).unwrap();

        let listing = store.check_terms(Some(Dim::A));
        let lines: Vec<&str> = listing.lines().skip(2).take(2).collect();
        assert_eq!(lines[0], "  névrose (1 synonym) : névrose");
        assert_eq!(lines[1], "  memory  (1 synonym) : memory");
    }

    #[test]
    fn test_terms_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let terms = vec![
            vec!["event related potential".to_string(), "ERP".to_string()],
            vec!["P300".to_string()],
        ];
        let exclusions = vec![vec![], vec!["rat".to_string(), "mouse".to_string()]];
        crate::io::write_terms_file(&dir.path().join("erps.txt"), &terms).unwrap();
        crate::io::write_terms_file(&dir.path().join("erps_excl.txt"), &exclusions).unwrap();

        let mut store = TermStore::new();
        store.add_terms_file("erps.txt", TermKind::Terms, Dim::A, dir.path()).unwrap();
        store.add_terms_file("erps_excl.txt", TermKind::Exclusions, Dim::A, dir.path()).unwrap();

        assert_eq!(store.terms(Dim::A), terms.as_slice());
        assert_eq!(store.exclusions(Dim::A), Some(exclusions.as_slice()));
    }
}
