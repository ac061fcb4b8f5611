//! Article counts and co-occurrences for one or two dimensions of terms.
//!
//! Results are tracked per dimension ("slice"):
//!
//! ```text
//! Empty ──add_terms──▶ TermsLoaded ──run_scrape──▶ Scraped
//!                          ▲   │                     │
//!                          │   └──(request failed)──▶ Incomplete
//!                          └────────drop_data────────┘
//! ```
//!
//! Term lists of a slice holding results are frozen until the results are dropped.

use std::fmt::Write as _;

use litscan_collect::{CountSource, EUtilsCounter, MetaData};
use litscan_common::error::{CollectionError, FailedQuery, LitscanError, Result};
use litscan_common::term::pair_query;
use litscan_common::{CollectionConfig, Dim, TermKind, TermsDirectory};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::base::{TermGroup, TermStore};
use crate::matrix::Matrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceState {
    Empty,
    TermsLoaded,
    Scraped,
    /// A scrape ran but some requests failed; successful values are kept.
    Incomplete,
}

/// Which slice of results to act on: a dimension, or its index (0 = A, 1 = B).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSelector {
    Dim(Dim),
    Index(usize),
}

impl From<Dim> for DataSelector {
    fn from(dim: Dim) -> Self { DataSelector::Dim(dim) }
}

impl From<usize> for DataSelector {
    fn from(index: usize) -> Self { DataSelector::Index(index) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreType {
    /// Co-occurrence divided by the row term's count
    Normalize,
    /// Jaccard index: co-occurrence over the union of both terms' documents
    Association,
}

#[derive(Debug, Clone, Default)]
enum SliceResults {
    #[default]
    Pending,
    Scraped(Vec<u64>),
    Incomplete(Vec<Option<u64>>),
}

impl SliceResults {
    fn from_values(values: Vec<Option<u64>>) -> Self {
        match values.iter().copied().collect::<Option<Vec<u64>>>() {
            Some(complete) => SliceResults::Scraped(complete),
            None => SliceResults::Incomplete(values),
        }
    }

    fn value(&self, index: usize) -> Option<u64> {
        match self {
            SliceResults::Pending => None,
            SliceResults::Scraped(v) => v.get(index).copied(),
            SliceResults::Incomplete(v) => v.get(index).copied().flatten(),
        }
    }
}

#[derive(Debug, Clone, Default)]
enum CoocResults {
    #[default]
    Pending,
    Scraped(Matrix<u64>),
    Incomplete(Matrix<Option<u64>>),
}

#[derive(Debug, Default)]
pub struct Counts {
    terms: TermStore,
    slices: [SliceResults; 2],
    cooc: CoocResults,
    score: Option<(ScoreType, Matrix<f64>)>,
    meta_data: Option<MetaData>,
}

impl Counts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terms(&self) -> &TermStore {
        &self.terms
    }

    pub fn state(&self, dim: Dim) -> SliceState {
        if !self.terms.has_dim(dim) {
            return SliceState::Empty;
        }
        match self.slices[dim.index()] {
            SliceResults::Pending => SliceState::TermsLoaded,
            SliceResults::Scraped(_) => SliceState::Scraped,
            SliceResults::Incomplete(_) => SliceState::Incomplete,
        }
    }

    /// Provenance of the last `run_scrape`.
    pub fn meta_data(&self) -> Option<&MetaData> {
        self.meta_data.as_ref()
    }

    // ── Terms ────────────────────────────────────────────────────────────────

    fn ensure_mutable(&self, dim: Dim) -> Result<()> {
        match self.state(dim) {
            SliceState::Scraped | SliceState::Incomplete => Err(LitscanError::State(format!(
                "Dimension {dim} holds collected data; drop it before changing its terms"
            ))),
            _ => Ok(()),
        }
    }

    /// Any change to the terms invalidates the co-occurrence matrix.
    fn terms_changed(&mut self) {
        self.cooc = CoocResults::Pending;
        self.score = None;
    }

    pub fn add_terms<I, T>(&mut self, terms: I, dim: Dim) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<TermGroup>,
    {
        self.ensure_mutable(dim)?;
        self.terms.add_terms(terms, dim)?;
        self.terms_changed();
        Ok(())
    }

    pub fn add_inclusions<I, T>(&mut self, terms: I, dim: Dim) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<TermGroup>,
    {
        self.ensure_mutable(dim)?;
        self.terms.add_inclusions(terms, dim)?;
        self.terms_changed();
        Ok(())
    }

    pub fn add_exclusions<I, T>(&mut self, terms: I, dim: Dim) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<TermGroup>,
    {
        self.ensure_mutable(dim)?;
        self.terms.add_exclusions(terms, dim)?;
        self.terms_changed();
        Ok(())
    }

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
        self.ensure_mutable(dim)?;
        self.terms.add_terms_file(filename, kind, dim, directory)?;
        self.terms_changed();
        Ok(())
    }

    pub fn unload_terms(&mut self, dim: Dim, kind: TermKind) -> Result<()> {
        self.ensure_mutable(dim)?;
        self.terms.unload_terms(dim, kind)?;
        self.terms_changed();
        Ok(())
    }

    pub fn check_terms(&self, dim: Option<Dim>) -> String {
        self.terms.check_terms(dim)
    }

    // ── Scraping ─────────────────────────────────────────────────────────────

    /// Dimensions still needing counts. Fails if there is nothing to scrape.
    fn dims_to_scrape(&self, collect_coocs: bool) -> Result<Vec<Dim>> {
        let dims = self.terms.dims();
        if dims.is_empty() {
            return Err(LitscanError::State(
                "No terms loaded; add terms before scraping".to_string(),
            ));
        }

        let pending: Vec<Dim> = dims
            .into_iter()
            .filter(|d| self.state(*d) != SliceState::Scraped)
            .collect();
        let cooc_done = matches!(self.cooc, CoocResults::Scraped(_));
        if pending.is_empty() && (!collect_coocs || cooc_done) {
            return Err(LitscanError::State(
                "Data has already been collected; drop it before scraping again".to_string(),
            ));
        }
        Ok(pending)
    }

    /// Collect counts from E-utilities as configured, recording provenance.
    #[instrument(skip(self, config), fields(db = %config.db))]
    pub async fn run_scrape(&mut self, config: &CollectionConfig) -> Result<()> {
        self.dims_to_scrape(config.collect_coocs)?;
        let mut source = EUtilsCounter::from_config(config)?;

        let mut info_failure = None;
        let db_info = match source.db_info().await {
            Ok(db_info) => Some(db_info),
            Err(error) => {
                warn!(%error, "Could not collect database info");
                info_failure = Some(FailedQuery { label: "database info".to_string(), error });
                None
            }
        };

        let result = self.scrape_with(&mut source, config.collect_coocs).await;
        self.meta_data = Some(MetaData::new(db_info, source.close()));

        match (result, info_failure) {
            (result, None) => result,
            (Ok(()), Some(failure)) => Err(CollectionError { failures: vec![failure] }.into()),
            (Err(LitscanError::Collection(mut err)), Some(failure)) => {
                err.failures.insert(0, failure);
                Err(err.into())
            }
            (Err(err), Some(_)) => Err(err),
        }
    }

    /// Collect counts through any count source.
    ///
    /// Every query is attempted; failures are gathered into a single
    /// `Collection` error once the loop finishes, and whatever succeeded
    /// stays available through `partial_counts` / `partial_cooc`.
    pub async fn scrape_with(
        &mut self,
        source: &mut dyn CountSource,
        collect_coocs: bool,
    ) -> Result<()> {
        let dims = self.dims_to_scrape(collect_coocs)?;
        let mut failures = Vec::new();

        for dim in dims {
            let terms = self.terms.all_terms(dim);
            info!(%dim, n_terms = terms.len(), "Collecting term counts");

            let mut values = Vec::with_capacity(terms.len());
            for term in &terms {
                values.push(query_count(source, &term.search_query(), &term.label, &mut failures).await);
            }
            self.slices[dim.index()] = SliceResults::from_values(values);
        }

        if collect_coocs {
            self.collect_cooc(source, &mut failures).await;
        }

        if failures.is_empty() {
            info!("Collection complete");
            Ok(())
        } else {
            warn!(n_failed = failures.len(), "Collection finished with failures");
            Err(CollectionError { failures }.into())
        }
    }

    async fn collect_cooc(&mut self, source: &mut dyn CountSource, failures: &mut Vec<FailedQuery>) {
        let rows = self.terms.all_terms(Dim::A);
        let square = !self.terms.has_dim(Dim::B);
        let cols = if square { rows.clone() } else { self.terms.all_terms(Dim::B) };
        info!(n_rows = rows.len(), n_cols = cols.len(), square, "Collecting co-occurrences");

        let mut matrix: Matrix<Option<u64>> = Matrix::filled(rows.len(), cols.len(), None);
        for (i, a) in rows.iter().enumerate() {
            for (j, b) in cols.iter().enumerate() {
                let value = if square && i == j {
                    // A term co-occurs with itself in every document it appears in
                    self.slices[Dim::A.index()].value(i)
                } else if square && j < i {
                    matrix.get(j, i).copied().flatten()
                } else {
                    let label = format!("{} & {}", a.label, b.label);
                    query_count(source, &pair_query(a, b), &label, failures).await
                };
                matrix.set(i, j, value);
            }
        }

        self.cooc = match matrix.complete() {
            Some(complete) => CoocResults::Scraped(complete),
            None => CoocResults::Incomplete(matrix),
        };
        self.score = None;
    }

    // ── Results ──────────────────────────────────────────────────────────────

    /// Complete counts for `dim`; only available once the slice is `Scraped`.
    pub fn counts(&self, dim: Dim) -> Result<&[u64]> {
        match &self.slices[dim.index()] {
            SliceResults::Scraped(values) if self.terms.has_dim(dim) => Ok(values),
            _ => Err(LitscanError::State(format!(
                "No complete counts for dimension {dim} (state: {:?})",
                self.state(dim)
            ))),
        }
    }

    /// Whatever counts were collected for `dim`, `None` where a request failed.
    pub fn partial_counts(&self, dim: Dim) -> Option<Vec<Option<u64>>> {
        match &self.slices[dim.index()] {
            SliceResults::Pending => None,
            SliceResults::Scraped(v) => Some(v.iter().copied().map(Some).collect()),
            SliceResults::Incomplete(v) => Some(v.clone()),
        }
    }

    /// True when co-occurrence is of dimension A with itself.
    pub fn is_square(&self) -> bool {
        !self.terms.has_dim(Dim::B)
    }

    pub fn cooc(&self) -> Result<&Matrix<u64>> {
        match &self.cooc {
            CoocResults::Scraped(matrix) => Ok(matrix),
            CoocResults::Incomplete(_) => Err(LitscanError::State(
                "Co-occurrence collection was incomplete".to_string(),
            )),
            CoocResults::Pending => Err(LitscanError::State(
                "No co-occurrence data collected".to_string(),
            )),
        }
    }

    pub fn partial_cooc(&self) -> Option<&Matrix<Option<u64>>> {
        match &self.cooc {
            CoocResults::Incomplete(matrix) => Some(matrix),
            _ => None,
        }
    }

    /// Clear the results of one slice, returning it to `TermsLoaded`.
    /// The co-occurrence matrix depends on both slices and is cleared too.
    pub fn drop_data(&mut self, selector: impl Into<DataSelector>) -> Result<()> {
        let dim = match selector.into() {
            DataSelector::Dim(dim) => dim,
            DataSelector::Index(index) => Dim::from_index(index).ok_or_else(|| {
                LitscanError::Validation(format!(
                    "No result index {index}; expected 0 (A) or 1 (B)"
                ))
            })?,
        };

        match self.state(dim) {
            SliceState::Scraped | SliceState::Incomplete => {}
            state => {
                return Err(LitscanError::State(format!(
                    "No collected data to drop for dimension {dim} (state: {state:?})"
                )))
            }
        }

        self.slices[dim.index()] = SliceResults::Pending;
        self.cooc = CoocResults::Pending;
        self.score = None;
        info!(%dim, "Dropped collected data");
        Ok(())
    }

    // ── Scores ───────────────────────────────────────────────────────────────

    pub fn compute_score(&mut self, score_type: ScoreType) -> Result<&Matrix<f64>> {
        let cooc = self.cooc()?;
        let row_counts = self.counts(Dim::A)?;
        let col_counts = if self.is_square() { row_counts } else { self.counts(Dim::B)? };

        let scores = cooc.map(|i, j, &both| match score_type {
            ScoreType::Normalize => ratio(both, row_counts[i]),
            ScoreType::Association => {
                ratio(both, (row_counts[i] + col_counts[j]).saturating_sub(both))
            }
        });
        debug!(?score_type, "Computed scores");
        Ok(&self.score.insert((score_type, scores)).1)
    }

    pub fn score(&self) -> Option<(ScoreType, &Matrix<f64>)> {
        self.score.as_ref().map(|(t, m)| (*t, m))
    }

    // ── Reports ──────────────────────────────────────────────────────────────

    fn ensure_scraped(&self, dim: Dim) -> Result<()> {
        match self.state(dim) {
            SliceState::Scraped => Ok(()),
            state => Err(LitscanError::State(format!(
                "Dimension {dim} has no complete results (state: {state:?})"
            ))),
        }
    }

    /// Document count of every term in `dim`.
    pub fn check_counts(&self, dim: Dim) -> Result<String> {
        let counts = self.counts(dim)?;
        let labels = self.terms.labels(dim);
        let width = label_width(&labels);

        let mut out = format!("The number of documents found for each search term in dimension {dim}:\n");
        for (label, count) in labels.iter().zip(counts) {
            let _ = writeln!(out, "  {label:<width$} - {count:>10}");
        }
        Ok(out)
    }

    /// The `n` terms of `dim` with the most documents, most first.
    pub fn check_top(&self, dim: Dim, n: usize) -> Result<String> {
        let counts = self.counts(dim)?;
        let labels = self.terms.labels(dim);

        let mut order: Vec<usize> = (0..counts.len()).collect();
        order.sort_by(|&x, &y| counts[y].cmp(&counts[x]));
        order.truncate(n);

        let width = label_width(&order.iter().map(|&i| labels[i]).collect::<Vec<_>>());
        let mut out = format!("Top {} terms by document count in dimension {dim}:\n", order.len());
        for (rank, &i) in order.iter().enumerate() {
            let _ = writeln!(out, "  {:>2}. {:<width$} - {:>10}", rank + 1, labels[i], counts[i]);
        }
        Ok(out)
    }

    /// For each term of `dim`, the term on the other axis it co-occurs with most.
    pub fn check_cooc(&self, dim: Dim) -> Result<String> {
        self.ensure_scraped(dim)?;
        let cooc = self.cooc()?;
        let cooc = cooc.map(|_, _, &v| v as f64);
        let lines = self.best_matches(dim, &cooc, |v| format!("{v:.0} documents"));
        Ok(format!("Highest co-occurrence for each term in dimension {dim}:\n{lines}"))
    }

    /// Like `check_cooc`, over the last computed score.
    pub fn check_score(&self, dim: Dim) -> Result<String> {
        self.ensure_scraped(dim)?;
        let (score_type, scores) = self
            .score()
            .ok_or_else(|| LitscanError::State("No scores computed".to_string()))?;
        let lines = self.best_matches(dim, scores, |v| format!("{v:.4}"));
        Ok(format!("Highest {score_type:?} score for each term in dimension {dim}:\n{lines}"))
    }

    fn best_matches(&self, dim: Dim, matrix: &Matrix<f64>, fmt_value: impl Fn(f64) -> String) -> String {
        let square = self.is_square();
        let labels = self.terms.labels(dim);
        let other_labels = if square { self.terms.labels(Dim::A) } else { self.terms.labels(dim.other()) };
        let width = label_width(&labels);

        let mut out = String::new();
        for (i, label) in labels.iter().enumerate() {
            let values: Vec<f64> = match dim {
                Dim::A => matrix.row(i).to_vec(),
                Dim::B => matrix.column(i).copied().collect(),
            };
            let best = values
                .iter()
                .enumerate()
                .filter(|(j, _)| !(square && *j == i && values.len() > 1))
                .fold(None, |best: Option<(usize, f64)>, (j, &v)| match best {
                    Some((_, b)) if b >= v => best,
                    _ => Some((j, v)),
                });
            match best {
                Some((j, v)) => {
                    let _ = writeln!(out, "  {label:<width$} : {} ({})", other_labels[j], fmt_value(v));
                }
                None => {
                    let _ = writeln!(out, "  {label:<width$} : -");
                }
            }
        }
        out
    }
}

/// One count request; a failure is recorded and yields `None`.
async fn query_count(
    source: &mut dyn CountSource,
    query: &str,
    label: &str,
    failures: &mut Vec<FailedQuery>,
) -> Option<u64> {
    match source.search_count(query).await {
        Ok(count) => Some(count),
        Err(error) => {
            warn!(term = label, %error, "Count request failed");
            failures.push(FailedQuery { label: label.to_string(), error });
            None
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn label_width(labels: &[&str]) -> usize {
    labels.iter().map(|l| l.chars().count()).max().unwrap_or(0)
}
