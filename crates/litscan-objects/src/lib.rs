//! litscan-objects: Term organisation and count collection objects.
//!
//! `TermStore` holds the search terms of up to two dimensions; `Counts`
//! scrapes article counts and co-occurrences for them and reports on the
//! results.

pub mod base;
pub mod counts;
pub mod io;
pub mod matrix;

pub use base::{TermGroup, TermStore};
pub use counts::{Counts, DataSelector, ScoreType, SliceState};
pub use io::{load_terms_file, write_terms_file};
pub use matrix::Matrix;
