//! litscan-common: Shared types, errors, and configuration used across all litscan crates.

pub mod error;
pub mod config;
pub mod term;
pub mod directory;

// Re-export commonly used types
pub use config::{CollectionConfig, LoggingMode};
pub use directory::{FileStructure, TermsDirectory};
pub use error::{CollectionError, FailedQuery, LitscanError, RequestError, Result};
pub use term::{Dim, Term, TermKind};
