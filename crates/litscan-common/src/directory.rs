//! On-disk layout for term files, request logs and collected data.
//!
//! A `FileStructure` is a root folder with one sub-folder per category:
//!
//! ```text
//! <root>/
//!   terms/   term, inclusion and exclusion files
//!   logs/    requester logs
//!   data/    collected results
//! ```
//!
//! Anything that can resolve a file name to a path implements
//! [`TermsDirectory`]; a bare directory path resolves names directly inside it.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{LitscanError, Result};

pub const CATEGORIES: [&str; 3] = ["terms", "logs", "data"];

/// Resolves a file name within a category to a concrete path.
pub trait TermsDirectory {
    fn get_file_path(&self, category: &str, filename: &str) -> PathBuf;
}

impl TermsDirectory for Path {
    fn get_file_path(&self, _category: &str, filename: &str) -> PathBuf {
        self.join(filename)
    }
}

impl TermsDirectory for PathBuf {
    fn get_file_path(&self, category: &str, filename: &str) -> PathBuf {
        self.as_path().get_file_path(category, filename)
    }
}

#[derive(Debug, Clone)]
pub struct FileStructure {
    root: PathBuf,
}

impl FileStructure {
    /// Wrap an existing root folder without touching the filesystem.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the root and every category folder (idempotent).
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let structure = Self::new(root);
        for category in CATEGORIES {
            let folder = structure.root.join(category);
            std::fs::create_dir_all(&folder)?;
            debug!(folder = %folder.display(), "Ensured folder exists");
        }
        Ok(structure)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get_folder_path(&self, category: &str) -> Result<PathBuf> {
        if !CATEGORIES.contains(&category) {
            return Err(LitscanError::Config(format!("Unknown folder category '{category}'")));
        }
        Ok(self.root.join(category))
    }

    /// File names in a category folder, sorted, hidden files skipped.
    pub fn get_files(&self, category: &str) -> Result<Vec<String>> {
        let folder = self.get_folder_path(category)?;
        let mut files: Vec<String> = std::fs::read_dir(&folder)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.'))
            .collect();
        files.sort();
        Ok(files)
    }

    /// Tree listing of the structure and the files it holds.
    pub fn check_file_structure(&self) -> Result<String> {
        let mut out = String::new();
        let _ = writeln!(out, "{}/", self.root.display());
        for category in CATEGORIES {
            let _ = writeln!(out, "  {category}/");
            if self.root.join(category).is_dir() {
                for file in self.get_files(category)? {
                    let _ = writeln!(out, "    {file}");
                }
            }
        }
        Ok(out)
    }
}

impl TermsDirectory for FileStructure {
    fn get_file_path(&self, category: &str, filename: &str) -> PathBuf {
        self.root.join(category).join(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_list_files() {
        let tmp = tempfile::tempdir().unwrap();
        let db = FileStructure::create(tmp.path().join("db")).unwrap();

        let path = db.get_file_path("terms", "terms.txt");
        assert_eq!(path, tmp.path().join("db").join("terms").join("terms.txt"));
        std::fs::write(&path, "brain,cortex\n").unwrap();
        std::fs::write(db.get_file_path("terms", "excl.txt"), "\n").unwrap();

        assert_eq!(db.get_files("terms").unwrap(), vec!["excl.txt", "terms.txt"]);
        assert!(db.get_files("logs").unwrap().is_empty());

        let tree = db.check_file_structure().unwrap();
        assert!(tree.contains("  terms/\n    excl.txt\n    terms.txt\n"));
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let db = FileStructure::new("/tmp/nowhere");
        assert!(matches!(db.get_folder_path("figures"), Err(LitscanError::Config(_))));
    }

    #[test]
    fn test_plain_path_ignores_category() {
        let dir = PathBuf::from("/data/terms");
        assert_eq!(dir.get_file_path("terms", "a.txt"), PathBuf::from("/data/terms/a.txt"));
    }
}
