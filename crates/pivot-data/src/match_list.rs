//! Row-key allow-lists loaded from plain text files.

use std::collections::HashSet;
use std::path::Path;

use pivot_core::{PivotError, Result};
use tracing::{debug, warn};

/// A set of exact row keys; rows whose key is absent are excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchList {
    keys: HashSet<String>,
}

impl MatchList {
    /// Build a list from the contents of a match-list file.
    ///
    /// Surrounding whitespace is trimmed from the whole text only; each line
    /// is kept verbatim.
    pub fn parse(text: &str) -> Self {
        let keys: HashSet<String> = text.trim().lines().map(str::to_string).collect();
        Self { keys }
    }

    /// Read and parse the match-list file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| PivotError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let list = Self::parse(&text);
        if list.is_empty() {
            warn!(
                "Match list {} is empty; every row will be excluded",
                path.display()
            );
        } else {
            debug!("Loaded {} keys from {}", list.len(), path.display());
        }
        Ok(list)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for MatchList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_splits_lines() {
        let list = MatchList::parse("AAA\nBBB");
        assert_eq!(list.len(), 2);
        assert!(list.contains("AAA"));
        assert!(list.contains("BBB"));
        assert!(!list.contains("DDD"));
    }

    #[test]
    fn test_parse_trims_whole_text_only() {
        let list = MatchList::parse("\n  AAA\nBBB  \n\n");
        assert!(list.contains("AAA"));
        assert!(list.contains("BBB"));

        let list = MatchList::parse("AAA\n BBB \nCCC");
        assert!(list.contains(" BBB "));
        assert!(!list.contains("BBB"));
    }

    #[test]
    fn test_parse_crlf() {
        let list = MatchList::parse("AAA\r\nBBB\r\n");
        assert!(list.contains("AAA"));
        assert!(list.contains("BBB"));
    }

    #[test]
    fn test_parse_empty() {
        assert!(MatchList::parse("  \n ").is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "AAA\nBBB\n").unwrap();
        let list = MatchList::load(file.path()).unwrap();
        assert_eq!(list, ["AAA", "BBB"].into_iter().collect::<MatchList>());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = MatchList::load(&dir.path().join("keys.txt")).unwrap_err();
        assert!(matches!(err, PivotError::FileRead { .. }));
    }
}
