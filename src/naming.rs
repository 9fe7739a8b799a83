//! File name encoding for package identifiers.
//!
//! A package identifier such as `dev-lang/python` contains a path separator,
//! so it cannot be used as a file name directly. Every separator is replaced
//! with a substitute character (`dev-lang_python`). The substitution is only
//! reversible over a set of identifiers that do not collide after encoding;
//! [`FileNameCodec::check_injective`] enforces that before anything is written.

use crate::error::SplitError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Separator/substitute pair used to turn identifiers into file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNameCodec {
    pub separator: char,
    pub substitute: char,
}

impl Default for FileNameCodec {
    fn default() -> Self {
        Self {
            separator: '/',
            substitute: '_',
        }
    }
}

impl FileNameCodec {
    pub fn new(separator: char, substitute: char) -> Self {
        Self {
            separator,
            substitute,
        }
    }

    /// File name for a package identifier.
    pub fn encode(&self, key: &str) -> String {
        key.replace(self.separator, &self.substitute.to_string())
    }

    /// Best-effort inverse of [`encode`](Self::encode).
    ///
    /// Exact only for identifiers that do not already contain the substitute
    /// character; use [`matches`](Self::matches) to check a recovered key.
    pub fn decode(&self, file_name: &str) -> String {
        file_name.replace(self.substitute, &self.separator.to_string())
    }

    /// True when `key` is the identifier stored under `file_name`.
    pub fn matches(&self, file_name: &str, key: &str) -> bool {
        self.encode(key) == file_name
    }

    /// Reject identifier sets whose encodings collide or are not usable file names.
    pub fn check_injective<'a, I>(&self, keys: I, source: &Path) -> Result<(), SplitError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen: HashMap<String, &'a str> = HashMap::new();
        for key in keys {
            let file_name = self.encode(key);
            if file_name.is_empty() || file_name == "." || file_name == ".." {
                return Err(SplitError::InvalidInput {
                    path: source.to_path_buf(),
                    reason: format!("package '{}' does not map to a usable file name", key),
                });
            }
            if let Some(first) = seen.insert(file_name.clone(), key) {
                if first != key {
                    return Err(SplitError::NameCollision {
                        file_name,
                        first: first.to_string(),
                        second: key.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
