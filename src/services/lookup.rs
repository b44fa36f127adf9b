// src/services/lookup.rs
use std::{collections::HashMap, io, path::Path};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("could not read {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("{path} is not a JSON object of string replies: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Canned replies keyed by the exact incoming message.
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    entries: HashMap<String, String>,
}

impl LookupTable {
    /// Load the table from a JSON file. A missing file gives an empty table.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LookupError> {
        let path = path.as_ref();
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "responses file not found, starting with an empty lookup table");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(LookupError::Read {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        let entries: HashMap<String, String> =
            serde_json::from_str(&content).map_err(|source| LookupError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        tracing::info!(path = %path.display(), entries = entries.len(), "lookup table loaded");
        Ok(Self { entries })
    }

    /// Case-sensitive exact match on the raw message.
    pub fn lookup(&self, message: &str) -> Option<&str> {
        self.entries.get(message).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for LookupTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
