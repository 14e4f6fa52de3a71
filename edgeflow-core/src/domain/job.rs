//! Job domain types

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Opaque job identifier assigned by the scheduler
///
/// The scheduler may send the id as a JSON string or a JSON number.
/// Numbers are normalised to their decimal representation so that
/// `42` and `"42"` name the same job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id can be used verbatim as a file name component
    ///
    /// Rejects empty ids, `.`/`..`, path separators and NUL bytes.
    pub fn is_path_safe(&self) -> bool {
        let id = self.0.as_str();
        !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\', '\0'])
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(id) => JobId(id),
            RawId::Number(n) => JobId(n.to_string()),
        })
    }
}

/// A unit of work handed out by `GET /jobs/next`
///
/// Only `id` and `imagePath` are required; any other fields the scheduler
/// includes are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(rename = "imagePath")]
    pub image_path: PathBuf,
}

impl Job {
    pub fn new(id: impl Into<String>, image_path: impl Into<PathBuf>) -> Self {
        Self {
            id: JobId::new(id),
            image_path: image_path.into(),
        }
    }
}
