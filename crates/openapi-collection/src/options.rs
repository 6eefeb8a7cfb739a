//! Generation options
//!
//! Options are plain JSON so a file can be checked in next to the document it
//! drives. None of them influence how schemas resolve.

use crate::error::CollectionResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// What to do when one operation cannot be extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorPolicy {
    /// Fail the whole run on the first error
    #[default]
    Abort,
    /// Log the error and leave the operation out of the collection
    SkipOperation,
}

/// Options for a generation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateOptions {
    /// Output destination hint for the caller; passed through untouched
    pub output: Option<PathBuf>,
    pub on_error: ErrorPolicy,
    /// Pretty-print the JSON output
    pub pretty: bool,
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }

    /// Load options from a JSON file
    pub fn load(path: &Path) -> CollectionResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let options: GenerateOptions = serde_json::from_str(&contents)?;
        debug!("Loaded options from {:?}", path);
        Ok(options)
    }
}
