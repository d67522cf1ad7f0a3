//! Domain model types for svn-automerge.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default directory holding the disposable working copy.
pub const DEFAULT_TEMP_ROOT: &str = "temp";

/// Default directory the conflict patch is written into.
pub const DEFAULT_OUTPUT_DIR: &str = "bin";

/// Name of the patch artifact produced on a conflicting merge.
pub const PATCH_FILE_NAME: &str = "automerge.patch";

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// Optional SVN credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// One merge job: merge `source` into `dest` and either commit the result or
/// write a conflict patch.
///
/// Immutable once built; the engine threads it through the pipeline by
/// reference instead of mutating shared fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeJob {
    /// Repository URL or path to merge from.
    pub source: String,

    /// URL to merge into and later commit to.
    pub dest: String,

    /// Credentials passed to every `svn` invocation when present.
    pub credentials: Option<Credentials>,

    /// Directory the conflict patch is written into.
    pub output_dir: PathBuf,

    /// Root directory for the disposable working copy.
    pub temp_root: PathBuf,
}

impl MergeJob {
    /// Create a job with the default `temp` / `bin` directories.
    pub fn new(source: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            credentials: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            temp_root: PathBuf::from(DEFAULT_TEMP_ROOT),
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_temp_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_root = dir.into();
        self
    }

    /// Working-copy directory name: the last path segment of the destination
    /// location, trailing slashes stripped. Empty iff `dest` is empty, in
    /// which case no workspace operation may run.
    pub fn workspace_name(&self) -> String {
        url_tail(&self.dest)
    }
}

/// Last path segment of a URL or path, trailing slashes stripped.
pub fn url_tail(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    match trimmed.rsplit('/').next() {
        Some(tail) => tail.to_string(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Outcome and report
// ---------------------------------------------------------------------------

/// Terminal outcome of a merge run that reached the end of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MergeOutcome {
    /// Clean merge, committed to the destination.
    Committed {
        revision: i64,
    },
    /// Conflicting merge, patch written for review.
    Patched {
        patch_path: PathBuf,
    },
}

/// Summary of one merge run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeReport {
    pub outcome: MergeOutcome,

    /// Total conflict count from the post-merge status listing.
    pub conflicts: u32,

    /// Revision range reported by the merge metadata, e.g. `r100-105`.
    /// May be empty when the metadata carried no `Merged` line.
    pub merged_revisions: String,

    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
