//! Disposable workspace lifecycle.
//!
//! The workspace is the only shared mutable resource of a run, and it is
//! owned exclusively by this module. [`Workspace::prepare`] is the first
//! mutation a job performs; [`Workspace::teardown`] runs on every exit path,
//! so the workspace never outlives the job that created it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::WorkspaceError;
use crate::models::{MergeJob, PATCH_FILE_NAME};

/// On-disk layout of one merge job: a disposable temp root holding the
/// checked-out working copy, and a persisted output directory for the
/// conflict patch.
#[derive(Debug, Clone)]
pub struct Workspace {
    temp_root: PathBuf,
    output_dir: PathBuf,
    name: String,
}

impl Workspace {
    /// Derive the workspace for a job. Fails when the destination location
    /// yields no directory name to work under.
    pub fn for_job(job: &MergeJob) -> Result<Self, WorkspaceError> {
        let name = job.workspace_name();
        if name.is_empty() {
            return Err(WorkspaceError::EmptyName);
        }
        Ok(Self {
            temp_root: job.temp_root.clone(),
            output_dir: job.output_dir.clone(),
            name,
        })
    }

    /// Path the destination branch is checked out into.
    pub fn working_copy(&self) -> PathBuf {
        self.temp_root.join(&self.name)
    }

    /// Path of the patch artifact, overwritten on each conflicting run.
    pub fn patch_path(&self) -> PathBuf {
        self.output_dir.join(PATCH_FILE_NAME)
    }

    /// Existence probe for the checked-out working copy. Every pipeline
    /// step that touches the working copy guards on this first.
    pub fn exists(&self) -> bool {
        self.working_copy().exists()
    }

    /// Ensure a clean temp root and a clean output directory, destroying and
    /// recreating each if already present.
    pub fn prepare(&self) -> Result<(), WorkspaceError> {
        recreate_dir(&self.temp_root)?;
        recreate_dir(&self.output_dir)?;
        debug!(
            temp_root = %self.temp_root.display(),
            output_dir = %self.output_dir.display(),
            "workspace prepared"
        );
        Ok(())
    }

    /// Remove the temp root and everything under it.
    ///
    /// A teardown failure is logged and swallowed so it can never mask the
    /// job's primary outcome. The output directory is not touched: the patch
    /// artifact must survive the job.
    pub fn teardown(&self) {
        match fs::remove_dir_all(&self.temp_root) {
            Ok(()) => debug!(temp_root = %self.temp_root.display(), "workspace removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(
                    temp_root = %self.temp_root.display(),
                    error = %e,
                    "failed to remove workspace"
                );
            }
        }
    }
}

fn recreate_dir(path: &Path) -> Result<(), WorkspaceError> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| WorkspaceError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
    }
    fs::create_dir_all(path).map_err(|e| WorkspaceError::IoError {
        path: path.display().to_string(),
        source: e,
    })
}
