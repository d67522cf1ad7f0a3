//! Merge orchestration state machine.
//!
//! One [`MergeEngine`] runs one [`MergeJob`] start to finish:
//!
//! 1. Validate that both repository locations are reachable.
//! 2. Prepare the disposable workspace.
//! 3. Check out the destination branch into the workspace.
//! 4. Merge the source branch with postpone-on-conflict semantics.
//! 5. Count conflicts in the status listing: conflicts present produce a
//!    patch artifact, a clean merge is committed back to the destination.
//!
//! The workspace is torn down exactly once per run, on every exit path, and
//! a teardown failure never overrides the run's primary outcome.

use std::fmt;
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{MergeError, SvnError, WorkspaceError};
use crate::models::{MergeJob, MergeOutcome, MergeReport};
use crate::svn::{parser, SvnClient};
use crate::validator;
use crate::workspace::Workspace;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// States of a merge run.
///
/// `Init → Validated → CheckedOut → Merged → {Patched | Committed} → Done`,
/// with `Aborted` as the terminal state of any failed run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MergeState {
    Init,
    Validated,
    CheckedOut,
    Merged,
    Patched,
    Committed,
    Done,
    Aborted,
}

impl fmt::Display for MergeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Validated => write!(f, "validated"),
            Self::CheckedOut => write!(f, "checked_out"),
            Self::Merged => write!(f, "merged"),
            Self::Patched => write!(f, "patched"),
            Self::Committed => write!(f, "committed"),
            Self::Done => write!(f, "done"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Drives one merge job through the state machine.
pub struct MergeEngine {
    job: MergeJob,
    svn: SvnClient,
    state: Mutex<MergeState>,
}

impl MergeEngine {
    pub fn new(job: MergeJob) -> Self {
        let svn = SvnClient::with_credentials(job.credentials.clone());
        Self {
            job,
            svn,
            state: Mutex::new(MergeState::Init),
        }
    }

    /// Current state of the run.
    pub fn state(&self) -> MergeState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, next: MergeState) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let prev = *state;
        debug!(from = %prev, to = %next, "state transition");
        *state = next;
    }

    /// Execute the job start to finish.
    ///
    /// Validation runs before any filesystem mutation, so a failed run never
    /// leaves a workspace behind — and a workspace that was created is torn
    /// down no matter how the pipeline ends.
    pub async fn run(&self) -> Result<MergeReport, MergeError> {
        let started_at = Utc::now();

        if let Err(e) = validator::validate(&self.svn, &self.job.source, &self.job.dest).await {
            self.set_state(MergeState::Aborted);
            return Err(e.into());
        }
        self.set_state(MergeState::Validated);

        let workspace = match Workspace::for_job(&self.job) {
            Ok(ws) => ws,
            Err(e) => {
                self.set_state(MergeState::Aborted);
                return Err(e.into());
            }
        };
        if let Err(e) = workspace.prepare() {
            self.set_state(MergeState::Aborted);
            workspace.teardown();
            return Err(e.into());
        }

        // Guaranteed release: the drop guard tears the workspace down once
        // the pipeline result is in hand, on unwind paths included.
        let result = {
            let _guard = TeardownGuard {
                workspace: &workspace,
            };
            self.execute(&workspace).await
        };

        match result {
            Ok((outcome, conflicts, merged_revisions)) => {
                self.set_state(MergeState::Done);
                Ok(MergeReport {
                    outcome,
                    conflicts,
                    merged_revisions,
                    started_at,
                    completed_at: Some(Utc::now()),
                })
            }
            Err(e) => {
                self.set_state(MergeState::Aborted);
                Err(e)
            }
        }
    }

    /// Checkout → merge → conflict check → patch-or-commit.
    async fn execute(
        &self,
        workspace: &Workspace,
    ) -> Result<(MergeOutcome, u32, String), MergeError> {
        let wc = workspace.working_copy();

        // Checkout failure is fatal: there is nothing for later steps to
        // operate on, so degrading to a do-nothing run would only hide it.
        let checkout_out = match self.svn.checkout(&self.job.dest, &wc).await {
            Ok(out) => out,
            Err(SvnError::CommandFailed { stderr, .. }) => {
                return Err(MergeError::CheckoutFailed {
                    url: self.job.dest.clone(),
                    detail: stderr.trim().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        if !parser::checkout_succeeded(&checkout_out) {
            return Err(MergeError::CheckoutFailed {
                url: self.job.dest.clone(),
                detail: "no 'Checked out revision' marker in checkout output".into(),
            });
        }
        self.set_state(MergeState::CheckedOut);
        info!(dest = %self.job.dest, wc = %wc.display(), "destination checked out");

        ensure_working_copy(workspace)?;
        self.svn.merge(&self.job.source, &wc).await?;

        ensure_working_copy(workspace)?;
        let status = self.svn.status(&wc).await?;
        let conflicts = parser::count_conflicts(&status);
        self.set_state(MergeState::Merged);
        info!(source = %self.job.source, conflicts, "merge pass completed");

        ensure_working_copy(workspace)?;
        let mergeinfo = self.svn.diff_mergeinfo(&wc).await?;
        let merged_revisions = parser::merged_revisions(&mergeinfo);

        let outcome = if conflicts > 0 {
            self.write_patch(workspace).await?
        } else {
            self.commit(workspace, &merged_revisions).await?
        };

        Ok((outcome, conflicts, merged_revisions))
    }

    /// Conflicting merge: write the whole-tree diff verbatim to the patch
    /// artifact instead of committing.
    async fn write_patch(&self, workspace: &Workspace) -> Result<MergeOutcome, MergeError> {
        ensure_working_copy(workspace)?;
        let diff = self.svn.diff(&workspace.working_copy()).await?;

        let patch_path = workspace.patch_path();
        std::fs::write(&patch_path, &diff).map_err(|e| WorkspaceError::IoError {
            path: patch_path.display().to_string(),
            source: e,
        })?;
        self.set_state(MergeState::Patched);
        info!(patch = %patch_path.display(), "conflict patch written");
        Ok(MergeOutcome::Patched { patch_path })
    }

    /// Clean merge: commit the working copy back to the destination.
    async fn commit(
        &self,
        workspace: &Workspace,
        merged_revisions: &str,
    ) -> Result<MergeOutcome, MergeError> {
        ensure_working_copy(workspace)?;

        // The revision descriptor may be empty when the mergeinfo diff
        // carried no `Merged` line; the message tolerates that.
        let message = format!(
            "automerge: merged revisions {} from {}",
            merged_revisions, self.job.dest
        );
        // A rejected commit is its own fatal condition: with zero conflicts
        // it would otherwise be indistinguishable from success.
        let output = match self.svn.commit(&workspace.working_copy(), &message).await {
            Ok(out) => out,
            Err(SvnError::CommandFailed { stderr, .. }) => {
                return Err(MergeError::CommitFailed {
                    url: self.job.dest.clone(),
                    output: stderr.trim().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let revision = parser::committed_revision(&output).ok_or_else(|| {
            // Exit status zero but no committed revision: surface that too.
            MergeError::CommitFailed {
                url: self.job.dest.clone(),
                output: output.trim().to_string(),
            }
        })?;
        self.set_state(MergeState::Committed);
        info!(revision, "merge committed");
        Ok(MergeOutcome::Committed { revision })
    }
}

/// Drop guard that tears down the workspace.
///
/// Ensures the workspace never outlives the run, even if a pipeline step
/// panics.
struct TeardownGuard<'a> {
    workspace: &'a Workspace,
}

impl Drop for TeardownGuard<'_> {
    fn drop(&mut self) {
        self.workspace.teardown();
    }
}

/// Precondition guard: the working copy must be on disk before any step
/// that touches it.
fn ensure_working_copy(workspace: &Workspace) -> Result<(), WorkspaceError> {
    if workspace.exists() {
        Ok(())
    } else {
        Err(WorkspaceError::WorkingCopyMissing(
            workspace.working_copy().display().to_string(),
        ))
    }
}
