//! Error types for the svn-automerge core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and the
//! top-level [`MergeError`] enum unifies them for callers that want a single
//! error type.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for a merge run.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error(transparent)]
    Svn(#[from] SvnError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Checkout of the destination branch failed. Fatal: nothing was checked
    /// out, so no later step can operate.
    #[error("checkout of '{url}' failed: {detail}")]
    CheckoutFailed {
        url: String,
        detail: String,
    },

    /// The commit command ran but no committed revision could be confirmed.
    ///
    /// Kept distinct from [`SvnError::CommandFailed`]: a rejected commit with
    /// zero conflicts would otherwise be indistinguishable from success.
    #[error("commit to '{url}' was not confirmed: {output}")]
    CommitFailed {
        url: String,
        output: String,
    },
}

// ---------------------------------------------------------------------------
// SVN errors
// ---------------------------------------------------------------------------

/// Errors from SVN CLI invocations.
#[derive(Debug, Error)]
pub enum SvnError {
    /// The `svn` binary was not found on `$PATH`.
    #[error("svn binary not found: {0}")]
    BinaryNotFound(String),

    /// An `svn` command exited with a non-zero status.
    #[error("svn command failed (exit {exit_code}): {stderr}")]
    CommandFailed {
        exit_code: i32,
        stderr: String,
    },

    /// Generic I/O wrapper.
    #[error("svn I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Workspace errors
// ---------------------------------------------------------------------------

/// Errors from workspace lifecycle management.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The destination location yielded no workspace name, so there is no
    /// unambiguous directory to operate on.
    #[error("cannot derive a workspace name from an empty destination")]
    EmptyName,

    /// A step required the checked-out working copy but it is not on disk.
    #[error("working copy missing at '{0}'")]
    WorkingCopyMissing(String),

    /// Generic I/O wrapper (directory creation / removal).
    #[error("workspace I/O error at '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

/// Errors from the pre-flight repository reachability check.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One or both repository locations are not reachable. The message lists
    /// every invalid location found.
    #[error("{0}")]
    Unreachable(String),
}
