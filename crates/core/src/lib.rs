//! svn-automerge core library.
//!
//! Automates merging one SVN branch into another: the destination branch is
//! checked out into a disposable workspace, the source branch is merged into
//! it, and the result is either committed (clean merge) or written out as a
//! reviewable patch (conflicts). Single pass, no retries, no service mode.

pub mod errors;
pub mod merge_engine;
pub mod models;
pub mod svn;
pub mod validator;
pub mod workspace;

// Re-exports for convenience.
pub use errors::MergeError;
pub use merge_engine::{MergeEngine, MergeState};
pub use models::{MergeJob, MergeOutcome, MergeReport};
