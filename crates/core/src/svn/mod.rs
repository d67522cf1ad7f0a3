//! SVN CLI wrapper for svn-automerge.

pub mod client;
pub mod parser;

pub use client::SvnClient;
pub use parser::*;
