//! svn-automerge command-line front-end.
//!
//! Parses the merge parameters, runs one merge job, prints a final status
//! line, and maps the outcome to the process exit code. All real logic
//! lives in `svn-automerge-core`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use svn_automerge_core::{MergeEngine, MergeJob, MergeOutcome};

/// Automatically merge one SVN branch into another: clean merges are
/// committed, conflicting merges produce a reviewable patch.
#[derive(Parser, Debug)]
#[command(name = "svn-automerge", version, about)]
struct Cli {
    /// SVN source location to merge from.
    #[arg(short, long)]
    source: String,

    /// SVN destination location to merge into and commit to.
    #[arg(short, long)]
    dest: String,

    /// Username for SVN authentication.
    #[arg(short, long, requires = "passwd")]
    username: Option<String>,

    /// Password for SVN authentication.
    #[arg(short, long, requires = "username")]
    passwd: Option<String>,

    /// Directory the conflict patch is written into.
    #[arg(long, default_value = "bin")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut job = MergeJob::new(cli.source, cli.dest).with_output_dir(cli.output_dir);
    // clap enforces that the two flags come as a pair.
    if let (Some(username), Some(passwd)) = (cli.username, cli.passwd) {
        job = job.with_credentials(username, passwd);
    }

    info!(source = %job.source, dest = %job.dest, "starting merge job");
    let engine = MergeEngine::new(job);
    let report = engine.run().await?;

    match report.outcome {
        MergeOutcome::Committed { revision } => {
            println!(
                "Finished branch merge: committed revision {} ({} merged)",
                revision,
                if report.merged_revisions.is_empty() {
                    "no revision range reported".to_string()
                } else {
                    format!("revisions {}", report.merged_revisions)
                }
            );
        }
        MergeOutcome::Patched { patch_path } => {
            println!(
                "Finished branch merge: {} conflict(s), patch written to {}",
                report.conflicts,
                patch_path.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_credentials_come_as_a_pair() {
        let base = ["svn-automerge", "-s", "file:///r/branches/b1", "-d", "file:///r/trunk"];

        assert!(Cli::try_parse_from(base).is_ok());

        let mut with_user = base.to_vec();
        with_user.extend(["-u", "alice"]);
        assert!(Cli::try_parse_from(with_user).is_err(), "-u alone must be rejected");

        let mut with_passwd = base.to_vec();
        with_passwd.extend(["-p", "secret"]);
        assert!(Cli::try_parse_from(with_passwd).is_err(), "-p alone must be rejected");

        let mut with_both = base.to_vec();
        with_both.extend(["-u", "alice", "-p", "secret"]);
        assert!(Cli::try_parse_from(with_both).is_ok());
    }

    #[test]
    fn test_missing_required_options_rejected() {
        assert!(Cli::try_parse_from(["svn-automerge", "-s", "file:///r/branches/b1"]).is_err());
        assert!(Cli::try_parse_from(["svn-automerge"]).is_err());
    }
}
