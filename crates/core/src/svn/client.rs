//! Asynchronous SVN CLI client.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::errors::SvnError;
use crate::models::Credentials;

/// Client for invoking the `svn` command-line tool.
///
/// Every operation spawns one child process and blocks until it completes;
/// no timeout is enforced and nothing is retried. The returned text is
/// stdout and stderr merged into one stream — the merge engine feeds it to
/// the parsers in [`super::parser`] for data extraction, while success and
/// failure are decided by the process exit status.
#[derive(Debug, Clone, Default)]
pub struct SvnClient {
    credentials: Option<Credentials>,
}

impl SvnClient {
    /// Create a client that runs `svn` without explicit credentials.
    pub fn new() -> Self {
        Self { credentials: None }
    }

    /// Create a client passing `--username` / `--password` to every command.
    pub fn with_credentials(credentials: Option<Credentials>) -> Self {
        Self { credentials }
    }

    /// `svn info <url>` — repository metadata query, used as a reachability
    /// probe by the validator.
    #[instrument(skip(self))]
    pub async fn info(&self, url: &str) -> Result<String, SvnError> {
        self.run_svn(&["info", url]).await
    }

    /// `svn checkout <url> <path>`.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn checkout(&self, url: &str, path: &Path) -> Result<String, SvnError> {
        let path_str = path.to_string_lossy();
        self.run_svn(&["checkout", url, &path_str]).await
    }

    /// `svn status <path>` — the post-merge listing the conflict counter
    /// scans.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn status(&self, path: &Path) -> Result<String, SvnError> {
        let path_str = path.to_string_lossy();
        self.run_svn(&["status", &path_str]).await
    }

    /// `svn merge --accept postpone <source> <path>`.
    ///
    /// Postpone semantics: the merge pass always completes and leaves
    /// conflicting files marked instead of aborting on the first conflict.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn merge(&self, source: &str, path: &Path) -> Result<String, SvnError> {
        let path_str = path.to_string_lossy();
        self.run_svn(&["merge", "--accept", "postpone", source, &path_str])
            .await
    }

    /// `svn diff <path>` — whole-tree unified diff, written verbatim into
    /// the patch artifact.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn diff(&self, path: &Path) -> Result<String, SvnError> {
        let path_str = path.to_string_lossy();
        self.run_svn(&["diff", &path_str]).await
    }

    /// `svn diff --depth empty <path>` — property-only diff of the working
    /// copy root, carrying the `Merged ...` mergeinfo line.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn diff_mergeinfo(&self, path: &Path) -> Result<String, SvnError> {
        let path_str = path.to_string_lossy();
        self.run_svn(&["diff", "--depth", "empty", &path_str]).await
    }

    /// `svn commit -m <message> <path>`.
    #[instrument(skip(self, message), fields(path = %path.display()))]
    pub async fn commit(&self, path: &Path, message: &str) -> Result<String, SvnError> {
        let path_str = path.to_string_lossy();
        self.run_svn(&["commit", "-m", message, &path_str]).await
    }

    /// Run one `svn` command and return its combined stdout + stderr text.
    ///
    /// An empty argument list is a no-op returning an empty string. A
    /// non-zero exit status is fatal ([`SvnError::CommandFailed`]); text
    /// markers are never used for success detection here.
    async fn run_svn(&self, args: &[&str]) -> Result<String, SvnError> {
        if args.is_empty() {
            return Ok(String::new());
        }

        let mut cmd = Command::new("svn");
        cmd.args(args)
            .arg("--non-interactive")
            .arg("--no-auth-cache")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(creds) = &self.credentials {
            cmd.arg("--username")
                .arg(&creds.username)
                .arg("--password")
                .arg(&creds.password);
        }

        debug!(cmd = %format!("svn {}", args.join(" ")), "running svn command");
        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SvnError::BinaryNotFound("svn".into())
            } else {
                SvnError::IoError(e)
            }
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            let exit_code = output.status.code().unwrap_or(-1);
            warn!(exit_code, %stderr, "svn command failed");
            return Err(SvnError::CommandFailed { exit_code, stderr });
        }

        // Merge the streams so callers see one text, as the CLI user would.
        let mut text = stdout;
        text.push_str(&stderr);
        Ok(text)
    }
}
