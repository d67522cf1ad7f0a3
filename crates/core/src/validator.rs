//! Pre-flight reachability check for the source and destination locations.

use tracing::{debug, info};

use crate::errors::{SvnError, ValidationError};
use crate::svn::SvnClient;

/// Error-line prefix the SVN CLI emits, e.g. `svn: E170000: ...`. Retained
/// as a backstop alongside the exit-code check. The bare `svn:` prefix is
/// not enough: healthy `svn info` output for an `svn://host/repo` URL
/// contains `URL: svn://...` lines.
const SVN_ERROR_MARKER: &str = "svn: E";

/// Query `svn info` for both locations and collect every invalid one into a
/// combined human-readable message. The merge engine treats any failure as a
/// hard gate, before a workspace is created.
pub async fn validate(
    client: &SvnClient,
    source: &str,
    dest: &str,
) -> Result<(), ValidationError> {
    let mut message = String::new();

    if let Some(detail) = probe(client, source).await {
        message.push_str(&format!("Source URL '{}' is invalid: {}\n", source, detail));
    }
    if let Some(detail) = probe(client, dest).await {
        message.push_str(&format!(
            "Destination URL '{}' is invalid: {}\n",
            dest, detail
        ));
    }

    if message.is_empty() {
        info!(source, dest, "both repository locations are reachable");
        Ok(())
    } else {
        Err(ValidationError::Unreachable(message.trim_end().to_string()))
    }
}

/// Probe one location; `None` means reachable, `Some(detail)` carries the
/// reason it is not.
async fn probe(client: &SvnClient, url: &str) -> Option<String> {
    match client.info(url).await {
        Ok(output) if carries_error_marker(&output) => {
            debug!(url, "svn info output carries an error marker");
            Some(first_line(&output))
        }
        Ok(_) => None,
        Err(SvnError::CommandFailed { stderr, .. }) => Some(first_line(&stderr)),
        Err(e) => Some(e.to_string()),
    }
}

fn carries_error_marker(output: &str) -> bool {
    output.contains(SVN_ERROR_MARKER)
}

fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("unknown error")
        .to_string()
}
