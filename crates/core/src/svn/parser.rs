//! Parsers for SVN command output.
//!
//! Every function here is pure and total: the absence of an expected pattern
//! is never an error at this layer, it degrades to `false` / `0` / `None` /
//! an empty string and is interpreted by the merge engine.

use std::sync::OnceLock;

use regex_lite::Regex;

/// Marker printed by `svn checkout` on success.
const CHECKOUT_MARKER: &str = "Checked out revision";

fn conflict_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Matches both "Text conflicts: N" and "Tree conflicts: N" summary lines.
    RE.get_or_init(|| Regex::new(r"T[a-z]+\s+conflicts:\s*([0-9]+)").expect("valid regex"))
}

fn committed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Committed\s+revision\s+([0-9]+)").expect("valid regex"))
}

fn merged_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Mergeinfo property diff line, e.g. "   Merged /branches/b1:r100-105".
    RE.get_or_init(|| Regex::new(r"Merged.*[0-9]+").expect("valid regex"))
}

/// True iff `text` contains the literal checkout success marker.
/// Case-sensitive substring match, not anchored.
pub fn checkout_succeeded(text: &str) -> bool {
    text.contains(CHECKOUT_MARKER)
}

/// Sum of all `<Kind> conflicts: N` counts in a status listing.
///
/// Handles zero, one, or multiple summary lines; returns 0 when none match.
pub fn count_conflicts(text: &str) -> u32 {
    conflict_re()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .sum()
}

/// Revision number from the first `Committed revision N` line, if any.
pub fn committed_revision(text: &str) -> Option<i64> {
    committed_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// Revision descriptor from merge metadata: the substring after the last
/// colon of the first `Merged ... <digits>` match, e.g. `r100-105`.
/// Empty string when the metadata carries no such line.
pub fn merged_revisions(text: &str) -> String {
    match merged_re().find(text) {
        Some(m) => {
            let matched = m.as_str();
            match matched.rsplit(':').next() {
                Some(revs) => revs.trim().to_string(),
                None => String::new(),
            }
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_marker_case_sensitive() {
        assert!(checkout_succeeded("A    temp/trunk/a.txt\nChecked out revision 12.\n"));
        assert!(!checkout_succeeded("checked out revision 12."));
        assert!(!checkout_succeeded(""));
    }

    #[test]
    fn test_count_conflicts_sums_all_kinds() {
        let status = "M       temp/trunk/a.txt\n\
                      C       temp/trunk/b.txt\n\
                      Summary of conflicts:\n\
                      Text conflicts: 2\n\
                      Tree conflicts: 1\n";
        assert_eq!(count_conflicts(status), 3);
    }

    #[test]
    fn test_count_conflicts_single_line() {
        assert_eq!(count_conflicts("Summary of conflicts:\n  Text conflicts: 3\n"), 3);
    }

    #[test]
    fn test_count_conflicts_none() {
        assert_eq!(count_conflicts("M       temp/trunk/a.txt\n"), 0);
        assert_eq!(count_conflicts(""), 0);
    }

    #[test]
    fn test_committed_revision() {
        let out = "Sending        a.txt\nTransmitting file data .\nCommitted revision 1251.\n";
        assert_eq!(committed_revision(out), Some(1251));
        assert_eq!(committed_revision("Authentication failed"), None);
    }

    #[test]
    fn test_merged_revisions_range() {
        let diff = "Index: .\n\
                    Property changes on: .\n\
                    Modified: svn:mergeinfo\n\
                    ## -0,0 +0,1 ##\n   Merged /branches/x:r100-105\n";
        assert_eq!(merged_revisions(diff), "r100-105");
    }

    #[test]
    fn test_merged_revisions_single() {
        assert_eq!(merged_revisions("   Merged /branches/x:r1240\n"), "r1240");
    }

    #[test]
    fn test_merged_revisions_absent() {
        assert_eq!(merged_revisions("Index: a.txt\n+++ a.txt\n"), "");
        assert_eq!(merged_revisions(""), "");
    }
}
