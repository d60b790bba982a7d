use std::path::Path;

use tracing::warn;

use crate::{Error, Result};

/// A grant lookup line: `org grant-id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantId {
    pub org: String,
    pub grant: String,
}

/// Non-empty, non-comment lines with their 1-based line numbers.
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

/// One author name per line.
pub fn parse_authors(text: &str) -> Vec<String> {
    content_lines(text).map(|(_, line)| line.to_string()).collect()
}

/// Whitespace separated `org grant-id` pairs, one per line.
/// Malformed lines are logged and skipped.
pub fn parse_grants(path: &Path, text: &str) -> Vec<GrantId> {
    content_lines(text)
        .filter_map(|(line_no, line)| match parse_grant_line(path, line_no, line) {
            Ok(grant) => Some(grant),
            Err(e) => {
                warn!("skipping line: {e}");
                None
            }
        })
        .collect()
}

fn parse_grant_line(path: &Path, line_no: usize, line: &str) -> Result<GrantId> {
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(org), Some(grant), None) => Ok(GrantId {
            org: org.to_string(),
            grant: grant.to_string(),
        }),
        _ => Err(Error::Input {
            path: path.to_path_buf(),
            line: line_no,
            reason: format!("expected `org grant-id`, got {line:?}"),
        }),
    }
}
