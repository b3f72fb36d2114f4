//! Error taxonomy for the editing core.
//!
//! Every failure names its kind plus the offending path, lines or tag so a
//! caller can act on it without re-reading the file. Validation errors are
//! raised before any byte is written.

use std::path::PathBuf;

use miette::Diagnostic;

/// Errors produced by the encoding, line store, edit, backup and writer layers.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum LineEditError {
    /// A line number or range falls outside the file, or start > end.
    #[error("invalid line range {start}-{end} for {op}: {reason} (file has {len} lines)")]
    #[diagnostic(
        code(lineedit::invalid_range),
        help("line numbers are 1-based; view the file first to confirm current numbering")
    )]
    InvalidLineRange {
        op: &'static str,
        start: usize,
        end: usize,
        len: usize,
        reason: &'static str,
    },

    /// A delete wider than the configured threshold without an override.
    #[error(
        "refusing to delete {count} lines ({start}-{end}); the limit is {threshold} without --force"
    )]
    #[diagnostic(
        code(lineedit::large_delete),
        help("pass --force or raise edit.confirm_large_delete")
    )]
    LargeDeleteRejected {
        start: usize,
        end: usize,
        count: usize,
        threshold: usize,
    },

    #[error("file not found: {}", .0.display())]
    #[diagnostic(
        code(lineedit::file_not_found),
        help("set edit.create_if_missing = true to create files on first edit")
    )]
    FileNotFound(PathBuf),

    /// No backup matches the requested file (and tag, if any).
    #[error("no backup found for {}{}", .path.display(), tag_suffix(.tag))]
    #[diagnostic(code(lineedit::backup_not_found), help("list available backups with `led backup list`"))]
    BackupNotFound { path: PathBuf, tag: Option<String> },

    /// Disk full, permission denied and friends.
    #[error("{action} {}: {source}", .path.display())]
    #[diagnostic(code(lineedit::io))]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Text holds a character the file's charset cannot represent.
    #[error(
        "line {line} contains {ch:?} (U+{code:04X}) which cannot be encoded as {charset}",
        code = codepoint(.ch)
    )]
    #[diagnostic(
        code(lineedit::encoding_round_trip),
        help("use characters representable in the file's encoding, or convert the file to UTF-8 first")
    )]
    EncodingRoundTripFailure {
        charset: &'static str,
        line: usize,
        ch: char,
    },

    /// `view --grep` got a pattern that does not compile.
    #[error("invalid pattern '{pattern}': {source}")]
    #[diagnostic(code(lineedit::invalid_pattern))]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Replace/insert/append was requested without any content.
    #[error("no content provided for {op} (use -c TEXT or --stdin)")]
    #[diagnostic(code(lineedit::missing_content))]
    MissingContent { op: &'static str },
}

fn codepoint(ch: &char) -> u32 {
    *ch as u32
}

fn tag_suffix(tag: &Option<String>) -> String {
    match tag {
        Some(t) => format!(" with tag '{t}'"),
        None => String::new(),
    }
}

impl LineEditError {
    /// Wrap an I/O error with the action and path it concerns.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LineEditError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Stable process exit code for this error kind.
    /// 2=invalid range/pattern/input, 3=large delete, 4=not found, 5=encoding, 1=io
    pub fn exit_code(&self) -> i32 {
        match self {
            LineEditError::InvalidLineRange { .. }
            | LineEditError::MissingContent { .. }
            | LineEditError::InvalidPattern { .. } => 2,
            LineEditError::LargeDeleteRejected { .. } => 3,
            LineEditError::FileNotFound(_) | LineEditError::BackupNotFound { .. } => 4,
            LineEditError::EncodingRoundTripFailure { .. } => 5,
            LineEditError::Io { .. } => 1,
        }
    }
}

/// Exit code for an arbitrary error chain; falls back to 1.
pub fn exit_code_for(e: &anyhow::Error) -> i32 {
    e.chain()
        .find_map(|cause| cause.downcast_ref::<LineEditError>())
        .map(LineEditError::exit_code)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_lines() {
        let e = LineEditError::InvalidLineRange {
            op: "delete",
            start: 7,
            end: 9,
            len: 5,
            reason: "end is past the last line",
        };
        let msg = e.to_string();
        assert!(msg.contains("7-9"));
        assert!(msg.contains("delete"));
        assert!(msg.contains("5 lines"));
    }

    #[test]
    fn backup_not_found_mentions_tag() {
        let e = LineEditError::BackupNotFound {
            path: PathBuf::from("a.txt"),
            tag: Some("before".into()),
        };
        assert_eq!(e.to_string(), "no backup found for a.txt with tag 'before'");
    }

    #[test]
    fn round_trip_failure_shows_codepoint() {
        let e = LineEditError::EncodingRoundTripFailure {
            charset: "windows-1252",
            line: 3,
            ch: '✓',
        };
        assert!(e.to_string().contains("U+2713"));
        assert!(e.to_string().contains("line 3"));
    }

    #[test]
    fn exit_codes_follow_kind_through_context() {
        let e = anyhow::Error::new(LineEditError::LargeDeleteRejected {
            start: 1,
            end: 60,
            count: 60,
            threshold: 50,
        })
        .context("edit failed");
        assert_eq!(exit_code_for(&e), 3);
        assert_eq!(exit_code_for(&anyhow::anyhow!("boom")), 1);
    }
}
