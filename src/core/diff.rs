//! Unified diff between two byte buffers.
//!
//! Both sides are decoded into line stores and compared line by line with
//! `\n` separators, so a UTF-16 backup diffs against a UTF-16 file as text,
//! and a CRLF file against its LF copy shows no changed lines.

use std::fmt::Write as _;

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use crate::core::line_store::LineStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DiffOutcome {
    /// Byte-identical.
    Identical,
    /// Same text, different encoding, BOM or terminators.
    EncodingOnly,
    Changed(UnifiedDiff),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnifiedDiff {
    /// Full patch text with `---`/`+++` headers.
    pub text: String,
    pub added: usize,
    pub removed: usize,
}

pub const DEFAULT_CONTEXT: usize = 3;

pub fn diff_bytes(old: &[u8], new: &[u8], old_label: &str, new_label: &str) -> DiffOutcome {
    if old == new {
        return DiffOutcome::Identical;
    }
    let old_text = normalized(old);
    let new_text = normalized(new);
    match diff_text(&old_text, &new_text, old_label, new_label, DEFAULT_CONTEXT) {
        Some(d) => DiffOutcome::Changed(d),
        None => DiffOutcome::EncodingOnly,
    }
}

/// Decoded lines joined with `\n`, keeping the final-newline flag.
fn normalized(bytes: &[u8]) -> String {
    let store = LineStore::decode(bytes, "");
    let mut text = store.lines().join("\n");
    if store.trailing_newline() && !store.is_empty() {
        text.push('\n');
    }
    text
}

/// Line diff of two texts; `None` when no line differs.
pub fn diff_text(
    old: &str,
    new: &str,
    old_label: &str,
    new_label: &str,
    context: usize,
) -> Option<UnifiedDiff> {
    let diff = TextDiff::from_lines(old, new);
    let mut text = String::new();
    let (mut added, mut removed) = (0, 0);

    for hunk in diff.unified_diff().context_radius(context).iter_hunks() {
        if text.is_empty() {
            let _ = writeln!(text, "--- {old_label}");
            let _ = writeln!(text, "+++ {new_label}");
        }
        let _ = writeln!(text, "{}", hunk.header());
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => {
                    removed += 1;
                    '-'
                }
                ChangeTag::Insert => {
                    added += 1;
                    '+'
                }
                ChangeTag::Equal => ' ',
            };
            text.push(sign);
            text.push_str(change.value());
            if change.missing_newline() {
                text.push('\n');
                text.push_str("\\ No newline at end of file\n");
            }
        }
    }

    if text.is_empty() {
        None
    } else {
        Some(UnifiedDiff {
            text,
            added,
            removed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_bytes() {
        assert_eq!(diff_bytes(b"a\n", b"a\n", "x", "y"), DiffOutcome::Identical);
    }

    #[test]
    fn bom_only_change_is_encoding_only() {
        assert_eq!(
            diff_bytes(b"\xEF\xBB\xBFa\n", b"a\n", "x", "y"),
            DiffOutcome::EncodingOnly
        );
    }

    #[test]
    fn terminator_only_change_is_encoding_only() {
        assert_eq!(
            diff_bytes(b"a\r\nb\r\n", b"a\nb\n", "old", "new"),
            DiffOutcome::EncodingOnly
        );
        assert_eq!(diff_bytes(b"a\rb", b"a\nb", "old", "new"), DiffOutcome::EncodingOnly);
    }

    #[test]
    fn crlf_edits_render_without_carriage_returns() {
        let DiffOutcome::Changed(d) = diff_bytes(b"a\r\nb\r\n", b"a\nB\n", "old", "new") else {
            panic!("expected a change");
        };
        assert!(!d.text.contains('\r'));
        assert!(d.text.contains("-b\n+B\n"));
        assert_eq!((d.added, d.removed), (1, 1));
    }

    #[test]
    fn changed_lines_are_counted() {
        let out = diff_text("a\nb\nc\n", "a\nB\nc\nd\n", "backup: f.1", "current: f", 3).unwrap();
        assert!(out.text.starts_with("--- backup: f.1\n+++ current: f\n@@"));
        assert!(out.text.contains("-b\n"));
        assert!(out.text.contains("+B\n"));
        assert_eq!(out.added, 2);
        assert_eq!(out.removed, 1);
    }

    #[test]
    fn missing_final_newline_is_marked() {
        let out = diff_text("a\n", "a\nb", "old", "new", 3).unwrap();
        assert!(out.text.contains("+b\n\\ No newline at end of file\n"));
    }
}
