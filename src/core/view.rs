//! Read-only numbered views over a [`LineStore`].

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use regex::RegexBuilder;
use serde::Serialize;

use crate::core::error::LineEditError;
use crate::core::line_store::{LineStore, LineTerminator};
use crate::infra::io::{looks_binary, read_bytes};

/// Which lines to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewSpan {
    All,
    Line(usize),
    /// Inclusive; the end is clamped to the file.
    Range(usize, usize),
    Head(usize),
    Tail(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View<'a> {
    pub rows: Vec<(usize, &'a str)>,
    pub total: usize,
    /// Set when `All` hit the line cap.
    pub truncated: bool,
}

impl View<'_> {
    /// `"<lineno> | <content>"` per row, line numbers right-aligned.
    pub fn render(&self, width: usize) -> String {
        let mut out = String::new();
        for (n, line) in &self.rows {
            let _ = writeln!(out, "{n:>width$} | {line}");
        }
        out
    }
}

/// Pick rows of `store` for `span`. `max_lines` caps `All`; 0 means no cap.
pub fn select(store: &LineStore, span: ViewSpan, max_lines: usize) -> Result<View<'_>, LineEditError> {
    let total = store.len();
    let invalid = |start, end, reason| LineEditError::InvalidLineRange {
        op: "view",
        start,
        end,
        len: total,
        reason,
    };

    let (start, end, truncated) = match span {
        ViewSpan::All => {
            let cap = if max_lines == 0 { total } else { max_lines.min(total) };
            (1, cap, cap < total)
        }
        ViewSpan::Line(n) => {
            if n == 0 || n > total {
                return Err(invalid(n, n, "line does not exist"));
            }
            (n, n, false)
        }
        ViewSpan::Range(s, e) => {
            if s == 0 {
                return Err(invalid(s, e, "line numbers start at 1"));
            }
            if s > e {
                return Err(invalid(s, e, "start is after end"));
            }
            if s > total {
                return Err(invalid(s, e, "start is past the last line"));
            }
            (s, e.min(total), false)
        }
        ViewSpan::Head(n) => (1, n.min(total), false),
        ViewSpan::Tail(n) => (total.saturating_sub(n) + 1, total, false),
    };

    Ok(View {
        rows: store.numbered(start, end).collect(),
        total,
        truncated,
    })
}

/// Lines matching `pattern`, case-insensitively, with their numbers.
pub fn grep<'a>(store: &'a LineStore, pattern: &str) -> Result<View<'a>, LineEditError> {
    let re = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| LineEditError::InvalidPattern {
            pattern: pattern.to_owned(),
            source,
        })?;
    Ok(View {
        rows: store
            .numbered(1, store.len())
            .filter(|(_, line)| re.is_match(line))
            .collect(),
        total: store.len(),
        truncated: false,
    })
}

/// Structural facts about a file, for `view --summary`.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub path: PathBuf,
    pub lines: usize,
    pub size_bytes: u64,
    pub encoding: String,
    pub has_bom: bool,
    pub terminator: LineTerminator,
    pub trailing_newline: bool,
    pub binary: bool,
}

pub fn summarize(path: &Path) -> Result<FileSummary, LineEditError> {
    let bytes = read_bytes(path)?;
    let raw = bytes.as_ref();
    let store = LineStore::decode(raw, path);
    Ok(FileSummary {
        path: path.to_path_buf(),
        lines: store.len(),
        size_bytes: raw.len() as u64,
        encoding: store.encoding().charset.name().to_owned(),
        has_bom: store.encoding().has_bom,
        terminator: store.terminator(),
        trailing_newline: store.trailing_newline(),
        binary: looks_binary(raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten() -> LineStore {
        let text: String = (1..=10).map(|i| format!("line {i}\n")).collect();
        LineStore::decode(text.as_bytes(), "ten.txt")
    }

    #[test]
    fn render_pads_numbers() {
        let s = ten();
        let v = select(&s, ViewSpan::Range(9, 10), 0).unwrap();
        assert_eq!(v.render(4), "   9 | line 9\n  10 | line 10\n");
    }

    #[test]
    fn spans_clamp_and_cap() {
        let s = ten();
        let all = select(&s, ViewSpan::All, 4).unwrap();
        assert_eq!(all.rows.len(), 4);
        assert!(all.truncated);

        assert_eq!(select(&s, ViewSpan::Range(8, 99), 0).unwrap().rows.len(), 3);
        assert_eq!(select(&s, ViewSpan::Head(3), 0).unwrap().rows[2], (3, "line 3"));
        let tail = select(&s, ViewSpan::Tail(2), 0).unwrap();
        assert_eq!(tail.rows, vec![(9, "line 9"), (10, "line 10")]);
        assert_eq!(select(&s, ViewSpan::Tail(50), 0).unwrap().rows.len(), 10);
    }

    #[test]
    fn bad_spans_are_errors() {
        let s = ten();
        assert!(select(&s, ViewSpan::Line(11), 0).is_err());
        assert!(select(&s, ViewSpan::Range(5, 4), 0).is_err());
        assert!(select(&s, ViewSpan::Range(11, 12), 0).is_err());
    }

    #[test]
    fn grep_is_case_insensitive_and_numbered() {
        let s = LineStore::decode(b"fn main() {\n    // TODO: wire up\n}\n// todo later\n", "g.rs");
        let v = grep(&s, "todo").unwrap();
        assert_eq!(v.rows, vec![(2, "    // TODO: wire up"), (4, "// todo later")]);
        assert_eq!(v.render(3), "  2 |     // TODO: wire up\n  4 | // todo later\n");

        assert!(grep(&s, "nothing here").unwrap().rows.is_empty());
        assert!(matches!(
            grep(&s, "(unclosed"),
            Err(LineEditError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn summary_of_crlf_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.txt");
        std::fs::write(&path, b"\xEF\xBB\xBFa\r\nb").unwrap();
        let sum = summarize(&path).unwrap();
        assert_eq!(sum.lines, 2);
        assert_eq!(sum.encoding, "UTF-8");
        assert!(sum.has_bom);
        assert_eq!(sum.terminator, LineTerminator::Crlf);
        assert!(!sum.trailing_newline);
        assert!(!sum.binary);
    }
}
