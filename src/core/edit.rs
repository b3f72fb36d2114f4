//! Line-addressed edit operations over a [`LineStore`].
//!
//! Every operation is validated in full before the new line sequence is
//! built, and `apply` never touches disk: it maps one store to another.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::core::error::LineEditError;
use crate::core::line_store::LineStore;
use crate::core::options::EditOptions;
use crate::infra::line_index::TerminatorIndex;

/// Inclusive 1-based `[start, end]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(line: usize) -> Self {
        Self::new(line, line)
    }

    /// Number of lines covered; 0 when the range is inverted.
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOperation {
    /// Swap lines `range` for `new_lines`.
    Replace {
        range: LineRange,
        new_lines: Vec<String>,
    },
    /// New lines land at `before`; the old line `before` moves down.
    Insert {
        before: usize,
        new_lines: Vec<String>,
    },
    /// New lines land right after `after`.
    Append {
        after: usize,
        new_lines: Vec<String>,
    },
    Delete {
        range: LineRange,
    },
}

impl EditOperation {
    pub fn name(&self) -> &'static str {
        match self {
            EditOperation::Replace { .. } => "replace",
            EditOperation::Insert { .. } => "insert",
            EditOperation::Append { .. } => "append",
            EditOperation::Delete { .. } => "delete",
        }
    }

    /// Past-tense verb for user-facing summaries.
    pub fn verb(&self) -> &'static str {
        match self {
            EditOperation::Replace { .. } => "replaced",
            EditOperation::Insert { .. } => "inserted",
            EditOperation::Append { .. } => "appended",
            EditOperation::Delete { .. } => "deleted",
        }
    }

    fn new_lines(&self) -> Option<&[String]> {
        match self {
            EditOperation::Replace { new_lines, .. }
            | EditOperation::Insert { new_lines, .. }
            | EditOperation::Append { new_lines, .. } => Some(new_lines),
            EditOperation::Delete { .. } => None,
        }
    }
}

/// What an applied edit changed, in pre-edit line numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub store: LineStore,
    /// Index (0-based) where the splice happened.
    pub at: usize,
    pub lines_removed: usize,
    pub lines_added: usize,
}

/// Validates and applies a single [`EditOperation`].
#[derive(Debug, Clone)]
pub struct EditEngine {
    large_delete_threshold: usize,
    force: bool,
    expand_escapes: bool,
}

impl Default for EditEngine {
    fn default() -> Self {
        Self {
            large_delete_threshold: EditOptions::default().large_delete_threshold,
            force: false,
            expand_escapes: true,
        }
    }
}

impl EditEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(opts: &EditOptions) -> Self {
        Self::new().with_threshold(opts.large_delete_threshold)
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.large_delete_threshold = threshold;
        self
    }

    pub fn with_force(mut self, enabled: bool) -> Self {
        self.force = enabled;
        self
    }

    /// Whether literal `\n` sequences in new content count as line breaks.
    pub fn with_escapes(mut self, enabled: bool) -> Self {
        self.expand_escapes = enabled;
        self
    }

    pub fn apply(&self, store: &LineStore, op: &EditOperation) -> Result<LineStore, LineEditError> {
        self.apply_detailed(store, op).map(|o| o.store)
    }

    pub fn apply_detailed(
        &self,
        store: &LineStore,
        op: &EditOperation,
    ) -> Result<EditOutcome, LineEditError> {
        let len = store.len();
        let (at, removed) = self.validate(op, len)?;

        let incoming: Vec<String> = match op.new_lines() {
            Some([]) => return Err(LineEditError::MissingContent { op: op.name() }),
            Some(pieces) => pieces
                .iter()
                .flat_map(|p| split_content(p, self.expand_escapes))
                .collect(),
            None => Vec::new(),
        };
        let added = incoming.len();

        let mut lines = store.lines().to_vec();
        lines.splice(at..at + removed, incoming);

        debug!(op = op.name(), at = at + 1, removed, added, before = len, after = lines.len(), "edit applied");

        Ok(EditOutcome {
            store: store.with_lines(lines),
            at,
            lines_removed: removed,
            lines_added: added,
        })
    }

    /// Returns the 0-based splice index and the number of lines removed.
    fn validate(&self, op: &EditOperation, len: usize) -> Result<(usize, usize), LineEditError> {
        let invalid = |start, end, reason| LineEditError::InvalidLineRange {
            op: op.name(),
            start,
            end,
            len,
            reason,
        };

        match *op {
            EditOperation::Replace { range, .. } | EditOperation::Delete { range } => {
                check_range(range, len).map_err(|reason| invalid(range.start, range.end, reason))?;
                let count = range.len();
                if matches!(op, EditOperation::Delete { .. })
                    && count > self.large_delete_threshold
                    && !self.force
                {
                    return Err(LineEditError::LargeDeleteRejected {
                        start: range.start,
                        end: range.end,
                        count,
                        threshold: self.large_delete_threshold,
                    });
                }
                Ok((range.start - 1, count))
            }
            EditOperation::Insert { before, .. } => {
                // `len + 1` inserts at end of file.
                check_anchor(before, len + 1).map_err(|reason| invalid(before, before, reason))?;
                Ok((before - 1, 0))
            }
            EditOperation::Append { after, .. } => {
                if len == 0 && after == 0 {
                    return Ok((0, 0));
                }
                check_anchor(after, len).map_err(|reason| invalid(after, after, reason))?;
                Ok((after, 0))
            }
        }
    }
}

fn check_range(range: LineRange, len: usize) -> Result<(), &'static str> {
    if range.start == 0 {
        Err("line numbers start at 1")
    } else if range.start > range.end {
        Err("start is after end")
    } else if len == 0 {
        Err("file is empty")
    } else if range.end > len {
        Err("end is past the last line")
    } else {
        Ok(())
    }
}

/// `line` must be in `[1, last]`.
fn check_anchor(line: usize, last: usize) -> Result<(), &'static str> {
    if line == 0 {
        Err("line numbers start at 1")
    } else if last == 0 {
        Err("file is empty")
    } else if line > last {
        Err("line is past the last valid position")
    } else {
        Ok(())
    }
}

/// Split new content into the logical lines it represents.
///
/// CR, LF and CRLF always break lines; literal `\n` does too when
/// `expand_escapes` is set. A single trailing terminator does not produce an
/// extra empty line, and empty content is one empty line.
pub fn split_content(text: &str, expand_escapes: bool) -> Vec<String> {
    let text = if expand_escapes && text.contains("\\n") {
        std::borrow::Cow::Owned(text.replace("\\n", "\n"))
    } else {
        std::borrow::Cow::Borrowed(text)
    };

    if text.is_empty() {
        return vec![String::new()];
    }
    TerminatorIndex::build(text.as_bytes())
        .split(&text)
        .into_iter()
        .map(str::to_owned)
        .collect()
}
