//! Terminator index with CR/LF/CRLF-aware line splitting.
//!
//! Goals
//! - Single pass over bytes to record every terminator and its kind.
//! - CRLF is one terminator, never CR followed by LF.
//! - 1-based external line numbers (friendly for UX).
//! - O(1) line→byte span via the index.
//!
//! Notes
//! - An empty buffer has 0 lines.
//! - A buffer ending in a terminator has no empty phantom last line.
//! - Spans exclude the terminator; end is exclusive.

use serde::Serialize;

/// Line terminator style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum LineTerminator {
    #[default]
    Lf,
    Crlf,
    Cr,
}

impl LineTerminator {
    pub fn as_str(self) -> &'static str {
        match self {
            LineTerminator::Lf => "\n",
            LineTerminator::Crlf => "\r\n",
            LineTerminator::Cr => "\r",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LineTerminator::Lf => "LF",
            LineTerminator::Crlf => "CRLF",
            LineTerminator::Cr => "CR",
        }
    }

    /// Byte width of the terminator.
    pub fn width(self) -> usize {
        self.as_str().len()
    }
}

impl std::fmt::Display for LineTerminator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct TerminatorIndex {
    /// (byte offset, kind) of every terminator, in order.
    breaks: Vec<(usize, LineTerminator)>,
    /// Total byte length of the buffer.
    len: usize,
}

impl TerminatorIndex {
    /// Build an index recording every CR, LF and CRLF.
    pub fn build(bytes: &[u8]) -> Self {
        let mut breaks = Vec::with_capacity(bytes.len() / 48);
        let mut i = 0usize;

        // Single pass; CR immediately followed by LF is one CRLF.
        while let Some(pos) = memchr::memchr2(b'\r', b'\n', &bytes[i..]) {
            let abs = i + pos;
            if bytes[abs] == b'\r' {
                if bytes.get(abs + 1) == Some(&b'\n') {
                    breaks.push((abs, LineTerminator::Crlf));
                    i = abs + 2;
                } else {
                    breaks.push((abs, LineTerminator::Cr));
                    i = abs + 1;
                }
            } else {
                breaks.push((abs, LineTerminator::Lf));
                i = abs + 1;
            }
        }

        Self {
            breaks,
            len: bytes.len(),
        }
    }

    /// Style of the first terminator, if any.
    pub fn first_terminator(&self) -> Option<LineTerminator> {
        self.breaks.first().map(|&(_, t)| t)
    }

    /// True when more than one terminator style occurs.
    pub fn is_mixed(&self) -> bool {
        match self.first_terminator() {
            Some(first) => self.breaks.iter().any(|&(_, t)| t != first),
            None => false,
        }
    }

    /// True when the buffer's last bytes are a terminator.
    pub fn ends_with_terminator(&self) -> bool {
        self.breaks
            .last()
            .is_some_and(|&(pos, t)| pos + t.width() == self.len)
    }

    /// Total number of logical lines.
    pub fn line_count(&self) -> usize {
        if self.len == 0 {
            0
        } else if self.ends_with_terminator() {
            self.breaks.len()
        } else {
            self.breaks.len() + 1
        }
    }

    /// Byte span (start..end) of a 1-based line, terminator excluded.
    /// Returns None if line is out of range.
    pub fn line_span(&self, line1: usize) -> Option<(usize, usize)> {
        if line1 == 0 || line1 > self.line_count() {
            return None;
        }
        let start = match line1 {
            1 => 0,
            // One past the previous terminator.
            _ => {
                let (pos, t) = self.breaks[line1 - 2];
                pos + t.width()
            }
        };
        let end = self
            .breaks
            .get(line1 - 1)
            .map_or(self.len, |&(pos, _)| pos);
        Some((start, end))
    }

    /// Split `text` into its lines, terminators removed.
    /// `text` must be the buffer this index was built from.
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        (1..=self.line_count())
            .filter_map(|n| self.line_span(n))
            .map(|(s, e)| &text[s..e])
            .collect()
    }
}
