//! Decoded, 1-indexed view of a file plus what is needed to re-encode it.
//!
//! A store remembers the charset and BOM, the canonical terminator (the first
//! one seen in the file) and whether the last line was terminated. `encode`
//! reproduces the original bytes exactly for single-style files; files with
//! mixed terminators are normalized to the canonical style.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::core::encoding::{self, FileEncoding, encode_str};
use crate::core::error::LineEditError;
use crate::infra::io::read_bytes;
use crate::infra::line_index::TerminatorIndex;

pub use crate::infra::line_index::LineTerminator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineStore {
    encoding: FileEncoding,
    terminator: LineTerminator,
    trailing_newline: bool,
    lines: Vec<String>,
    source_path: PathBuf,
}

impl LineStore {
    /// Decode raw bytes read from `source_path`.
    pub fn decode(bytes: &[u8], source_path: impl Into<PathBuf>) -> Self {
        let (encoding, text) = encoding::decode(bytes);
        Self::from_text(&text, encoding, source_path)
    }

    /// Build a store from already-decoded text.
    pub fn from_text(text: &str, encoding: FileEncoding, source_path: impl Into<PathBuf>) -> Self {
        let source_path = source_path.into();
        let index = TerminatorIndex::build(text.as_bytes());
        let terminator = index.first_terminator().unwrap_or_default();

        if index.is_mixed() {
            warn!(
                path = %source_path.display(),
                canonical = %terminator,
                "mixed line terminators; writing will normalize every line to the first style seen"
            );
        }

        Self {
            encoding,
            terminator,
            // An empty file gets a final newline once it has content.
            trailing_newline: text.is_empty() || index.ends_with_terminator(),
            lines: index.split(text).into_iter().map(str::to_owned).collect(),
            source_path,
        }
    }

    /// A store for a file that does not exist yet: UTF-8, LF, no lines.
    pub fn empty(source_path: impl Into<PathBuf>) -> Self {
        Self {
            encoding: FileEncoding::UTF8,
            terminator: LineTerminator::Lf,
            trailing_newline: true,
            lines: Vec::new(),
            source_path: source_path.into(),
        }
    }

    /// Read and decode `path`.
    #[instrument(level = "debug", fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LineEditError> {
        let path = path.as_ref();
        let bytes = read_bytes(path)?;
        let store = Self::decode(bytes.as_ref(), path);
        debug!(
            encoding = %store.encoding,
            terminator = %store.terminator,
            lines = store.lines.len(),
            "loaded"
        );
        Ok(store)
    }

    /// Like [`LineStore::load`], but a missing file yields an empty store
    /// when `create_if_missing` is set.
    pub fn load_or_create(
        path: impl AsRef<Path>,
        create_if_missing: bool,
    ) -> Result<Self, LineEditError> {
        match Self::load(path.as_ref()) {
            Err(LineEditError::FileNotFound(p)) if create_if_missing => {
                debug!(path = %p.display(), "file missing; starting empty");
                Ok(Self::empty(p))
            }
            other => other,
        }
    }

    /// Re-encode: lines joined by the canonical terminator, a final
    /// terminator iff `trailing_newline`, BOM iff the encoding has one.
    pub fn encode(&self) -> Result<Vec<u8>, LineEditError> {
        let charset = self.encoding.charset;
        let nl = self.terminator.as_str();
        let approx: usize = self.lines.iter().map(|l| l.len() + nl.len()).sum();
        let mut out = Vec::with_capacity(approx + 4);
        out.extend_from_slice(self.encoding.bom_bytes());

        let last = self.lines.len();
        for (i, line) in self.lines.iter().enumerate() {
            let lineno = i + 1;
            let fail = |ch| LineEditError::EncodingRoundTripFailure {
                charset: charset.name(),
                line: lineno,
                ch,
            };
            encode_str(charset, line, &mut out).map_err(fail)?;
            if lineno < last || self.trailing_newline {
                encode_str(charset, nl, &mut out).map_err(fail)?;
            }
        }
        Ok(out)
    }

    /// Replace the line sequence, keeping every other attribute.
    pub(crate) fn with_lines(&self, lines: Vec<String>) -> Self {
        Self {
            encoding: self.encoding,
            terminator: self.terminator,
            trailing_newline: self.trailing_newline,
            lines,
            source_path: self.source_path.clone(),
        }
    }

    pub fn encoding(&self) -> FileEncoding {
        self.encoding
    }

    pub fn terminator(&self) -> LineTerminator {
        self.terminator
    }

    pub fn trailing_newline(&self) -> bool {
        self.trailing_newline
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 1-based line lookup.
    pub fn line(&self, line1: usize) -> Option<&str> {
        line1
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .map(String::as_str)
    }

    /// `(line number, content)` pairs for an inclusive 1-based span,
    /// clamped to the lines that exist.
    pub fn numbered(&self, start: usize, end: usize) -> impl Iterator<Item = (usize, &str)> {
        let lo = start.max(1);
        let hi = end.min(self.lines.len());
        self.lines
            .iter()
            .enumerate()
            .skip(lo - 1)
            .take((hi + 1).saturating_sub(lo))
            .map(|(i, l)| (i + 1, l.as_str()))
    }
}
