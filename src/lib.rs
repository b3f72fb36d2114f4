//! **lineedit** - Encoding-aware, line-addressed file editing
//!
//! Loads a file into numbered lines while remembering its charset, BOM, line
//! terminator and final newline, applies one validated edit, snapshots the
//! original and writes the result back atomically, byte-for-byte faithful.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Command handlers behind each `led` subcommand
pub mod cli_ext {
    /// `led edit`
    pub mod edit_cmd;

    /// `led view`
    pub mod view_cmd;

    /// `led backup ...`
    pub mod backup_cmd;

    /// `led diff`
    pub mod diff_cmd;

    /// Shared color helpers
    pub mod style;
}

/// Editing core - detection, line store, edits, backups and atomic writes
pub mod core {
    /// Charset + BOM detection and strict re-encoding
    pub mod encoding;
    pub use encoding::{Charset, FileEncoding, detect};

    /// Decoded lines plus the metadata needed for exact round-trips
    pub mod line_store;
    pub use line_store::{LineStore, LineTerminator};

    /// Validated, pure line edits
    pub mod edit;
    pub use edit::{EditEngine, EditOperation, LineRange};

    /// Timestamped per-file backups with eviction
    pub mod backup;
    pub use backup::{Backup, BackupManager};

    /// Save/list/restore/diff/cleanup request layer
    pub mod backup_ops;

    /// Atomic temp-then-rename writes
    pub mod writer;
    pub use writer::{write_atomic, write_store};

    /// Load → edit → backup → write pipeline
    pub mod apply;
    pub use apply::{ApplyReport, ApplyRequest};

    /// Unified diff over two byte buffers
    pub mod diff;

    /// Numbered read-only views
    pub mod view;

    /// Immutable options value
    pub mod options;
    pub use options::EditOptions;

    /// Error taxonomy and exit codes
    pub mod error;
    pub use error::{LineEditError, exit_code_for};
}

/// Infrastructure - Configuration, I/O, indexing and logging
pub mod infra {
    /// Layered configuration (defaults, ~/.lineedit.toml, project file, env)
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Raw byte reads, memory-mapped above 1MB
    pub mod io;
    pub use io::{FileBytes, read_bytes};

    /// CR/LF/CRLF terminator index
    pub mod line_index;
    pub use line_index::TerminatorIndex;

    /// tracing subscriber setup
    pub mod logging;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use infra::{Config, load_config};

// Core types for external consumers
pub use core::{
    EditEngine, EditOperation, EditOptions, FileEncoding, LineEditError, LineRange, LineStore,
};
