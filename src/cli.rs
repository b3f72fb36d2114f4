use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser)]
#[command(name = "led")]
#[command(
    about = "Line-addressed file editing that keeps encodings, line endings and backups intact"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Validate and report without writing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Debug logging on stderr (LINEEDIT_LOG overrides)
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl Cli {
    pub fn context(&self) -> AppContext {
        AppContext {
            quiet: self.quiet,
            no_color: self.no_color || std::env::var_os("NO_COLOR").is_some(),
            dry_run: self.dry_run,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replace, insert, append or delete lines by number
    Edit(EditArgs),

    /// Show numbered lines or a file summary
    View(ViewArgs),

    /// Save, list, restore, diff and clean up backups
    Backup(BackupArgs),

    /// Unified diff between two files, or a file and its backup
    Diff(DiffArgs),

    /// Initialize a lineedit.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
pub struct EditArgs {
    /// File to edit
    pub file: PathBuf,

    #[command(subcommand)]
    pub action: EditAction,

    /// Allow deletes wider than edit.confirm_large_delete
    #[arg(long, global = true)]
    pub force: bool,

    /// Skip the pre-edit backup
    #[arg(long, global = true)]
    pub no_backup: bool,
}

#[derive(Subcommand, Debug)]
pub enum EditAction {
    /// Replace lines START..=END with new content
    Replace {
        start: usize,
        /// Defaults to START
        end: Option<usize>,
        #[command(flatten)]
        content: ContentArgs,
    },

    /// Insert new content before LINE (last line + 1 appends at the end)
    Insert {
        line: usize,
        #[command(flatten)]
        content: ContentArgs,
    },

    /// Append new content after LINE (0 on an empty file)
    Append {
        line: usize,
        #[command(flatten)]
        content: ContentArgs,
    },

    /// Delete lines START..=END
    Delete {
        start: usize,
        /// Defaults to START
        end: Option<usize>,
    },
}

#[derive(Args, Debug, Clone)]
#[group(required = false, multiple = false)]
pub struct ContentArgs {
    /// New content; a literal \n starts a new line
    #[arg(short = 'c', long = "content", value_name = "TEXT", allow_hyphen_values = true)]
    pub text: Option<String>,

    /// Read new content from stdin (only real line breaks split lines)
    #[arg(long)]
    pub stdin: bool,
}

#[derive(Parser, Debug)]
#[command(group(
    ArgGroup::new("span").args(["line", "range", "head", "tail", "grep", "summary"])
))]
pub struct ViewArgs {
    /// File to view
    pub file: PathBuf,

    /// A single line
    #[arg(short, long, value_name = "N")]
    pub line: Option<usize>,

    /// Inclusive range; the end is clamped to the file
    #[arg(short, long, num_args = 2, value_names = ["START", "END"])]
    pub range: Option<Vec<usize>>,

    /// First N lines
    #[arg(long, value_name = "N")]
    pub head: Option<usize>,

    /// Last N lines
    #[arg(long, value_name = "N")]
    pub tail: Option<usize>,

    /// Lines matching a case-insensitive regex
    #[arg(long, value_name = "PATTERN")]
    pub grep: Option<String>,

    /// Encoding, terminator and size facts instead of lines
    #[arg(long)]
    pub summary: bool,

    /// Machine-readable JSON output (with --summary)
    #[arg(long, requires = "summary")]
    pub json: bool,
}

#[derive(Parser)]
pub struct BackupArgs {
    #[command(subcommand)]
    pub command: BackupSubcommand,
}

#[derive(Subcommand)]
pub enum BackupSubcommand {
    /// Snapshot a file now
    Save(BackupSaveArgs),

    /// List a file's backups, newest first
    List(BackupListArgs),

    /// Overwrite a file with one of its backups
    Restore(BackupRestoreArgs),

    /// Show what changed since a backup
    Diff(BackupDiffArgs),

    /// Delete all but the newest N backups
    Cleanup(BackupCleanupArgs),
}

#[derive(Parser, Debug)]
pub struct BackupSaveArgs {
    pub file: PathBuf,

    /// Label stored in the backup name
    #[arg(long)]
    pub tag: Option<String>,
}

#[derive(Parser, Debug)]
pub struct BackupListArgs {
    pub file: PathBuf,

    /// Machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct BackupRestoreArgs {
    pub file: PathBuf,

    /// Newest backup with exactly this tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Do not snapshot the current file before restoring
    #[arg(long)]
    pub no_backup: bool,

    /// Machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct BackupDiffArgs {
    pub file: PathBuf,

    /// Newest backup with exactly this tag
    #[arg(long)]
    pub tag: Option<String>,
}

#[derive(Parser, Debug)]
pub struct BackupCleanupArgs {
    pub file: PathBuf,

    /// Number of newest backups to keep
    #[arg(long)]
    pub keep: usize,

    /// Machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// Old side (or the file, with --backup)
    pub first: PathBuf,

    /// New side
    #[arg(required_unless_present = "backup")]
    pub second: Option<PathBuf>,

    /// Compare FIRST against its newest backup
    #[arg(long, conflicts_with = "second")]
    pub backup: bool,

    /// With --backup: newest backup with exactly this tag
    #[arg(long, requires = "backup")]
    pub tag: Option<String>,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
