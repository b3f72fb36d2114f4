use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};
use crate::core::options::EditOptions;

/// Project config file names, checked in order in each directory.
pub const CONFIG_FILES: [&str; 5] = [
    "lineedit.toml",
    "lineedit.yaml",
    "lineedit.yml",
    "lineedit.json",
    ".lineedit.toml",
];

const GLOBAL_CONFIG: &str = "~/.lineedit.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Pre-edit snapshots
    pub backup: BackupConfig,

    /// Edit safety settings
    pub edit: EditConfig,

    /// `led view` output
    pub view: ViewConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig
{
    pub enabled: bool,
    /// Directory created next to each edited file
    pub dir: String,
    /// Backups kept per file (0 keeps all)
    pub max_backups: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig
{
    /// Deletes wider than this need --force
    pub confirm_large_delete: usize,
    pub create_if_missing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig
{
    /// Cap for whole-file views (0 = no cap)
    pub max_lines: usize,
    pub number_width: usize,
}

impl Default for BackupConfig
{
    fn default() -> Self
    {
        let opts = EditOptions::default();
        Self { enabled: opts.auto_backup, dir: opts.backup_dir, max_backups: opts.max_backups }
    }
}

impl Default for EditConfig
{
    fn default() -> Self
    {
        let opts = EditOptions::default();
        Self {
            confirm_large_delete: opts.large_delete_threshold,
            create_if_missing: opts.create_if_missing,
        }
    }
}

impl Default for ViewConfig
{
    fn default() -> Self
    {
        Self { max_lines: 500, number_width: 5 }
    }
}

impl Config
{
    /// Options value handed to the editing core.
    pub fn edit_options(&self) -> EditOptions
    {
        EditOptions {
            backup_dir: self.backup.dir.clone(),
            max_backups: self.backup.max_backups,
            large_delete_threshold: self.edit.confirm_large_delete,
            create_if_missing: self.edit.create_if_missing,
            auto_backup: self.backup.enabled,
        }
    }
}

/// Load configuration for the current directory.
pub fn load_config() -> Result<Config>
{
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let global = PathBuf::from(shellexpand::tilde(GLOBAL_CONFIG).into_owned());
    load_config_from(&cwd, Some(&global))
}

/// Layer defaults, the global file, the nearest project file and
/// `LINEEDIT_<SECTION>__<KEY>` environment variables.
pub fn load_config_from(
    start: &Path,
    global: Option<&Path>,
) -> Result<Config>
{
    let mut builder = config::Config::builder();

    if let Some(global) = global.filter(|p| p.is_file())
    {
        builder = builder.add_source(config::File::from(global));
    }

    if let Some(project) = find_project_config(start)
    {
        tracing::debug!(path = %project.display(), "using project config");
        builder = builder.add_source(config::File::from(project.as_path()));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("LINEEDIT")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

/// Nearest project config walking up from `start`.
pub fn find_project_config(start: &Path) -> Option<PathBuf>
{
    start
        .ancestors()
        .flat_map(|dir| CONFIG_FILES.iter().map(move |name| dir.join(name)))
        .find(|p| p.is_file())
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join("lineedit.toml");

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    if ctx.dry_run
    {
        println!("Would create {}:\n{}", config_path.display(), toml_string);
        return Ok(());
    }

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
