//! `led backup`: manage one file's backups.

use anyhow::Result;
use owo_colors::Style;
use tabled::settings::Style as TableStyle;
use tabled::{Table, Tabled};

use crate::cli::{
    AppContext, BackupArgs, BackupCleanupArgs, BackupDiffArgs, BackupListArgs, BackupRestoreArgs,
    BackupSaveArgs, BackupSubcommand,
};
use crate::cli_ext::diff_cmd::print_outcome;
use crate::cli_ext::style::{self, paint};
use crate::core::backup_ops::{
    BackupInfo, CleanupRequest, DiffRequest, RestoreRequest, SaveRequest, cleanup_backups,
    diff_backup, list_backups, restore_backup, save_backup,
};
use crate::core::options::EditOptions;
use crate::infra::config::load_config;
use crate::infra::io::format_size;

pub fn run(
    args: BackupArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let opts = load_config()?.edit_options();

    match args.command
    {
        BackupSubcommand::Save(a) => backup_save(&opts, a, ctx),
        BackupSubcommand::List(a) => backup_list(&opts, a, ctx),
        BackupSubcommand::Restore(a) => backup_restore(&opts, a, ctx),
        BackupSubcommand::Diff(a) => backup_diff(&opts, a, ctx),
        BackupSubcommand::Cleanup(a) => backup_cleanup(&opts, a, ctx),
    }
}

fn backup_save(
    opts: &EditOptions,
    a: BackupSaveArgs,
    ctx: &AppContext,
) -> Result<()>
{
    if ctx.dry_run
    {
        println!("Would back up {}", a.file.display());
        return Ok(());
    }
    let info = save_backup(opts, SaveRequest { path: a.file, tag: a.tag })?;
    if !ctx.quiet
    {
        println!("{}: saved {}", style::ok(ctx), info.path.display());
    }
    Ok(())
}

#[derive(Tabled)]
struct BackupRow
{
    #[tabled(rename = "#")]
    index: usize,
    timestamp: String,
    tag: String,
    size: String,
    name: String,
}

fn backup_list(
    opts: &EditOptions,
    a: BackupListArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let backups = list_backups(opts, &a.file)?;

    if a.json
    {
        println!("{}", serde_json::to_string_pretty(&backups)?);
        return Ok(());
    }

    if backups.is_empty()
    {
        if !ctx.quiet
        {
            println!("No backups found for {}.", a.file.display());
        }
        return Ok(());
    }

    println!("{}", backup_table(&backups));
    Ok(())
}

fn backup_table(backups: &[BackupInfo]) -> String
{
    let rows: Vec<BackupRow> = backups
        .iter()
        .enumerate()
        .map(|(i, b)| BackupRow {
            index: i + 1,
            timestamp: b.timestamp.clone(),
            tag: b.tag.clone().unwrap_or_default(),
            size: format_size(b.size_bytes),
            name: b.name.clone(),
        })
        .collect();
    Table::new(rows)
        .with(TableStyle::sharp())
        .to_string()
}

fn backup_restore(
    opts: &EditOptions,
    a: BackupRestoreArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let result = restore_backup(
        opts,
        RestoreRequest {
            path: a.file.clone(),
            tag: a.tag,
            dry_run: ctx.dry_run,
            backup_current: !a.no_backup,
        },
    )?;

    if a.json
    {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.dry_run
    {
        println!("Would restore {} from {}", a.file.display(), result.restored_from.name);
        return Ok(());
    }
    if !ctx.quiet
    {
        println!(
            "{}: restored {} from {}",
            style::ok(ctx),
            a.file.display(),
            paint(ctx, &result.restored_from.name, Style::new().cyan())
        );
        if let Some(pre) = &result.pre_restore
        {
            println!("  previous contents saved as {}", pre.name);
        }
    }
    Ok(())
}

fn backup_diff(
    opts: &EditOptions,
    a: BackupDiffArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let result = diff_backup(opts, DiffRequest { path: a.file, tag: a.tag })?;
    print_outcome(&result.outcome, ctx);
    Ok(())
}

fn backup_cleanup(
    opts: &EditOptions,
    a: BackupCleanupArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let result = cleanup_backups(
        opts,
        CleanupRequest { path: a.file.clone(), keep: a.keep, dry_run: ctx.dry_run },
    )?;

    if a.json
    {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if ctx.quiet
    {
        return Ok(());
    }
    let verb = if ctx.dry_run { "Would remove" } else { "Removed" };
    println!(
        "{verb} {} backup(s) of {}, {} freed",
        result.removed.len(),
        a.file.display(),
        format_size(result.bytes_freed)
    );
    for b in &result.removed
    {
        println!("  - {}", b.name);
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn table_numbers_rows_newest_first()
    {
        let info = |name: &str, tag: Option<&str>| BackupInfo {
            name: name.into(),
            tag: tag.map(str::to_owned),
            timestamp: "2025-01-01 00:00:00".into(),
            size_bytes: 2048,
            path: PathBuf::from(name),
        };
        let table = backup_table(&[
            info("a.txt.20250101_000000_000002", Some("fix")),
            info("a.txt.20250101_000000_000001", None),
        ]);
        assert!(table.contains("2.0KB"));
        assert!(table.contains("fix"));
        let first = table.find("000002").unwrap();
        let second = table.find("000001").unwrap();
        assert!(first < second);
    }
}
