//! `led diff`: two files, or a file against one of its backups.

use anyhow::{Context, Result};
use owo_colors::Style;

use crate::cli::{AppContext, DiffArgs};
use crate::cli_ext::style::paint;
use crate::core::backup_ops::{DiffRequest, diff_backup};
use crate::core::diff::{DiffOutcome, diff_bytes};
use crate::infra::config::load_config;
use crate::infra::io::read_bytes;

pub fn run(
    args: DiffArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let outcome = match args.second
    {
        Some(second) if !args.backup =>
        {
            let old = read_bytes(&args.first)?;
            let new = read_bytes(&second)?;
            diff_bytes(
                old.as_ref(),
                new.as_ref(),
                &args.first.display().to_string(),
                &second.display().to_string(),
            )
        }
        _ =>
        {
            let opts = load_config()?.edit_options();
            diff_backup(&opts, DiffRequest { path: args.first.clone(), tag: args.tag })
                .with_context(|| format!("diff {} against its backup", args.first.display()))?
                .outcome
        }
    };
    print_outcome(&outcome, ctx);
    Ok(())
}

/// Print a diff outcome, coloring `+`/`-`/`@@` lines.
pub fn print_outcome(
    outcome: &DiffOutcome,
    ctx: &AppContext,
)
{
    match outcome
    {
        DiffOutcome::Identical => println!("No differences found."),
        DiffOutcome::EncodingOnly =>
        {
            println!("No differences found in text (encoding, BOM or line endings differ).")
        }
        DiffOutcome::Changed(d) =>
        {
            for line in d.text.lines()
            {
                println!("{}", colorize(line, ctx));
            }
            if !ctx.quiet
            {
                eprintln!("{} insertion(s), {} deletion(s)", d.added, d.removed);
            }
        }
    }
}

fn colorize(
    line: &str,
    ctx: &AppContext,
) -> String
{
    let style = if line.starts_with("+++") || line.starts_with("---")
    {
        Style::new().bold()
    }
    else if line.starts_with('+')
    {
        Style::new().green()
    }
    else if line.starts_with('-')
    {
        Style::new().red()
    }
    else if line.starts_with("@@")
    {
        Style::new().cyan()
    }
    else
    {
        return line.to_string();
    };
    paint(ctx, line, style)
}
