use anyhow::Result;
use clap::Parser;
use lineedit::cli::{Cli, Commands};
use lineedit::cli_ext::{backup_cmd, diff_cmd, edit_cmd, view_cmd};
use lineedit::core::error::{LineEditError, exit_code_for};
use miette::{GraphicalReportHandler, GraphicalTheme};

fn main() {
    let cli = Cli::parse();
    lineedit::infra::logging::init(cli.verbose, cli.no_color);

    // Build a context once, pass everywhere
    let ctx = cli.context();

    let result = match cli.command {
        Commands::Edit(args) => edit_cmd::run(args, &ctx),
        Commands::View(args) => view_cmd::run(args, &ctx),
        Commands::Backup(args) => backup_cmd::run(args, &ctx),
        Commands::Diff(args) => diff_cmd::run(args, &ctx),
        Commands::Init(args) => lineedit::infra::config::init(args, &ctx),
        Commands::Completions(args) => lineedit::completion::run(args, &ctx),
    };
    finish_with_exit(result, ctx.no_color)
}

fn finish_with_exit(result: Result<()>, no_color: bool) -> ! {
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            report(&e, no_color);
            std::process::exit(exit_code_for(&e));
        }
    }
}

/// Core errors get a miette report (code + help); anything else prints its chain.
fn report(e: &anyhow::Error, no_color: bool) {
    if let Some(diag) = e.chain().find_map(|c| c.downcast_ref::<LineEditError>()) {
        let handler = if no_color {
            GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
        } else {
            GraphicalReportHandler::new()
        };
        let mut out = String::new();
        if handler.render_report(&mut out, diag).is_ok() {
            // Context added above the core error.
            let top = e.to_string();
            if top != diag.to_string() {
                eprintln!("Error: {top}");
            }
            eprint!("{out}");
            return;
        }
    }
    eprintln!("Error: {e:#}");
}
