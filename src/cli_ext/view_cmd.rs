//! `led view`: numbered lines or a structural summary.

use anyhow::{Result, bail};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::{AppContext, ViewArgs};
use crate::cli_ext::style;
use crate::core::line_store::LineStore;
use crate::core::view::{FileSummary, ViewSpan, grep, select, summarize};
use crate::infra::config::load_config;
use crate::infra::io::format_size;

pub fn run(
    args: ViewArgs,
    ctx: &AppContext,
) -> Result<()>
{
    if args.summary
    {
        let summary = summarize(&args.file)?;
        if args.json
        {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        else
        {
            println!("{}", summary_table(&summary));
        }
        return Ok(());
    }

    let cfg = load_config()?;
    let store = LineStore::load(&args.file)?;

    if let Some(pattern) = &args.grep
    {
        let view = grep(&store, pattern)?;
        if view.rows.is_empty()
        {
            bail!("no matches for '{pattern}'");
        }
        print!("{}", view.render(cfg.view.number_width));
        if !ctx.quiet
        {
            eprintln!("{} match(es)", view.rows.len());
        }
        return Ok(());
    }

    let view = select(&store, span_of(&args), cfg.view.max_lines)?;

    print!("{}", view.render(cfg.view.number_width));

    if view.truncated && !ctx.quiet
    {
        eprintln!(
            "{}: showing {} of {} lines; use --range, --head or --tail for the rest",
            style::warning(ctx),
            view.rows.len(),
            view.total
        );
    }
    Ok(())
}

fn span_of(args: &ViewArgs) -> ViewSpan
{
    if let Some(n) = args.line
    {
        return ViewSpan::Line(n);
    }
    if let Some([s, e]) = args.range.as_deref()
    {
        return ViewSpan::Range(*s, *e);
    }
    match (args.head, args.tail)
    {
        (Some(n), _) => ViewSpan::Head(n),
        (_, Some(n)) => ViewSpan::Tail(n),
        _ => ViewSpan::All,
    }
}

#[derive(Tabled)]
struct Fact
{
    field: &'static str,
    value: String,
}

fn summary_table(s: &FileSummary) -> String
{
    let yes_no = |b: bool| (if b { "yes" } else { "no" }).to_string();
    let rows = vec![
        Fact { field: "path", value: s.path.display().to_string() },
        Fact { field: "lines", value: s.lines.to_string() },
        Fact { field: "size", value: format_size(s.size_bytes) },
        Fact { field: "encoding", value: s.encoding.clone() },
        Fact { field: "bom", value: yes_no(s.has_bom) },
        Fact { field: "terminator", value: s.terminator.to_string() },
        Fact { field: "trailing newline", value: yes_no(s.trailing_newline) },
        Fact { field: "content", value: (if s.binary { "binary" } else { "text" }).to_string() },
    ];
    Table::new(rows)
        .with(Style::sharp())
        .to_string()
}
