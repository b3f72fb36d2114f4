//! Color helpers honoring `--no-color`.

use owo_colors::{OwoColorize, Style};

use crate::cli::AppContext;

pub fn paint(
    ctx: &AppContext,
    text: &str,
    style: Style,
) -> String
{
    if ctx.no_color
    {
        text.to_string()
    }
    else
    {
        text.style(style)
            .to_string()
    }
}

pub fn ok(ctx: &AppContext) -> String
{
    paint(ctx, "OK", Style::new().green().bold())
}

pub fn warning(ctx: &AppContext) -> String
{
    paint(ctx, "warning", Style::new().yellow().bold())
}
