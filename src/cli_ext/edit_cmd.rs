//! `led edit`: one line-addressed edit per invocation.

use std::io::Read;

use anyhow::{Context, Result};
use tracing::instrument;

use crate::cli::{AppContext, ContentArgs, EditAction, EditArgs};
use crate::cli_ext::style;
use crate::core::apply::{ApplyRequest, apply};
use crate::core::edit::{EditOperation, LineRange};
use crate::core::error::LineEditError;
use crate::infra::config::load_config;

#[instrument(skip_all, fields(file = %args.file.display()))]
pub fn run(
    args: EditArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let opts = load_config()?.edit_options();
    let (op, expand_escapes) = build_operation(args.action, &mut std::io::stdin())?;

    let req = ApplyRequest {
        path: &args.file,
        op,
        force: args.force,
        backup: !args.no_backup,
        dry_run: ctx.dry_run,
        expand_escapes,
    };
    let report = apply(&req, &opts)?;

    if !ctx.quiet
    {
        println!("{}: {}", style::ok(ctx), report.summary());
    }
    Ok(())
}

/// Turn parsed arguments into an operation; the flag says whether literal
/// `\n` sequences in the content should split lines.
pub fn build_operation(
    action: EditAction,
    stdin: &mut dyn Read,
) -> Result<(EditOperation, bool)>
{
    let built = match action
    {
        EditAction::Replace { start, end, content } =>
        {
            let (text, expand) = read_content(content, "replace", stdin)?;
            let range = LineRange::new(start, end.unwrap_or(start));
            (EditOperation::Replace { range, new_lines: vec![text] }, expand)
        }
        EditAction::Insert { line, content } =>
        {
            let (text, expand) = read_content(content, "insert", stdin)?;
            (EditOperation::Insert { before: line, new_lines: vec![text] }, expand)
        }
        EditAction::Append { line, content } =>
        {
            let (text, expand) = read_content(content, "append", stdin)?;
            (EditOperation::Append { after: line, new_lines: vec![text] }, expand)
        }
        EditAction::Delete { start, end } =>
        {
            let range = LineRange::new(start, end.unwrap_or(start));
            (EditOperation::Delete { range }, false)
        }
    };
    Ok(built)
}

fn read_content(
    content: ContentArgs,
    op: &'static str,
    stdin: &mut dyn Read,
) -> Result<(String, bool)>
{
    match (content.text, content.stdin)
    {
        (Some(text), _) => Ok((text, true)),
        (None, true) =>
        {
            let mut buf = String::new();
            stdin
                .read_to_string(&mut buf)
                .context("Failed to read content from stdin")?;
            Ok((buf, false))
        }
        (None, false) => Err(LineEditError::MissingContent { op }.into()),
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn content(text: Option<&str>, stdin: bool) -> ContentArgs
    {
        ContentArgs { text: text.map(str::to_owned), stdin }
    }

    #[test]
    fn inline_content_expands_escapes()
    {
        let action = EditAction::Replace { start: 2, end: None, content: content(Some("a\\nb"), false) };
        let (op, expand) = build_operation(action, &mut std::io::empty()).unwrap();
        assert!(expand);
        assert_eq!(
            op,
            EditOperation::Replace { range: LineRange::single(2), new_lines: vec!["a\\nb".into()] }
        );
    }

    #[test]
    fn stdin_content_is_taken_verbatim()
    {
        let action = EditAction::Insert { line: 1, content: content(None, true) };
        let mut input: &[u8] = b"let s = \"\\n\";\n";
        let (op, expand) = build_operation(action, &mut input).unwrap();
        assert!(!expand);
        assert_eq!(
            op,
            EditOperation::Insert { before: 1, new_lines: vec!["let s = \"\\n\";\n".into()] }
        );
    }

    #[test]
    fn missing_content_is_reported()
    {
        let action = EditAction::Append { line: 3, content: content(None, false) };
        let err = build_operation(action, &mut std::io::empty()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LineEditError>(),
            Some(LineEditError::MissingContent { op: "append" })
        ));
    }
}
