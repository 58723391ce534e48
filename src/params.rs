//! Positional parameter substitution.
//!
//! Fragments and templates reference their arguments as `@0`, `@1`, ...
//! Before execution every marker is rewritten to the backend's native
//! placeholder and the argument list is expanded in occurrence order, so a
//! marker used twice binds its value twice. `@@N` stands for the literal text
//! `@N`; any other `@@` (PostgreSQL's text-search match) is kept as written.
//! Markers inside quoted literals or quoted identifiers are left alone.

use crate::dialect::DbBackend;
use crate::error::{Result, TideError};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use sea_query::Value;

static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"'(?:[^']|'')*'|"(?:[^"]|"")*"|@@(\d+)|@(\d+)"#).expect("marker pattern is valid")
});

/// Walk `text`, replacing each `@N` marker with whatever `on_marker` returns and
/// each escaped `@@N` with `escape_prefix` followed by `N`. Quoted sections are
/// copied through.
fn rewrite<F>(text: &str, escape_prefix: &str, mut on_marker: F) -> Result<String>
where
    F: FnMut(usize) -> Result<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in MARKER.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&text[last..whole.start()]);
        out.push_str(&replacement(&caps, escape_prefix, &mut on_marker)?);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

fn replacement<F>(caps: &Captures<'_>, escape_prefix: &str, on_marker: &mut F) -> Result<String>
where
    F: FnMut(usize) -> Result<String>,
{
    if let Some(index) = caps.get(2) {
        let index = index.as_str().parse::<usize>().map_err(|e| {
            TideError::Mapping(format!("Invalid parameter marker @{}: {e}", index.as_str()))
        })?;
        return on_marker(index);
    }
    match caps.get(1) {
        Some(escaped) => Ok(format!("{escape_prefix}{}", escaped.as_str())),
        None => Ok(caps.get(0).map_or("", |m| m.as_str()).to_string()),
    }
}

/// Shift every `@N` marker in `text` by `offset`. Used when templates are
/// concatenated so the combined argument list stays positional.
pub(crate) fn renumber(text: &str, offset: usize) -> String {
    if offset == 0 {
        return text.to_string();
    }
    rewrite(text, "@@", |n| Ok(format!("@{}", n + offset))).unwrap_or_else(|_| text.to_string())
}

/// Rewrite `@N` markers to native placeholders starting at `first_placeholder`,
/// returning the new text and the arguments in binding order.
///
/// # Errors
///
/// Returns `TideError::Mapping` if a marker references an argument that was
/// not supplied.
pub(crate) fn bind(
    text: &str,
    args: &[Value],
    backend: DbBackend,
    first_placeholder: usize,
) -> Result<(String, Vec<Value>)> {
    let mut bound: Vec<Value> = Vec::new();
    let sql = rewrite(text, "@", |n| {
        let value = args.get(n).ok_or_else(|| {
            TideError::Mapping(format!(
                "Parameter @{n} referenced but only {} argument(s) supplied",
                args.len()
            ))
        })?;
        bound.push(value.clone());
        Ok(backend.placeholder(first_placeholder + bound.len() - 1))
    })?;
    Ok((sql, bound))
}
