//! Markdown to HTML conversion.
//!
//! Uses pulldown-cmark with the GitHub-flavoured extensions model output
//! tends to rely on (tables, strikethrough, task lists).

use pulldown_cmark::{Options, Parser, html};

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Converts one markdown string to an HTML fragment. Empty input yields an
/// empty fragment.
pub fn markdown_to_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let parser = Parser::new_ext(text, options());
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Wraps `body` in a fenced code block that `body` itself cannot close.
///
/// The fence is one backtick longer than the longest backtick run inside
/// `body`, and never shorter than three.
pub fn fenced(info: &str, body: &str) -> String {
    let longest_run = body
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat((longest_run + 1).max(3));
    let body = body.strip_suffix('\n').unwrap_or(body);
    format!("{fence}{info}\n{body}\n{fence}")
}
