//! Output surfaces for rendered blocks.

use std::io::{self, Write};

use pulldown_cmark_escape::escape_html;

/// Append-only sink for rendered HTML blocks.
///
/// Blocks are never removed or rewritten once appended.
pub trait OutputSurface {
    fn append_block(&mut self, html: String);
}

impl<S: OutputSurface + ?Sized> OutputSurface for &mut S {
    fn append_block(&mut self, html: String) {
        (**self).append_block(html);
    }
}

/// In-memory HTML document; each block becomes one `<div>` in the body.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    title: String,
    blocks: Vec<String>,
}

impl HtmlDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    /// Block contents in append order, without the wrapping `<div>`.
    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    /// Body content only: one `<div>` per block.
    pub fn to_fragment(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            out.push_str("<div>");
            out.push_str(block);
            out.push_str("</div>\n");
        }
        out
    }

    /// Standalone HTML page.
    pub fn to_page(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
            escape_text(&self.title),
            self.to_fragment()
        )
    }

    /// Writes the page (or only the fragment) to `writer`.
    ///
    /// # Errors
    /// Returns any I/O error from `writer`.
    pub fn write_to(&self, mut writer: impl Write, fragment_only: bool) -> io::Result<()> {
        let html = if fragment_only {
            self.to_fragment()
        } else {
            self.to_page()
        };
        writer.write_all(html.as_bytes())?;
        writer.flush()
    }
}

impl OutputSurface for HtmlDocument {
    fn append_block(&mut self, html: String) {
        self.blocks.push(html);
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a `String` is infallible.
    let _ = escape_html(&mut out, text);
    out
}
