//! Rendering of markdown fragments into HTML blocks.

mod document;
mod markdown;

use futures_util::future::join_all;
use tracing::warn;

pub use document::{HtmlDocument, OutputSurface};
pub use markdown::{fenced, markdown_to_html};

/// Converts markdown fragments and appends them to an [`OutputSurface`].
#[derive(Debug)]
pub struct Renderer<S> {
    surface: S,
}

impl<S: OutputSurface> Renderer<S> {
    pub fn new(surface: S) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Renders every fragment and appends the concatenation as one block.
    ///
    /// Absent fragments render as empty strings. Conversions run on the
    /// blocking pool concurrently; the results are joined in argument order,
    /// not completion order. Exactly one block is appended per call.
    pub async fn render<I, T>(&mut self, fragments: I)
    where
        I: IntoIterator<Item = Option<T>>,
        T: Into<String>,
    {
        let conversions = fragments.into_iter().map(|fragment| {
            let text: String = fragment.map(Into::into).unwrap_or_default();
            tokio::task::spawn_blocking(move || markdown_to_html(&text))
        });

        let html: String = join_all(conversions)
            .await
            .into_iter()
            .map(|converted| {
                converted.unwrap_or_else(|e| {
                    warn!(error = %e, "markdown conversion task failed; rendering empty fragment");
                    String::new()
                })
            })
            .collect();

        self.surface.append_block(html);
    }

    /// Renders a single markdown string as one block.
    pub async fn render_markdown(&mut self, markdown: impl Into<String>) {
        self.render([Some(markdown.into())]).await;
    }
}
