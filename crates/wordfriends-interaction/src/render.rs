//! Markdown rendering sink.

use crate::stream::{StreamError, StreamSink};
use pulldown_cmark::{Options, Parser, html};

pub const NO_CONTENT_NOTICE: &str = "No content was received. Please try again.";

/// What the result surface currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResultView {
    #[default]
    Loading,
    Rendered(String),
    NoContent,
    Failed(String),
}

impl ResultView {
    /// HTML for the current state.
    pub fn to_html(&self) -> String {
        match self {
            ResultView::Loading => "<p class=\"loading\">Loading…</p>".to_string(),
            ResultView::Rendered(html) => html.clone(),
            ResultView::NoContent => format!("<p class=\"notice\">{NO_CONTENT_NOTICE}</p>"),
            ResultView::Failed(message) => {
                format!("<p class=\"error\">{}</p>", escape_html(message))
            }
        }
    }
}

/// Renders Markdown (tables enabled) to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

type CompletionHook = Box<dyn FnMut(&str) + Send>;

/// Re-renders the full answer on every delta.
///
/// Completion hooks run once, after the final render, with the final answer
/// text. Post-processing such as phonetic annotation attaches here.
#[derive(Default)]
pub struct MarkdownSink {
    view: ResultView,
    answer: String,
    hooks: Vec<CompletionHook>,
    completed: bool,
}

impl MarkdownSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_complete<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn view(&self) -> &ResultView {
        &self.view
    }

    /// Raw Markdown of the latest render.
    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

impl StreamSink for MarkdownSink {
    fn on_delta(&mut self, answer: &str, _reasoning: &str, done: bool) {
        if answer != self.answer || matches!(self.view, ResultView::Loading) {
            self.answer.clear();
            self.answer.push_str(answer);
            self.view = ResultView::Rendered(markdown_to_html(answer));
        }

        if !done || self.completed {
            return;
        }
        self.completed = true;

        if answer.trim().is_empty() {
            tracing::info!("[Render] Stream ended without content");
            self.view = ResultView::NoContent;
            return;
        }
        for hook in &mut self.hooks {
            hook(answer);
        }
    }

    fn on_error(&mut self, error: &StreamError) {
        self.view = ResultView::Failed(error.to_string());
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
