use super::AppContext;
use anyhow::Result;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use wordfriends_application::LookupService;
use wordfriends_interaction::stream::{StreamError, StreamSink, StreamingClient};
use wordfriends_interaction::{MarkdownSink, ResultView};

/// Prints the newly appended part of the answer as it streams in.
struct TerminalSink {
    printed: usize,
    markdown: MarkdownSink,
}

impl TerminalSink {
    fn new() -> Self {
        Self {
            printed: 0,
            markdown: MarkdownSink::new(),
        }
    }
}

impl StreamSink for TerminalSink {
    fn on_delta(&mut self, answer: &str, reasoning: &str, done: bool) {
        self.markdown.on_delta(answer, reasoning, done);

        let mut stdout = io::stdout().lock();
        if let Some(suffix) = answer.get(self.printed..) {
            let _ = stdout.write_all(suffix.as_bytes());
            self.printed = answer.len();
        }
        if done {
            let _ = writeln!(stdout);
        }
        let _ = stdout.flush();
    }

    fn on_error(&mut self, error: &StreamError) {
        self.markdown.on_error(error);
    }
}

pub async fn run(ctx: &AppContext, word: &str, html: bool, timeout: Option<u64>) -> Result<()> {
    let service = LookupService::new(
        Arc::new(ctx.profile_store()),
        Arc::new(ctx.settings_repository()),
        ctx.prompt_library(),
    );

    let watcher = tokio::spawn(cancel_on_signal(service.client().clone(), timeout));

    let mut sink = TerminalSink::new();
    let result = service.lookup(word, &mut sink).await;
    watcher.abort();
    let outcome = result?;

    if outcome.is_cancelled() {
        if sink.printed > 0 {
            println!();
        }
        eprintln!("Lookup cancelled.");
        return Ok(());
    }

    match sink.markdown.view() {
        ResultView::NoContent => eprintln!("{}", wordfriends_interaction::render::NO_CONTENT_NOTICE),
        view if html => println!("{}", view.to_html()),
        _ => {}
    }
    Ok(())
}

/// Cancels the in-flight request on Ctrl-C or after `timeout` seconds.
pub(super) async fn cancel_on_signal(client: StreamingClient, timeout: Option<u64>) {
    let deadline = async {
        match timeout {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::warn!("[Stream] Failed to listen for Ctrl-C: {}", e);
                return;
            }
            tracing::info!("[Stream] Ctrl-C received, cancelling");
        }
        _ = deadline => {
            tracing::warn!("[Stream] Timed out, cancelling");
        }
    }
    client.cancel();
}
