use super::AppContext;
use super::lookup::cancel_on_signal;
use anyhow::Result;
use std::sync::Arc;
use wordfriends_application::QuoteService;

pub async fn run(ctx: &AppContext, json: bool, timeout: Option<u64>) -> Result<()> {
    let service = QuoteService::new(Arc::new(ctx.profile_store()));

    let watcher = tokio::spawn(cancel_on_signal(service.client().clone(), timeout));
    let quote = service.daily().await;
    watcher.abort();

    if json {
        println!("{}", serde_json::to_string_pretty(&quote)?);
    } else {
        println!("{}", quote.english);
        println!("{}", quote.chinese);
        println!("{}", quote.source);
    }
    Ok(())
}
