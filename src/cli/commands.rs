use std::sync::Arc;

use crate::aggregator::providers::{StaticTextProvider, StaticUrlProvider};
use crate::aggregator::{PayloadProvider, ShareInput};
use crate::app::{AppContext, Result};
use crate::bridge::Trigger;
use crate::domain::SharedItem;
use crate::thumbnail::{cancel_pair, CancelHandle, ResolveState};

pub struct SaveArgs<'a> {
    pub text: &'a [String],
    pub url: Option<&'a str>,
    pub caption: Option<&'a str>,
    pub title: Option<&'a str>,
    pub thumbnail: bool,
}

/// Run the extension-side pipeline: aggregate, optionally resolve a
/// thumbnail, then confirm the save.
pub async fn save(ctx: &AppContext, args: SaveArgs<'_>) -> Result<()> {
    let mut providers: Vec<Arc<dyn PayloadProvider>> = Vec::new();
    if let Some(url) = args.url {
        providers.push(Arc::new(StaticUrlProvider::new(url)));
    }
    if !args.text.is_empty() {
        providers.push(Arc::new(StaticTextProvider::new(args.text.join(" "))));
    }

    let input = ShareInput::new(args.caption.map(String::from), providers);
    let mut result = ctx.aggregator.aggregate(vec![input]).await;

    // The thumbnail is display-only; the CLI waits for it before
    // confirming, then cancels the handle exactly as the share sheet
    // would on confirm.
    let mut thumbnail: Option<CancelHandle> = None;
    if args.thumbnail {
        if let Some(url) = result.url.clone() {
            let (handle, signal) = cancel_pair();
            let outcome = ctx.resolver.resolve(&url, signal).await;

            match outcome.state {
                ResolveState::HaveImage => {
                    let size = outcome.image.as_ref().map(Vec::len).unwrap_or(0);
                    println!("Thumbnail: {} bytes", size);
                }
                state => println!("Thumbnail: none ({:?})", state),
            }

            if result.title.is_none() {
                result.title = outcome.page_title;
            }
            thumbnail = Some(handle);
        }
    }

    let outcome = ctx.flow.confirm(&result, args.title, thumbnail);

    match outcome.saved {
        Some(item) => {
            println!("Saved: {}", item.path);
            if !item.message.is_empty() {
                println!("Title: {}", item.message);
            }
            if outcome.redirect {
                println!("Redirect to host app requested");
            }
        }
        None => println!("Nothing to save: no URL in the shared content"),
    }

    Ok(())
}

pub fn list(ctx: &AppContext) -> Result<()> {
    let items = ctx.bridge.get_initial_media();

    if items.is_empty() {
        println!("Queue is empty");
        return Ok(());
    }

    print_snapshot(&items);
    Ok(())
}

pub fn clear(ctx: &AppContext) -> Result<()> {
    ctx.bridge.reset();
    println!("Queue cleared");
    Ok(())
}

pub fn redirect(ctx: &AppContext, enabled: bool) -> Result<()> {
    ctx.bridge.set_redirect_after_share(enabled);
    println!("Redirect after share: {}", enabled);
    Ok(())
}

/// Host-side push surface: subscribe and print every delivered snapshot.
/// SIGHUP maps to the foreground trigger, SIGUSR1 to URL-scheme
/// activation.
pub async fn watch(ctx: &AppContext) -> Result<()> {
    let mut rx = ctx.bridge.subscribe();
    println!("Watching shared queue (SIGHUP = foreground, SIGUSR1 = URL activation, Ctrl-C quits)");

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sighup = signal(SignalKind::hangup())?;
        let mut sigusr1 = signal(SignalKind::user_defined1())?;

        loop {
            tokio::select! {
                snapshot = rx.recv() => match snapshot {
                    Some(items) => print_snapshot(&items),
                    None => break,
                },
                _ = sighup.recv() => ctx.bridge.notify(Trigger::Foreground),
                _ = sigusr1.recv() => ctx.bridge.notify(Trigger::UrlActivation),
                _ = tokio::signal::ctrl_c() => break,
            }
        }
    }

    #[cfg(not(unix))]
    {
        loop {
            tokio::select! {
                snapshot = rx.recv() => match snapshot {
                    Some(items) => print_snapshot(&items),
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => break,
            }
        }
    }

    ctx.bridge.unsubscribe();
    Ok(())
}

fn print_snapshot(items: &[SharedItem]) {
    println!("{} item(s):", items.len());
    for item in items {
        if item.message.is_empty() {
            println!("  {}", item.path);
        } else {
            println!("  {} ({})", item.message, item.path);
        }
    }
}
