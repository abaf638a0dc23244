mod builtin;
mod cli;
mod client;
mod console;
mod controller;
mod error;
mod event;
mod post;
mod progress;
mod render;
mod store;

use std::ops::ControlFlow;
use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;

pub use builtin::DEFAULT_PLACEHOLDER_IMAGE;
pub use cli::{Args as CliArgs, Mode, ProgressMode};
pub use client::FeedClient;
pub use console::{Command, parse_command};
pub use controller::{
    Controller, DEFAULT_REFRESH_INTERVAL, LOAD_ERROR_MESSAGE, LikeOutcome, MISSING_FIELDS_MESSAGE,
    RefreshOutcome, SubmitOutcome,
};
pub use error::FeedError;
pub use event::{FormField, UiEvent};
pub use post::{Comment, LikeResponse, NewPost, Post, PostId};
pub use render::{EMPTY_FEED_MESSAGE, FeedView, LIKED_GLYPH, LOADING_MESSAGE, NOT_LIKED_GLYPH};
pub use store::PostStore;

pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    use std::io::IsTerminal as _;

    let progress_enabled = match args.progress {
        ProgressMode::Always => true,
        ProgressMode::Never => false,
        ProgressMode::Auto => std::io::stderr().is_terminal(),
    };
    let progress = progress::Progress::new(progress_enabled);

    let client = FeedClient::new(args.base_url.clone(), &args.user_agent)?;
    tracing::info!(base_url = %client.base_url(), mode = ?args.mode, "starting feed client");
    let view = FeedView::new(&args.placeholder_image)?;
    let controller = Controller::new(client, view);
    let period = Duration::from_secs(args.refresh_interval.max(1));
    let out = args.out.as_deref();

    progress.loading();
    let outcome = controller.refresh().await;
    progress.record(outcome);
    write_snapshot(&controller, out)?;

    let res = match args.mode {
        Mode::Once => {
            println!("{}", controller.view().summary());
            Ok(())
        }
        Mode::Watch => {
            println!("{}", controller.view().summary());
            controller
                .run_auto_refresh(period, |outcome| {
                    progress.record(outcome);
                    if let RefreshOutcome::Loaded(_) = outcome {
                        println!("{}", controller.view().summary());
                    }
                    match write_snapshot(&controller, out) {
                        Ok(()) => ControlFlow::Continue(()),
                        Err(err) => ControlFlow::Break(Err(err)),
                    }
                })
                .await
        }
        Mode::Interactive => console::run(&controller, period, out, &progress).await,
    };
    progress.finish();
    res
}

/// Writes the current page HTML to `out`, if set.
pub fn write_snapshot(controller: &Controller, out: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = out else {
        return Ok(());
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let html = controller.view().html()?;
    std::fs::write(path, html).with_context(|| format!("write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote page snapshot");
    Ok(())
}
