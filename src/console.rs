use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context as _, anyhow, bail};
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tokio::time::MissedTickBehavior;

use crate::controller::{Controller, RefreshOutcome};
use crate::event::{FormField, UiEvent};
use crate::post::PostId;
use crate::progress::Progress;

pub const HELP: &str = "\
commands:
  refresh                          reload the feed
  like <id>                        toggle like on a post
  share <id>                       share a post
  new                              open the new-post form
  set <username|image|description> <value>
  submit                           publish the form
  cancel                           close the form
  broken <id>                      report a post image that failed to load
  show                             print the feed
  help                             this text
  quit";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Event(UiEvent),
    Show,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> anyhow::Result<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "refresh" | "r" => Command::Event(UiEvent::Refresh),
        "like" | "l" => Command::Event(UiEvent::Like(parse_id(rest)?)),
        "share" => Command::Event(UiEvent::Share(parse_id(rest)?)),
        "broken" => Command::Event(UiEvent::ImageFailed(parse_id(rest)?)),
        "new" => Command::Event(UiEvent::OpenForm),
        "cancel" => Command::Event(UiEvent::CancelForm),
        "submit" => Command::Event(UiEvent::SubmitForm),
        "set" => {
            let (name, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let field = FormField::parse(name)
                .ok_or_else(|| anyhow!("unknown field `{name}`; expected username, image or description"))?;
            Command::Event(UiEvent::SetField(field, value.trim().to_string()))
        }
        "show" | "ls" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        "" => bail!("empty command"),
        other => bail!("unknown command `{other}`; try `help`"),
    };
    Ok(command)
}

fn parse_id(raw: &str) -> anyhow::Result<PostId> {
    raw.parse::<PostId>()
        .with_context(|| format!("expected a post id, got `{raw}`"))
}

/// Reads commands from stdin until EOF or `quit`, reloading the feed on
/// `period` in between.
pub async fn run(
    controller: &Controller,
    period: Duration,
    out: Option<&Path>,
    progress: &Progress,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await;

    println!("{}", controller.view().summary());
    println!("type `help` for commands");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("read stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{HELP}"),
                    Ok(Command::Show) => println!("{}", controller.view().summary()),
                    Ok(Command::Event(UiEvent::Refresh)) => {
                        reload(controller, progress, out, Reload::Manual, &mut std::io::stdout()).await?;
                    }
                    Ok(Command::Event(event)) => {
                        controller.dispatch(event).await;
                        print_update(controller, &mut std::io::stdout())?;
                        crate::write_snapshot(controller, out)?;
                    }
                    Err(err) => eprintln!("{err:#}"),
                }
            }
            _ = ticker.tick() => {
                reload(controller, progress, out, Reload::Auto, &mut std::io::stdout()).await?;
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Reload {
    Manual,
    Auto,
}

/// One reload cycle: spinner, fetch, then the printed feed and snapshot.
/// A reload skipped because another is in flight prints nothing.
async fn reload<W: Write>(
    controller: &Controller,
    progress: &Progress,
    out: Option<&Path>,
    kind: Reload,
    w: &mut W,
) -> anyhow::Result<RefreshOutcome> {
    progress.loading();
    let outcome = match kind {
        Reload::Manual => controller.refresh().await,
        Reload::Auto => controller.auto_refresh().await,
    };
    progress.record(outcome);
    if outcome != RefreshOutcome::Skipped {
        print_update(controller, w)?;
        crate::write_snapshot(controller, out)?;
    }
    Ok(outcome)
}

fn print_update<W: Write>(controller: &Controller, w: &mut W) -> anyhow::Result<()> {
    for alert in controller.take_alerts() {
        writeln!(w, "! {alert}")?;
    }
    writeln!(w, "{}", controller.view().summary())?;
    w.flush()?;
    Ok(())
}
