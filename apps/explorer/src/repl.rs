use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context;
use explorer_core::{
    export::write_day_plan, GenerativeClient, QueryOutcome, Session, SessionError,
};
use map_integration::RecordingMap;
use shared::domain::AppMode;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render;

pub const HELP: &str = "\
Type a question to explore places on the map, or a command:
  :planner on|off        switch day planner mode
  :next / :prev          move through the result cards
  :select N              activate card N
  :timeline open|close   show or hide the day plan
  :goto N                jump to stop N of the day plan
  :export [DIR]          save the day plan as day-plan.txt
  :reset                 clear results
  :help                  show this help
  :quit                  leave";

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Prompt(String),
    Planner(bool),
    Next,
    Prev,
    Select(usize),
    Timeline(bool),
    Goto(usize),
    Export(Option<PathBuf>),
    Reset,
    Help,
    Quit,
    Nothing,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `:{0}`, try :help")]
    Unknown(String),
    #[error("`:{command}` expects {expected}")]
    BadArgument {
        command: &'static str,
        expected: &'static str,
    },
}

/// Card and timeline numbers are 1-based on the command line.
pub fn parse_command(line: &str) -> Result<ReplCommand, CommandError> {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        if line.is_empty() {
            return Ok(ReplCommand::Nothing);
        }
        return Ok(ReplCommand::Prompt(line.to_string()));
    };
    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    let argument = words.next();
    match name {
        "planner" => match argument {
            Some("on") => Ok(ReplCommand::Planner(true)),
            Some("off") => Ok(ReplCommand::Planner(false)),
            _ => Err(CommandError::BadArgument {
                command: "planner",
                expected: "`on` or `off`",
            }),
        },
        "next" => Ok(ReplCommand::Next),
        "prev" => Ok(ReplCommand::Prev),
        "select" => one_based(argument, "select").map(ReplCommand::Select),
        "timeline" => match argument {
            Some("open") => Ok(ReplCommand::Timeline(true)),
            Some("close") => Ok(ReplCommand::Timeline(false)),
            _ => Err(CommandError::BadArgument {
                command: "timeline",
                expected: "`open` or `close`",
            }),
        },
        "goto" => one_based(argument, "goto").map(ReplCommand::Goto),
        "export" => Ok(ReplCommand::Export(argument.map(PathBuf::from))),
        "reset" => Ok(ReplCommand::Reset),
        "help" => Ok(ReplCommand::Help),
        "quit" | "q" | "exit" => Ok(ReplCommand::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn one_based(argument: Option<&str>, command: &'static str) -> Result<usize, CommandError> {
    argument
        .and_then(|raw| raw.parse::<usize>().ok())
        .and_then(|number| number.checked_sub(1))
        .ok_or(CommandError::BadArgument {
            command,
            expected: "a number starting at 1",
        })
}

pub async fn run<C>(
    session: &mut Session<RecordingMap>,
    client: &C,
    export_dir: &Path,
) -> anyhow::Result<()>
where
    C: GenerativeClient + ?Sized,
{
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} > ", mode_label(session.mode()));
        std::io::stdout().flush().context("failed to flush stdout")?;
        let Some(line) = lines.next_line().await.context("failed to read input")? else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        if command == ReplCommand::Quit {
            break;
        }
        execute(session, client, command, export_dir).await?;
    }
    Ok(())
}

pub async fn execute<C>(
    session: &mut Session<RecordingMap>,
    client: &C,
    command: ReplCommand,
    export_dir: &Path,
) -> anyhow::Result<()>
where
    C: GenerativeClient + ?Sized,
{
    match command {
        ReplCommand::Prompt(prompt) => ask(session, client, &prompt).await,
        ReplCommand::Planner(on) => {
            let mode = if on { AppMode::Planner } else { AppMode::Explorer };
            match session.set_mode(mode) {
                Ok(()) => println!("{} mode", mode_label(mode)),
                Err(err) => println!("{err}"),
            }
        }
        ReplCommand::Next => navigate(session, 1),
        ReplCommand::Prev => navigate(session, -1),
        ReplCommand::Select(index) => {
            if session.set_active(index) {
                show_cards(session);
            } else {
                println!("there is no card {}", index + 1);
            }
        }
        ReplCommand::Timeline(true) => {
            if session.open_timeline() {
                println!("{}", render::timeline(&session.timeline()));
            } else {
                println!("no day plan yet; run a query in planner mode first");
            }
        }
        ReplCommand::Timeline(false) => {
            session.close_timeline();
            println!("{}", render::viewport(session.map()));
        }
        ReplCommand::Goto(row) => {
            if session.select_timeline_entry(row) {
                show_cards(session);
            } else {
                println!("there is no stop {} in the day plan", row + 1);
            }
        }
        ReplCommand::Export(dir) => {
            export(session, dir.as_deref().unwrap_or(export_dir)).await?;
        }
        ReplCommand::Reset => {
            session.reset();
            println!("cleared");
        }
        ReplCommand::Help => println!("{HELP}"),
        ReplCommand::Quit | ReplCommand::Nothing => {}
    }
    Ok(())
}

pub async fn ask<C>(session: &mut Session<RecordingMap>, client: &C, prompt: &str)
where
    C: GenerativeClient + ?Sized,
{
    let result = session.run_query(client, prompt).await;
    if let Some(report) = query_report(session, result) {
        print!("{report}");
    }
}

/// Text shown after a query. A failed query still lists whatever locations
/// arrived before the error.
fn query_report(
    session: &Session<RecordingMap>,
    result: Result<QueryOutcome, SessionError>,
) -> Option<String> {
    let mut out = String::new();
    match result {
        Ok(outcome) => {
            out.push_str(&render::outcome(&outcome));
            out.push('\n');
            out.push_str(&cards_report(session));
            if session.timeline_visible() {
                out.push_str(&render::timeline(&session.timeline()));
                out.push('\n');
            }
        }
        Err(SessionError::EmptyPrompt) => return None,
        Err(err) => {
            match session.surfaced_error() {
                Some(surfaced) => out.push_str(&render::error(surfaced)),
                None => out.push_str(&format!("error: {err}")),
            }
            out.push('\n');
            if !session.store().is_empty() {
                out.push_str(&cards_report(session));
            }
        }
    }
    Some(out)
}

pub async fn export(session: &Session<RecordingMap>, dir: &Path) -> anyhow::Result<()> {
    let Some(plan) = session.export_day_plan() else {
        println!("nothing to export; day plans come from planner mode queries");
        return Ok(());
    };
    let path = write_day_plan(dir, &plan)
        .await
        .with_context(|| format!("failed to export day plan to '{}'", dir.display()))?;
    println!("saved {}", path.display());
    Ok(())
}

fn navigate(session: &mut Session<RecordingMap>, direction: isize) {
    if session.navigate(direction) {
        show_cards(session);
    } else {
        println!("no more cards that way");
    }
}

fn show_cards(session: &Session<RecordingMap>) {
    print!("{}", cards_report(session));
}

fn cards_report(session: &Session<RecordingMap>) -> String {
    format!(
        "{}{}\n",
        render::cards(&session.cards()),
        render::viewport(session.map())
    )
}

fn mode_label(mode: AppMode) -> &'static str {
    match mode {
        AppMode::Explorer => "explorer",
        AppMode::Planner => "planner",
    }
}

#[cfg(test)]
#[path = "tests/repl_tests.rs"]
mod tests;
