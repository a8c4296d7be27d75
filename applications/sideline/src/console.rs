//! Interactive console
//!
//! Reads one command per line. Board commands go through the dispatcher;
//! the rest edit the library or show it.

use crate::dispatcher::Command;
use crate::error::Result;
use crate::session::Soundboard;
use sideline_core::{Letter, NewTile, SidelineError};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// One console line
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    /// A dispatcher command
    Board(Command),
    /// `letter <L>`
    Letter(Letter),
    /// `category <name>`
    Category(String),
    /// `new <name>`
    NewCategory(String),
    /// `add <path>`, the rest of the line is the path
    Add(PathBuf),
    /// `remote <title> <reference>`
    Remote { title: String, reference: String },
    /// `play <title>`
    Play(String),
    /// `rm <title>`
    Remove(String),
    /// `list`
    List,
    /// `quit`
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = SidelineError;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let required = |what: &str| -> std::result::Result<String, SidelineError> {
            if rest.is_empty() {
                Err(SidelineError::invalid_input(format!("{word} needs {what}")))
            } else {
                Ok(rest.to_string())
            }
        };

        let command = match word {
            "letter" => ConsoleCommand::Letter(rest.parse()?),
            "category" => ConsoleCommand::Category(required("a category name")?),
            "new" => ConsoleCommand::NewCategory(required("a category name")?),
            "add" => ConsoleCommand::Add(PathBuf::from(required("a file path")?)),
            "remote" => {
                let (title, reference) = rest
                    .rsplit_once(char::is_whitespace)
                    .ok_or_else(|| SidelineError::invalid_input("remote needs <title> <reference>"))?;
                ConsoleCommand::Remote {
                    title: title.trim().to_string(),
                    reference: reference.to_string(),
                }
            }
            "play" => ConsoleCommand::Play(required("a title")?),
            "rm" => ConsoleCommand::Remove(required("a title")?),
            "list" => ConsoleCommand::List,
            "quit" | "exit" => ConsoleCommand::Quit,
            _ => ConsoleCommand::Board(line.parse()?),
        };
        Ok(command)
    }
}

/// Run one console command, returning the text to show
pub async fn execute(board: &Soundboard, command: ConsoleCommand) -> Result<String> {
    let reply = match command {
        ConsoleCommand::Board(command) => board.dispatch(command).await.to_string(),
        ConsoleCommand::Letter(letter) => {
            board.select_letter(letter).await;
            format!("letter {letter}")
        }
        ConsoleCommand::Category(name) => {
            board.select_category(&name).await?;
            format!("category {name}")
        }
        ConsoleCommand::NewCategory(name) => {
            board.add_category(&name).await?;
            format!("category {name} ready")
        }
        ConsoleCommand::Add(path) => {
            let bytes = tokio::fs::read(&path).await?;
            let file_name = path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
            let id = board
                .add_tile(NewTile::LocalFile { file_name, bytes })
                .await?;
            format!("added {} as {id}", path.display())
        }
        ConsoleCommand::Remote { title, reference } => {
            let id = board
                .add_tile(NewTile::Remote {
                    title: title.clone(),
                    reference,
                })
                .await?;
            format!("added {title} as {id}")
        }
        ConsoleCommand::Play(query) => match board.find(&query).await {
            Some(location) => board.play(&location.tile_id).await.to_string(),
            None => format!("not found: {query}"),
        },
        ConsoleCommand::Remove(query) => match board.find(&query).await {
            Some(location) => {
                board.remove_tile(&location.tile_id).await;
                format!("removed {}", location.tile_id)
            }
            None => format!("not found: {query}"),
        },
        ConsoleCommand::List => render_listing(board).await,
        ConsoleCommand::Quit => String::new(),
    };
    Ok(reply)
}

async fn render_listing(board: &Soundboard) -> String {
    let guard = board.session().lock().await;
    let library = &guard.library;
    let toggles = guard.dispatcher.toggles();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "letter {} | multi={} loop={} autoFade={}",
        library.active_letter(),
        toggles.multi,
        toggles.loop_playback,
        toggles.auto_fade
    );
    let bucket = library.library().bucket(library.active_letter());
    for (name, tiles) in &bucket.categories {
        let marker = if library.active_category() == Some(name.as_str()) {
            "*"
        } else {
            " "
        };
        let _ = writeln!(out, "{marker} {name} ({})", tiles.len());
        if marker == "*" {
            for (i, tile) in tiles.iter().enumerate() {
                let state = if tile.inactive { " [inactive]" } else { "" };
                let _ = writeln!(out, "    {i:>2}. {}{state}", tile.title);
            }
        }
    }

    let progress = guard.engine.progress();
    let _ = write!(
        out,
        "{} / -{}",
        progress.elapsed_label(),
        progress.remaining_label()
    );
    out
}

/// Read commands until `quit` or end of input
pub async fn run<R, W>(board: &Soundboard, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let reply = match line.parse::<ConsoleCommand>() {
            Ok(ConsoleCommand::Quit) => break,
            Ok(command) => {
                debug!(?command, "console command");
                match execute(board, command).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        warn!(error = %e, "console command failed");
                        format!("error: {e}")
                    }
                }
            }
            Err(e) => format!("error: {e}"),
        };

        output.write_all(reply.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(())
}
