//! Command dispatcher
//!
//! Maps the closed command vocabulary onto library and engine calls and owns
//! the armed toggles. Every command returns a [`CommandOutcome`]; how to show
//! it is up to the caller.

use crate::library::LibraryStore;
use sideline_core::{RecordStore, SidelineError, TileId, ToggleFlag, Toggles};
use sideline_playback::{PlayOutcome, PlaybackEngine};
use sideline_storage::records::TOGGLES_KEY;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

/// Transport and library commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Seek the focused voice to its start offset
    Cue,
    /// Toggle multi-play
    Multi,
    /// Toggle looping for new voices
    Loop,
    /// Toggle auto-fade
    AutoFade,
    /// Pause or resume the focused voice
    Pause,
    /// Double the focused voice's rate for a moment
    Rapid,
    /// Stop everything
    Stop,
    /// Play the tile after the last started one in the active category
    Next,
    /// Shuffle the active category
    Shuffle,
    /// Play the first tile whose title matches
    Find(String),
    /// Reactivate every tile of the active category
    ResetPage,
}

impl FromStr for Command {
    type Err = SidelineError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let command = match word.to_ascii_lowercase().as_str() {
            "cue" => Command::Cue,
            "multi" => Command::Multi,
            "loop" => Command::Loop,
            "autofade" => Command::AutoFade,
            "pause" => Command::Pause,
            "rapid" => Command::Rapid,
            "stop" => Command::Stop,
            "next" => Command::Next,
            "shuffle" => Command::Shuffle,
            "find" => Command::Find(rest.trim().to_string()),
            "resetpage" => Command::ResetPage,
            other => {
                return Err(SidelineError::invalid_input(format!(
                    "unknown command: {other}"
                )))
            }
        };
        Ok(command)
    }
}

/// Structured result of a command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// A toggle flipped
    ConfigChanged { flag: ToggleFlag, now_on: bool },
    /// A tile was sent to the engine
    Played { tile: TileId, outcome: PlayOutcome },
    /// `find` matched nothing
    NotFound { query: String },
    /// Every voice stopped
    Stopped,
    /// The focused voice paused or resumed
    PauseToggled { paused: bool },
    /// The focused voice was cued
    Cued,
    /// The focused voice is running fast
    RateBoosted,
    /// The active category was shuffled
    Shuffled,
    /// Inactive flags of the active category were cleared
    PageReset { category: String, reactivated: usize },
    /// Nothing to act on
    NoOp,
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::ConfigChanged { flag, now_on } => {
                write!(f, "{flag} {}", if *now_on { "on" } else { "off" })
            }
            CommandOutcome::Played { tile, outcome } => match outcome {
                PlayOutcome::Started(voice) => write!(f, "playing {tile} on {voice}"),
                PlayOutcome::Delegated => write!(f, "playing {tile} remotely"),
                PlayOutcome::Skipped => write!(f, "{tile} is not playable"),
            },
            CommandOutcome::NotFound { query } => write!(f, "not found: {query}"),
            CommandOutcome::Stopped => f.write_str("stopped"),
            CommandOutcome::PauseToggled { paused } => {
                f.write_str(if *paused { "paused" } else { "resumed" })
            }
            CommandOutcome::Cued => f.write_str("cued"),
            CommandOutcome::RateBoosted => f.write_str("rapid"),
            CommandOutcome::Shuffled => f.write_str("shuffled"),
            CommandOutcome::PageReset {
                category,
                reactivated,
            } => write!(f, "{category}: {reactivated} tile(s) reactivated"),
            CommandOutcome::NoOp => f.write_str("nothing to do"),
        }
    }
}

/// Owner of the armed toggles
pub struct CommandDispatcher {
    toggles: Toggles,
    records: Arc<dyn RecordStore>,
}

impl CommandDispatcher {
    /// Load persisted toggles; anything unreadable means all off
    pub async fn load(records: Arc<dyn RecordStore>) -> Self {
        let toggles = match records.read(TOGGLES_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "toggles record malformed, all off");
                Toggles::default()
            }),
            Ok(None) => Toggles::default(),
            Err(e) => {
                warn!(error = %e, "toggles record unreadable, all off");
                Toggles::default()
            }
        };
        debug!(?toggles, "toggles loaded");
        Self { toggles, records }
    }

    pub fn toggles(&self) -> &Toggles {
        &self.toggles
    }

    /// Run one command to completion
    pub async fn dispatch(
        &mut self,
        command: Command,
        library: &mut LibraryStore,
        engine: &mut PlaybackEngine,
    ) -> CommandOutcome {
        debug!(?command, "dispatch");
        let outcome = match command {
            Command::Multi => self.flip(ToggleFlag::Multi).await,
            Command::Loop => self.flip(ToggleFlag::Loop).await,
            Command::AutoFade => self.flip(ToggleFlag::AutoFade).await,

            Command::Cue => {
                if engine.cue() {
                    CommandOutcome::Cued
                } else {
                    CommandOutcome::NoOp
                }
            }
            Command::Pause => engine
                .toggle_pause()
                .map_or(CommandOutcome::NoOp, |paused| CommandOutcome::PauseToggled {
                    paused,
                }),
            Command::Rapid => {
                if engine.rapid() {
                    CommandOutcome::RateBoosted
                } else {
                    CommandOutcome::NoOp
                }
            }
            Command::Stop => {
                engine.stop_all();
                CommandOutcome::Stopped
            }

            Command::Next => self.next(library, engine),
            Command::Find(query) => self.find(&query, library, engine),

            Command::Shuffle => match library.active_category().map(str::to_string) {
                Some(category) => {
                    if library.shuffle(&category).await {
                        CommandOutcome::Shuffled
                    } else {
                        CommandOutcome::NoOp
                    }
                }
                None => CommandOutcome::NoOp,
            },
            Command::ResetPage => match library.active_category().map(str::to_string) {
                Some(category) => {
                    let reactivated = library.reset_inactive(&category).await;
                    CommandOutcome::PageReset {
                        category,
                        reactivated,
                    }
                }
                None => CommandOutcome::NoOp,
            },
        };
        debug!(%outcome, "command done");
        outcome
    }

    /// Play a tile by ID with the current toggles
    pub fn play_tile(
        &self,
        id: &TileId,
        library: &LibraryStore,
        engine: &mut PlaybackEngine,
    ) -> CommandOutcome {
        match library.library().tile(id) {
            Some(tile) => CommandOutcome::Played {
                tile: tile.id.clone(),
                outcome: engine.play(tile, &self.toggles),
            },
            None => CommandOutcome::NoOp,
        }
    }

    fn next(&self, library: &LibraryStore, engine: &mut PlaybackEngine) -> CommandOutcome {
        let tiles = library.active_tiles();
        if tiles.is_empty() {
            return CommandOutcome::NoOp;
        }

        let index = engine
            .last_started_tile()
            .and_then(|last| tiles.iter().position(|t| &t.id == last))
            .map_or(0, |i| (i + 1) % tiles.len());

        let tile = &tiles[index];
        CommandOutcome::Played {
            tile: tile.id.clone(),
            outcome: engine.play(tile, &self.toggles),
        }
    }

    fn find(
        &self,
        query: &str,
        library: &LibraryStore,
        engine: &mut PlaybackEngine,
    ) -> CommandOutcome {
        if query.trim().is_empty() {
            return CommandOutcome::NoOp;
        }
        match library.find(query) {
            Some(location) => self.play_tile(&location.tile_id, library, engine),
            None => {
                debug!(error = %SidelineError::SearchMiss(query.to_string()), "search miss");
                CommandOutcome::NotFound {
                    query: query.to_string(),
                }
            }
        }
    }

    async fn flip(&mut self, flag: ToggleFlag) -> CommandOutcome {
        let now_on = self.toggles.toggle(flag);
        match serde_json::to_string(&self.toggles) {
            Ok(raw) => {
                if let Err(e) = self.records.write(TOGGLES_KEY, &raw).await {
                    warn!(error = %e, "failed to persist toggles");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize toggles"),
        }
        CommandOutcome::ConfigChanged { flag, now_on }
    }
}

impl fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("toggles", &self.toggles)
            .finish_non_exhaustive()
    }
}
