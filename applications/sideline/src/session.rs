//! Soundboard session
//!
//! One `Session` holds the library, the engine and the dispatcher. It sits
//! behind a single async mutex, so each command runs to completion before
//! the next one starts. Hydration and the clock task take the same lock in
//! short sections.

use crate::config::SidelineConfig;
use crate::dispatcher::{Command, CommandDispatcher, CommandOutcome};
use crate::error::Result as AppResult;
use crate::hydration::{HydrationReport, HydrationService};
use crate::library::LibraryStore;
use sideline_core::{
    BlobId, BlobStore, Letter, LibraryRecord, NewTile, RecordStore, RemoteProvider, Result, Tile,
    TileId, TileLocation,
};
use sideline_playback::{
    ClipDecoder, EngineEvent, EngineSettings, PlaybackEngine, ProgressReport,
    SymphoniaClipDecoder,
};
use sideline_storage::{SqliteBlobStore, SqliteRecordStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Everything a command may touch
#[derive(Debug)]
pub struct Session {
    pub library: LibraryStore,
    pub engine: PlaybackEngine,
    pub dispatcher: CommandDispatcher,
}

/// Library record plus every stored blob, for archive interchange
#[derive(Debug, Clone)]
pub struct Bundle {
    pub record: LibraryRecord,
    pub blobs: Vec<(BlobId, Vec<u8>)>,
}

/// Handle to a running soundboard
#[derive(Clone)]
pub struct Soundboard {
    session: Arc<Mutex<Session>>,
    blobs: Arc<dyn BlobStore>,
    hydration: HydrationService,
}

impl Soundboard {
    /// Load the library and toggles, then hydrate
    pub async fn open(
        blobs: Arc<dyn BlobStore>,
        records: Arc<dyn RecordStore>,
        decoder: Arc<dyn ClipDecoder>,
        settings: EngineSettings,
    ) -> Self {
        let library = LibraryStore::load(Arc::clone(&records)).await;
        let dispatcher = CommandDispatcher::load(records).await;
        let engine = PlaybackEngine::new(settings);

        let board = Self {
            session: Arc::new(Mutex::new(Session {
                library,
                engine,
                dispatcher,
            })),
            hydration: HydrationService::new(Arc::clone(&blobs), decoder),
            blobs,
        };
        board.hydrate().await;
        board
    }

    /// Open the SQLite-backed board described by `config`
    pub async fn open_with_config(config: &SidelineConfig) -> AppResult<Self> {
        let pool = sideline_storage::create_pool(&config.storage.database_url).await?;
        sideline_storage::run_migrations(&pool).await?;
        info!(url = %config.storage.database_url, "database ready");

        Ok(Self::open(
            Arc::new(SqliteBlobStore::new(pool.clone())),
            Arc::new(SqliteRecordStore::new(pool)),
            Arc::new(SymphoniaClipDecoder::new()),
            config.engine_settings(),
        )
        .await)
    }

    /// Shared session, for callers that need several steps under one lock
    pub fn session(&self) -> &Arc<Mutex<Session>> {
        &self.session
    }

    /// Install the provider used for remote tiles
    pub async fn set_remote_provider(&self, provider: Arc<dyn RemoteProvider>) {
        self.session.lock().await.engine.set_remote_provider(provider);
    }

    /// Hydrate every tile that has no clip yet
    pub async fn hydrate(&self) -> HydrationReport {
        self.hydration.hydrate(&self.session).await
    }

    // ===== Commands =====

    /// Run one command
    ///
    /// A page reset is followed by hydration, so restored blobs play again.
    pub async fn dispatch(&self, command: Command) -> CommandOutcome {
        let outcome = {
            let mut guard = self.session.lock().await;
            let Session {
                library,
                engine,
                dispatcher,
            } = &mut *guard;
            dispatcher.dispatch(command, library, engine).await
        };

        if matches!(outcome, CommandOutcome::PageReset { .. }) {
            self.hydrate().await;
        }
        outcome
    }

    /// Play a tile by ID with the current toggles
    pub async fn play(&self, id: &TileId) -> CommandOutcome {
        let mut guard = self.session.lock().await;
        let Session {
            library,
            engine,
            dispatcher,
        } = &mut *guard;
        dispatcher.play_tile(id, library, engine)
    }

    // ===== Library =====

    /// First tile whose title contains `query`
    pub async fn find(&self, query: &str) -> Option<TileLocation> {
        self.session.lock().await.library.find(query)
    }

    pub async fn select_letter(&self, letter: Letter) {
        self.session.lock().await.library.select_letter(letter).await;
    }

    pub async fn select_category(&self, name: &str) -> Result<()> {
        self.session.lock().await.library.select_category(name).await
    }

    pub async fn add_category(&self, name: &str) -> Result<()> {
        self.session.lock().await.library.add_category(name).await
    }

    /// Add a tile to the active category and hydrate it
    ///
    /// Fails with a configuration error, before touching any store, when no
    /// category is selected.
    pub async fn add_tile(&self, new: NewTile) -> Result<TileId> {
        let id = {
            let mut guard = self.session.lock().await;
            guard.library.require_active_category()?;

            let tile = match new {
                NewTile::LocalFile { file_name, bytes } => {
                    let tile = Tile::local_file(&file_name);
                    if let Some(blob) = &tile.blob_ref {
                        if let Err(e) = self.blobs.put(blob, bytes).await {
                            warn!(tile = %tile.id, error = %e, "failed to store clip bytes");
                        }
                    }
                    tile
                }
                NewTile::Remote { title, reference } => Tile::remote(title, reference),
            };
            guard.library.add_tile(tile).await?
        };

        self.hydrate().await;
        Ok(id)
    }

    /// Remove a tile and release its clip
    pub async fn remove_tile(&self, id: &TileId) -> bool {
        let mut guard = self.session.lock().await;
        let Some(tile) = guard.library.remove_tile(id).await else {
            return false;
        };
        if let Some(handle) = tile.resolved {
            guard.engine.release(handle);
        }
        debug!(tile = %id, "tile removed");
        true
    }

    /// Remove a category and release its clips; returns how many tiles went
    pub async fn remove_category(&self, letter: Letter, name: &str) -> usize {
        let mut guard = self.session.lock().await;
        let Some(tiles) = guard.library.remove_category(letter, name).await else {
            return 0;
        };
        for handle in tiles.iter().filter_map(|t| t.resolved) {
            guard.engine.release(handle);
        }
        tiles.len()
    }

    // ===== Interchange =====

    /// Snapshot the library record and every stored blob
    pub async fn export_bundle(&self) -> Result<Bundle> {
        let record = self.session.lock().await.library.record();
        let blobs = self.blobs.list().await?;
        info!(blobs = blobs.len(), "bundle exported");
        Ok(Bundle { record, blobs })
    }

    /// Merge a bundle: metadata first, then blobs, then hydration
    ///
    /// Returns the number of tiles added.
    pub async fn import_bundle(&self, bundle: Bundle) -> Result<usize> {
        let added = self.session.lock().await.library.merge(bundle.record).await;

        let count = bundle.blobs.len();
        for (id, bytes) in bundle.blobs {
            self.blobs.put(&id, bytes).await?;
        }

        let report = self.hydrate().await;
        info!(added, blobs = count, resolved = report.resolved, "bundle imported");
        Ok(added)
    }

    // ===== Clock =====

    /// Progress of the focused voice
    pub async fn progress(&self) -> ProgressReport {
        self.session.lock().await.engine.progress()
    }

    /// Advance the engine clock and collect what happened
    pub async fn advance(&self, elapsed: Duration) -> Vec<EngineEvent> {
        let mut guard = self.session.lock().await;
        guard.engine.advance(elapsed);
        guard.engine.drain_events()
    }

    /// Drive the engine from a tokio interval
    pub fn spawn_clock(&self, tick: Duration) -> JoinHandle<()> {
        let board = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                for event in board.advance(tick).await {
                    log_event(&event);
                }
            }
        })
    }

    /// Stop playback and free every clip
    pub async fn shutdown(&self) {
        let mut guard = self.session.lock().await;
        guard.engine.shutdown();
        for tile in guard.library.library_mut().tiles_mut() {
            tile.resolved = None;
        }
    }
}

fn log_event(event: &EngineEvent) {
    match event {
        EngineEvent::Level(level) => trace!(left = level.left, right = level.right, "level"),
        EngineEvent::Progress(report) => trace!(
            elapsed = %report.elapsed_label(),
            remaining = %report.remaining_label(),
            "progress"
        ),
        EngineEvent::VoiceEnded { voice, tile } => debug!(%voice, %tile, "voice ended"),
        EngineEvent::FadeCompleted { voice } => debug!(%voice, "fade completed"),
        EngineEvent::RateChanged { voice, rate } => debug!(%voice, rate, "rate changed"),
        other => trace!(?other, "engine event"),
    }
}

impl std::fmt::Debug for Soundboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Soundboard").finish_non_exhaustive()
    }
}
