//! Hydration: stored blobs → playable clips
//!
//! Runs in three phases so the session lock is never held across I/O:
//! 1. Under the lock, collect every local-file tile without a clip.
//! 2. Without the lock, fetch and decode all of them concurrently.
//! 3. Under the lock again, attach clips to tiles that still want them.
//!
//! A tile removed or hydrated by someone else between phases 1 and 3 simply
//! drops its clip. A play issued before phase 3 finds no clip and is a no-op.

use crate::session::Session;
use futures_util::future::join_all;
use sideline_core::{BlobId, BlobStore, Result, SidelineError, TileId};
use sideline_playback::{ClipDecoder, DecodedClip};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// What one hydration pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HydrationReport {
    /// Tiles that received a playable clip
    pub resolved: usize,
    /// Tiles marked inactive (missing or undecodable bytes)
    pub inactive: usize,
    /// Clips dropped because their tile went away or was already resolved
    pub discarded: usize,
}

/// Resolves tile blob references against the blob store
#[derive(Clone)]
pub struct HydrationService {
    blobs: Arc<dyn BlobStore>,
    decoder: Arc<dyn ClipDecoder>,
}

impl HydrationService {
    pub fn new(blobs: Arc<dyn BlobStore>, decoder: Arc<dyn ClipDecoder>) -> Self {
        Self { blobs, decoder }
    }

    /// Hydrate every local-file tile that has no clip yet
    pub async fn hydrate(&self, session: &Mutex<Session>) -> HydrationReport {
        let mut report = HydrationReport::default();

        let pending: Vec<(TileId, BlobId)> = {
            let mut guard = session.lock().await;
            let mut pending = Vec::new();
            for tile in guard.library.library_mut().tiles_mut() {
                if !tile.needs_hydration() {
                    continue;
                }
                match &tile.blob_ref {
                    Some(blob) => pending.push((tile.id.clone(), blob.clone())),
                    None => {
                        warn!(tile = %tile.id, "local tile without blob reference");
                        tile.inactive = true;
                        report.inactive += 1;
                    }
                }
            }
            pending
        };

        if pending.is_empty() && report.inactive == 0 {
            return report;
        }
        debug!(count = pending.len(), "hydrating tiles");

        let fetched = join_all(pending.into_iter().map(|(tile, blob)| async move {
            let result = self.fetch(&tile, &blob).await;
            (tile, result)
        }))
        .await;

        let mut guard = session.lock().await;
        let Session {
            library, engine, ..
        } = &mut *guard;

        for (id, result) in fetched {
            let Some(tile) = library.library_mut().tile_mut(&id) else {
                report.discarded += usize::from(result.is_ok());
                continue;
            };
            if tile.resolved.is_some() {
                report.discarded += usize::from(result.is_ok());
                continue;
            }

            match result {
                Ok(clip) => {
                    tile.resolved = Some(engine.register_clip(clip));
                    tile.inactive = false;
                    report.resolved += 1;
                }
                Err(e) => {
                    warn!(tile = %id, error = %e, "tile unavailable, marking inactive");
                    tile.inactive = true;
                    report.inactive += 1;
                }
            }
        }

        library.persist().await;
        info!(
            resolved = report.resolved,
            inactive = report.inactive,
            discarded = report.discarded,
            "hydration finished"
        );
        report
    }

    /// Fetch and decode one blob
    async fn fetch(&self, tile: &TileId, blob: &BlobId) -> Result<DecodedClip> {
        let bytes = self
            .blobs
            .get(blob)
            .await?
            .ok_or_else(|| SidelineError::BlobMissing {
                tile: tile.clone(),
                blob: blob.clone(),
            })?;

        let decoder = Arc::clone(&self.decoder);
        let clip = tokio::task::spawn_blocking(move || decoder.decode(bytes))
            .await
            .map_err(|e| SidelineError::decode(format!("decode task failed: {e}")))??;
        Ok(clip)
    }
}

impl std::fmt::Debug for HydrationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HydrationService").finish_non_exhaustive()
    }
}
