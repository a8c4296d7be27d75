//! Library store
//!
//! In-memory library plus selection cursor, persisted as a single record.
//! Storage failures never escape: a bad or unreadable record loads as an
//! empty scaffold, and failed saves are logged and retried on the next save.

use rand::seq::SliceRandom;
use rand::Rng;
use sideline_core::{
    Letter, Library, LibraryRecord, RecordStore, Result, Selection, SidelineError, Tile, TileId,
    TileLocation,
};
use sideline_storage::records::LIBRARY_KEY;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Owner of the library and the active selection
pub struct LibraryStore {
    records: Arc<dyn RecordStore>,
    library: Library,
    selection: Selection,
}

impl LibraryStore {
    /// Load the library record, falling back to an empty scaffold
    pub async fn load(records: Arc<dyn RecordStore>) -> Self {
        let record = match records.read(LIBRARY_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<LibraryRecord>(&raw) {
                Ok(record) => record,
                Err(e) => {
                    warn!(error = %e, "library record malformed, starting empty");
                    LibraryRecord::default()
                }
            },
            Ok(None) => {
                debug!("no library record, starting empty");
                LibraryRecord::default()
            }
            Err(e) => {
                warn!(error = %e, "library record unreadable, starting empty");
                LibraryRecord::default()
            }
        };

        let (library, selection) = record.into_parts();
        info!(
            tiles = library.tile_count(),
            letter = %selection.active_letter,
            category = ?selection.active_category,
            "library loaded"
        );

        Self {
            records,
            library,
            selection,
        }
    }

    /// Write the full library and selection as one record
    pub async fn save(&self) -> Result<()> {
        let record = LibraryRecord::from_parts(&self.library, &self.selection);
        let raw = serde_json::to_string(&record)?;
        self.records.write(LIBRARY_KEY, &raw).await
    }

    /// Save, logging instead of failing
    pub async fn persist(&self) {
        if let Err(e) = self.save().await {
            warn!(error = %e, "failed to persist library");
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut Library {
        &mut self.library
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn active_letter(&self) -> Letter {
        self.selection.active_letter
    }

    pub fn active_category(&self) -> Option<&str> {
        self.selection.active_category.as_deref()
    }

    /// Tiles of the active category, empty when none is selected
    pub fn active_tiles(&self) -> &[Tile] {
        self.active_category()
            .and_then(|name| self.library.category(self.active_letter(), name))
            .unwrap_or(&[])
    }

    // ===== Selection =====

    /// Show a letter and select its first category
    pub async fn select_letter(&mut self, letter: Letter) {
        self.selection.active_letter = letter;
        self.selection.active_category = self.library.first_category(letter).map(str::to_string);
        self.persist().await;
    }

    /// Select an existing category of the active letter
    pub async fn select_category(&mut self, name: &str) -> Result<()> {
        if self.library.category(self.active_letter(), name).is_none() {
            return Err(SidelineError::not_found("category", name));
        }
        self.selection.active_category = Some(name.to_string());
        self.persist().await;
        Ok(())
    }

    // ===== Mutation =====

    /// Create an empty category under the active letter and select it
    ///
    /// An existing category keeps its tiles.
    pub async fn add_category(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SidelineError::invalid_input("category name is empty"));
        }

        let letter = self.active_letter();
        let categories = &mut self.library.bucket_mut(letter).categories;
        if categories.contains_key(name) {
            debug!(%letter, category = name, "category exists");
        } else {
            categories.insert(name.to_string(), Vec::new());
            info!(%letter, category = name, "category added");
        }

        self.selection.active_category = Some(name.to_string());
        self.persist().await;
        Ok(())
    }

    /// Fail with a configuration error when no category is selected
    pub fn require_active_category(&self) -> Result<&str> {
        self.active_category().ok_or_else(|| {
            SidelineError::configuration("create or select a category before adding tiles")
        })
    }

    /// Append a tile to the active category
    pub async fn add_tile(&mut self, tile: Tile) -> Result<TileId> {
        let category = self.require_active_category()?.to_string();
        let letter = self.active_letter();
        let id = tile.id.clone();

        self.library
            .bucket_mut(letter)
            .categories
            .entry(category.clone())
            .or_default()
            .push(tile);

        debug!(tile = %id, %letter, %category, "tile added");
        self.persist().await;
        Ok(id)
    }

    /// First tile whose title contains `query`, ignoring case
    pub fn find(&self, query: &str) -> Option<TileLocation> {
        self.library.find_title(query)
    }

    /// Shuffle a category of the active letter
    ///
    /// Returns `false` if the category does not exist.
    pub async fn shuffle(&mut self, category: &str) -> bool {
        let shuffled = self.shuffle_with(category, &mut rand::thread_rng());
        if shuffled {
            self.persist().await;
        }
        shuffled
    }

    /// Fisher-Yates over the whole category using `rng`
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, category: &str, rng: &mut R) -> bool {
        let letter = self.active_letter();
        match self.library.category_mut(letter, category) {
            Some(tiles) => {
                tiles.shuffle(rng);
                debug!(%letter, category, len = tiles.len(), "category shuffled");
                true
            }
            None => false,
        }
    }

    /// Clear `inactive` on every tile of a category of the active letter
    ///
    /// Returns how many tiles were reactivated.
    pub async fn reset_inactive(&mut self, category: &str) -> usize {
        let letter = self.active_letter();
        let Some(tiles) = self.library.category_mut(letter, category) else {
            return 0;
        };

        let mut cleared = 0;
        for tile in tiles.iter_mut().filter(|t| t.inactive) {
            tile.inactive = false;
            cleared += 1;
        }
        debug!(%letter, category, cleared, "inactive flags reset");
        self.persist().await;
        cleared
    }

    /// Remove a tile anywhere in the library
    pub async fn remove_tile(&mut self, id: &TileId) -> Option<Tile> {
        let tile = self.library.remove_tile(id)?;
        self.persist().await;
        Some(tile)
    }

    /// Remove a category, fixing the selection if it was active
    pub async fn remove_category(&mut self, letter: Letter, name: &str) -> Option<Vec<Tile>> {
        let tiles = self.library.remove_category(letter, name)?;
        if letter == self.active_letter() && self.active_category() == Some(name) {
            self.selection.active_category =
                self.library.first_category(letter).map(str::to_string);
        }
        self.persist().await;
        Some(tiles)
    }

    /// Snapshot for export
    pub fn record(&self) -> LibraryRecord {
        LibraryRecord::from_parts(&self.library, &self.selection)
    }

    /// Merge an imported record; returns how many tiles were added
    ///
    /// The current selection is kept.
    pub async fn merge(&mut self, record: LibraryRecord) -> usize {
        let (incoming, _) = record.into_parts();
        let added = self.library.merge(incoming);

        if self.selection.active_category.is_none() {
            self.selection.active_category = self
                .library
                .first_category(self.active_letter())
                .map(str::to_string);
        }
        self.persist().await;
        added
    }
}

impl std::fmt::Debug for LibraryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryStore")
            .field("tiles", &self.library.tile_count())
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sideline_storage::MemoryRecordStore;

    async fn empty_store() -> LibraryStore {
        LibraryStore::load(Arc::new(MemoryRecordStore::new())).await
    }

    #[tokio::test]
    async fn empty_record_scaffolds_all_letters() {
        let store = empty_store().await;
        for letter in Letter::ALL {
            assert!(store.library().bucket(letter).categories.is_empty());
        }
        assert_eq!(store.active_letter(), Letter::A);
        assert_eq!(store.active_category(), None);
    }

    #[tokio::test]
    async fn malformed_record_falls_back_to_scaffold() {
        let records = MemoryRecordStore::with_record(LIBRARY_KEY, "{not json");
        let store = LibraryStore::load(Arc::new(records)).await;
        assert_eq!(store.library().tile_count(), 0);
        assert_eq!(store.active_letter(), Letter::A);
    }

    #[tokio::test]
    async fn add_tile_without_category_is_a_configuration_error() {
        let mut store = empty_store().await;
        let err = store.add_tile(Tile::local_file("kick.wav")).await.unwrap_err();
        assert!(matches!(err, SidelineError::Configuration(_)));
        assert_eq!(store.library().tile_count(), 0);
    }

    #[tokio::test]
    async fn existing_category_keeps_its_tiles() {
        let mut store = empty_store().await;
        store.add_category("Hockey").await.unwrap();
        store.add_tile(Tile::local_file("horn.wav")).await.unwrap();
        store.add_category("Soccer").await.unwrap();

        store.add_category("Hockey").await.unwrap();
        assert_eq!(store.active_category(), Some("Hockey"));
        assert_eq!(store.active_tiles().len(), 1);
    }

    #[tokio::test]
    async fn select_letter_picks_first_category() {
        let mut store = empty_store().await;
        store.select_letter(Letter::C).await;
        store.add_category("One").await.unwrap();
        store.add_category("Two").await.unwrap();

        store.select_letter(Letter::A).await;
        assert_eq!(store.active_category(), None);
        store.select_letter(Letter::C).await;
        assert_eq!(store.active_category(), Some("One"));

        assert!(store.select_category("Nope").await.is_err());
        store.select_category("Two").await.unwrap();
        assert_eq!(store.active_category(), Some("Two"));
    }

    #[tokio::test]
    async fn removing_active_category_moves_selection() {
        let mut store = empty_store().await;
        store.add_category("One").await.unwrap();
        store.add_category("Two").await.unwrap();

        let removed = store.remove_category(Letter::A, "Two").await.unwrap();
        assert!(removed.is_empty());
        assert_eq!(store.active_category(), Some("One"));
    }

    #[tokio::test]
    async fn reset_inactive_clears_flags() {
        let mut store = empty_store().await;
        store.add_category("X").await.unwrap();
        let mut dead = Tile::local_file("dead.wav");
        dead.inactive = true;
        store.add_tile(dead).await.unwrap();
        store.add_tile(Tile::local_file("fine.wav")).await.unwrap();

        assert_eq!(store.reset_inactive("X").await, 1);
        assert!(store.active_tiles().iter().all(|t| !t.inactive));
        assert_eq!(store.reset_inactive("missing").await, 0);
    }
}
