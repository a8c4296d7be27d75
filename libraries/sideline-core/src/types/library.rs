//! Library hierarchy: letter → category → ordered tiles
//!
//! Every one of the ten letters always has a bucket, which is guaranteed
//! structurally by storing buckets in a fixed-size array. The persisted form
//! (`LibraryRecord`) is a JSON object keyed by letter.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::types::{Letter, Tile, TileId};

/// Categories of one letter, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LetterBucket {
    /// Category name → ordered tiles
    #[serde(default)]
    pub categories: IndexMap<String, Vec<Tile>>,
}

/// Position of a tile inside the library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLocation {
    /// Letter holding the tile
    pub letter: Letter,
    /// Category holding the tile
    pub category: String,
    /// Index within the category sequence
    pub index: usize,
    /// The tile's ID
    pub tile_id: TileId,
}

/// The whole soundboard library
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Library {
    buckets: [LetterBucket; 10],
}

/// Active-selection cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Currently shown letter
    pub active_letter: Letter,
    /// Currently shown category of that letter, if any exist
    pub active_category: Option<String>,
}

fn letter_index(letter: Letter) -> usize {
    letter as usize
}

impl Library {
    /// Create a library with all ten letters empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket of a letter
    pub fn bucket(&self, letter: Letter) -> &LetterBucket {
        &self.buckets[letter_index(letter)]
    }

    /// Mutable bucket of a letter
    pub fn bucket_mut(&mut self, letter: Letter) -> &mut LetterBucket {
        &mut self.buckets[letter_index(letter)]
    }

    /// Tiles of a category
    pub fn category(&self, letter: Letter, name: &str) -> Option<&[Tile]> {
        self.bucket(letter).categories.get(name).map(Vec::as_slice)
    }

    /// Mutable tiles of a category
    pub fn category_mut(&mut self, letter: Letter, name: &str) -> Option<&mut Vec<Tile>> {
        self.bucket_mut(letter).categories.get_mut(name)
    }

    /// First category of a letter in stored order
    pub fn first_category(&self, letter: Letter) -> Option<&str> {
        self.bucket(letter).categories.keys().next().map(String::as_str)
    }

    /// Iterate over all tiles in scan order: letters A→J, then categories in
    /// stored order, then tiles in sequence order
    pub fn tiles(&self) -> impl Iterator<Item = (Letter, &str, usize, &Tile)> {
        Letter::ALL.into_iter().flat_map(move |letter| {
            self.bucket(letter)
                .categories
                .iter()
                .flat_map(move |(name, tiles)| {
                    tiles
                        .iter()
                        .enumerate()
                        .map(move |(index, tile)| (letter, name.as_str(), index, tile))
                })
        })
    }

    /// Iterate mutably over every tile in scan order
    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.buckets
            .iter_mut()
            .flat_map(|bucket| bucket.categories.values_mut())
            .flat_map(|tiles| tiles.iter_mut())
    }

    /// Total number of tiles
    pub fn tile_count(&self) -> usize {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.categories.values())
            .map(Vec::len)
            .sum()
    }

    /// Look up a tile by ID
    pub fn tile(&self, id: &TileId) -> Option<&Tile> {
        self.tiles()
            .find(|(_, _, _, tile)| &tile.id == id)
            .map(|(_, _, _, tile)| tile)
    }

    /// Look up a tile by ID for mutation
    pub fn tile_mut(&mut self, id: &TileId) -> Option<&mut Tile> {
        self.tiles_mut().find(|tile| &tile.id == id)
    }

    /// Locate a tile by ID
    pub fn locate(&self, id: &TileId) -> Option<TileLocation> {
        self.tiles()
            .find(|(_, _, _, tile)| &tile.id == id)
            .map(|(letter, category, index, tile)| TileLocation {
                letter,
                category: category.to_string(),
                index,
                tile_id: tile.id.clone(),
            })
    }

    /// First tile whose title contains `query`, ignoring case
    ///
    /// An empty query matches nothing.
    pub fn find_title(&self, query: &str) -> Option<TileLocation> {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return None;
        }

        self.tiles()
            .find(|(_, _, _, tile)| tile.title.to_lowercase().contains(&needle))
            .map(|(letter, category, index, tile)| TileLocation {
                letter,
                category: category.to_string(),
                index,
                tile_id: tile.id.clone(),
            })
    }

    /// Remove a tile, returning it
    pub fn remove_tile(&mut self, id: &TileId) -> Option<Tile> {
        let location = self.locate(id)?;
        self.category_mut(location.letter, &location.category)
            .map(|tiles| tiles.remove(location.index))
    }

    /// Remove a whole category, returning its tiles
    pub fn remove_category(&mut self, letter: Letter, name: &str) -> Option<Vec<Tile>> {
        self.bucket_mut(letter).categories.shift_remove(name)
    }

    /// Merge another library into this one
    ///
    /// Missing categories are created; tiles whose ID already exists anywhere
    /// in this library are skipped. Returns the number of tiles added.
    pub fn merge(&mut self, other: Library) -> usize {
        let mut known: HashSet<TileId> = self.tiles().map(|(_, _, _, t)| t.id.clone()).collect();
        let mut added = 0;

        for (letter, bucket) in Letter::ALL.into_iter().zip(other.buckets) {
            for (name, tiles) in bucket.categories {
                let target = self
                    .bucket_mut(letter)
                    .categories
                    .entry(name)
                    .or_default();
                for mut tile in tiles {
                    if known.insert(tile.id.clone()) {
                        tile.resolved = None;
                        target.push(tile);
                        added += 1;
                    }
                }
            }
        }

        added
    }
}

/// Persisted form of the library and its selection cursor
///
/// `{ letters: { A: { categories: { ... } }, ... }, activeLetter, activeCategory }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryRecord {
    /// Buckets keyed by letter
    #[serde(default)]
    pub letters: BTreeMap<Letter, LetterBucket>,

    /// Active letter at save time
    #[serde(default)]
    pub active_letter: Option<Letter>,

    /// Active category at save time
    #[serde(default)]
    pub active_category: Option<String>,
}

impl LibraryRecord {
    /// Snapshot a library and selection
    pub fn from_parts(library: &Library, selection: &Selection) -> Self {
        Self {
            letters: Letter::ALL
                .into_iter()
                .map(|letter| (letter, library.bucket(letter).clone()))
                .collect(),
            active_letter: Some(selection.active_letter),
            active_category: selection.active_category.clone(),
        }
    }

    /// Rebuild a library and a valid selection from the record
    ///
    /// Missing letters are scaffolded empty. The active letter defaults to
    /// `A`; an absent or unknown active category falls back to the first
    /// category of the active letter.
    pub fn into_parts(self) -> (Library, Selection) {
        let mut library = Library::new();
        for (letter, bucket) in self.letters {
            *library.bucket_mut(letter) = bucket;
        }

        let active_letter = self.active_letter.unwrap_or_default();
        let active_category = self
            .active_category
            .filter(|name| library.category(active_letter, name).is_some())
            .or_else(|| library.first_category(active_letter).map(str::to_string));

        (
            library,
            Selection {
                active_letter,
                active_category,
            },
        )
    }
}
