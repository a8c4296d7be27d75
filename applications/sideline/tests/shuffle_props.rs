//! Property tests for category shuffling

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sideline::LibraryStore;
use sideline_core::{Tile, TileId};
use sideline_storage::MemoryRecordStore;
use std::sync::Arc;

fn store_with(count: usize) -> (LibraryStore, Vec<TileId>) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    runtime.block_on(async {
        let mut store = LibraryStore::load(Arc::new(MemoryRecordStore::new())).await;
        store.add_category("Shuffle").await.unwrap();
        let mut ids = Vec::new();
        for i in 0..count {
            let tile = Tile::remote(format!("t{i}"), format!("ref:{i}"));
            ids.push(store.add_tile(tile).await.unwrap());
        }
        (store, ids)
    })
}

proptest! {
    #[test]
    fn shuffle_is_a_permutation(count in 0usize..24, seed in any::<u64>()) {
        let (mut store, ids) = store_with(count);
        let mut rng = StdRng::seed_from_u64(seed);

        prop_assert!(store.shuffle_with("Shuffle", &mut rng));

        let mut shuffled: Vec<TileId> =
            store.active_tiles().iter().map(|t| t.id.clone()).collect();
        let mut expected = ids;
        shuffled.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        expected.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        prop_assert_eq!(shuffled, expected);
    }

    #[test]
    fn shuffling_a_missing_category_changes_nothing(seed in any::<u64>()) {
        let (mut store, ids) = store_with(3);
        let mut rng = StdRng::seed_from_u64(seed);

        prop_assert!(!store.shuffle_with("Elsewhere", &mut rng));
        let order: Vec<TileId> = store.active_tiles().iter().map(|t| t.id.clone()).collect();
        prop_assert_eq!(order, ids);
    }
}
