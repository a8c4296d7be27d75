//! Soundboard session integration tests
//!
//! Each test opens a board on memory stores with real WAV bytes, so
//! hydration runs the actual decoder.

mod common;

use common::{ms, wav_bytes, FlakyBlobStore, TestBoard};
use sideline::{Command, CommandOutcome, Soundboard};
use sideline_core::{
    BlobId, BlobStore, Letter, Library, LibraryRecord, NewTile, Selection, SidelineError,
    SourceKind, Tile, TileId, ToggleFlag,
};
use sideline_playback::{EngineEvent, PlayOutcome, SymphoniaClipDecoder};
use sideline_storage::records::LIBRARY_KEY;
use sideline_storage::{MemoryBlobStore, MemoryRecordStore};
use std::collections::HashSet;
use std::sync::Arc;

// ===== Helpers =====

async fn add_clip(board: &Soundboard, name: &str, seconds: f64) -> TileId {
    board
        .add_tile(NewTile::LocalFile {
            file_name: name.to_string(),
            bytes: wav_bytes(seconds),
        })
        .await
        .unwrap()
}

async fn tile(board: &Soundboard, id: &TileId) -> Tile {
    board
        .session()
        .lock()
        .await
        .library
        .library()
        .tile(id)
        .cloned()
        .unwrap()
}

async fn active_order(board: &Soundboard) -> Vec<TileId> {
    board
        .session()
        .lock()
        .await
        .library
        .active_tiles()
        .iter()
        .map(|t| t.id.clone())
        .collect()
}

fn played(outcome: &CommandOutcome) -> &TileId {
    match outcome {
        CommandOutcome::Played { tile, .. } => tile,
        other => panic!("expected a play, got {other:?}"),
    }
}

/// Record holding one local tile under A/Hockey whose blob was never stored
fn record_with_orphan() -> (LibraryRecord, Tile) {
    let orphan = Tile::local_file("ghost.wav");
    let mut library = Library::new();
    library
        .bucket_mut(Letter::A)
        .categories
        .insert("Hockey".to_string(), vec![orphan.clone()]);
    let selection = Selection {
        active_letter: Letter::A,
        active_category: Some("Hockey".to_string()),
    };
    (LibraryRecord::from_parts(&library, &selection), orphan)
}

// ===== Loading =====

#[tokio::test]
async fn empty_store_opens_scaffolded() {
    let t = TestBoard::new().await;
    let session = t.board.session().lock().await;

    for letter in Letter::ALL {
        assert!(session.library.library().bucket(letter).categories.is_empty());
    }
    assert_eq!(session.library.active_letter(), Letter::A);
    assert_eq!(session.library.active_category(), None);
    assert_eq!(session.dispatcher.toggles(), &Default::default());
}

#[tokio::test]
async fn adding_without_category_fails_before_storing() {
    let t = TestBoard::new().await;

    let err = t
        .board
        .add_tile(NewTile::LocalFile {
            file_name: "kick.wav".into(),
            bytes: wav_bytes(0.2),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SidelineError::Configuration(_)));
    assert!(t.blobs.is_empty().await);
}

// ===== Hydration =====

#[tokio::test]
async fn imported_file_hydrates_and_plays() {
    let t = TestBoard::new().await;
    t.board.add_category("Drums").await.unwrap();
    let id = add_clip(&t.board, "kick.wav", 0.5).await;

    let kick = tile(&t.board, &id).await;
    assert_eq!(kick.title, "kick");
    assert_eq!(kick.source_kind, SourceKind::LocalFile);
    assert!(!kick.inactive);
    assert!(kick.resolved.is_some());

    let outcome = t.board.play(&id).await;
    let CommandOutcome::Played {
        outcome: PlayOutcome::Started(voice),
        ..
    } = outcome
    else {
        panic!("expected a started voice, got {outcome:?}");
    };

    let events = t.board.advance(ms(150)).await;
    assert!(events.iter().any(|e| matches!(e, EngineEvent::Level(_))));
    assert!(events.iter().any(|e| matches!(e, EngineEvent::Progress(_))));

    let events = t.board.advance(ms(500)).await;
    assert!(events.contains(&EngineEvent::VoiceEnded {
        voice,
        tile: id.clone()
    }));
}

#[tokio::test]
async fn missing_blob_marks_tile_inactive() {
    let (record, orphan) = record_with_orphan();
    let records = Arc::new(MemoryRecordStore::with_record(
        LIBRARY_KEY,
        serde_json::to_string(&record).unwrap(),
    ));
    let t = TestBoard::with_records(records).await;

    let ghost = tile(&t.board, &orphan.id).await;
    assert!(ghost.inactive);
    assert!(ghost.resolved.is_none());

    let outcome = t.board.play(&orphan.id).await;
    assert_eq!(
        outcome,
        CommandOutcome::Played {
            tile: orphan.id.clone(),
            outcome: PlayOutcome::Skipped
        }
    );
    assert_eq!(t.board.session().lock().await.engine.active_count(), 0);
}

#[tokio::test]
async fn reset_page_rehydrates_restored_blobs() {
    let (record, orphan) = record_with_orphan();
    let records = Arc::new(MemoryRecordStore::with_record(
        LIBRARY_KEY,
        serde_json::to_string(&record).unwrap(),
    ));
    let t = TestBoard::with_records(records).await;
    assert!(tile(&t.board, &orphan.id).await.inactive);

    let blob = orphan.blob_ref.clone().unwrap();
    t.blobs.put(&blob, wav_bytes(0.3)).await.unwrap();

    let outcome = t.board.dispatch(Command::ResetPage).await;
    assert_eq!(
        outcome,
        CommandOutcome::PageReset {
            category: "Hockey".into(),
            reactivated: 1
        }
    );

    let ghost = tile(&t.board, &orphan.id).await;
    assert!(!ghost.inactive);
    assert!(ghost.resolved.is_some());
    assert!(matches!(
        t.board.play(&orphan.id).await,
        CommandOutcome::Played {
            outcome: PlayOutcome::Started(_),
            ..
        }
    ));
}

#[tokio::test]
async fn one_failing_blob_does_not_block_the_rest() {
    let blobs = Arc::new(FlakyBlobStore::default());
    let board = Soundboard::open(
        blobs.clone(),
        Arc::new(MemoryRecordStore::new()),
        Arc::new(SymphoniaClipDecoder::new()),
        common::settings(),
    )
    .await;
    board.add_category("Mixed").await.unwrap();

    let good = add_clip(&board, "good.wav", 0.2).await;
    let bad = Tile::local_file("bad.wav");
    let bad_blob = bad.blob_ref.clone().unwrap();
    blobs.put(&bad_blob, wav_bytes(0.2)).await.unwrap();
    blobs.break_blob(&bad_blob);
    board
        .session()
        .lock()
        .await
        .library
        .add_tile(bad.clone())
        .await
        .unwrap();
    let garbage = board
        .add_tile(NewTile::LocalFile {
            file_name: "noise.wav".into(),
            bytes: vec![0xde, 0xad, 0xbe, 0xef],
        })
        .await
        .unwrap();

    assert!(tile(&board, &good).await.resolved.is_some());
    assert!(tile(&board, &bad.id).await.inactive);
    assert!(tile(&board, &garbage).await.inactive);
}

#[tokio::test]
async fn hydration_is_idempotent() {
    let t = TestBoard::new().await;
    t.board.add_category("Drums").await.unwrap();
    add_clip(&t.board, "kick.wav", 0.2).await;
    add_clip(&t.board, "snare.wav", 0.2).await;

    let live = t.board.session().lock().await.engine.live_clips();
    let report = t.board.hydrate().await;

    assert_eq!(report.resolved, 0);
    assert_eq!(live, 2);
    assert_eq!(t.board.session().lock().await.engine.live_clips(), 2);
}

#[tokio::test]
async fn removing_a_tile_releases_its_clip() {
    let t = TestBoard::new().await;
    t.board.add_category("Drums").await.unwrap();
    let id = add_clip(&t.board, "kick.wav", 1.0).await;
    let handle = tile(&t.board, &id).await.resolved.unwrap();
    t.board.play(&id).await;

    assert!(t.board.remove_tile(&id).await);

    let session = t.board.session().lock().await;
    assert!(!session.engine.is_live(handle));
    assert_eq!(session.engine.active_count(), 0);
    assert!(session.library.library().tile(&id).is_none());
}

#[tokio::test]
async fn removing_a_category_releases_every_clip() {
    let t = TestBoard::new().await;
    t.board.add_category("Drums").await.unwrap();
    add_clip(&t.board, "kick.wav", 0.2).await;
    add_clip(&t.board, "snare.wav", 0.2).await;

    assert_eq!(t.board.remove_category(Letter::A, "Drums").await, 2);
    let session = t.board.session().lock().await;
    assert_eq!(session.engine.live_clips(), 0);
    assert_eq!(session.library.active_category(), None);
}

// ===== Commands =====

#[tokio::test]
async fn next_walks_the_category_and_wraps() {
    let t = TestBoard::new().await;
    t.board.select_letter(Letter::B).await;
    t.board.add_category("Basketball").await.unwrap();
    let a = add_clip(&t.board, "a.wav", 2.0).await;
    let b = add_clip(&t.board, "b.wav", 2.0).await;
    let c = add_clip(&t.board, "c.wav", 2.0).await;

    let mut order = Vec::new();
    for _ in 0..4 {
        let outcome = t.board.dispatch(Command::Next).await;
        order.push(played(&outcome).clone());
    }

    assert_eq!(order, [a.clone(), b, c, a]);
    // Multi is off, so only the latest tile plays
    assert_eq!(t.board.session().lock().await.engine.active_count(), 1);
}

#[tokio::test]
async fn next_after_natural_end_advances() {
    let t = TestBoard::new().await;
    t.board.add_category("Short").await.unwrap();
    let a = add_clip(&t.board, "a.wav", 0.5).await;
    let b = add_clip(&t.board, "b.wav", 0.5).await;
    add_clip(&t.board, "c.wav", 0.5).await;

    assert_eq!(played(&t.board.dispatch(Command::Next).await), &a);
    t.board.advance(ms(2000)).await;
    {
        let session = t.board.session().lock().await;
        assert_eq!(session.engine.active_count(), 0);
        assert_eq!(session.engine.last_started_tile(), Some(&a));
    }

    assert_eq!(played(&t.board.dispatch(Command::Next).await), &b);
}

#[tokio::test]
async fn next_after_stop_starts_over() {
    let t = TestBoard::new().await;
    t.board.add_category("Short").await.unwrap();
    let a = add_clip(&t.board, "a.wav", 1.0).await;
    add_clip(&t.board, "b.wav", 1.0).await;

    t.board.dispatch(Command::Next).await;
    t.board.dispatch(Command::Stop).await;

    assert_eq!(played(&t.board.dispatch(Command::Next).await), &a);
}

#[tokio::test]
async fn find_miss_leaves_session_untouched() {
    let t = TestBoard::new().await;
    t.board.add_category("Hockey").await.unwrap();
    let horn = add_clip(&t.board, "goal horn.wav", 2.0).await;
    t.board.play(&horn).await;

    let outcome = t.board.dispatch(Command::Find("zz".into())).await;
    assert_eq!(
        outcome,
        CommandOutcome::NotFound {
            query: "zz".into()
        }
    );

    let session = t.board.session().lock().await;
    assert_eq!(session.engine.active_count(), 1);
    assert_eq!(session.engine.focused_tile(), Some(&horn));
}

#[tokio::test]
async fn find_plays_first_match_across_letters() {
    let t = TestBoard::new().await;
    t.board.select_letter(Letter::D).await;
    t.board.add_category("Crowd").await.unwrap();
    let clap = add_clip(&t.board, "Slow Clap.wav", 1.0).await;
    t.board.select_letter(Letter::A).await;

    let outcome = t.board.dispatch(Command::Find("clap".into())).await;
    assert_eq!(played(&outcome), &clap);
}

#[tokio::test]
async fn toggles_persist_and_apply_to_new_voices_only() {
    let records = Arc::new(MemoryRecordStore::new());
    let t = TestBoard::with_records(records.clone()).await;
    t.board.add_category("Loops").await.unwrap();
    let id = add_clip(&t.board, "organ.wav", 2.0).await;

    t.board.play(&id).await;
    let outcome = t.board.dispatch(Command::Loop).await;
    assert_eq!(
        outcome,
        CommandOutcome::ConfigChanged {
            flag: ToggleFlag::Loop,
            now_on: true
        }
    );
    {
        let session = t.board.session().lock().await;
        assert!(!session.engine.voices()[0].is_looping());
    }

    t.board.play(&id).await;
    {
        let session = t.board.session().lock().await;
        assert!(session.engine.voices()[0].is_looping());
    }

    let reopened = TestBoard::with_stores(t.blobs.clone(), records).await;
    let session = reopened.board.session().lock().await;
    assert!(session.dispatcher.toggles().loop_playback);
    assert!(!session.dispatcher.toggles().multi);
}

#[tokio::test]
async fn shuffle_produces_more_than_one_order() {
    let t = TestBoard::new().await;
    t.board.add_category("Walk-up").await.unwrap();
    for i in 0..8 {
        add_clip(&t.board, &format!("song{i}.wav"), 0.05).await;
    }
    let original: HashSet<TileId> = active_order(&t.board).await.into_iter().collect();

    let mut orders = HashSet::new();
    for _ in 0..20 {
        assert_eq!(t.board.dispatch(Command::Shuffle).await, CommandOutcome::Shuffled);
        let order = active_order(&t.board).await;
        assert_eq!(order.iter().cloned().collect::<HashSet<_>>(), original);
        orders.insert(order);
    }
    assert!(orders.len() > 1);
}

#[tokio::test]
async fn tile_ids_are_unique() {
    let t = TestBoard::new().await;
    t.board.add_category("Bulk").await.unwrap();

    let mut ids = HashSet::new();
    for i in 0..50 {
        let id = t
            .board
            .add_tile(NewTile::Remote {
                title: format!("track {i}"),
                reference: format!("spotify:track:{i}"),
            })
            .await
            .unwrap();
        ids.insert(id);
    }
    assert_eq!(ids.len(), 50);
}

// ===== Interchange =====

#[tokio::test]
async fn bundle_round_trips_into_a_fresh_board() {
    let source = TestBoard::new().await;
    source.board.select_letter(Letter::C).await;
    source.board.add_category("Cheers").await.unwrap();
    let clip = add_clip(&source.board, "cheer.wav", 0.3).await;
    let remote = source
        .board
        .add_tile(NewTile::Remote {
            title: "Anthem".into(),
            reference: "spotify:track:anthem".into(),
        })
        .await
        .unwrap();

    let bundle = source.board.export_bundle().await.unwrap();
    assert_eq!(bundle.blobs.len(), 1);

    let target = TestBoard::new().await;
    assert_eq!(target.board.import_bundle(bundle.clone()).await.unwrap(), 2);

    let imported = tile(&target.board, &clip).await;
    assert_eq!(imported.title, "cheer");
    assert!(imported.resolved.is_some());
    assert_eq!(tile(&target.board, &remote).await.source_kind, SourceKind::Remote);
    assert!(target
        .blobs
        .get(&BlobId::from(&clip))
        .await
        .unwrap()
        .is_some());

    // A second import adds nothing new
    assert_eq!(target.board.import_bundle(bundle).await.unwrap(), 0);
}

#[tokio::test]
async fn sqlite_board_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = sideline::SidelineConfig::default();
    config.storage.database_url = format!("sqlite://{}", dir.path().join("board.db").display());
    config.engine.sample_rate = common::TEST_RATE;

    let id = {
        let board = Soundboard::open_with_config(&config).await.unwrap();
        board.select_letter(Letter::E).await;
        board.add_category("Encore").await.unwrap();
        let id = add_clip(&board, "bell.wav", 0.2).await;
        board.dispatch(Command::Multi).await;
        id
    };

    let board = Soundboard::open_with_config(&config).await.unwrap();
    let session = board.session().lock().await;
    assert_eq!(session.library.active_letter(), Letter::E);
    assert_eq!(session.library.active_category(), Some("Encore"));
    assert!(session.dispatcher.toggles().multi);

    let bell = session.library.library().tile(&id).unwrap();
    assert_eq!(bell.title, "bell");
    assert!(bell.resolved.is_some());
}

#[tokio::test]
async fn memory_blob_store_is_shared_with_the_board() {
    let blobs = Arc::new(MemoryBlobStore::new());
    let t = TestBoard::with_stores(blobs.clone(), Arc::new(MemoryRecordStore::new())).await;
    t.board.add_category("Drums").await.unwrap();
    add_clip(&t.board, "kick.wav", 0.1).await;

    assert_eq!(blobs.len().await, 1);
}
