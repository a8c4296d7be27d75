//! Shared fixtures for soundboard integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use sideline::Soundboard;
use sideline_core::{BlobId, BlobStore, SidelineError};
use sideline_playback::{EngineSettings, SymphoniaClipDecoder};
use sideline_storage::{MemoryBlobStore, MemoryRecordStore};
use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

/// Output rate used by test boards, so milliseconds map to frames
pub const TEST_RATE: u32 = 1000;

pub fn settings() -> EngineSettings {
    EngineSettings {
        sample_rate: TEST_RATE,
        ..EngineSettings::default()
    }
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Mono 16-bit WAV of a quiet square-ish tone
pub fn wav_bytes(seconds: f64) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: TEST_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let frames = (seconds * f64::from(TEST_RATE)) as usize;

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..frames {
            let sample: i16 = if (i / 5) % 2 == 0 { 8_000 } else { -8_000 };
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Board on memory stores, with handles to the stores for inspection
pub struct TestBoard {
    pub board: Soundboard,
    pub blobs: Arc<MemoryBlobStore>,
    pub records: Arc<MemoryRecordStore>,
}

impl TestBoard {
    pub async fn new() -> Self {
        Self::with_records(Arc::new(MemoryRecordStore::new())).await
    }

    pub async fn with_records(records: Arc<MemoryRecordStore>) -> Self {
        Self::with_stores(Arc::new(MemoryBlobStore::new()), records).await
    }

    pub async fn with_stores(blobs: Arc<MemoryBlobStore>, records: Arc<MemoryRecordStore>) -> Self {
        let board = Soundboard::open(
            blobs.clone(),
            records.clone(),
            Arc::new(SymphoniaClipDecoder::new()),
            settings(),
        )
        .await;
        Self {
            board,
            blobs,
            records,
        }
    }
}

/// Blob store that refuses to read selected blobs
#[derive(Default)]
pub struct FlakyBlobStore {
    pub inner: MemoryBlobStore,
    pub broken: std::sync::Mutex<HashSet<BlobId>>,
}

impl FlakyBlobStore {
    pub fn break_blob(&self, id: &BlobId) {
        self.broken.lock().unwrap().insert(id.clone());
    }
}

#[async_trait]
impl BlobStore for FlakyBlobStore {
    async fn put(&self, id: &BlobId, bytes: Vec<u8>) -> sideline_core::Result<()> {
        self.inner.put(id, bytes).await
    }

    async fn get(&self, id: &BlobId) -> sideline_core::Result<Option<Vec<u8>>> {
        let broken = self.broken.lock().unwrap().contains(id);
        if broken {
            return Err(SidelineError::storage(format!("read of {id} failed")));
        }
        self.inner.get(id).await
    }

    async fn list(&self) -> sideline_core::Result<Vec<(BlobId, Vec<u8>)>> {
        self.inner.list().await
    }
}
