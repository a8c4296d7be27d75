//! Ownership of hydrated clips
//!
//! Every decoded clip lives here under a `ClipHandle` until it is released.
//! Voices hold their own `Arc`, so a release frees the memory once the
//! engine has also stopped the voices playing it.

use crate::clip::DecodedClip;
use sideline_core::ClipHandle;
use std::collections::HashMap;
use std::sync::Arc;

/// Handle → decoded clip
#[derive(Debug, Default)]
pub struct ClipRegistry {
    clips: HashMap<ClipHandle, Arc<DecodedClip>>,
    next_handle: u64,
}

impl ClipRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a clip and hand out its handle
    pub fn register(&mut self, clip: DecodedClip) -> ClipHandle {
        self.next_handle += 1;
        let handle = ClipHandle::new(self.next_handle);
        self.clips.insert(handle, Arc::new(clip));
        handle
    }

    /// Clip behind a handle, if it has not been released
    pub fn get(&self, handle: ClipHandle) -> Option<Arc<DecodedClip>> {
        self.clips.get(&handle).cloned()
    }

    /// Drop a clip; returns whether the handle was live
    pub fn release(&mut self, handle: ClipHandle) -> bool {
        self.clips.remove(&handle).is_some()
    }

    /// Drop every clip; returns how many were live
    pub fn release_all(&mut self) -> usize {
        let count = self.clips.len();
        self.clips.clear();
        count
    }

    /// Number of live clips
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Whether no clips are live
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}
