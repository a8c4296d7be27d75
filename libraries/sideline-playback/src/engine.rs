//! Playback engine - mixing, fades, rate and metering
//!
//! The engine is driven by its output clock. Every call to
//! [`PlaybackEngine::process_audio`] mixes the active voices into the buffer
//! and advances the clock by the rendered frames. Fade steps, meter samples
//! and rate restores are frame deadlines on that clock; rendering is split at
//! each deadline so they fire at exact positions.

use crate::{
    clip::DecodedClip,
    events::EngineEvent,
    fade::{FadeJob, FadeStep},
    meter::LevelMeter,
    registry::ClipRegistry,
    types::{EngineSettings, PlayOutcome, ProgressReport, VoiceId, VoiceState},
    voice::{Voice, VoiceOptions},
};
use sideline_core::{ClipHandle, RemoteProvider, SourceKind, Tile, TileId, Toggles};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Frames rendered per block by [`PlaybackEngine::advance`]
const ADVANCE_BLOCK_FRAMES: usize = 1024;

/// Pending return of a voice to normal speed
#[derive(Debug, Clone, Copy)]
struct RateRestore {
    voice: VoiceId,
    due: u64,
}

/// Session-wide mixer
///
/// Owns the hydrated clips, the active voices, the focus, and every timer.
pub struct PlaybackEngine {
    settings: EngineSettings,
    registry: ClipRegistry,

    /// Active voices in start order
    voices: Vec<Voice>,
    focus: Option<VoiceId>,
    /// Tile of the latest local play; survives its voice ending
    last_started: Option<TileId>,
    next_voice: u64,

    fades: Vec<FadeJob>,
    rate_restores: Vec<RateRestore>,
    meter: LevelMeter,
    /// Next meter sample; `None` while nothing is active
    meter_due: Option<u64>,

    /// Output clock in frames
    clock: u64,
    scratch: Vec<f32>,
    tap: Vec<f32>,

    remote: Option<Arc<dyn RemoteProvider>>,
    pending_events: Vec<EngineEvent>,
}

impl PlaybackEngine {
    /// Create an engine with the given tuning
    pub fn new(settings: EngineSettings) -> Self {
        let meter = LevelMeter::new(settings.meter_window_frames);
        Self {
            settings,
            registry: ClipRegistry::new(),
            voices: Vec::new(),
            focus: None,
            last_started: None,
            next_voice: 0,
            fades: Vec::new(),
            rate_restores: Vec::new(),
            meter,
            meter_due: None,
            clock: 0,
            scratch: Vec::new(),
            tap: Vec::new(),
            remote: None,
            pending_events: Vec::new(),
        }
    }

    /// Engine tuning
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Install the provider used for remote tiles
    pub fn set_remote_provider(&mut self, provider: Arc<dyn RemoteProvider>) {
        self.remote = Some(provider);
    }

    // ===== Clip ownership =====

    /// Take ownership of a decoded clip
    pub fn register_clip(&mut self, clip: DecodedClip) -> ClipHandle {
        let handle = self.registry.register(clip);
        debug!(%handle, live = self.registry.len(), "registered clip");
        handle
    }

    /// Whether a handle still refers to a live clip
    pub fn is_live(&self, handle: ClipHandle) -> bool {
        self.registry.get(handle).is_some()
    }

    /// Number of live clips
    pub fn live_clips(&self) -> usize {
        self.registry.len()
    }

    /// Free a clip and stop every voice playing it
    ///
    /// Returns `false` if the handle was already released.
    pub fn release(&mut self, handle: ClipHandle) -> bool {
        if !self.registry.release(handle) {
            return false;
        }

        let doomed: Vec<VoiceId> = self
            .voices
            .iter()
            .filter(|v| v.handle == handle)
            .map(|v| v.id)
            .collect();
        for id in doomed {
            if let Some(mut voice) = self.remove_voice(id) {
                voice.stop();
            }
        }

        debug!(%handle, "released clip");
        self.pending_events.push(EngineEvent::ClipReleased { handle });
        true
    }

    /// Stop everything and free every clip
    pub fn shutdown(&mut self) {
        self.stop_all();
        let freed = self.registry.release_all();
        self.rate_restores.clear();
        info!(freed, "playback engine shut down");
    }

    // ===== Transport =====

    /// Play a tile
    ///
    /// `toggles` are read now; later changes never affect this voice.
    pub fn play(&mut self, tile: &Tile, toggles: &Toggles) -> PlayOutcome {
        if tile.inactive {
            debug!(tile = %tile.id, "tile inactive, not playing");
            return PlayOutcome::Skipped;
        }

        match tile.source_kind {
            SourceKind::Remote => self.delegate(tile, toggles),
            SourceKind::LocalFile => self.play_local(tile, toggles),
        }
    }

    fn delegate(&mut self, tile: &Tile, toggles: &Toggles) -> PlayOutcome {
        let (Some(provider), Some(reference)) = (self.remote.clone(), tile.remote_ref.as_deref())
        else {
            debug!(tile = %tile.id, "no remote provider or reference");
            return PlayOutcome::Skipped;
        };

        if !toggles.multi {
            self.stop_all();
        }

        match provider.play(reference, tile.start_offset_seconds) {
            Ok(()) => {
                debug!(tile = %tile.id, reference, "delegated to remote provider");
                self.pending_events.push(EngineEvent::RemoteDelegated {
                    tile: tile.id.clone(),
                });
                PlayOutcome::Delegated
            }
            Err(e) => {
                warn!(tile = %tile.id, error = %e, "remote provider failed");
                PlayOutcome::Skipped
            }
        }
    }

    fn play_local(&mut self, tile: &Tile, toggles: &Toggles) -> PlayOutcome {
        let Some((handle, clip)) = tile
            .resolved
            .and_then(|h| self.registry.get(h).map(|clip| (h, clip)))
        else {
            debug!(tile = %tile.id, "tile not hydrated, not playing");
            return PlayOutcome::Skipped;
        };

        if !toggles.multi {
            self.stop_all();
        }

        if toggles.auto_fade {
            if let Some(previous) = self.focus {
                self.fade_out(previous, self.settings.autofade_on_play);
            }
        }

        self.next_voice += 1;
        let id = VoiceId(self.next_voice);
        let mut voice = Voice::new(
            id,
            tile.id.clone(),
            handle,
            clip,
            self.settings.sample_rate,
            VoiceOptions {
                gain: tile.volume,
                looping: toggles.loop_playback,
                auto_fade_on_end: toggles.auto_fade,
                start_offset_seconds: tile.start_offset_seconds,
            },
        );
        voice.start();
        self.voices.push(voice);
        self.focus = Some(id);
        self.last_started = Some(tile.id.clone());
        self.meter.attach(id);
        if self.meter_due.is_none() {
            self.meter_due = Some(self.clock + self.meter_interval_frames());
        }

        debug!(voice = %id, tile = %tile.id, active = self.voices.len(), "voice started");
        self.pending_events.push(EngineEvent::VoiceStarted {
            voice: id,
            tile: tile.id.clone(),
        });
        PlayOutcome::Started(id)
    }

    /// Stop and rewind every active voice
    ///
    /// Clears focus, cancels fades, stops metering, and resets progress.
    /// Pending rate restores are left to fire on their own.
    pub fn stop_all(&mut self) {
        let count = self.voices.len();
        for voice in &mut self.voices {
            voice.stop();
        }
        self.voices.clear();
        self.focus = None;
        self.last_started = None;
        self.fades.clear();
        self.stop_metering();

        if count > 0 {
            debug!(count, "stopped all voices");
        }
        self.pending_events.push(EngineEvent::VoicesStopped { count });
        self.pending_events
            .push(EngineEvent::Progress(ProgressReport::idle()));
    }

    /// Fade a voice out linearly over `duration`
    ///
    /// Replaces any fade already running on the voice. Returns `false` if
    /// the voice is not active.
    pub fn fade_out(&mut self, voice: VoiceId, duration: Duration) -> bool {
        let Some(gain) = self.voice(voice).map(Voice::gain) else {
            return false;
        };

        self.fades.retain(|f| f.voice != voice);
        let job = FadeJob::new(
            voice,
            gain,
            self.settings.fade_steps,
            self.clock,
            self.settings.frames(duration),
        );
        debug!(%voice, ?duration, from = gain, "fade out");
        self.fades.push(job);
        self.fire_due_timers();
        true
    }

    /// Seek the focused voice back to its tile's start offset
    pub fn cue(&mut self) -> bool {
        match self.focused_voice_mut() {
            Some(voice) => {
                voice.cue();
                true
            }
            None => false,
        }
    }

    /// Speed up the focused voice for the rapid window
    ///
    /// The restore is scheduled on its own and fires even if the voice was
    /// stopped meanwhile.
    pub fn rapid(&mut self) -> bool {
        let rate = self.settings.rapid_rate;
        let due = self.clock + self.settings.frames(self.settings.rapid_window);
        let Some(voice) = self.focused_voice_mut() else {
            return false;
        };

        voice.rate = rate;
        let id = voice.id;
        self.rate_restores.push(RateRestore { voice: id, due });
        self.pending_events
            .push(EngineEvent::RateChanged { voice: id, rate });
        true
    }

    /// Flip Playing/Paused on the focused voice
    ///
    /// Returns the new paused state, or `None` with no focus.
    pub fn toggle_pause(&mut self) -> Option<bool> {
        self.focused_voice_mut().map(Voice::toggle_pause)
    }

    // ===== Queries =====

    /// Progress of the focused voice, or the neutral report
    pub fn progress(&self) -> ProgressReport {
        self.focused_voice()
            .map_or_else(ProgressReport::idle, Voice::progress)
    }

    /// Focused voice ID
    pub fn focused(&self) -> Option<VoiceId> {
        self.focus
    }

    /// Tile of the focused voice
    pub fn focused_tile(&self) -> Option<&TileId> {
        self.focused_voice().map(Voice::tile)
    }

    /// Tile most recently started locally
    ///
    /// Still set after that voice ends on its own; cleared by `stop_all`.
    pub fn last_started_tile(&self) -> Option<&TileId> {
        self.last_started.as_ref()
    }

    /// Number of active voices
    pub fn active_count(&self) -> usize {
        self.voices.len()
    }

    /// Active voices in start order
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Whether a voice is in the active set
    pub fn is_active(&self, voice: VoiceId) -> bool {
        self.voice(voice).is_some()
    }

    /// Current gain of an active voice
    pub fn voice_gain(&self, voice: VoiceId) -> Option<f32> {
        self.voice(voice).map(Voice::gain)
    }

    /// State of an active voice
    pub fn voice_state(&self, voice: VoiceId) -> Option<VoiceState> {
        self.voice(voice).map(Voice::state)
    }

    /// Current rate of an active voice
    pub fn voice_rate(&self, voice: VoiceId) -> Option<f32> {
        self.voice(voice).map(Voice::rate)
    }

    /// Whether a fade is running on a voice
    pub fn is_fading(&self, voice: VoiceId) -> bool {
        self.fades.iter().any(|f| f.voice == voice)
    }

    /// Whether level sampling is running
    pub fn is_metering(&self) -> bool {
        self.meter_due.is_some()
    }

    /// Shared level meter
    pub fn meter(&self) -> &LevelMeter {
        &self.meter
    }

    /// Output clock position
    pub fn elapsed(&self) -> Duration {
        Duration::from_secs_f64(self.clock as f64 / f64::from(self.settings.sample_rate.max(1)))
    }

    /// Take every buffered event
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Rendering =====

    /// Mix active voices into interleaved stereo `output`
    ///
    /// The buffer is overwritten. Returns the number of frames rendered.
    pub fn process_audio(&mut self, output: &mut [f32]) -> usize {
        output.fill(0.0);
        let frames = output.len() / 2;
        let mut done = 0;

        while done < frames {
            self.fire_due_timers();

            let until_deadline = self
                .next_deadline()
                .map_or(u64::MAX, |due| due.saturating_sub(self.clock).max(1));
            let chunk = (frames - done).min(usize::try_from(until_deadline).unwrap_or(usize::MAX));

            self.render_chunk(&mut output[done * 2..(done + chunk) * 2]);
            self.clock += chunk as u64;
            done += chunk;
            self.reap_ended();
        }

        self.fire_due_timers();
        frames
    }

    /// Render `duration` of output into scratch space
    ///
    /// Used by headless drivers that only need timers and events.
    pub fn advance(&mut self, duration: Duration) {
        let mut remaining = self.settings.frames(duration) as usize;
        let mut scratch = std::mem::take(&mut self.scratch);
        while remaining > 0 {
            let frames = remaining.min(ADVANCE_BLOCK_FRAMES);
            scratch.resize(frames * 2, 0.0);
            self.process_audio(&mut scratch[..frames * 2]);
            remaining -= frames;
        }
        self.scratch = scratch;
    }

    fn render_chunk(&mut self, out: &mut [f32]) {
        let mut tap = std::mem::take(&mut self.tap);
        tap.clear();
        tap.resize(out.len(), 0.0);

        for voice in &mut self.voices {
            let tapped = self.meter.is_attached(voice.id);
            voice.render(out, tapped.then_some(&mut tap[..]));
        }

        if self.meter_due.is_some() {
            self.meter.push(&tap);
        }
        self.tap = tap;
    }

    // ===== Timers =====

    fn next_deadline(&self) -> Option<u64> {
        let fades = self.fades.iter().map(FadeJob::due);
        let restores = self.rate_restores.iter().map(|r| r.due);
        fades.chain(restores).chain(self.meter_due).min()
    }

    fn fire_due_timers(&mut self) {
        let now = self.clock;

        while let Some(index) = self.fades.iter().position(|f| f.due() <= now) {
            let voice = self.fades[index].voice;
            match self.fades[index].step() {
                FadeStep::Lowered(gain) => {
                    if let Some(v) = self.voice_mut(voice) {
                        v.gain = gain;
                    }
                }
                FadeStep::Finished => {
                    self.fades.remove(index);
                    if let Some(v) = self.voice_mut(voice) {
                        v.gain = 0.0;
                        v.pause();
                    }
                    debug!(%voice, "fade complete");
                    self.pending_events
                        .push(EngineEvent::FadeCompleted { voice });
                }
            }
        }

        let (due, pending): (Vec<_>, Vec<_>) =
            self.rate_restores.drain(..).partition(|r| r.due <= now);
        self.rate_restores = pending;
        for restore in due {
            if let Some(voice) = self.voice_mut(restore.voice) {
                voice.rate = 1.0;
                self.pending_events.push(EngineEvent::RateChanged {
                    voice: restore.voice,
                    rate: 1.0,
                });
            }
        }

        if let Some(due) = self.meter_due {
            if due <= now {
                let level = self.meter.reading();
                let progress = self.progress();
                self.pending_events.push(EngineEvent::Level(level));
                self.pending_events.push(EngineEvent::Progress(progress));
                self.meter_due = Some(now + self.meter_interval_frames());
            }
        }
    }

    fn meter_interval_frames(&self) -> u64 {
        self.settings.frames(self.settings.meter_interval).max(1)
    }

    fn stop_metering(&mut self) {
        self.meter_due = None;
        self.meter.clear();
    }

    // ===== Voice bookkeeping =====

    fn reap_ended(&mut self) {
        let ended: Vec<VoiceId> = self
            .voices
            .iter()
            .filter(|v| v.is_finished())
            .map(|v| v.id)
            .collect();

        for id in ended {
            let Some(voice) = self.remove_voice(id) else {
                continue;
            };
            debug!(voice = %id, tile = %voice.tile, "voice ended");
            self.pending_events.push(EngineEvent::VoiceEnded {
                voice: id,
                tile: voice.tile.clone(),
            });

            if voice.auto_fade_on_end {
                if let Some(previous) = self.focus {
                    if !self.is_fading(previous) {
                        self.fade_out(previous, self.settings.autofade_on_end);
                    }
                }
            }
        }
    }

    /// Drop a voice from the active set, fixing focus and metering
    fn remove_voice(&mut self, id: VoiceId) -> Option<Voice> {
        let index = self.voices.iter().position(|v| v.id == id)?;
        let voice = self.voices.remove(index);
        self.fades.retain(|f| f.voice != id);
        self.meter.detach(id);

        if self.focus == Some(id) {
            self.focus = self.voices.last().map(|v| v.id);
        }
        if self.voices.is_empty() {
            self.stop_metering();
        }
        Some(voice)
    }

    fn voice(&self, id: VoiceId) -> Option<&Voice> {
        self.voices.iter().find(|v| v.id == id)
    }

    fn voice_mut(&mut self, id: VoiceId) -> Option<&mut Voice> {
        self.voices.iter_mut().find(|v| v.id == id)
    }

    fn focused_voice(&self) -> Option<&Voice> {
        self.focus.and_then(|id| self.voice(id))
    }

    fn focused_voice_mut(&mut self) -> Option<&mut Voice> {
        let id = self.focus?;
        self.voice_mut(id)
    }
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("voices", &self.voices.len())
            .field("focus", &self.focus)
            .field("clips", &self.registry.len())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
