//! Playback session coordinator
//!
//! Serializes every change of the "current track" slot and exposes the
//! commands the UI layer issues (play, skip, repeat, shuffle, seek, detail
//! view). Every native-player and network failure is swallowed here: the
//! visible symptom is simply that nothing plays.
//!
//! # Track switch
//!
//! 1. If something is playing, set `transitioning`, ramp the output to
//!    silence and pause it.
//! 2. Optimistically publish the new track with `loading` set.
//! 3. Resolve the stream (by id for search results, exact title + artist for
//!    catalog entries).
//! 4. Load exactly that one item, then fade back in (if step 1 faded out) or
//!    play at full volume.
//! 5. On failure clear the current track and force the volume back to full.
//!
//! Each request takes a new generation number. A request that finds a newer
//! generation after any suspension point stops touching the native player,
//! the flags and the volume; the newer request owns them from then on.

use serde::Serialize;
use sonara_common::events::{EventBus, PlaybackFailure, SonaraEvent};
use sonara_common::{RepeatMode, Track, TrackDescriptor};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::fader::{FadeSettings, Fader};
use super::queue::{Queue, QueueEntry};
use super::session::PlaybackSession;
use crate::catalog::StreamResolver;
use crate::error::{Error, Result};
use crate::native::{NativeItem, NativePlayer, NativeRepeat, NativeState};

/// Past this many seconds, "previous" restarts the current track
pub const RESTART_THRESHOLD_SECS: f64 = 5.0;

/// How a play request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayOutcome {
    /// The track is loaded and playing at full volume
    Playing,
    /// Resolution or a native call failed; nothing is playing
    Failed,
    /// A newer request took over before this one finished
    Superseded,
}

/// Result of `skip_previous`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result", content = "outcome")]
pub enum SkipPrevious {
    /// Current track sought back to the start
    Restarted,
    /// Moved to the previous queue entry
    Played(PlayOutcome),
    /// Nothing current, nothing to do
    Idle,
}

pub struct Coordinator {
    player: Arc<dyn NativePlayer>,
    resolver: Arc<dyn StreamResolver>,
    fader: Fader,
    session: RwLock<PlaybackSession>,
    queue: RwLock<Queue>,
    generation: AtomicU64,
    events: Arc<EventBus>,
}

impl Coordinator {
    pub fn new(
        player: Arc<dyn NativePlayer>,
        resolver: Arc<dyn StreamResolver>,
        fade: FadeSettings,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            player,
            resolver,
            fader: Fader::new(fade),
            session: RwLock::new(PlaybackSession::default()),
            queue: RwLock::new(Queue::default()),
            generation: AtomicU64::new(0),
            events,
        }
    }

    pub fn player(&self) -> &Arc<dyn NativePlayer> {
        &self.player
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SonaraEvent> {
        self.events.subscribe()
    }

    /// Copy of the current session state
    pub async fn snapshot(&self) -> PlaybackSession {
        self.session.read().await.clone()
    }

    /// Copy of the current queue
    pub async fn queue(&self) -> Queue {
        self.queue.read().await.clone()
    }

    // ------------------------------------------------------------------
    // Queue
    // ------------------------------------------------------------------

    /// Replace the queue with a new browsing context
    ///
    /// The current track keeps playing; it stays reachable for skips only if
    /// the new listing contains it.
    pub async fn set_queue(&self, context: &str, tracks: Vec<Track>) -> Vec<QueueEntry> {
        let queue = Queue::new(context, tracks);
        let entries = queue.entries().to_vec();
        info!(context, length = entries.len(), "Queue replaced");

        *self.queue.write().await = queue;
        self.emit(SonaraEvent::QueueReplaced {
            context: context.to_string(),
            length: entries.len(),
            timestamp: chrono::Utc::now(),
        });
        entries
    }

    // ------------------------------------------------------------------
    // Play requests
    // ------------------------------------------------------------------

    /// Play any accepted track shape (search result, catalog entry, track)
    pub async fn play_descriptor(&self, descriptor: TrackDescriptor) -> PlayOutcome {
        self.play_track(descriptor.into_track()).await
    }

    /// Play a track selected outside the queue
    ///
    /// If the queue holds an entry with the same title and artist, that entry
    /// becomes the skip/autoplay anchor.
    pub async fn play_track(&self, track: Track) -> PlayOutcome {
        let entry_id = self
            .queue
            .read()
            .await
            .find_by_identity(&track.identity())
            .map(|e| e.entry_id);
        self.start(track, entry_id).await
    }

    /// Play a queue entry by its stable id
    pub async fn play_entry(&self, entry_id: Uuid) -> Result<PlayOutcome> {
        let entry = self
            .queue
            .read()
            .await
            .get(entry_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("queue entry {}", entry_id)))?;
        Ok(self.start(entry.track, Some(entry.entry_id)).await)
    }

    async fn start(&self, track: Track, entry_id: Option<Uuid>) -> PlayOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut session = self.session.write().await;
            session.generation = session.generation.max(generation);
        }
        info!(generation, title = %track.title, artist = %track.artist, origin = ?track.origin, "Play requested");

        let result = self.transition(generation, &track, entry_id).await;

        // Flags belong to the newest request; it clears them whatever happened
        let latest = self.is_latest(generation);
        if latest {
            self.set_flags(false, false).await;
        }

        match result {
            Ok(()) => {
                info!(generation, title = %track.title, "Playback started");
                PlayOutcome::Playing
            }
            Err(Error::Superseded) => {
                debug!(generation, title = %track.title, "Play request superseded");
                PlayOutcome::Superseded
            }
            Err(e) if !latest => {
                debug!(generation, error = %e, "Superseded request failed; ignoring");
                PlayOutcome::Superseded
            }
            Err(e) => {
                warn!(generation, title = %track.title, error = %e, "Play request failed");
                let reason = match e {
                    Error::Native(_) => PlaybackFailure::Native,
                    _ => PlaybackFailure::Resolution,
                };
                self.fail(&track, reason).await;
                PlayOutcome::Failed
            }
        }
    }

    async fn transition(&self, generation: u64, track: &Track, entry_id: Option<Uuid>) -> Result<()> {
        let still_current = || self.is_latest(generation);

        let had_track = self.session.read().await.current.is_some();
        let faded = had_track && self.player.state().await? == NativeState::Playing;

        if faded {
            let loading = self.session.read().await.loading;
            self.set_flags(loading, true).await;
            self.fader.fade_out(self.player.as_ref(), still_current).await?;
            self.guard(generation)?;
            self.player.pause().await?;
        }
        self.guard(generation)?;

        // Optimistic: show the new track immediately with a spinner
        {
            let mut session = self.session.write().await;
            session.current = Some(track.clone());
            session.entry_id = entry_id;
            session.loading = true;
        }
        self.publish_current().await;
        self.publish_flags().await;

        let stream = self.resolver.resolve(track).await?;
        self.guard(generation)?;
        let playable = track
            .with_stream(stream)
            .map_err(|e| Error::Resolution(e.to_string()))?;
        debug!(generation, duration = ?playable.duration, "Stream resolved");

        self.player.load(NativeItem::try_from(&playable)?).await?;
        self.guard(generation)?;
        let repeat = self.session.read().await.repeat_mode;
        self.player.set_repeat(native_repeat(repeat)).await?;
        self.guard(generation)?;

        if faded {
            self.player.set_volume(0.0).await?;
            self.player.play().await?;
            self.fader.fade_in(self.player.as_ref(), still_current).await?;
        } else {
            self.player.set_volume(1.0).await?;
            self.player.play().await?;
        }
        self.guard(generation)?;

        self.session.write().await.current = Some(playable);
        self.publish_current().await;
        Ok(())
    }

    /// Failure path: nothing current, output back to full volume
    async fn fail(&self, track: &Track, reason: PlaybackFailure) {
        {
            let mut session = self.session.write().await;
            session.current = None;
            session.entry_id = None;
        }
        self.publish_current().await;
        self.emit(SonaraEvent::PlaybackFailed {
            title: track.title.clone(),
            artist: track.artist.clone(),
            reason,
            timestamp: chrono::Utc::now(),
        });

        if let Err(e) = self.player.set_volume(1.0).await {
            warn!(error = %e, "Could not restore output volume after failure");
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Play the next queue entry (random other entry when shuffling)
    ///
    /// Returns None when the current track has no successor or is not in the
    /// queue.
    pub async fn skip_next(&self) -> Option<PlayOutcome> {
        let Some(target) = self.next_entry().await else {
            debug!("skip_next: no next entry");
            return None;
        };
        Some(self.start(target.track, Some(target.entry_id)).await)
    }

    /// Restart the current track if it is past the threshold, else move to
    /// the previous queue entry
    pub async fn skip_previous(&self) -> SkipPrevious {
        let session = self.snapshot().await;
        if session.current.is_none() {
            debug!("skip_previous: nothing current");
            return SkipPrevious::Idle;
        }

        let position = match self.player.progress().await {
            Ok(progress) => progress.position,
            Err(e) => {
                warn!(error = %e, "Could not read position for skip_previous");
                0.0
            }
        };

        if position > RESTART_THRESHOLD_SECS {
            self.seek_to_start().await;
            return SkipPrevious::Restarted;
        }

        let target = {
            let queue = self.queue.read().await;
            locate_current(&queue, &session)
                .and_then(|id| queue.predecessor(id))
                .cloned()
        };

        match target {
            Some(entry) => SkipPrevious::Played(self.start(entry.track, Some(entry.entry_id)).await),
            // First entry (or not queued): restart instead
            None => {
                self.seek_to_start().await;
                SkipPrevious::Restarted
            }
        }
    }

    async fn next_entry(&self) -> Option<QueueEntry> {
        let session = self.snapshot().await;
        let queue = self.queue.read().await;
        let current = locate_current(&queue, &session)?;

        let next = if session.shuffle {
            queue.random_other(current, &mut rand::thread_rng())
        } else {
            queue.successor(current)
        };
        next.cloned()
    }

    // ------------------------------------------------------------------
    // Modes and transport
    // ------------------------------------------------------------------

    /// Switch repeat mode
    ///
    /// Only `Track` uses the native loop; `Once` and `Off` are handled by the
    /// autoplay policy, so the native loop is disabled for them.
    pub async fn set_repeat_mode(&self, mode: RepeatMode) {
        self.session.write().await.repeat_mode = mode;
        info!(%mode, "Repeat mode set");

        if let Err(e) = self.player.set_repeat(native_repeat(mode)).await {
            warn!(%mode, error = %e, "Native repeat update failed");
        }
        self.emit(SonaraEvent::RepeatModeChanged {
            mode,
            timestamp: chrono::Utc::now(),
        });
    }

    pub async fn set_shuffle(&self, enabled: bool) {
        self.session.write().await.shuffle = enabled;
        info!(enabled, "Shuffle set");
        self.emit(SonaraEvent::ShuffleChanged {
            enabled,
            timestamp: chrono::Utc::now(),
        });
    }

    pub async fn open_adv(&self) {
        self.set_adv(true).await;
    }

    pub async fn close_adv(&self) {
        self.set_adv(false).await;
    }

    async fn set_adv(&self, open: bool) {
        self.session.write().await.adv_open = open;
        self.emit(SonaraEvent::AdvancedViewChanged {
            open,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Mini-player play/pause button
    ///
    /// Returns the native state after the toggle, or None if the player was
    /// in a state that cannot be toggled (loading, buffering, no item).
    pub async fn toggle_play_pause(&self) -> Option<NativeState> {
        let state = match self.player.state().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Could not read native state for toggle");
                return None;
            }
        };

        let result = match state {
            NativeState::Playing => self.player.pause().await.map(|_| NativeState::Paused),
            NativeState::Paused | NativeState::Ready | NativeState::Stopped | NativeState::Ended => {
                self.player.play().await.map(|_| NativeState::Playing)
            }
            other => {
                debug!(state = %other, "Player not ready for toggle");
                return None;
            }
        };

        match result {
            Ok(new_state) => Some(new_state),
            Err(e) => {
                warn!(error = %e, "Play/pause toggle failed");
                None
            }
        }
    }

    /// Seek within the current track, clamped to its duration
    pub async fn seek(&self, position: f64) -> Option<f64> {
        let duration = match self.player.progress().await {
            Ok(progress) => progress.duration,
            Err(e) => {
                warn!(error = %e, "Could not read duration for seek");
                return None;
            }
        };
        if duration <= 0.0 {
            debug!("Seek ignored: no duration yet");
            return None;
        }

        let target = position.clamp(0.0, duration);
        match self.player.seek_to(target).await {
            Ok(()) => Some(target),
            Err(e) => {
                warn!(error = %e, "Seek failed");
                None
            }
        }
    }

    /// Replay the current track from the start (repeat-once)
    pub async fn replay_current(&self) {
        self.seek_to_start().await;
        if let Err(e) = self.player.play().await {
            warn!(error = %e, "Resume after replay seek failed");
        }
    }

    async fn seek_to_start(&self) {
        if let Err(e) = self.player.seek_to(0.0).await {
            warn!(error = %e, "Seek to start failed");
        }
    }

    // ------------------------------------------------------------------
    // Startup
    // ------------------------------------------------------------------

    /// Adopt a track the native player kept alive across a restart
    ///
    /// No fade, no stream lookup: the native layer already holds a valid
    /// stream for it.
    pub async fn restore(&self, track: Track) {
        let entry_id = self
            .queue
            .read()
            .await
            .find_by_identity(&track.identity())
            .map(|e| e.entry_id);
        {
            let mut session = self.session.write().await;
            session.current = Some(track.clone());
            session.entry_id = entry_id;
        }
        info!(title = %track.title, artist = %track.artist, "Session restored");
        self.emit(SonaraEvent::SessionRestored {
            track,
            timestamp: chrono::Utc::now(),
        });
        self.publish_current().await;
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn is_latest(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn guard(&self, generation: u64) -> Result<()> {
        if self.is_latest(generation) {
            Ok(())
        } else {
            Err(Error::Superseded)
        }
    }

    async fn set_flags(&self, loading: bool, transitioning: bool) {
        {
            let mut session = self.session.write().await;
            if session.loading == loading && session.transitioning == transitioning {
                return;
            }
            session.loading = loading;
            session.transitioning = transitioning;
        }
        self.publish_flags().await;
    }

    async fn publish_flags(&self) {
        let (loading, transitioning) = {
            let session = self.session.read().await;
            (session.loading, session.transitioning)
        };
        self.emit(SonaraEvent::SessionFlagsChanged {
            loading,
            transitioning,
            timestamp: chrono::Utc::now(),
        });
    }

    async fn publish_current(&self) {
        let (track, entry_id) = {
            let session = self.session.read().await;
            (session.current.clone(), session.entry_id)
        };
        self.emit(SonaraEvent::CurrentTrackChanged {
            track,
            entry_id,
            timestamp: chrono::Utc::now(),
        });
    }

    fn emit(&self, event: SonaraEvent) {
        self.events.emit_lossy(event);
    }
}

/// Queue entry of the current track: the recorded entry if it is still in
/// this queue, else the first entry with the same title and artist
fn locate_current(queue: &Queue, session: &PlaybackSession) -> Option<Uuid> {
    if let Some(id) = session.entry_id.filter(|id| queue.position(*id).is_some()) {
        return Some(id);
    }
    let track = session.current.as_ref()?;
    queue.find_by_identity(&track.identity()).map(|e| e.entry_id)
}

fn native_repeat(mode: RepeatMode) -> NativeRepeat {
    if mode.loops_natively() {
        NativeRepeat::Track
    } else {
        NativeRepeat::Off
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_repeat_mapping() {
        assert_eq!(native_repeat(RepeatMode::Track), NativeRepeat::Track);
        assert_eq!(native_repeat(RepeatMode::Once), NativeRepeat::Off);
        assert_eq!(native_repeat(RepeatMode::Off), NativeRepeat::Off);
    }

    #[test]
    fn test_skip_previous_serialization() {
        let json = serde_json::to_value(SkipPrevious::Played(PlayOutcome::Playing)).unwrap();
        assert_eq!(json["result"], "played");
        assert_eq!(json["outcome"], "playing");
        let json = serde_json::to_value(SkipPrevious::Restarted).unwrap();
        assert_eq!(json["result"], "restarted");
    }
}
