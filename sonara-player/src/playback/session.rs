//! Playback session state
//!
//! Which track is *intended* to be current, plus the flags the UI renders
//! from. Position and play/pause status stay with the native player; the
//! session never duplicates them.

use serde::Serialize;
use sonara_common::{RepeatMode, Track};
use uuid::Uuid;

/// Session owned by the coordinator
///
/// Mutated only by coordinator commands; everyone else reads snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaybackSession {
    /// Current track (None = nothing playing)
    pub current: Option<Track>,

    /// Queue entry of the current track, when it came from the queue
    pub entry_id: Option<Uuid>,

    /// Stream resolution / native load in progress
    pub loading: bool,

    /// Fading out of the previous track
    pub transitioning: bool,

    pub repeat_mode: RepeatMode,

    pub shuffle: bool,

    /// Detail ("advanced") view showing
    pub adv_open: bool,

    /// Generation of the most recent play request
    pub generation: u64,
}

/// Identity of the current track as seen by the autoplay policy
///
/// A replay of the same track keeps the key; any new selection (even of the
/// same song from another queue entry) changes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackKey {
    pub entry_id: Option<Uuid>,
    pub title: String,
    pub artist: String,
}

impl PlaybackSession {
    /// Either flag set: autoplay must hold off
    pub fn is_busy(&self) -> bool {
        self.loading || self.transitioning
    }

    pub fn track_key(&self) -> Option<TrackKey> {
        self.current.as_ref().map(|track| TrackKey {
            entry_id: self.entry_id,
            title: track.title.clone(),
            artist: track.artist.clone(),
        })
    }
}
