//! Event types and broadcast bus
//!
//! The player is the single owner of session state; anything that renders it
//! (HTTP clients over SSE, a future native shell) subscribes to these events
//! instead of reading shared state directly.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::track::{RepeatMode, Track};

/// Why a `play_track` call ended without a track playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackFailure {
    /// Stream lookup failed or returned no stream URL
    Resolution,
    /// A native player call failed
    Native,
}

/// Session change notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SonaraEvent {
    /// The current track slot changed (None = nothing playing)
    CurrentTrackChanged {
        track: Option<Track>,
        entry_id: Option<Uuid>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Loading / transitioning flags changed
    SessionFlagsChanged {
        loading: bool,
        transitioning: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    RepeatModeChanged {
        mode: RepeatMode,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    ShuffleChanged {
        enabled: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Detail ("advanced") view opened or closed
    AdvancedViewChanged {
        open: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Queue replaced by a new browsing context
    QueueReplaced {
        context: String,
        length: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A play request ended with nothing playing
    PlaybackFailed {
        title: String,
        artist: String,
        reason: PlaybackFailure,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A session left running by the native player was picked up at startup
    SessionRestored {
        track: Track,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl SonaraEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            SonaraEvent::CurrentTrackChanged { .. } => "CurrentTrackChanged",
            SonaraEvent::SessionFlagsChanged { .. } => "SessionFlagsChanged",
            SonaraEvent::RepeatModeChanged { .. } => "RepeatModeChanged",
            SonaraEvent::ShuffleChanged { .. } => "ShuffleChanged",
            SonaraEvent::AdvancedViewChanged { .. } => "AdvancedViewChanged",
            SonaraEvent::QueueReplaced { .. } => "QueueReplaced",
            SonaraEvent::PlaybackFailed { .. } => "PlaybackFailed",
            SonaraEvent::SessionRestored { .. } => "SessionRestored",
        }
    }
}

/// One-to-many event broadcaster
///
/// Thin wrapper over `tokio::sync::broadcast`. Slow subscribers lag and lose
/// the oldest events rather than blocking the player.
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<SonaraEvent>,
    capacity: usize,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<SonaraEvent> {
        self.tx.subscribe()
    }

    /// Emit an event; `Err` when nobody is listening
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: SonaraEvent,
    ) -> Result<usize, broadcast::error::SendError<SonaraEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the no-subscriber case
    pub fn emit_lossy(&self, event: SonaraEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
