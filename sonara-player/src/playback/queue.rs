//! Playback queue
//!
//! Ordered list of tracks for the active browsing context (home listing,
//! search results, ...). Insertion order is playback order. Each entry gets a
//! stable `entry_id` when the queue is built, so position lookups never depend
//! on display titles being unique.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use sonara_common::{Track, TrackIdentity};
use uuid::Uuid;

/// Queue entry with its stable identifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueEntry {
    pub entry_id: Uuid,
    pub track: Track,
}

/// Queue for one browsing context
#[derive(Debug, Clone, Default)]
pub struct Queue {
    context: String,
    entries: Vec<QueueEntry>,
}

impl Queue {
    /// Build a queue, assigning a fresh entry id to every track
    pub fn new(context: impl Into<String>, tracks: Vec<Track>) -> Self {
        let entries = tracks
            .into_iter()
            .map(|track| QueueEntry {
                entry_id: Uuid::new_v4(),
                track,
            })
            .collect();
        Self {
            context: context.into(),
            entries,
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, entry_id: Uuid) -> Option<&QueueEntry> {
        self.entries.iter().find(|e| e.entry_id == entry_id)
    }

    pub fn position(&self, entry_id: Uuid) -> Option<usize> {
        self.entries.iter().position(|e| e.entry_id == entry_id)
    }

    /// First entry with this display identity
    ///
    /// Fallback for tracks that reached the player without an entry id.
    pub fn find_by_identity(&self, identity: &TrackIdentity) -> Option<&QueueEntry> {
        self.entries
            .iter()
            .find(|e| e.track.title == identity.title && e.track.artist == identity.artist)
    }

    /// Entry after `entry_id` in queue order
    pub fn successor(&self, entry_id: Uuid) -> Option<&QueueEntry> {
        let index = self.position(entry_id)?;
        self.entries.get(index + 1)
    }

    /// Entry before `entry_id` in queue order
    pub fn predecessor(&self, entry_id: Uuid) -> Option<&QueueEntry> {
        let index = self.position(entry_id)?;
        index.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Uniformly random entry other than `entry_id` (shuffle)
    pub fn random_other<R: Rng + ?Sized>(&self, entry_id: Uuid, rng: &mut R) -> Option<&QueueEntry> {
        let candidates: Vec<&QueueEntry> = self
            .entries
            .iter()
            .filter(|e| e.entry_id != entry_id)
            .collect();
        candidates.choose(rng).copied()
    }
}
