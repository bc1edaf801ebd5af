//! Native player capability surface
//!
//! The platform audio engine (decoding, output, lock-screen controls) is
//! outside this crate. The coordinator only ever talks to it through
//! [`NativePlayer`], which mirrors the handful of calls a mobile track player
//! exposes: status, a single loaded item, transport, volume, repeat, reset.

mod headless;

pub use headless::{HeadlessPlayer, NativeCall};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sonara_common::{Track, TrackOrigin};
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Discrete status reported by the native player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeState {
    /// Nothing loaded
    None,
    /// Item loaded, not started
    Ready,
    Playing,
    Paused,
    Stopped,
    Buffering,
    Loading,
    /// Reached the end of the item without looping
    Ended,
    Error,
}

impl NativeState {
    /// States in which the native layer still holds a live session
    pub fn is_active(self) -> bool {
        matches!(
            self,
            NativeState::Playing | NativeState::Paused | NativeState::Buffering | NativeState::Ready
        )
    }
}

impl std::fmt::Display for NativeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NativeState::None => "none",
            NativeState::Ready => "ready",
            NativeState::Playing => "playing",
            NativeState::Paused => "paused",
            NativeState::Stopped => "stopped",
            NativeState::Buffering => "buffering",
            NativeState::Loading => "loading",
            NativeState::Ended => "ended",
            NativeState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Native repeat capability: off or loop the single loaded item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeRepeat {
    Off,
    Track,
}

/// Position and duration in seconds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub position: f64,
    pub duration: f64,
}

/// The one item the native player holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeItem {
    pub id: String,
    pub url: String,
    pub title: String,
    pub artist: String,
    pub artwork: Option<String>,
    pub duration: Option<f64>,
    pub headers: Option<HashMap<String, String>>,
}

impl TryFrom<&Track> for NativeItem {
    type Error = Error;

    fn try_from(track: &Track) -> Result<Self> {
        let url = track
            .stream_url
            .clone()
            .ok_or_else(|| Error::Resolution(format!("'{}' has no stream URL", track.title)))?;

        Ok(NativeItem {
            id: track.id.clone(),
            url,
            title: track.title.clone(),
            artist: track.artist.clone(),
            artwork: track.artwork.clone(),
            duration: track.duration,
            headers: track.headers.clone(),
        })
    }
}

impl NativeItem {
    /// Rebuild a track from the item metadata read back from the player
    ///
    /// Only resolved streams are ever loaded, so the result is treated as a
    /// direct (search-origin) track.
    pub fn into_track(self) -> Track {
        Track {
            id: self.id,
            title: self.title,
            artist: self.artist,
            artwork: self.artwork,
            stream_url: Some(self.url),
            duration: self.duration,
            headers: self.headers,
            origin: TrackOrigin::Search,
        }
    }
}

/// Imperative API of the platform track player
///
/// All calls may fail; callers treat failures as recoverable.
#[async_trait]
pub trait NativePlayer: Send + Sync {
    /// Current discrete status
    async fn state(&self) -> Result<NativeState>;

    /// Replace whatever is loaded with exactly this item
    async fn load(&self, item: NativeItem) -> Result<()>;

    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    /// Seek to an absolute position in seconds
    async fn seek_to(&self, position: f64) -> Result<()>;

    /// Output volume, 0.0..=1.0
    async fn set_volume(&self, volume: f32) -> Result<()>;

    async fn volume(&self) -> Result<f32>;

    async fn set_repeat(&self, repeat: NativeRepeat) -> Result<()>;

    async fn progress(&self) -> Result<Progress>;

    /// Metadata of the loaded item, if any
    async fn current_item(&self) -> Result<Option<NativeItem>>;

    /// Clear the loaded item and stop
    async fn reset(&self) -> Result<()>;
}
