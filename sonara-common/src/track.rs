//! Track model and descriptor normalization
//!
//! Listings hand the player tracks in two wire shapes: search results (already
//! carrying a stream identifier) and catalog chart entries (display fields only,
//! resolved later by exact title/artist match). Both are normalized into the
//! canonical [`Track`] before the player touches them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Where a track was discovered, which decides how its stream is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackOrigin {
    /// Chart/catalog listing: resolved by exact title + artist lookup
    Catalog,
    /// Search result: resolved directly by stream identifier
    Search,
}

/// Canonical track value
///
/// Never mutated in place: resolving a stream produces a new value via
/// [`Track::with_stream`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub artwork: Option<String>,
    /// Playable URL, present once resolved
    #[serde(default)]
    pub stream_url: Option<String>,
    /// Duration in seconds (authoritative once resolved)
    #[serde(default)]
    pub duration: Option<f64>,
    /// Extra request headers the stream host requires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    pub origin: TrackOrigin,
}

/// Display identity of a track (title + artist)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackIdentity {
    pub title: String,
    pub artist: String,
}

/// Stream lookup response shared by `/stream/{id}` and `/search/exact`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStream {
    #[serde(default)]
    pub stream_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
}

impl Track {
    pub fn identity(&self) -> TrackIdentity {
        TrackIdentity {
            title: self.title.clone(),
            artist: self.artist.clone(),
        }
    }

    /// Produce the playable version of this track from a stream lookup
    ///
    /// Fails when the lookup carried no usable `stream_url`. The resolved
    /// duration replaces the listing duration when present.
    pub fn with_stream(&self, stream: ResolvedStream) -> Result<Track> {
        let url = stream
            .stream_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                Error::NotFound(format!("no stream_url for '{}' by '{}'", self.title, self.artist))
            })?;

        Ok(Track {
            stream_url: Some(url),
            duration: stream.duration.or(self.duration),
            headers: stream.headers.or_else(|| self.headers.clone()),
            ..self.clone()
        })
    }
}

/// Listing duration: either display text ("3:45") or seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListingDuration {
    Seconds(f64),
    Text(String),
}

impl ListingDuration {
    pub fn as_seconds(&self) -> Option<f64> {
        match self {
            ListingDuration::Seconds(s) if *s > 0.0 => Some(*s),
            ListingDuration::Seconds(_) => None,
            ListingDuration::Text(text) => parse_clock(text),
        }
    }
}

/// Parse "m:ss" or "h:mm:ss" into seconds
///
/// Fields after the first must be below 60; overflowing input is rejected.
fn parse_clock(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let mut total = 0u64;
    for (i, part) in text.split(':').enumerate() {
        let value: u64 = part.trim().parse().ok()?;
        if i > 0 && value >= 60 {
            return None;
        }
        total = total.checked_mul(60)?.checked_add(value)?;
    }
    (total > 0).then_some(total as f64)
}

/// Search result as returned by `GET /search?q=`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "videoId")]
    pub video_id: String,
    pub uploader: String,
    #[serde(default)]
    pub duration: Option<ListingDuration>,
}

/// Chart entry from the catalog listings (top songs globally / per country)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSong {
    #[serde(default)]
    pub rank: u32,
    pub song_name: String,
    pub artist_name: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

/// Any accepted track shape
///
/// Variant order matters for untagged decoding: the canonical shape needs
/// `id` and `origin`, search results need `videoId`, catalog entries need
/// `song_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackDescriptor {
    Track(Track),
    Search(SearchResult),
    Catalog(CatalogSong),
}

impl TrackDescriptor {
    /// Normalize into the canonical track shape
    pub fn into_track(self) -> Track {
        match self {
            TrackDescriptor::Track(track) => track,
            TrackDescriptor::Search(result) => Track::from(result),
            TrackDescriptor::Catalog(song) => Track::from(song),
        }
    }
}

impl From<SearchResult> for Track {
    fn from(result: SearchResult) -> Self {
        Track {
            id: result.video_id,
            title: result.title,
            artist: result.uploader,
            artwork: result.thumbnail_url,
            stream_url: None,
            duration: result.duration.as_ref().and_then(ListingDuration::as_seconds),
            headers: None,
            origin: TrackOrigin::Search,
        }
    }
}

impl From<CatalogSong> for Track {
    fn from(song: CatalogSong) -> Self {
        Track {
            id: format!("catalog:{}:{}", song.artist_name, song.song_name),
            title: song.song_name,
            artist: song.artist_name,
            artwork: song.thumbnail,
            stream_url: None,
            duration: None,
            headers: None,
            origin: TrackOrigin::Catalog,
        }
    }
}

impl From<Track> for TrackDescriptor {
    fn from(track: Track) -> Self {
        TrackDescriptor::Track(track)
    }
}

/// Repeat behaviour for the current track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Advance through the queue when a track ends
    #[default]
    Off,
    /// Replay the current track one more time, then advance
    Once,
    /// Loop the current track indefinitely
    Track,
}

impl RepeatMode {
    /// Whether the native player's own single-track loop should be enabled
    pub fn loops_natively(self) -> bool {
        matches!(self, RepeatMode::Track)
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepeatMode::Off => write!(f, "off"),
            RepeatMode::Once => write!(f, "once"),
            RepeatMode::Track => write!(f, "track"),
        }
    }
}

impl FromStr for RepeatMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(RepeatMode::Off),
            "once" => Ok(RepeatMode::Once),
            "track" => Ok(RepeatMode::Track),
            other => Err(Error::InvalidInput(format!("unknown repeat mode: {}", other))),
        }
    }
}
