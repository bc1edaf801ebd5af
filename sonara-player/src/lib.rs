//! # Sonara Player Library (sonara-player)
//!
//! Playback session coordinator for the Sonara streaming client.
//!
//! **Purpose:** Own the single "current track" slot and the queue, serialize
//! track switches behind a fade-out/fade-in crossfade, auto-advance or repeat
//! at the end of a track, and pick up a session the native player kept alive
//! across restarts.
//!
//! **Architecture:** The audio engine is a black box behind [`native::NativePlayer`];
//! stream URLs come from the remote API through [`catalog::StreamResolver`].
//! The [`playback::Coordinator`] is the only mutator of session state and
//! publishes every change on the shared `EventBus`.

pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod native;
pub mod playback;

pub use error::{Error, Result};
