//! # Sonara Common Library
//!
//! Shared code for the Sonara player and any front-end talking to it:
//! - Track model and descriptor normalization
//! - Repeat mode
//! - Event types (SonaraEvent enum) and the EventBus
//! - Bootstrap configuration loading
//! - Fade curve definitions and calculations

pub mod config;
pub mod error;
pub mod events;
pub mod fade_curves;
pub mod track;

pub use error::{Error, Result};
pub use fade_curves::FadeCurve;
pub use track::{RepeatMode, Track, TrackDescriptor, TrackIdentity, TrackOrigin};
