//! Playback session coordination
//!
//! - [`coordinator`]: the single writer of the current-track slot
//! - [`fader`]: volume ramps that mask track switches
//! - [`autoplay`]: end-of-track repeat / advance policy
//! - [`queue`]: ordered entries of the active browsing context
//! - [`reconciler`]: adopt or clear a surviving native session on startup

pub mod autoplay;
pub mod coordinator;
pub mod fader;
pub mod queue;
pub mod reconciler;
pub mod session;

pub use autoplay::{AutoplayAction, AutoplayMonitor, AutoplayPolicy};
pub use coordinator::{Coordinator, PlayOutcome, SkipPrevious};
pub use fader::{FadeSettings, Fader};
pub use queue::{Queue, QueueEntry};
pub use reconciler::reconcile;
pub use session::{PlaybackSession, TrackKey};
