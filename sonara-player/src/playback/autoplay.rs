//! Autoplay / repeat policy
//!
//! The native player only knows "loop this one item" or "stop at the end".
//! Repeat-once and advancing to the next queued track are implemented here
//! by watching the position stream for the last moments of a track.
//!
//! [`AutoplayPolicy`] is the pure state machine; [`AutoplayMonitor`] feeds it
//! from a fixed-interval poll of the native position and carries out the
//! resulting actions on the [`Coordinator`].

use sonara_common::RepeatMode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::coordinator::Coordinator;
use super::session::TrackKey;

/// Trigger when at most this many seconds remain
pub const NEAR_END_WINDOW_SECS: f64 = 1.5;

/// Never trigger before this much of the track has played
pub const MIN_ELAPSED_SECS: f64 = 5.0;

/// After a repeat-once replay, wait this long before re-arming
pub const REPEAT_ONCE_SETTLE: Duration = Duration::from_secs(2);

/// One observation of the position stream plus the session flags
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSample {
    pub position: f64,
    pub duration: f64,
    /// `loading` or `transitioning` set
    pub busy: bool,
    pub repeat_mode: RepeatMode,
    pub track: Option<TrackKey>,
}

/// What the monitor should do after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayAction {
    None,
    /// Seek to 0 and keep playing (first completion in repeat-once)
    ReplayCurrent,
    /// Second completion in repeat-once: repeat off, then skip to next
    FinishRepeatOnce,
    /// Repeat off: play the next queue entry if there is one
    AdvanceToNext,
}

/// Policy phase for the current track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyPhase {
    /// Watching for the near-end window
    Armed,
    /// Action dispatched; re-arms at `release_at` if set, otherwise only when
    /// the track changes
    Triggered { release_at: Option<Instant> },
}

/// End-of-track state machine, reset whenever the current track changes
#[derive(Debug)]
pub struct AutoplayPolicy {
    track: Option<TrackKey>,
    phase: PolicyPhase,
    repeated_once: bool,
}

impl AutoplayPolicy {
    pub fn new() -> Self {
        Self {
            track: None,
            phase: PolicyPhase::Armed,
            repeated_once: false,
        }
    }

    pub fn phase(&self) -> PolicyPhase {
        self.phase
    }

    /// Whether the single repeat already happened for this track
    pub fn repeated_once(&self) -> bool {
        self.repeated_once
    }

    pub fn on_position_update(&mut self, sample: &PlaybackSample, now: Instant) -> AutoplayAction {
        if sample.track != self.track {
            self.track = sample.track.clone();
            self.phase = PolicyPhase::Armed;
            self.repeated_once = false;
        }
        if self.track.is_none() {
            return AutoplayAction::None;
        }

        if let PolicyPhase::Triggered { release_at: Some(at) } = self.phase {
            if now >= at {
                self.phase = PolicyPhase::Armed;
            }
        }

        if self.phase != PolicyPhase::Armed
            || sample.busy
            || !is_near_end(sample.position, sample.duration)
        {
            return AutoplayAction::None;
        }

        match sample.repeat_mode {
            // Native loop takes care of it
            RepeatMode::Track => AutoplayAction::None,
            RepeatMode::Once if !self.repeated_once => {
                self.repeated_once = true;
                self.phase = PolicyPhase::Triggered {
                    release_at: Some(now + REPEAT_ONCE_SETTLE),
                };
                AutoplayAction::ReplayCurrent
            }
            RepeatMode::Once => {
                self.phase = PolicyPhase::Triggered { release_at: None };
                AutoplayAction::FinishRepeatOnce
            }
            RepeatMode::Off => {
                self.phase = PolicyPhase::Triggered { release_at: None };
                AutoplayAction::AdvanceToNext
            }
        }
    }
}

impl Default for AutoplayPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Inside the near-end window, and far enough in that a not-yet-loaded
/// stream (duration 0, position 0) can never qualify
pub fn is_near_end(position: f64, duration: f64) -> bool {
    let remaining = duration - position;
    remaining > 0.0 && remaining <= NEAR_END_WINDOW_SECS && position >= MIN_ELAPSED_SECS
}

/// Drives the policy from the native position and applies its actions
pub struct AutoplayMonitor {
    coordinator: Arc<Coordinator>,
    policy: Mutex<AutoplayPolicy>,
    interval: Duration,
}

impl AutoplayMonitor {
    pub fn new(coordinator: Arc<Coordinator>, interval: Duration) -> Self {
        Self {
            coordinator,
            policy: Mutex::new(AutoplayPolicy::new()),
            interval,
        }
    }

    /// Feed one position observation through the policy and act on it
    pub async fn on_position_update(&self, position: f64, duration: f64) -> AutoplayAction {
        let session = self.coordinator.snapshot().await;
        let sample = PlaybackSample {
            position,
            duration,
            busy: session.is_busy(),
            repeat_mode: session.repeat_mode,
            track: session.track_key(),
        };

        let action = self
            .policy
            .lock()
            .await
            .on_position_update(&sample, Instant::now());

        if action != AutoplayAction::None {
            info!(?action, position, duration, "Autoplay triggered");
            self.dispatch(action).await;
        }
        action
    }

    /// Read the native position once and feed it to the policy
    pub async fn poll_once(&self) -> Option<AutoplayAction> {
        match self.coordinator.player().progress().await {
            Ok(progress) => Some(self.on_position_update(progress.position, progress.duration).await),
            Err(e) => {
                debug!(error = %e, "Position poll failed");
                None
            }
        }
    }

    /// Current policy phase and repeat-once flag
    pub async fn policy_state(&self) -> (PolicyPhase, bool) {
        let policy = self.policy.lock().await;
        (policy.phase(), policy.repeated_once())
    }

    /// Poll on a fixed interval until `shutdown` flips to true
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval = ?self.interval, "Autoplay monitor started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Autoplay monitor stopped");
    }

    async fn dispatch(&self, action: AutoplayAction) {
        match action {
            AutoplayAction::None => {}
            AutoplayAction::ReplayCurrent => self.coordinator.replay_current().await,
            AutoplayAction::FinishRepeatOnce => {
                self.coordinator.set_repeat_mode(RepeatMode::Off).await;
                if self.coordinator.skip_next().await.is_none() {
                    debug!("Repeat-once finished with no next entry");
                }
            }
            AutoplayAction::AdvanceToNext => match self.coordinator.skip_next().await {
                Some(outcome) => debug!(?outcome, "Autoplay advanced"),
                None => debug!("End of queue; playback ends"),
            },
        }
        if matches!(action, AutoplayAction::FinishRepeatOnce | AutoplayAction::AdvanceToNext) {
            let current = self.coordinator.snapshot().await.current;
            if current.is_none() {
                warn!("Autoplay advance left nothing playing");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn key(title: &str) -> TrackKey {
        TrackKey {
            entry_id: Some(Uuid::nil()),
            title: title.to_string(),
            artist: "X".to_string(),
        }
    }

    fn sample(position: f64, mode: RepeatMode, track: Option<TrackKey>) -> PlaybackSample {
        PlaybackSample {
            position,
            duration: 180.0,
            busy: false,
            repeat_mode: mode,
            track,
        }
    }

    #[test]
    fn test_near_end_window() {
        assert!(is_near_end(178.5, 180.0));
        assert!(is_near_end(179.9, 180.0));
        assert!(!is_near_end(178.4, 180.0));
        assert!(!is_near_end(180.0, 180.0));
        // Short or unloaded streams never qualify
        assert!(!is_near_end(3.0, 4.0));
        assert!(!is_near_end(0.0, 0.0));
    }

    #[test]
    fn test_off_triggers_once_per_track() {
        let mut policy = AutoplayPolicy::new();
        let now = Instant::now();
        let a = Some(key("A"));

        assert_eq!(policy.on_position_update(&sample(100.0, RepeatMode::Off, a.clone()), now), AutoplayAction::None);
        assert_eq!(
            policy.on_position_update(&sample(179.0, RepeatMode::Off, a.clone()), now),
            AutoplayAction::AdvanceToNext
        );
        assert_eq!(policy.on_position_update(&sample(179.5, RepeatMode::Off, a.clone()), now), AutoplayAction::None);

        // New track re-arms
        let b = Some(key("B"));
        assert_eq!(
            policy.on_position_update(&sample(179.0, RepeatMode::Off, b), now),
            AutoplayAction::AdvanceToNext
        );
    }

    #[test]
    fn test_busy_session_suppresses_trigger() {
        let mut policy = AutoplayPolicy::new();
        let mut busy = sample(179.0, RepeatMode::Off, Some(key("A")));
        busy.busy = true;
        assert_eq!(policy.on_position_update(&busy, Instant::now()), AutoplayAction::None);
        assert_eq!(policy.phase(), PolicyPhase::Armed);
    }

    #[test]
    fn test_repeat_track_is_left_to_native_loop() {
        let mut policy = AutoplayPolicy::new();
        let action = policy.on_position_update(&sample(179.0, RepeatMode::Track, Some(key("A"))), Instant::now());
        assert_eq!(action, AutoplayAction::None);
        assert_eq!(policy.phase(), PolicyPhase::Armed);
    }

    #[test]
    fn test_repeat_once_replays_then_finishes_after_settle() {
        let mut policy = AutoplayPolicy::new();
        let a = Some(key("A"));
        let t0 = Instant::now();

        assert_eq!(
            policy.on_position_update(&sample(179.0, RepeatMode::Once, a.clone()), t0),
            AutoplayAction::ReplayCurrent
        );
        assert!(policy.repeated_once());

        // Still settling: even a near-end sample is ignored
        let early = t0 + Duration::from_millis(1500);
        assert_eq!(policy.on_position_update(&sample(179.0, RepeatMode::Once, a.clone()), early), AutoplayAction::None);

        // Released, replay plays through, second completion
        let later = t0 + Duration::from_secs(3);
        assert_eq!(policy.on_position_update(&sample(10.0, RepeatMode::Once, a.clone()), later), AutoplayAction::None);
        assert_eq!(policy.phase(), PolicyPhase::Armed);
        assert_eq!(
            policy.on_position_update(&sample(179.2, RepeatMode::Once, a), later + Duration::from_secs(170)),
            AutoplayAction::FinishRepeatOnce
        );
    }

    #[test]
    fn test_no_track_resets_state() {
        let mut policy = AutoplayPolicy::new();
        let now = Instant::now();
        policy.on_position_update(&sample(179.0, RepeatMode::Once, Some(key("A"))), now);
        assert!(policy.repeated_once());

        assert_eq!(policy.on_position_update(&sample(179.0, RepeatMode::Once, None), now), AutoplayAction::None);
        assert!(!policy.repeated_once());
    }
}
