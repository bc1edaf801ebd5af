//! Stepped volume ramps on the native output
//!
//! The native player has no crossfade of its own and holds one item at a
//! time, so a track switch is masked by ramping the shared output volume:
//! out to silence before the old item is paused, back to full after the new
//! item starts. Each ramp is `steps` volume writes spaced `duration / steps`
//! apart (800 ms / 20 steps by default).

use sonara_common::config::FadeConfig;
use sonara_common::fade_curves::FadeDirection;
use sonara_common::FadeCurve;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::native::NativePlayer;

/// Ramp shape and timing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeSettings {
    pub duration: Duration,
    pub steps: u32,
    pub curve: FadeCurve,
}

impl Default for FadeSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(800),
            steps: 20,
            curve: FadeCurve::Linear,
        }
    }
}

impl From<&FadeConfig> for FadeSettings {
    fn from(config: &FadeConfig) -> Self {
        Self {
            duration: Duration::from_millis(config.duration_ms),
            steps: config.steps.max(1),
            curve: config.curve,
        }
    }
}

impl FadeSettings {
    /// Pause between two volume writes
    pub fn step_interval(&self) -> Duration {
        self.duration / self.steps.max(1)
    }
}

/// Drives volume ramps on a native player
#[derive(Debug, Clone, Copy)]
pub struct Fader {
    settings: FadeSettings,
}

impl Fader {
    pub fn new(settings: FadeSettings) -> Self {
        Self { settings }
    }

    /// Ramp from the current level to silence
    ///
    /// Gains are scaled by the level read at the start, so a ramp that takes
    /// over from an interrupted one continues downwards from where it stopped.
    pub async fn fade_out<F>(&self, player: &dyn NativePlayer, still_current: F) -> Result<()>
    where
        F: Fn() -> bool,
    {
        let start = player.volume().await?.clamp(0.0, 1.0);
        self.ramp(player, FadeDirection::Out, start, still_current).await
    }

    /// Ramp from silence to full volume
    pub async fn fade_in<F>(&self, player: &dyn NativePlayer, still_current: F) -> Result<()>
    where
        F: Fn() -> bool,
    {
        self.ramp(player, FadeDirection::In, 1.0, still_current).await
    }

    /// Write each step's gain, then wait one interval
    ///
    /// `still_current` is checked before every write; once it reports false
    /// the ramp stops with [`Error::Superseded`] and leaves the volume to
    /// whoever took over.
    async fn ramp<F>(
        &self,
        player: &dyn NativePlayer,
        direction: FadeDirection,
        scale: f32,
        still_current: F,
    ) -> Result<()>
    where
        F: Fn() -> bool,
    {
        let interval = self.settings.step_interval();
        let gains = self.settings.curve.steps(direction, self.settings.steps);
        debug!(?direction, steps = gains.len(), scale, ?interval, "Starting volume ramp");

        for gain in gains {
            if !still_current() {
                debug!(?direction, "Volume ramp superseded");
                return Err(Error::Superseded);
            }
            player.set_volume(gain * scale).await?;
            tokio::time::sleep(interval).await;
        }
        Ok(())
    }
}
