//! Headless native backend
//!
//! Simulates a track player without producing audio: position advances with
//! the tokio clock while playing, volume and repeat are stored, and the item
//! list holds at most one entry. The service binary runs on it when no
//! platform engine is attached, and tests use its call journal to assert on
//! the exact sequence of native calls.

use async_trait::async_trait;
use std::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::{NativeItem, NativePlayer, NativeRepeat, NativeState, Progress};
use crate::error::{Error, Result};

/// A mutating call received by the headless player
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCall {
    Load { id: String },
    Play,
    Pause,
    SeekTo(f64),
    SetVolume(f32),
    SetRepeat(NativeRepeat),
    Reset,
}

#[derive(Debug)]
struct Inner {
    status: NativeState,
    item: Option<NativeItem>,
    volume: f32,
    repeat: NativeRepeat,
    /// Position at `started_at` (or the frozen position when not playing)
    base_position: f64,
    started_at: Option<Instant>,
    journal: Option<Vec<NativeCall>>,
}

/// In-memory [`NativePlayer`]
#[derive(Debug)]
pub struct HeadlessPlayer {
    inner: Mutex<Inner>,
}

impl HeadlessPlayer {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                status: NativeState::None,
                item: None,
                volume: 1.0,
                repeat: NativeRepeat::Off,
                base_position: 0.0,
                started_at: None,
                journal: None,
            }),
        }
    }

    /// Player that records every mutating call
    pub fn with_journal() -> Self {
        let player = Self::new();
        player.lock().journal = Some(Vec::new());
        player
    }

    /// Player that already holds an item, as after an app restart while the
    /// platform service kept running
    pub fn with_session(item: NativeItem, status: NativeState) -> Self {
        let player = Self::with_journal();
        {
            let mut inner = player.lock();
            inner.item = Some(item);
            inner.status = status;
            if status == NativeState::Playing {
                inner.started_at = Some(Instant::now());
            }
        }
        player
    }

    /// Recorded calls (empty unless created with a journal)
    pub fn calls(&self) -> Vec<NativeCall> {
        self.lock().journal.clone().unwrap_or_default()
    }

    pub fn clear_calls(&self) {
        if let Some(journal) = self.lock().journal.as_mut() {
            journal.clear();
        }
    }

    /// Current volume without going through the async trait
    pub fn current_volume(&self) -> f32 {
        self.lock().volume
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a test panicked mid-call; the data is
        // still a consistent snapshot.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for HeadlessPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn record(&mut self, call: NativeCall) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push(call);
        }
    }

    fn duration(&self) -> f64 {
        self.item.as_ref().and_then(|i| i.duration).unwrap_or(0.0)
    }

    /// Position right now, applying loop/end semantics
    fn position(&self) -> f64 {
        let elapsed = self
            .started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        let raw = self.base_position + elapsed;
        let duration = self.duration();
        if duration <= 0.0 {
            return raw;
        }
        match self.repeat {
            NativeRepeat::Track => raw % duration,
            NativeRepeat::Off => raw.min(duration),
        }
    }

    fn freeze(&mut self) {
        self.base_position = self.position();
        self.started_at = None;
    }

    fn reached_end(&self) -> bool {
        let duration = self.duration();
        self.repeat == NativeRepeat::Off
            && duration > 0.0
            && self.started_at.is_some()
            && self.position() >= duration
    }
}

#[async_trait]
impl NativePlayer for HeadlessPlayer {
    async fn state(&self) -> Result<NativeState> {
        let mut inner = self.lock();
        if inner.status == NativeState::Playing && inner.reached_end() {
            inner.freeze();
            inner.status = NativeState::Ended;
        }
        Ok(inner.status)
    }

    async fn load(&self, item: NativeItem) -> Result<()> {
        let mut inner = self.lock();
        debug!(id = %item.id, title = %item.title, "Headless player loading item");
        inner.record(NativeCall::Load { id: item.id.clone() });
        inner.item = Some(item);
        inner.status = NativeState::Ready;
        inner.base_position = 0.0;
        inner.started_at = None;
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        let mut inner = self.lock();
        inner.record(NativeCall::Play);
        if inner.item.is_none() {
            return Err(Error::Native("play called with no item loaded".to_string()));
        }
        if inner.status != NativeState::Playing {
            if inner.status == NativeState::Ended {
                inner.base_position = 0.0;
            }
            inner.started_at = Some(Instant::now());
            inner.status = NativeState::Playing;
        }
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        let mut inner = self.lock();
        inner.record(NativeCall::Pause);
        if inner.status == NativeState::Playing {
            inner.freeze();
            inner.status = NativeState::Paused;
        }
        Ok(())
    }

    async fn seek_to(&self, position: f64) -> Result<()> {
        let mut inner = self.lock();
        inner.record(NativeCall::SeekTo(position));
        let duration = inner.duration();
        let target = if duration > 0.0 {
            position.clamp(0.0, duration)
        } else {
            position.max(0.0)
        };
        inner.base_position = target;
        if inner.started_at.is_some() {
            inner.started_at = Some(Instant::now());
        }
        Ok(())
    }

    async fn set_volume(&self, volume: f32) -> Result<()> {
        let mut inner = self.lock();
        let volume = volume.clamp(0.0, 1.0);
        inner.record(NativeCall::SetVolume(volume));
        inner.volume = volume;
        Ok(())
    }

    async fn volume(&self) -> Result<f32> {
        Ok(self.lock().volume)
    }

    async fn set_repeat(&self, repeat: NativeRepeat) -> Result<()> {
        let mut inner = self.lock();
        inner.record(NativeCall::SetRepeat(repeat));
        // Re-anchor so switching loop mode never jumps the position
        if inner.started_at.is_some() {
            inner.base_position = inner.position();
            inner.started_at = Some(Instant::now());
        }
        inner.repeat = repeat;
        Ok(())
    }

    async fn progress(&self) -> Result<Progress> {
        let inner = self.lock();
        Ok(Progress {
            position: inner.position(),
            duration: inner.duration(),
        })
    }

    async fn current_item(&self) -> Result<Option<NativeItem>> {
        Ok(self.lock().item.clone())
    }

    async fn reset(&self) -> Result<()> {
        let mut inner = self.lock();
        inner.record(NativeCall::Reset);
        inner.item = None;
        inner.status = NativeState::None;
        inner.base_position = 0.0;
        inner.started_at = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn item(duration: f64) -> NativeItem {
        NativeItem {
            id: "id-1".to_string(),
            url: "https://stream/1".to_string(),
            title: "One".to_string(),
            artist: "Artist".to_string(),
            artwork: None,
            duration: Some(duration),
            headers: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_position_advances_only_while_playing() {
        let player = HeadlessPlayer::new();
        player.load(item(100.0)).await.unwrap();
        assert_eq!(player.state().await.unwrap(), NativeState::Ready);

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(player.progress().await.unwrap().position, 0.0);

        player.play().await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;
        let pos = player.progress().await.unwrap().position;
        assert!((pos - 10.0).abs() < 0.01, "position {}", pos);

        player.pause().await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;
        let paused = player.progress().await.unwrap().position;
        assert!((paused - 10.0).abs() < 0.01);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_without_loop_reports_ended() {
        let player = HeadlessPlayer::new();
        player.load(item(5.0)).await.unwrap();
        player.play().await.unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(player.state().await.unwrap(), NativeState::Ended);
        assert_eq!(player.progress().await.unwrap().position, 5.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_track_loop_wraps_position() {
        let player = HeadlessPlayer::new();
        player.load(item(10.0)).await.unwrap();
        player.set_repeat(NativeRepeat::Track).await.unwrap();
        player.play().await.unwrap();
        tokio::time::advance(Duration::from_secs(13)).await;

        let pos = player.progress().await.unwrap().position;
        assert!((pos - 3.0).abs() < 0.01, "position {}", pos);
        assert_eq!(player.state().await.unwrap(), NativeState::Playing);
    }

    #[tokio::test]
    async fn test_journal_and_reset() {
        let player = HeadlessPlayer::with_journal();
        player.load(item(50.0)).await.unwrap();
        player.set_volume(1.7).await.unwrap();
        player.reset().await.unwrap();

        assert_eq!(
            player.calls(),
            vec![
                NativeCall::Load { id: "id-1".to_string() },
                NativeCall::SetVolume(1.0),
                NativeCall::Reset,
            ]
        );
        assert!(player.current_item().await.unwrap().is_none());
        assert_eq!(player.state().await.unwrap(), NativeState::None);
    }

    #[tokio::test]
    async fn test_play_without_item_fails() {
        let player = HeadlessPlayer::new();
        assert!(player.play().await.is_err());
    }
}
