//! Shared fixtures for sonara-player integration tests
//!
//! - [`StubResolver`]: canned stream lookups with optional per-track delay
//! - [`FlakyPlayer`]: headless player with switchable native failures and
//!   slow loads

#![allow(dead_code)]

use async_trait::async_trait;
use sonara_common::events::EventBus;
use sonara_common::track::ResolvedStream;
use sonara_common::{Track, TrackOrigin};
use sonara_player::catalog::StreamResolver;
use sonara_player::native::{HeadlessPlayer, NativeCall, NativeItem, NativePlayer, NativeRepeat, NativeState, Progress};
use sonara_player::playback::{Coordinator, FadeSettings};
use sonara_player::{Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Search-origin track without a stream
pub fn track(id: &str, title: &str, artist: &str) -> Track {
    Track {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        artwork: None,
        stream_url: None,
        duration: None,
        headers: None,
        origin: TrackOrigin::Search,
    }
}

pub fn stream(id: &str, duration: f64) -> ResolvedStream {
    ResolvedStream {
        stream_url: Some(format!("https://cdn.example.test/{}.m4a", id)),
        duration: Some(duration),
        headers: None,
    }
}

/// Resolver answering from a fixed table keyed by track id
#[derive(Default)]
pub struct StubResolver {
    streams: Mutex<HashMap<String, ResolvedStream>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: AtomicUsize,
}

impl StubResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a playable stream of `duration` seconds for `id`
    pub fn with_stream(self, id: &str, duration: f64) -> Self {
        self.insert(id, stream(id, duration));
        self
    }

    /// Register a lookup that answers without a URL
    pub fn with_empty(self, id: &str) -> Self {
        self.insert(
            id,
            ResolvedStream {
                stream_url: None,
                duration: None,
                headers: None,
            },
        );
        self
    }

    /// Make lookups for `id` take `delay`
    pub fn with_delay(self, id: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .unwrap()
            .insert(id.to_string(), delay);
        self
    }

    pub fn insert(&self, id: &str, stream: ResolvedStream) {
        self.streams
            .lock()
            .unwrap()
            .insert(id.to_string(), stream);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamResolver for StubResolver {
    async fn resolve(&self, track: &Track) -> Result<ResolvedStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.lock().unwrap().get(&track.id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.streams
            .lock()
            .unwrap()
            .get(&track.id)
            .cloned()
            .ok_or_else(|| Error::Resolution(format!("no stream for {}", track.id)))
    }
}

/// Headless player whose load/play can be made to fail
pub struct FlakyPlayer {
    inner: HeadlessPlayer,
    fail_load: AtomicBool,
    fail_play: AtomicBool,
    load_delays: Mutex<HashMap<String, Duration>>,
}

impl FlakyPlayer {
    pub fn new() -> Self {
        Self {
            inner: HeadlessPlayer::with_journal(),
            fail_load: AtomicBool::new(false),
            fail_play: AtomicBool::new(false),
            load_delays: Mutex::new(HashMap::new()),
        }
    }

    /// `load` of this id returns only after `delay` (the item is already in place)
    pub fn slow_load(&self, id: &str, delay: Duration) {
        self.load_delays.lock().unwrap().insert(id.to_string(), delay);
    }

    pub fn fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn fail_play(&self, fail: bool) {
        self.fail_play.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<NativeCall> {
        self.inner.calls()
    }

    pub fn clear_calls(&self) {
        self.inner.clear_calls();
    }

    pub fn current_volume(&self) -> f32 {
        self.inner.current_volume()
    }
}

#[async_trait]
impl NativePlayer for FlakyPlayer {
    async fn state(&self) -> Result<NativeState> {
        self.inner.state().await
    }

    async fn load(&self, item: NativeItem) -> Result<()> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(Error::Native("injected load failure".to_string()));
        }
        let delay = self.load_delays.lock().unwrap().get(&item.id).copied();
        self.inner.load(item).await?;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(Error::Native("injected play failure".to_string()));
        }
        self.inner.play().await
    }

    async fn pause(&self) -> Result<()> {
        self.inner.pause().await
    }

    async fn seek_to(&self, position: f64) -> Result<()> {
        self.inner.seek_to(position).await
    }

    async fn set_volume(&self, volume: f32) -> Result<()> {
        self.inner.set_volume(volume).await
    }

    async fn volume(&self) -> Result<f32> {
        self.inner.volume().await
    }

    async fn set_repeat(&self, repeat: NativeRepeat) -> Result<()> {
        self.inner.set_repeat(repeat).await
    }

    async fn progress(&self) -> Result<Progress> {
        self.inner.progress().await
    }

    async fn current_item(&self) -> Result<Option<NativeItem>> {
        self.inner.current_item().await
    }

    async fn reset(&self) -> Result<()> {
        self.inner.reset().await
    }
}

/// Coordinator over the given fixtures with the default 800 ms / 20 step fade
pub fn coordinator(player: Arc<FlakyPlayer>, resolver: Arc<StubResolver>) -> Arc<Coordinator> {
    Arc::new(Coordinator::new(
        player,
        resolver,
        FadeSettings::default(),
        Arc::new(EventBus::new(256)),
    ))
}

/// Volume writes in call order
pub fn volume_writes(calls: &[NativeCall]) -> Vec<f32> {
    calls
        .iter()
        .filter_map(|c| match c {
            NativeCall::SetVolume(v) => Some(*v),
            _ => None,
        })
        .collect()
}
