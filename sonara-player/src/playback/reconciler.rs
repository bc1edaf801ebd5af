//! Startup reconciliation with the native player
//!
//! The platform service can outlive the app. On startup the native player
//! is asked what it still holds: a live session is adopted as the current
//! track, anything else is reset so the app never inherits a half-dead item.

use sonara_common::Track;
use tracing::{debug, info, warn};

use crate::native::NativePlayer;

/// Track to adopt from a surviving native session, if any
///
/// "Active" means playing, paused, buffering or ready with an item loaded.
/// In every other case `reset` is issued exactly once and None returned.
/// Native errors are logged and treated as "no session".
pub async fn reconcile(player: &dyn NativePlayer) -> Option<Track> {
    let state = match player.state().await {
        Ok(state) => state,
        Err(e) => {
            warn!(error = %e, "Could not query native state on startup");
            reset(player).await;
            return None;
        }
    };

    if state.is_active() {
        match player.current_item().await {
            Ok(Some(item)) => {
                info!(%state, title = %item.title, artist = %item.artist, "Adopting surviving native session");
                return Some(item.into_track());
            }
            Ok(None) => debug!(%state, "Native player active but holds no item"),
            Err(e) => warn!(error = %e, "Could not read native item on startup"),
        }
    } else {
        debug!(%state, "No live native session");
    }

    reset(player).await;
    None
}

async fn reset(player: &dyn NativePlayer) {
    if let Err(e) = player.reset().await {
        warn!(error = %e, "Native reset failed");
    }
}
