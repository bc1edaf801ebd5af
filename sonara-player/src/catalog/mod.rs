//! Remote catalog and stream lookup
//!
//! The player never talks to stream hosts to discover URLs itself; it asks
//! the remote API through [`StreamResolver`]. [`CatalogClient`] is the HTTP
//! implementation and also serves search and locale lookups for the UI layer.

mod client;

pub use client::{CatalogClient, Locale};

use async_trait::async_trait;
use sonara_common::track::ResolvedStream;
use sonara_common::Track;

use crate::error::Result;

/// Turns a listing track into a stream lookup result
#[async_trait]
pub trait StreamResolver: Send + Sync {
    /// Look up the playable stream for `track`
    ///
    /// Search-origin tracks are looked up by id, catalog-origin tracks by
    /// exact title + artist. A response without `stream_url` is returned
    /// as-is; the caller decides it is unplayable.
    async fn resolve(&self, track: &Track) -> Result<ResolvedStream>;
}
