//! HTTP control surface
//!
//! JSON endpoints standing in for the UI layer, plus an SSE stream of
//! session events.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{create_router, serve, AppContext};
