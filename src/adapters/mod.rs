//! Port implementations.
//!
//! `live` talks to the real world, `recording` wraps live adapters and
//! captures what they return, `replaying` serves a captured cassette.

pub mod live;
pub mod recording;
pub mod replaying;
