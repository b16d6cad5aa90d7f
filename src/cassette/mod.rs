//! Cassettes: recorded port interactions that can be replayed later.
//!
//! A cassette captures provider chunk streams, clock readings and generated
//! IDs so that a chat turn can be reproduced without network access.

pub mod format;
pub mod recorder;
pub mod replayer;
