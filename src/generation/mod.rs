//! Turning a streamed model response into file tree changes.
//!
//! The flow is: stream chunks into [`extractor`] for live conversation text,
//! [`parser`] the completed text once, then apply the file operations one at
//! a time through the [`sequencer`]. [`pipeline`] wires these together.

pub mod extractor;
pub mod observer;
pub mod parser;
pub mod pipeline;
pub mod sequencer;

pub use observer::{GenerationObserver, NoopObserver};
pub use pipeline::{GenerationOutcome, GenerationPipeline, GenerationReport};
pub use sequencer::Sequencer;
