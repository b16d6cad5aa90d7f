//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the generation core and an
//! external system (time, IDs, disk, LLM providers, the module transpiler).
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod llm;
pub mod transpiler;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use id_gen::IdGenerator;
pub use llm::{ChatProvider, ChatRequest, ChatTurn, ChunkStream};
pub use transpiler::Transpiler;
