//! In-memory port implementations shared by unit tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use futures::stream;
use futures::StreamExt;

use crate::adapters::live::transpiler::PassthroughTranspiler;
use crate::context::ServiceContext;
use crate::error::StudioError;
use crate::ports::filesystem::FsError;
use crate::ports::{ChatProvider, ChatRequest, ChunkStream, Clock, FileSystem, IdGenerator};
use crate::providers::ProviderRegistry;

/// Context with a frozen clock, sequential IDs, an in-memory filesystem
/// and the given providers.
pub fn context(providers: Vec<ScriptedProvider>) -> ServiceContext {
    let mut registry = ProviderRegistry::new();
    for provider in providers {
        registry.register(Box::new(provider));
    }
    ServiceContext::from_parts(
        Box::new(FixedClock::default()),
        Box::new(SequentialIds::default()),
        Box::new(MemFs::default()),
        registry,
        Box::new(PassthroughTranspiler),
    )
}

/// Clock frozen at a single instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Produces `id-1`, `id-2`, ...
#[derive(Default)]
pub struct SequentialIds(AtomicUsize);

impl IdGenerator for SequentialIds {
    fn generate_id(&self) -> String {
        format!("id-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

enum Ending {
    Finish,
    Fail(Mutex<Option<StudioError>>),
    Stall,
}

/// Provider that replays fixed chunks and records the requests it saw.
pub struct ScriptedProvider {
    name: &'static str,
    chunks: Vec<String>,
    ending: Ending,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl ScriptedProvider {
    /// Streams `chunks` and then ends normally.
    pub fn new(chunks: Vec<&str>) -> Self {
        Self::with_ending(chunks, Ending::Finish)
    }

    /// Streams `chunks` and then fails with `error`.
    pub fn failing(chunks: Vec<&str>, error: StudioError) -> Self {
        Self::with_ending(chunks, Ending::Fail(Mutex::new(Some(error))))
    }

    /// Streams `chunks` and then never yields again.
    pub fn stalled(chunks: Vec<&str>) -> Self {
        Self::with_ending(chunks, Ending::Stall)
    }

    /// Answers under `name` instead of `"scripted"`.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Shared log of every request passed to `stream_completion`.
    pub fn request_log(&self) -> Arc<Mutex<Vec<ChatRequest>>> {
        Arc::clone(&self.requests)
    }

    fn with_ending(chunks: Vec<&str>, ending: Ending) -> Self {
        Self {
            name: "scripted",
            chunks: chunks.into_iter().map(str::to_string).collect(),
            ending,
            requests: Arc::default(),
        }
    }
}

impl ChatProvider for ScriptedProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn stream_completion(&self, request: &ChatRequest) -> ChunkStream<'_> {
        self.requests.lock().unwrap().push(request.clone());
        let head = stream::iter(self.chunks.clone().into_iter().map(Ok));
        match &self.ending {
            Ending::Finish => Box::pin(head),
            Ending::Fail(error) => {
                let error = error.lock().unwrap().take().unwrap_or(StudioError::Cancelled);
                Box::pin(head.chain(stream::once(async move { Err(error) })))
            }
            Ending::Stall => Box::pin(head.chain(stream::pending())),
        }
    }
}

/// Filesystem kept in a map.
#[derive(Default)]
pub struct MemFs {
    files: Mutex<BTreeMap<PathBuf, String>>,
}

impl MemFs {
    /// Returns the contents written to `path`, if any.
    pub fn get(&self, path: &Path) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }
}

impl FileSystem for MemFs {
    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        self.get(path).ok_or_else(|| format!("{} not found", path.display()).into())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), FsError> {
        self.files.lock().unwrap().insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().keys().any(|p| p == path || p.starts_with(path))
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, FsError> {
        let files = self.files.lock().unwrap();
        let mut names: Vec<String> = files
            .keys()
            .filter_map(|p| p.strip_prefix(path).ok())
            .filter_map(|rest| rest.components().next())
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}
