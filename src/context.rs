//! Service context bundling all port trait objects.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::adapters::live::clock::SystemClock;
use crate::adapters::live::filesystem::LocalFileSystem;
use crate::adapters::live::gemini::GeminiProvider;
use crate::adapters::live::huggingface::HuggingFaceProvider;
use crate::adapters::live::id_gen::UuidGenerator;
use crate::adapters::live::openai::OpenAiCompatibleProvider;
use crate::adapters::live::transpiler::PassthroughTranspiler;
use crate::adapters::recording::{
    RecordingChatProvider, RecordingClock, RecordingIdGenerator, SharedRecorder,
};
use crate::adapters::replaying::{ReplayingChatProvider, ReplayingClock, ReplayingIdGenerator};
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::StudioConfig;
use crate::ports::{ChatProvider, Clock, FileSystem, IdGenerator, Transpiler};
use crate::providers::models::{GEMINI, HUGGINGFACE, OPENAI, OPENROUTER};
use crate::providers::ProviderRegistry;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors
/// wire up different adapter implementations (live, recording, replaying).
pub struct ServiceContext {
    /// Clock for session timestamps.
    pub clock: Box<dyn Clock>,
    /// ID generator for sessions and messages.
    pub id_gen: Box<dyn IdGenerator>,
    /// Filesystem holding the session store.
    pub fs: Box<dyn FileSystem>,
    /// Chat providers keyed by name.
    pub providers: ProviderRegistry,
    /// Module transpiler used by the preview builder.
    pub transpiler: Box<dyn Transpiler>,
}

impl ServiceContext {
    /// Assembles a context from explicit adapters.
    #[must_use]
    pub fn from_parts(
        clock: Box<dyn Clock>,
        id_gen: Box<dyn IdGenerator>,
        fs: Box<dyn FileSystem>,
        providers: ProviderRegistry,
        transpiler: Box<dyn Transpiler>,
    ) -> Self {
        Self { clock, id_gen, fs, providers, transpiler }
    }

    /// Creates a live context talking to the configured providers.
    #[must_use]
    pub fn live(config: &StudioConfig) -> Self {
        let mut providers = ProviderRegistry::new();
        for provider in live_providers(config) {
            providers.register(provider);
        }
        Self::from_parts(
            Box::new(SystemClock),
            Box::new(UuidGenerator),
            Box::new(LocalFileSystem),
            providers,
            Box::new(PassthroughTranspiler),
        )
    }

    /// Creates a live context whose provider, clock and ID traffic is
    /// captured into a cassette at `path`.
    ///
    /// The caller saves the returned recorder once the context is dropped.
    #[must_use]
    pub fn recording(config: &StudioConfig, path: &Path) -> (Self, SharedRecorder) {
        let name = path.file_stem().map_or_else(
            || "studio-session".to_string(),
            |stem| stem.to_string_lossy().into_owned(),
        );
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(path, name)));

        let mut providers = ProviderRegistry::new();
        for provider in live_providers(config) {
            providers.register(Box::new(RecordingChatProvider::new(provider, Arc::clone(&recorder))));
        }
        let ctx = Self::from_parts(
            Box::new(RecordingClock::new(Box::new(SystemClock), Arc::clone(&recorder))),
            Box::new(RecordingIdGenerator::new(Box::new(UuidGenerator), Arc::clone(&recorder))),
            Box::new(LocalFileSystem),
            providers,
            Box::new(PassthroughTranspiler),
        );
        (ctx, recorder)
    }

    /// Creates a context that serves provider streams, clock readings and
    /// IDs from the cassette at `path`. Sessions still persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let cassette = CassetteReplayer::load(path)?;

        // Each port gets its own replayer so per-port cursors are independent.
        let llm = Arc::new(Mutex::new(CassetteReplayer::new(&cassette)));
        let mut providers = ProviderRegistry::new();
        for name in [OPENAI, OPENROUTER, GEMINI, HUGGINGFACE] {
            providers.register(Box::new(ReplayingChatProvider::new(name, Arc::clone(&llm))));
        }

        Ok(Self::from_parts(
            Box::new(ReplayingClock::new(CassetteReplayer::new(&cassette))),
            Box::new(ReplayingIdGenerator::new(CassetteReplayer::new(&cassette))),
            Box::new(LocalFileSystem),
            providers,
            Box::new(PassthroughTranspiler),
        ))
    }
}

fn live_providers(config: &StudioConfig) -> Vec<Box<dyn ChatProvider>> {
    let openai = OpenAiCompatibleProvider::openai(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
    );
    let openrouter = OpenAiCompatibleProvider::openrouter(config.openrouter_api_key.clone());
    let gemini = GeminiProvider::new(config.gemini_api_key.clone());
    let huggingface = HuggingFaceProvider::new(config.huggingface_api_key.clone());

    let mut providers: Vec<Box<dyn ChatProvider>> = Vec::new();
    providers.push(Box::new(openai));
    providers.push(Box::new(openrouter));
    providers.push(Box::new(gemini));
    providers.push(Box::new(huggingface));
    providers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use chrono::Utc;
    use serde_json::json;

    fn config() -> StudioConfig {
        StudioConfig::from_lookup(|_| None).unwrap()
    }

    #[test]
    fn live_context_registers_every_adapter() {
        let ctx = ServiceContext::live(&config());
        assert_eq!(ctx.providers.names(), vec!["gemini", "huggingface", "openai", "openrouter"]);
        assert!(!ctx.providers.contains("anthropic"));
    }

    #[test]
    fn replaying_context_serves_clock_and_ids() {
        let dir = std::env::temp_dir().join("studio_ctx_replay_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("full.cassette.yaml");
        let cassette = Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            studio_version: String::new(),
            interactions: vec![
                Interaction {
                    seq: 0,
                    port: "clock".into(),
                    method: "now".into(),
                    input: json!(null),
                    output: json!("2024-06-15T10:30:00Z"),
                },
                Interaction {
                    seq: 1,
                    port: "id_gen".into(),
                    method: "generate_id".into(),
                    input: json!(null),
                    output: json!("uuid-001"),
                },
            ],
        };
        std::fs::write(&path, serde_yaml::to_string(&cassette).unwrap()).unwrap();

        let ctx = ServiceContext::replaying(&path).unwrap();
        assert_eq!(ctx.clock.now().to_rfc3339(), "2024-06-15T10:30:00+00:00");
        assert_eq!(ctx.id_gen.generate_id(), "uuid-001");
        assert!(ctx.providers.contains("openrouter"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn replaying_missing_cassette_is_an_error() {
        let err = ServiceContext::replaying(Path::new("/nonexistent/c.yaml")).err().unwrap();
        assert!(err.contains("Failed to read cassette file"));
    }

    #[test]
    fn recording_context_captures_clock_reads() {
        let dir = std::env::temp_dir().join("studio_ctx_record_test");
        let path = dir.join("run.cassette.yaml");
        let (ctx, recorder) = ServiceContext::recording(&config(), &path);

        let _ = ctx.clock.now();
        let _ = ctx.id_gen.generate_id();
        drop(ctx);
        recorder.lock().unwrap().save().unwrap();

        let cassette = CassetteReplayer::load(&path).unwrap();
        assert_eq!(cassette.name, "run.cassette");
        let ports: Vec<_> = cassette.interactions.iter().map(|i| i.port.as_str()).collect();
        assert_eq!(ports, vec!["clock", "id_gen"]);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
