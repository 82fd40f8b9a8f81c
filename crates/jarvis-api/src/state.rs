//! Application state shared across all route handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use jarvis_chat::{AutoRouter, ChatPipeline, HistoryStore, PipelineSettings};
use jarvis_core::{JarvisConfig, Result};
use jarvis_docs::{DocumentIndex, DocumentQa};
use jarvis_llm::LanguageModel;
use jarvis_search::WebSearch;
use jarvis_skills::{builtin_skills, BuiltinDeps, CommandRouter, SkillRegistry};
use jarvis_storage::MemoryStore;
use tracing::warn;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<JarvisConfig>,
    pub pipeline: Arc<ChatPipeline>,
    pub documents: Arc<DocumentIndex>,
    pub registry: Arc<SkillRegistry>,
    /// Where uploaded files are written, one subdirectory per session.
    pub upload_root: PathBuf,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Wire the document index, skill registry and chat pipeline from
    /// configuration around the given backends.
    pub fn build(
        config: JarvisConfig,
        llm: Arc<dyn LanguageModel>,
        search: Arc<dyn WebSearch>,
        memory: Arc<dyn MemoryStore>,
    ) -> Result<Self> {
        let settings = PipelineSettings::from_config(&config)?;

        let documents = Arc::new(DocumentIndex::from_config(&config.documents, &config.sessions));
        for ext in &config.documents.allowed_extensions {
            let ext = ext.trim_start_matches('.').to_lowercase();
            if !documents.supported_extensions().contains(&ext.as_str()) {
                warn!(extension = %ext, "Allowed upload extension has no extractor; uploads will be rejected");
            }
        }
        let qa = DocumentQa::new(Arc::clone(&documents));

        let registry = Arc::new(SkillRegistry::discover(builtin_skills(&BuiltinDeps {
            memory: Arc::clone(&memory),
            documents: qa.clone(),
            timezone: settings.timezone,
            document_top_k: config.documents.command_top_k,
        })));

        let sessions = &config.sessions;
        let history = HistoryStore::new(
            sessions.max_sessions,
            sessions.idle_timeout(),
            sessions.max_history_messages,
        );

        let pipeline = ChatPipeline::new(
            CommandRouter::new(Arc::clone(&registry)),
            AutoRouter::new(Arc::clone(&registry), Arc::clone(&documents)),
            qa,
            history,
            memory,
            search,
            llm,
            settings,
        );

        Ok(Self {
            upload_root: config.upload_root(),
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            documents,
            registry,
            start_time: Instant::now(),
        })
    }
}
