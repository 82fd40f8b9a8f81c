//! The request pipeline: one ordered cascade per inbound message.

use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use jarvis_core::config::JarvisConfig;
use jarvis_core::{ChatMessage, ChatReply, Route, DEFAULT_SESSION};
use jarvis_docs::DocumentQa;
use jarvis_llm::LanguageModel;
use jarvis_search::{format_hits, WebSearch};
use jarvis_skills::{CommandOutcome, CommandRouter};
use jarvis_storage::MemoryStore;
use tracing::{debug, info, warn};

use crate::auto_router::AutoRouter;
use crate::error::ChatError;
use crate::history::HistoryStore;
use crate::triggers::{
    looks_like_document_question, needs_time, needs_web, wants_summary, SUMMARY_QUESTION,
};

pub const CLEARED_MESSAGE: &str = "✅ Chat history cleared.";
pub const EXIT_MESSAGE: &str = "Goodbye.";

/// Tunables for [`ChatPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub timezone: Tz,
    pub system_prompt: String,
    /// Chunks retrieved for implicit document questions.
    pub question_top_k: usize,
    pub search_enabled: bool,
    pub search_max_results: usize,
    pub max_message_chars: usize,
}

impl PipelineSettings {
    pub fn from_config(config: &JarvisConfig) -> jarvis_core::Result<Self> {
        Ok(Self {
            timezone: config.general.tz()?,
            system_prompt: config.llm.system_prompt.clone(),
            question_top_k: config.documents.question_top_k,
            search_enabled: config.search.enabled,
            search_max_results: config.search.max_results,
            max_message_chars: config.general.max_message_chars,
        })
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Asia::Karachi,
            system_prompt: "You are Jarvis. Be helpful, accurate, and concise.".to_string(),
            question_top_k: 8,
            search_enabled: true,
            search_max_results: 5,
            max_message_chars: 4000,
        }
    }
}

/// Routes each message through, in order: time, commands, implicit document
/// questions, automatic skills, web search and finally the default
/// conversation. The first stage that produces output wins.
pub struct ChatPipeline {
    commands: CommandRouter,
    auto_router: AutoRouter,
    documents: DocumentQa,
    history: HistoryStore,
    memory: Arc<dyn MemoryStore>,
    search: Arc<dyn WebSearch>,
    llm: Arc<dyn LanguageModel>,
    settings: PipelineSettings,
}

impl ChatPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        commands: CommandRouter,
        auto_router: AutoRouter,
        documents: DocumentQa,
        history: HistoryStore,
        memory: Arc<dyn MemoryStore>,
        search: Arc<dyn WebSearch>,
        llm: Arc<dyn LanguageModel>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            commands,
            auto_router,
            documents,
            history,
            memory,
            search,
            llm,
            settings,
        }
    }

    pub fn commands(&self) -> &CommandRouter {
        &self.commands
    }

    pub fn documents(&self) -> &DocumentQa {
        &self.documents
    }

    /// Handle one message for `session_id` (default session when `None`).
    ///
    /// Only the default conversation stage (and the answer step of the web
    /// stage) can fail with a model error; every other stage reports
    /// problems as reply text.
    pub async fn handle(&self, session_id: Option<&str>, text: &str) -> Result<ChatReply, ChatError> {
        let session_id = match session_id.map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => DEFAULT_SESSION,
        };
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if text.chars().count() > self.settings.max_message_chars {
            return Err(ChatError::MessageTooLong(self.settings.max_message_chars));
        }

        let reply = |route: Route, output: String| {
            debug!(session_id, route = %route, "Message routed");
            Ok(ChatReply::new(session_id, route, output))
        };

        // 1. Time. Slash commands such as `/time` belong to the command stage.
        if !text.starts_with('/') && needs_time(text) {
            return reply(Route::Time, format!("Current time: {}", self.now_string()));
        }

        // 2. Commands
        match self
            .commands
            .route(text, session_id, Arc::clone(&self.llm))
            .await
        {
            CommandOutcome::NotCommand => {}
            CommandOutcome::Exit => return reply(Route::Exit, EXIT_MESSAGE.to_string()),
            CommandOutcome::ClearHistory => {
                self.history.clear(session_id);
                info!(session_id, "Chat history cleared");
                return reply(Route::Clear, CLEARED_MESSAGE.to_string());
            }
            CommandOutcome::Reply(output) => return reply(Route::Command, output),
        }

        // 3. Implicit document question
        if self.documents.index().active(session_id).is_some() && looks_like_document_question(text) {
            let question = if wants_summary(text) { SUMMARY_QUESTION } else { text };
            let output = match self
                .documents
                .answer(
                    self.llm.as_ref(),
                    session_id,
                    question,
                    self.settings.question_top_k,
                    None,
                )
                .await
            {
                Ok(answer) => answer,
                Err(e) => {
                    warn!(session_id, error = %e, "Document question failed");
                    format!("❌ Document question failed: {}", e)
                }
            };
            return reply(Route::Document, output);
        }

        // 4. Automatic skills
        if let Some(output) = self
            .auto_router
            .route(text, Arc::clone(&self.llm), session_id)
            .await
        {
            return reply(Route::Skill, output);
        }

        // 5. Web search
        if self.settings.search_enabled && needs_web(text) {
            match self.search.search(text, self.settings.search_max_results).await {
                Err(e) => {
                    warn!(session_id, error = %e, "Web search failed");
                    return reply(Route::WebError, format!("❌ Web search failed: {}", e));
                }
                Ok(hits) if !hits.is_empty() => {
                    let prompt = web_prompt(&format_hits(&hits), text);
                    let answer = self.llm.prompt(&prompt).await?;
                    return reply(Route::Web, answer);
                }
                Ok(_) => debug!(session_id, "Web search returned nothing; continuing to chat"),
            }
        }

        // 6. Default conversation
        let output = self.converse(session_id, text).await?;
        reply(Route::Chat, output)
    }

    async fn converse(&self, session_id: &str, text: &str) -> Result<String, ChatError> {
        let memories = self.memory.memories(session_id)?;
        let mut messages = vec![ChatMessage::system(&self.settings.system_prompt)];
        if !memories.is_empty() {
            let block = memories
                .iter()
                .map(|m| format!("- {m}"))
                .collect::<Vec<_>>()
                .join("\n");
            messages.push(ChatMessage::system(format!(
                "User memory (use this if relevant):\n{block}"
            )));
        }
        messages.extend(self.history.history(session_id));
        messages.push(ChatMessage::user(text));

        let answer = self.llm.invoke(&messages).await?;
        self.history.append_turn(session_id, text, &answer);
        Ok(answer)
    }

    fn now_string(&self) -> String {
        Utc::now()
            .with_timezone(&self.settings.timezone)
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string()
    }
}

fn web_prompt(sources: &str, question: &str) -> String {
    format!(
        "Answer using these web results. If the results don't contain the answer, \
         say you're not sure.\n\n\
         Web Results:\n{sources}\n\n\
         User Question:\n{question}\n\n\
         Answer:"
    )
}
