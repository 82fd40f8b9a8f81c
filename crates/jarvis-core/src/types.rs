//! Shared domain types used across the Jarvis crates.

use serde::{Deserialize, Serialize};

/// Session used when a caller does not supply one.
pub const DEFAULT_SESSION: &str = "default";

// =============================================================================
// Conversation turns
// =============================================================================

/// Who authored a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single role-tagged message sent to (or received from) the language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// =============================================================================
// Routing
// =============================================================================

/// Label identifying which pipeline stage produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Current date/time synthesized locally.
    Time,
    /// `/exit` or `/quit`.
    Exit,
    /// `/clear` dropped the session history.
    Clear,
    /// A registered slash command.
    Command,
    /// Implicit question about the active document.
    Document,
    /// Automatic skill routing.
    Skill,
    /// Answer grounded in web search results.
    Web,
    /// Web search failed.
    WebError,
    /// Default conversation with the language model.
    Chat,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Time => "time",
            Route::Exit => "exit",
            Route::Clear => "clear",
            Route::Command => "command",
            Route::Document => "document",
            Route::Skill => "skill",
            Route::Web => "web",
            Route::WebError => "web_error",
            Route::Chat => "chat",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reply produced by the request pipeline for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub session_id: String,
    pub route: Route,
    pub output: String,
}

impl ChatReply {
    pub fn new(session_id: impl Into<String>, route: Route, output: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            route,
            output: output.into(),
        }
    }
}
