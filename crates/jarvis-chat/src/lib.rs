//! Conversational request pipeline for Jarvis.
//!
//! [`ChatPipeline`] runs each message through an ordered cascade (time,
//! commands, document questions, automatic skills, web search, default chat)
//! and tags the reply with the [`Route`](jarvis_core::Route) that produced it.

pub mod auto_router;
pub mod error;
pub mod history;
pub mod pipeline;
pub mod triggers;

pub use auto_router::AutoRouter;
pub use error::ChatError;
pub use history::HistoryStore;
pub use pipeline::{ChatPipeline, PipelineSettings};
