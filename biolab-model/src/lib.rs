//! # biolab-model
//!
//! Generation-model integrations for the biolab assistant.
//!
//! This crate defines the [`ChatModel`] contract used by the RAG pipelines
//! to synthesize answers, plus two implementations:
//!
//! - [`OpenAIChatModel`] — OpenAI chat completions (GPT-4, GPT-4o, ...)
//! - [`MockChatModel`] — deterministic mock for tests
//!
//! Generation here is deliberately non-streaming: the assistant returns a
//! complete answer with its citations in one response.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use biolab_model::{ChatModel, ChatRequest, Message, OpenAIChatModel};
//!
//! let model = OpenAIChatModel::from_env("gpt-4")?;
//! let answer = model
//!     .complete(ChatRequest {
//!         messages: vec![
//!             Message::system("Vous êtes un assistant de biologie clinique."),
//!             Message::user("Quelles sont les valeurs normales de créatinine ?"),
//!         ],
//!         max_output_tokens: Some(1000),
//!         temperature: Some(0.1),
//!     })
//!     .await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod mock;
pub mod openai;

pub use error::{ModelError, Result};
pub use mock::MockChatModel;
pub use openai::OpenAIChatModel;

/// The role of a chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message: a role plus text content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A generation request: ordered messages plus sampling bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation messages, in order.
    pub messages: Vec<Message>,
    /// Upper bound on generated tokens. `None` uses the provider default.
    pub max_output_tokens: Option<u32>,
    /// Sampling temperature. `None` uses the provider default.
    pub temperature: Option<f32>,
}

/// A chat-completion model.
///
/// Implementations wrap a specific generation backend behind a unified
/// async interface. Calls block until the full completion is available.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// The model identifier, for logging and diagnostics.
    fn name(&self) -> &str;

    /// Generate a completion for the given request.
    async fn complete(&self, request: ChatRequest) -> Result<String>;
}
