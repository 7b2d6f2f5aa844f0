//! Extension seams for the external collaborators.
//!
//! The analyzer and the shortcut handler only talk to the outside world
//! through these two traits, so tests (and alternative deployments) can
//! swap in their own implementations:
//!
//! ```text
//!   ┌────────────────┐        ┌──────────────────┐
//!   │  ChatPlatform  │        │   OracleClient   │
//!   │  (SlackClient) │        │  (GeminiClient)  │
//!   └───────┬────────┘        └────────┬─────────┘
//!           │ messages, reactions,     │ generate(prompt, model)
//!           │ modal views              │
//!           ▼                          ▼
//!   handle_sentiment_shortcut ──▶ ThreadAnalyzer
//! ```
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use thread_sentiment::error::OracleError;
//! use thread_sentiment::traits::OracleClient;
//!
//! struct AlwaysPositive;
//!
//! #[async_trait]
//! impl OracleClient for AlwaysPositive {
//!     async fn generate(&self, _prompt: &str, _model: &str) -> Result<String, OracleError> {
//!         Ok("2".to_string())
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{OracleError, PlatformError};
use crate::models::{Message, Reaction};

/// Identifies an opened modal so it can be updated in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewHandle {
    pub id: Option<String>,
    pub hash: Option<String>,
}

/// The messaging platform the bot runs in.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Fetch a thread's messages in order, root message included.
    async fn fetch_thread_messages(
        &self,
        channel_id: &str,
        root_ts: &str,
    ) -> Result<Vec<Message>, PlatformError>;

    /// Fetch the reactions attached to the thread's root message.
    async fn fetch_root_reactions(
        &self,
        channel_id: &str,
        root_ts: &str,
    ) -> Result<Vec<Reaction>, PlatformError>;

    /// Open a modal view for the given interaction trigger.
    async fn open_view(&self, trigger_id: &str, view: Value) -> Result<ViewHandle, PlatformError>;

    /// Replace the contents of an open modal view.
    async fn update_view(
        &self,
        view_id: &str,
        hash: Option<&str>,
        view: Value,
    ) -> Result<(), PlatformError>;
}

/// A generative-text service that answers prompts with text.
#[async_trait]
pub trait OracleClient: Send + Sync {
    /// Send `prompt` to `model` and return the raw reply text.
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, OracleError>;
}
