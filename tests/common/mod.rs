//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use thread_sentiment::analyzer::ThreadAnalyzer;
use thread_sentiment::emoji::EmojiSentimentTable;
use thread_sentiment::error::{OracleError, PlatformError};
use thread_sentiment::lexicon::Lexicon;
use thread_sentiment::models::{Message, Reaction};
use thread_sentiment::oracle::ModelCascade;
use thread_sentiment::traits::{ChatPlatform, OracleClient, ViewHandle};

// ─── Chat platform ──────────────────────────────────────────────────

/// A platform that serves a fixed thread and records every modal call.
#[derive(Default)]
pub struct InMemoryPlatform {
    pub messages: Vec<Message>,
    pub reactions: Vec<Reaction>,
    pub fail_messages: bool,
    pub fail_reactions: bool,
    /// Returned from `open_view`; `None` forces a second `open_view`.
    pub view_id: Option<String>,
    pub opened: Mutex<Vec<Value>>,
    pub updated: Mutex<Vec<(String, Option<String>, Value)>>,
}

impl InMemoryPlatform {
    pub fn with_thread(messages: Vec<Message>, reactions: Vec<Reaction>) -> Self {
        Self {
            messages,
            reactions,
            view_id: Some("V1".to_string()),
            ..Default::default()
        }
    }

    pub fn opened_callback_ids(&self) -> Vec<String> {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .map(|v| v["callback_id"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn updated_callback_ids(&self) -> Vec<String> {
        self.updated
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, v)| v["callback_id"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

#[async_trait]
impl ChatPlatform for InMemoryPlatform {
    async fn fetch_thread_messages(
        &self,
        _channel_id: &str,
        _root_ts: &str,
    ) -> Result<Vec<Message>, PlatformError> {
        if self.fail_messages {
            return Err(PlatformError::Api {
                method: "conversations.replies".to_string(),
                code: "channel_not_found".to_string(),
            });
        }
        Ok(self.messages.clone())
    }

    async fn fetch_root_reactions(
        &self,
        _channel_id: &str,
        _root_ts: &str,
    ) -> Result<Vec<Reaction>, PlatformError> {
        if self.fail_reactions {
            return Err(PlatformError::Api {
                method: "reactions.get".to_string(),
                code: "missing_scope".to_string(),
            });
        }
        Ok(self.reactions.clone())
    }

    async fn open_view(&self, _trigger_id: &str, view: Value) -> Result<ViewHandle, PlatformError> {
        self.opened.lock().unwrap().push(view);
        Ok(ViewHandle {
            id: self.view_id.clone(),
            hash: self.view_id.as_ref().map(|_| "H1".to_string()),
        })
    }

    async fn update_view(
        &self,
        view_id: &str,
        hash: Option<&str>,
        view: Value,
    ) -> Result<(), PlatformError> {
        self.updated
            .lock()
            .unwrap()
            .push((view_id.to_string(), hash.map(str::to_string), view));
        Ok(())
    }
}

// ─── Oracle ─────────────────────────────────────────────────────────

/// An oracle answering per model, recording every call.
pub struct ScriptedOracle {
    replies: Vec<(String, Result<String, String>)>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedOracle {
    pub fn new(replies: &[(&str, Result<&str, &str>)]) -> Arc<Self> {
        Arc::new(Self {
            replies: replies
                .iter()
                .map(|(m, r)| (m.to_string(), r.map(str::to_string).map_err(str::to_string)))
                .collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn models_called(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
    }
}

#[async_trait]
impl OracleClient for ScriptedOracle {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, OracleError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));
        match self.replies.iter().find(|(m, _)| m == model) {
            Some((_, Ok(text))) => Ok(text.clone()),
            Some((_, Err(msg))) => Err(OracleError::Unavailable(msg.clone())),
            None => Err(OracleError::Unavailable(format!("model {} not found", model))),
        }
    }
}

// ─── Builders ───────────────────────────────────────────────────────

pub fn message(ts: &str, text: &str) -> Message {
    Message {
        ts: ts.to_string(),
        thread_ts: Some("100.0".to_string()),
        text: Some(text.to_string()),
        user: Some("U1".to_string()),
    }
}

pub fn bundled_tables() -> (Arc<Lexicon>, Arc<EmojiSentimentTable>) {
    (
        Arc::new(Lexicon::bundled().unwrap()),
        Arc::new(EmojiSentimentTable::bundled().unwrap()),
    )
}

pub fn lexical_analyzer() -> ThreadAnalyzer {
    let (lexicon, table) = bundled_tables();
    ThreadAnalyzer::new(lexicon, table)
}

pub fn oracle_analyzer(oracle: Arc<ScriptedOracle>, models: &[&str]) -> ThreadAnalyzer {
    let cascade = ModelCascade::new(oracle, models.iter().map(|m| m.to_string()));
    lexical_analyzer().with_cascade(cascade)
}
