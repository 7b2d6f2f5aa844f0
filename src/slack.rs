//! Slack Web API client.
//!
//! Implements [`ChatPlatform`] over the four Web API methods the bot uses:
//!
//! | Method | HTTP | Purpose |
//! |--------|------|---------|
//! | `conversations.replies` | GET | thread messages, root included |
//! | `reactions.get` | GET | reactions on the root message |
//! | `views.open` | POST | open the loading modal |
//! | `views.update` | POST | replace the loading modal |
//!
//! Slack reports most failures as HTTP 200 with `{"ok": false, "error": "..."}`;
//! those surface as [`PlatformError::Api`].

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::config::SlackConfig;
use crate::error::PlatformError;
use crate::models::{Message, Reaction};
use crate::traits::{ChatPlatform, ViewHandle};

pub struct SlackClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
    page_size: u32,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepliesResponse {
    #[serde(default)]
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct ReactionsResponse {
    #[serde(default)]
    message: Option<ReactedMessage>,
}

#[derive(Debug, Deserialize)]
struct ReactedMessage {
    #[serde(default)]
    reactions: Vec<Reaction>,
}

#[derive(Debug, Deserialize)]
struct ViewResponse {
    #[serde(default)]
    view: Option<ViewInfo>,
}

#[derive(Debug, Deserialize)]
struct ViewInfo {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    hash: Option<String>,
}

impl SlackClient {
    /// Create a client. A missing token is allowed, but every call will be
    /// rejected by Slack with `not_authed`.
    pub fn new(config: &SlackConfig, token: Option<String>) -> Result<Self, PlatformError> {
        let token = token.unwrap_or_default();
        if token.is_empty() {
            tracing::warn!("SLACK_BOT_TOKEN is not set. Slack API calls will fail.");
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token,
            page_size: config.thread_page_size,
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, &str)],
    ) -> Result<T, PlatformError> {
        let response = self
            .http
            .get(self.url(method))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        decode(method, response.json().await?)
    }

    async fn post<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, PlatformError> {
        let response = self
            .http
            .post(self.url(method))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        decode(method, response.json().await?)
    }
}

/// Check the `ok` flag, then decode the method-specific body.
fn decode<T: DeserializeOwned>(method: &str, json: Value) -> Result<T, PlatformError> {
    let envelope: Envelope =
        serde_json::from_value(json.clone()).map_err(|source| PlatformError::Decode {
            method: method.to_string(),
            source,
        })?;

    if !envelope.ok {
        return Err(PlatformError::Api {
            method: method.to_string(),
            code: envelope.error.unwrap_or_else(|| "unknown_error".to_string()),
        });
    }

    serde_json::from_value(json).map_err(|source| PlatformError::Decode {
        method: method.to_string(),
        source,
    })
}

#[async_trait]
impl ChatPlatform for SlackClient {
    async fn fetch_thread_messages(
        &self,
        channel_id: &str,
        root_ts: &str,
    ) -> Result<Vec<Message>, PlatformError> {
        let limit = self.page_size.to_string();
        let response: RepliesResponse = self
            .get(
                "conversations.replies",
                &[
                    ("channel", channel_id),
                    ("ts", root_ts),
                    ("inclusive", "true"),
                    ("limit", limit.as_str()),
                ],
            )
            .await?;
        Ok(response.messages)
    }

    async fn fetch_root_reactions(
        &self,
        channel_id: &str,
        root_ts: &str,
    ) -> Result<Vec<Reaction>, PlatformError> {
        let response: ReactionsResponse = self
            .get(
                "reactions.get",
                &[("channel", channel_id), ("timestamp", root_ts), ("full", "true")],
            )
            .await?;
        Ok(response.message.map(|m| m.reactions).unwrap_or_default())
    }

    async fn open_view(&self, trigger_id: &str, view: Value) -> Result<ViewHandle, PlatformError> {
        let body = serde_json::json!({ "trigger_id": trigger_id, "view": view });
        let response: ViewResponse = self.post("views.open", &body).await?;
        Ok(response
            .view
            .map(|v| ViewHandle {
                id: v.id,
                hash: v.hash,
            })
            .unwrap_or_default())
    }

    async fn update_view(
        &self,
        view_id: &str,
        hash: Option<&str>,
        view: Value,
    ) -> Result<(), PlatformError> {
        let mut body = serde_json::json!({ "view_id": view_id, "view": view });
        if let Some(hash) = hash {
            body["hash"] = Value::String(hash.to_string());
        }
        let _: Envelope = self.post("views.update", &body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_replies() {
        let json = json!({
            "ok": true,
            "messages": [
                { "ts": "1.0", "thread_ts": "1.0", "text": "root", "user": "U1" },
                { "ts": "1.1", "thread_ts": "1.0", "text": "reply" },
                { "ts": "1.2", "subtype": "bot_message" }
            ],
            "has_more": false
        });
        let response: RepliesResponse = decode("conversations.replies", json).unwrap();
        assert_eq!(response.messages.len(), 3);
        assert!(response.messages[0].is_thread_root());
        assert_eq!(response.messages[2].text, None);
    }

    #[test]
    fn test_decode_reactions() {
        let json = json!({
            "ok": true,
            "type": "message",
            "message": { "reactions": [{ "name": "+1", "count": 2, "users": ["U1", "U2"] }] }
        });
        let response: ReactionsResponse = decode("reactions.get", json).unwrap();
        let reactions = response.message.unwrap().reactions;
        assert_eq!(reactions, vec![Reaction::new("+1", 2)]);
    }

    #[test]
    fn test_decode_api_error() {
        let err = decode::<RepliesResponse>("conversations.replies", json!({ "ok": false, "error": "not_in_channel" }))
            .unwrap_err();
        match err {
            PlatformError::Api { method, code } => {
                assert_eq!(method, "conversations.replies");
                assert_eq!(code, "not_in_channel");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_missing_ok_is_decode_error() {
        let err = decode::<RepliesResponse>("conversations.replies", json!({ "messages": [] })).unwrap_err();
        assert!(matches!(err, PlatformError::Decode { .. }));
    }
}
