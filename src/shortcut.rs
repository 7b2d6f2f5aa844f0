//! End-to-end handling of one "Sentiment Score" message shortcut.
//!
//! # Flow
//!
//! 1. Validate the payload (trigger id, channel, root timestamp).
//! 2. Open a loading modal.
//! 3. Fetch thread messages and root reactions concurrently. A failed
//!    reactions fetch degrades to "no reactions"; a failed or empty thread
//!    fetch fails the request.
//! 4. Analyze, then replace the loading modal with the result, or with an
//!    error modal naming the reason.

use crate::analyzer::ThreadAnalyzer;
use crate::error::SentimentError;
use crate::models::{Message, Reaction, RootMessage, ShortcutPayload, ThreadSentimentReport};
use crate::traits::{ChatPlatform, ViewHandle};
use crate::views::{error_view, loading_view, result_view};

/// Validated identifiers extracted from a shortcut payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortcutTarget {
    pub trigger_id: String,
    pub channel_id: String,
    /// Root of the thread: `thread_ts` when the shortcut ran on a reply.
    pub root_ts: String,
    pub root: RootMessage,
}

impl ShortcutTarget {
    pub fn from_payload(payload: &ShortcutPayload) -> Result<Self, SentimentError> {
        let message = payload.message.as_ref();

        let channel_id = non_empty(payload.channel.as_ref().and_then(|c| c.id.as_deref()))
            .or_else(|| non_empty(message.and_then(|m| m.channel.as_deref())));
        let root_ts = non_empty(message.and_then(|m| m.thread_ts.as_deref()))
            .or_else(|| non_empty(message.and_then(|m| m.ts.as_deref())));
        let trigger_id = non_empty(payload.trigger_id.as_deref());

        let root = RootMessage {
            text: message
                .and_then(|m| m.text.clone())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "No text content".to_string()),
            user: message.and_then(|m| m.user.clone()),
            channel_id: channel_id.clone(),
        };

        match (trigger_id, channel_id, root_ts) {
            (Some(trigger_id), Some(channel_id), Some(root_ts)) => Ok(Self {
                trigger_id,
                channel_id,
                root_ts,
                root,
            }),
            _ => Err(SentimentError::InvalidPayload),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Reactions on the root message; fetch failures are logged and absorbed.
pub async fn fetch_root_reactions_lenient(
    platform: &dyn ChatPlatform,
    channel_id: &str,
    root_ts: &str,
) -> Vec<Reaction> {
    match platform.fetch_root_reactions(channel_id, root_ts).await {
        Ok(reactions) => reactions,
        Err(e) => {
            tracing::warn!(error = %e, "Unable to fetch reactions for sentiment modal");
            Vec::new()
        }
    }
}

/// Fetch both inputs concurrently and analyze them.
pub async fn analyze_thread(
    platform: &dyn ChatPlatform,
    analyzer: &ThreadAnalyzer,
    channel_id: &str,
    root_ts: &str,
) -> Result<ThreadSentimentReport, SentimentError> {
    let (messages, reactions): (Result<Vec<Message>, _>, Vec<Reaction>) = tokio::join!(
        platform.fetch_thread_messages(channel_id, root_ts),
        fetch_root_reactions_lenient(platform, channel_id, root_ts),
    );

    let messages = messages?;
    if messages.is_empty() {
        return Err(SentimentError::NoAnalyzableContent);
    }

    Ok(analyzer.analyze(&messages, &reactions).await)
}

async fn show_view(
    platform: &dyn ChatPlatform,
    target: &ShortcutTarget,
    handle: &ViewHandle,
    view: serde_json::Value,
) -> Result<(), SentimentError> {
    match &handle.id {
        Some(view_id) => platform.update_view(view_id, handle.hash.as_deref(), view).await?,
        None => {
            platform.open_view(&target.trigger_id, view).await?;
        }
    }
    Ok(())
}

/// Handle a shortcut invocation from start to finish.
///
/// Analysis failures are shown to the user in the modal; only payload
/// validation and modal delivery failures are returned.
pub async fn handle_sentiment_shortcut(
    platform: &dyn ChatPlatform,
    analyzer: &ThreadAnalyzer,
    payload: &ShortcutPayload,
) -> Result<(), SentimentError> {
    let target = ShortcutTarget::from_payload(payload)?;
    tracing::info!(channel = %target.channel_id, root_ts = %target.root_ts, "sentiment shortcut received");

    let handle = platform
        .open_view(&target.trigger_id, loading_view(&target.root))
        .await?;

    let view = match analyze_thread(platform, analyzer, &target.channel_id, &target.root_ts).await {
        Ok(report) => result_view(&target.root, &report),
        Err(e) => {
            tracing::error!(error = %e, "Sentiment analysis failed");
            error_view(&e.to_string(), &target.root)
        }
    };

    show_view(platform, &target, &handle, view).await
}
