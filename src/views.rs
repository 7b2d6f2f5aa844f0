//! Slack modal builders for the sentiment shortcut.
//!
//! All three builders are pure: they format already-computed values into
//! Block Kit JSON and never call out.

use serde_json::{json, Value};

use crate::analyzer::truncate_text;
use crate::models::{RootMessage, ThreadSentimentReport};

const TITLE: &str = "Sentiment Score";

fn modal(callback_id: &str, blocks: Vec<Value>) -> Value {
    json!({
        "type": "modal",
        "callback_id": callback_id,
        "title": { "type": "plain_text", "text": TITLE },
        "close": { "type": "plain_text", "text": "Close" },
        "blocks": blocks,
    })
}

fn section(text: String) -> Value {
    json!({ "type": "section", "text": { "type": "mrkdwn", "text": text } })
}

fn context(text: String) -> Value {
    json!({ "type": "context", "elements": [{ "type": "mrkdwn", "text": text }] })
}

fn format_user(user: Option<&str>) -> String {
    match user {
        Some(id) if !id.is_empty() => format!("<@{}>", id),
        _ => "Someone".to_string(),
    }
}

fn format_channel(channel: Option<&str>) -> String {
    match channel {
        Some(id) if !id.is_empty() => format!("<#{}>", id),
        _ => "this channel".to_string(),
    }
}

/// `+1.5` / `-0.3` / `+0.0`.
fn signed(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.1}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Shown while the thread is being fetched and scored.
pub fn loading_view(root: &RootMessage) -> Value {
    modal(
        "sentiment_score_loading",
        vec![
            section("*Analyzing conversation...*".to_string()),
            context(format!("Message snippet:\n>{}", truncate_text(&root.text, 120))),
        ],
    )
}

pub fn result_view(root: &RootMessage, report: &ThreadSentimentReport) -> Value {
    modal(
        "sentiment_score_result",
        vec![
            section(format!(
                "{} *Overall mood:* {}\n*Combined score:* {:.1}",
                report.mood.emoji,
                report.mood.label.as_str(),
                report.combined_score
            )),
            context(format!(
                "{} messages analyzed • Text score: {:.1} • Reaction adj: {}",
                report.analyzed_message_count,
                report.text_score,
                signed(report.reaction_score)
            )),
            section(format!("*Message preview*\n{}", truncate_text(&root.text, 180))),
            context(format!(
                "Posted by {} in {}",
                format_user(root.user.as_deref()),
                format_channel(root.channel_id.as_deref())
            )),
            json!({ "type": "divider" }),
            section(format!("*Reactions overview*\n{}", report.reaction_summary_text)),
            context("🔒 Sentiment is calculated on demand and not stored anywhere.".to_string()),
        ],
    )
}

pub fn error_view(reason: &str, root: &RootMessage) -> Value {
    modal(
        "sentiment_score_error",
        vec![
            section("⚠️ *Unable to calculate sentiment right now.*".to_string()),
            section(format!("Reason: `{}`", reason)),
            context(format!("Original message: {}", truncate_text(&root.text, 120))),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> RootMessage {
        RootMessage {
            text: "Launch went well".to_string(),
            user: Some("U123".to_string()),
            channel_id: Some("C456".to_string()),
        }
    }

    fn block_text(view: &Value, i: usize) -> String {
        let block = &view["blocks"][i];
        block["text"]["text"]
            .as_str()
            .or_else(|| block["elements"][0]["text"].as_str())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn test_loading_view() {
        let view = loading_view(&root());
        assert_eq!(view["callback_id"], "sentiment_score_loading");
        assert_eq!(view["title"]["text"], "Sentiment Score");
        assert_eq!(block_text(&view, 1), "Message snippet:\n>Launch went well");
    }

    #[test]
    fn test_result_view_formats_scores() {
        let report = ThreadSentimentReport::new(4.0, -0.3, ":-1: ×1".to_string(), vec![]);
        let view = result_view(&root(), &report);
        assert_eq!(view["callback_id"], "sentiment_score_result");
        assert_eq!(block_text(&view, 0), "😄 *Overall mood:* Positive\n*Combined score:* 3.7");
        assert_eq!(
            block_text(&view, 1),
            "0 messages analyzed • Text score: 4.0 • Reaction adj: -0.3"
        );
        assert_eq!(block_text(&view, 3), "Posted by <@U123> in <#C456>");
        assert_eq!(view["blocks"][4]["type"], "divider");
        assert_eq!(block_text(&view, 5), "*Reactions overview*\n:-1: ×1");
    }

    #[test]
    fn test_result_view_positive_reaction_adj() {
        let report = ThreadSentimentReport::new(0.0, 0.0, "No reactions yet.".to_string(), vec![]);
        let view = result_view(&root(), &report);
        assert!(block_text(&view, 1).ends_with("Reaction adj: +0.0"));
    }

    #[test]
    fn test_error_view() {
        let root = RootMessage {
            text: "x".to_string(),
            user: None,
            channel_id: None,
        };
        let view = error_view("boom", &root);
        assert_eq!(view["callback_id"], "sentiment_score_error");
        assert_eq!(block_text(&view, 1), "Reason: `boom`");
        assert_eq!(block_text(&view, 2), "Original message: x");
    }
}
