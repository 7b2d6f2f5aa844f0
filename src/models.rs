//! Core data models used throughout the sentiment pipeline.
//!
//! [`Message`] and [`Reaction`] are the inputs fetched from the chat
//! platform; [`MessageAnalysis`] and [`ThreadSentimentReport`] are the
//! values the analyzer produces. Reports are computed fresh for every
//! request and never stored.

use serde::{Deserialize, Serialize};

/// A single message in a thread, as returned by `conversations.replies`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Message {
    /// Message timestamp; unique within the channel and orderable.
    #[serde(default)]
    pub ts: String,
    /// Timestamp of the thread's root message, when part of a thread.
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Author user id.
    #[serde(default)]
    pub user: Option<String>,
}

impl Message {
    /// True when this message is the thread's originating message.
    pub fn is_thread_root(&self) -> bool {
        self.thread_ts.as_deref() == Some(self.ts.as_str())
    }

    /// The trimmed message text, or `None` when absent or blank.
    pub fn analyzable_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// An emoji reaction attached to a message.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Reaction {
    /// Reaction shortcode, possibly with a `::skin-tone-N` suffix.
    #[serde(default)]
    pub name: String,
    /// Number of distinct users who applied the reaction.
    #[serde(default)]
    pub count: u64,
}

impl Reaction {
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// Per-message scoring result.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MessageAnalysis {
    pub ts: String,
    /// Trimmed message text.
    pub text: String,
    /// Text shortened to 120 characters for display.
    pub snippet: String,
    /// Lexical score, or the oracle's score in [-3, 3] when `used_oracle`.
    pub score: f64,
    pub user: Option<String>,
    pub is_root: bool,
    pub used_oracle: bool,
}

/// Discrete mood label derived from a combined score.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum MoodLabel {
    Positive,
    Neutral,
    Negative,
}

impl MoodLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodLabel::Positive => "Positive",
            MoodLabel::Neutral => "Neutral",
            MoodLabel::Negative => "Negative",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            MoodLabel::Positive => "😄",
            MoodLabel::Neutral => "😐",
            MoodLabel::Negative => "😟",
        }
    }
}

/// A mood label together with its display emoji.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Mood {
    pub label: MoodLabel,
    pub emoji: &'static str,
}

impl From<MoodLabel> for Mood {
    fn from(label: MoodLabel) -> Self {
        Self {
            label,
            emoji: label.emoji(),
        }
    }
}

/// The combined sentiment of a thread and its root reactions.
///
/// `combined_score` is always `text_score + reaction_score`; use
/// [`ThreadSentimentReport::new`] so the sum is computed in one place.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ThreadSentimentReport {
    pub text_score: f64,
    pub reaction_score: f64,
    pub combined_score: f64,
    pub mood: Mood,
    pub reaction_summary_text: String,
    pub message_analyses: Vec<MessageAnalysis>,
    pub analyzed_message_count: usize,
}

impl ThreadSentimentReport {
    pub fn new(
        text_score: f64,
        reaction_score: f64,
        reaction_summary_text: String,
        message_analyses: Vec<MessageAnalysis>,
    ) -> Self {
        let combined_score = text_score + reaction_score;
        Self {
            text_score,
            reaction_score,
            combined_score,
            mood: crate::analyzer::classify_mood(combined_score),
            reaction_summary_text,
            analyzed_message_count: message_analyses.len(),
            message_analyses,
        }
    }
}

/// Message shortcut payload posted by Slack (`type = "message_action"`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShortcutPayload {
    #[serde(default)]
    pub trigger_id: Option<String>,
    #[serde(default)]
    pub channel: Option<ShortcutChannel>,
    #[serde(default)]
    pub message: Option<ShortcutMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShortcutChannel {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShortcutMessage {
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
}

/// The message the shortcut was invoked on, as shown in the modal.
#[derive(Debug, Clone, PartialEq)]
pub struct RootMessage {
    pub text: String,
    pub user: Option<String>,
    pub channel_id: Option<String>,
}
