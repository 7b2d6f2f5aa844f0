//! Thread sentiment aggregation.
//!
//! [`ThreadAnalyzer::analyze`] combines three signals into one
//! [`ThreadSentimentReport`]:
//!
//! ```text
//! messages ──▶ Lexicon::score ──(== 0)──▶ ModelCascade ──┐
//!                    │                                    ├─▶ text_score ─┐
//!                    └─────────(!= 0)─────────────────────┘               ├─▶ combined ─▶ Mood
//! reactions ─▶ resolve_reaction ─▶ EmojiSentimentTable ─▶ reaction_score ─┘
//! ```
//!
//! A lexical score of exactly zero is always escalated to the oracle when
//! one is configured, including for genuinely neutral text. The lexicon
//! cannot tell "neutral" from "no sentiment words", so a neutral message may
//! be overridden by the oracle's judgment. This is the scoring behavior
//! users see and is kept as-is.

use std::sync::Arc;

use anyhow::Context;

use crate::config::Config;
use crate::emoji::{summarize_reactions, EmojiSentimentTable};
use crate::lexicon::Lexicon;
use crate::models::{Message, MessageAnalysis, Mood, MoodLabel, Reaction, ThreadSentimentReport};
use crate::oracle::{GeminiClient, ModelCascade};

/// Combined scores at or above this are Positive.
pub const POSITIVE_THRESHOLD: f64 = 3.0;
/// Combined scores at or below this are Negative.
pub const NEGATIVE_THRESHOLD: f64 = -3.0;

/// Thread context handed to the oracle is cut to this many characters.
pub const MAX_CONTEXT_CHARS: usize = 500;
/// Length of [`MessageAnalysis::snippet`].
pub const SNIPPET_CHARS: usize = 120;

/// Map a combined score to a mood.
pub fn classify_mood(score: f64) -> Mood {
    let label = if score >= POSITIVE_THRESHOLD {
        MoodLabel::Positive
    } else if score <= NEGATIVE_THRESHOLD {
        MoodLabel::Negative
    } else {
        MoodLabel::Neutral
    };
    Mood::from(label)
}

/// Trim `text` and shorten it to at most `max` characters, ending in `...`
/// when shortened.
pub fn truncate_text(text: &str, max: usize) -> String {
    let normalized = text.trim();
    if normalized.chars().count() <= max {
        return normalized.to_string();
    }
    let kept: String = normalized.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Space-joined text of every analyzable message, cut to
/// [`MAX_CONTEXT_CHARS`].
pub fn build_thread_context(messages: &[Message]) -> String {
    let joined = messages
        .iter()
        .filter_map(Message::analyzable_text)
        .collect::<Vec<_>>()
        .join(" ");
    joined.chars().take(MAX_CONTEXT_CHARS).collect()
}

/// Scores threads. Cheap to clone; holds only shared read-only state.
#[derive(Clone)]
pub struct ThreadAnalyzer {
    lexicon: Arc<Lexicon>,
    emoji_table: Arc<EmojiSentimentTable>,
    cascade: Option<ModelCascade>,
}

impl ThreadAnalyzer {
    /// Lexical-only analyzer; zero scores stay zero.
    pub fn new(lexicon: Arc<Lexicon>, emoji_table: Arc<EmojiSentimentTable>) -> Self {
        Self {
            lexicon,
            emoji_table,
            cascade: None,
        }
    }

    /// Build the production analyzer: lexicon and emoji table (bundled, or
    /// from `[datasets]`), plus the Gemini cascade when a `GEMINI_API_KEY`
    /// is available.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let emoji_table = match &config.datasets.emoji_path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read emoji dataset: {}", path.display()))?;
                EmojiSentimentTable::from_json(&json)
                    .with_context(|| format!("Failed to parse emoji dataset: {}", path.display()))?
            }
            None => EmojiSentimentTable::bundled().context("Failed to load bundled emoji sentiment dataset")?,
        };
        let words = match &config.datasets.lexicon_path {
            Some(path) => Lexicon::from_afinn(
                &std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read lexicon: {}", path.display()))?,
            ),
            None => Lexicon::afinn(),
        };
        let lexicon = words.with_emoji(&emoji_table);
        tracing::info!(
            tokens = lexicon.len(),
            emojis = emoji_table.len(),
            "sentiment tables loaded"
        );

        let analyzer = Self::new(Arc::new(lexicon), Arc::new(emoji_table));

        match &config.secrets.gemini_api_key {
            Some(api_key) if config.oracle_active() => {
                let client = GeminiClient::new(&config.oracle, api_key.clone())?;
                let cascade = ModelCascade::from_config(Arc::new(client), &config.oracle);
                tracing::info!(models = ?cascade.models(), "oracle fallback enabled");
                Ok(analyzer.with_cascade(cascade))
            }
            _ => {
                tracing::info!("oracle fallback disabled; scoring is lexical only");
                Ok(analyzer)
            }
        }
    }

    /// Enable oracle escalation for zero lexical scores.
    pub fn with_cascade(mut self, cascade: ModelCascade) -> Self {
        self.cascade = Some(cascade);
        self
    }

    /// Score one text: lexical first, the cascade only on an exact zero.
    ///
    /// Returns the score and whether it came from the oracle.
    pub async fn score_text(&self, text: &str, context: &str) -> (f64, bool) {
        let lexical = self.lexicon.score(text);
        if lexical != 0 {
            return (f64::from(lexical), false);
        }

        match &self.cascade {
            Some(cascade) => match cascade.run(text, context).await {
                Some(score) => (score, true),
                None => (0.0, false),
            },
            None => (0.0, false),
        }
    }

    /// Analyze a thread and its root reactions.
    ///
    /// Messages are scored one at a time in the order given; blank messages
    /// are skipped and do not count towards `analyzed_message_count`.
    pub async fn analyze(&self, messages: &[Message], reactions: &[Reaction]) -> ThreadSentimentReport {
        let context = build_thread_context(messages);
        let mut analyses = Vec::with_capacity(messages.len());
        let mut text_score = 0.0;

        for message in messages {
            let Some(text) = message.analyzable_text() else {
                continue;
            };

            let (score, used_oracle) = self.score_text(text, &context).await;
            tracing::debug!(ts = %message.ts, score, used_oracle, "scored message");
            text_score += score;

            analyses.push(MessageAnalysis {
                ts: message.ts.clone(),
                text: text.to_string(),
                snippet: truncate_text(text, SNIPPET_CHARS),
                score,
                user: message.user.clone(),
                is_root: message.is_thread_root(),
                used_oracle,
            });
        }

        let summary = summarize_reactions(&self.emoji_table, reactions);
        let report =
            ThreadSentimentReport::new(text_score, summary.reaction_score, summary.summary_text, analyses);

        tracing::info!(
            messages = report.analyzed_message_count,
            text_score = report.text_score,
            reaction_score = report.reaction_score,
            combined_score = report.combined_score,
            mood = report.mood.label.as_str(),
            "thread analyzed"
        );
        report
    }
}
