//! Emoji reaction sentiment.
//!
//! Three pieces turn a list of Slack reactions into a score adjustment:
//!
//! - **[`resolve_reaction`]**: maps a reaction name (`tada`, `+1`,
//!   `thumbsup::skin-tone-3`) to the emoji character it stands for.
//! - **[`EmojiSentimentTable`]**: emoji character → signed weight, built
//!   from the bundled Emoji Sentiment Ranking dataset.
//! - **[`summarize_reactions`]**: weights the first
//!   [`MAX_SUMMARIZED_REACTIONS`] reactions by their counts and builds the
//!   display summary.
//!
//! # Dataset Format
//!
//! `data/emoji_sentiment.json` holds an array of entries whose `sequence`
//! field is a hyphen-delimited list of hex code points:
//!
//! ```json
//! [{ "sequence": "1F44D", "name": "thumbs up sign", "score": 0.521 }]
//! ```

use serde::Deserialize;
use std::collections::HashMap;

use crate::models::Reaction;

/// Only this many reactions are weighted and listed; later ones are ignored.
pub const MAX_SUMMARIZED_REACTIONS: usize = 8;

/// Summary text used when a message has no reactions.
pub const NO_REACTIONS_TEXT: &str = "No reactions yet.";

const SUMMARY_SEPARATOR: &str = " • ";

const VARIATION_SELECTOR_16: char = '\u{FE0F}';

const BUNDLED_DATASET: &str = include_str!("../data/emoji_sentiment.json");

/// Platform shorthand that the shortcode directory may not know.
const REACTION_ALIASES: &[(&str, &str)] = &[
    ("thumbsup", "👍"),
    ("thumbsdown", "👎"),
    ("+1", "👍"),
    ("-1", "👎"),
];

#[derive(Debug, Deserialize)]
struct DatasetEntry {
    sequence: String,
    score: f64,
}

/// Immutable emoji → sentiment weight map.
#[derive(Debug, Clone, Default)]
pub struct EmojiSentimentTable {
    weights: HashMap<String, f64>,
}

impl EmojiSentimentTable {
    /// Build the table from the dataset compiled into the binary.
    pub fn bundled() -> serde_json::Result<Self> {
        Self::from_json(BUNDLED_DATASET)
    }

    /// Build a table from a JSON dataset string.
    ///
    /// Entries whose sequence does not decode to valid characters are
    /// skipped with a warning.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let entries: Vec<DatasetEntry> = serde_json::from_str(json)?;
        let mut weights = HashMap::with_capacity(entries.len());

        for entry in entries {
            match decode_sequence(&entry.sequence) {
                Some(emoji) => {
                    weights.insert(emoji, entry.score);
                }
                None => {
                    tracing::warn!(sequence = %entry.sequence, "skipping undecodable emoji dataset entry");
                }
            }
        }

        Ok(Self { weights })
    }

    /// Build a table from already-decoded `(emoji, weight)` pairs.
    pub fn from_weights<I, S>(weights: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            weights: weights.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Sentiment weight of an emoji character, if the dataset has one.
    ///
    /// Falls back to the emoji with its U+FE0F presentation selector removed,
    /// since the dataset indexes the bare code points.
    pub fn weight_of(&self, emoji: &str) -> Option<f64> {
        if let Some(weight) = self.weights.get(emoji) {
            return Some(*weight);
        }
        if emoji.contains(VARIATION_SELECTOR_16) {
            let bare: String = emoji.chars().filter(|c| *c != VARIATION_SELECTOR_16).collect();
            return self.weights.get(&bare).copied();
        }
        None
    }

    /// Every `(emoji, weight)` pair, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.weights.iter().map(|(emoji, weight)| (emoji.as_str(), *weight))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Decode a hyphen-delimited hex code point sequence (`"1F1FA-1F1F8"`).
pub fn decode_sequence(sequence: &str) -> Option<String> {
    if sequence.trim().is_empty() {
        return None;
    }
    sequence
        .split('-')
        .map(|part| u32::from_str_radix(part.trim(), 16).ok().and_then(char::from_u32))
        .collect()
}

/// Resolve a reaction name to its emoji character.
///
/// The name is lowercased and any `::` suffix (skin tone) is dropped before
/// looking it up in the shortcode directory, then in [`REACTION_ALIASES`].
pub fn resolve_reaction(name: &str) -> Option<&'static str> {
    let normalized = name.to_lowercase();
    let base = normalized
        .split("::")
        .next()
        .unwrap_or_default()
        .trim_matches(':');
    if base.is_empty() {
        return None;
    }

    emojis::get_by_shortcode(base)
        .map(|emoji| emoji.as_str())
        .or_else(|| {
            REACTION_ALIASES
                .iter()
                .find(|(alias, _)| *alias == base)
                .map(|(_, emoji)| *emoji)
        })
}

/// Score contribution of a single reaction: `weight × count`, or 0.
pub fn reaction_delta(table: &EmojiSentimentTable, reaction: &Reaction) -> f64 {
    resolve_reaction(&reaction.name)
        .and_then(|emoji| table.weight_of(emoji))
        .map(|weight| weight * reaction.count as f64)
        .unwrap_or(0.0)
}

/// Reaction score plus the human-readable summary line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionSummary {
    pub reaction_score: f64,
    pub summary_text: String,
}

/// Reduce reactions to a score and a summary, in the order given.
pub fn summarize_reactions(table: &EmojiSentimentTable, reactions: &[Reaction]) -> ReactionSummary {
    if reactions.is_empty() {
        return ReactionSummary {
            reaction_score: 0.0,
            summary_text: NO_REACTIONS_TEXT.to_string(),
        };
    }

    let mut reaction_score = 0.0;
    let mut parts = Vec::with_capacity(reactions.len().min(MAX_SUMMARIZED_REACTIONS));

    for reaction in reactions.iter().take(MAX_SUMMARIZED_REACTIONS) {
        reaction_score += reaction_delta(table, reaction);
        let name = if reaction.name.is_empty() {
            "reaction"
        } else {
            reaction.name.as_str()
        };
        parts.push(format!(":{}: ×{}", name, reaction.count));
    }

    ReactionSummary {
        reaction_score,
        summary_text: parts.join(SUMMARY_SEPARATOR),
    }
}
