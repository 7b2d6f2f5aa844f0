//! Bag-of-words lexical sentiment scoring.
//!
//! Scores text against the AFINN-165 word list (`data/AFINN-en-165.txt`,
//! one `word<TAB>score` pair per line, integer polarity in -5..=5). Emoji
//! from the Emoji Sentiment Ranking are indexed as tokens too, so an emoji
//! typed into a message scores like a word:
//!
//! ```text
//! weight = floor(5 × ranking score)      🎉 0.717 → 3, 😭 -0.093 → -1
//! ```
//!
//! Emoji whose converted weight is zero are left out. The only context the
//! scorer understands is negation: a recognized token directly preceded by
//! a negator (`not`, `don't`, ...) contributes its inverted weight.
//!
//! A score of exactly zero means either "neutral" or "no known words"; the
//! two are indistinguishable here and the analyzer treats both as
//! inconclusive.

use std::collections::{HashMap, HashSet};

use crate::emoji::EmojiSentimentTable;

const BUNDLED_LEXICON: &str = include_str!("../data/AFINN-en-165.txt");

const NEGATORS: &[&str] = &[
    "aint", "ain't", "arent", "aren't", "cant", "can't", "cannot", "couldnt", "couldn't",
    "darent", "daren't", "didnt", "didn't", "doesnt", "doesn't", "dont", "don't", "hadnt",
    "hadn't", "hasnt", "hasn't", "havent", "haven't", "isnt", "isn't", "mightnt", "mightn't",
    "mustnt", "mustn't", "neednt", "needn't", "never", "no", "none", "not", "oughtnt",
    "oughtn't", "shant", "shan't", "shouldnt", "shouldn't", "wasnt", "wasn't", "werent",
    "weren't", "without", "wont", "won't", "wouldnt", "wouldn't",
];

/// Characters replaced by whitespace before splitting into tokens.
const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '?', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '_', '`',
    '"', '~', '(', ')',
];

const VARIATION_SELECTOR_16: char = '\u{FE0F}';

/// Word-list sentiment scorer.
#[derive(Debug, Clone)]
pub struct Lexicon {
    weights: HashMap<String, i32>,
    negators: HashSet<&'static str>,
}

impl Lexicon {
    /// The bundled AFINN-165 list plus the bundled emoji ranking.
    pub fn bundled() -> serde_json::Result<Self> {
        Ok(Self::afinn().with_emoji(&EmojiSentimentTable::bundled()?))
    }

    /// The bundled AFINN-165 list alone.
    pub fn afinn() -> Self {
        Self::from_afinn(BUNDLED_LEXICON)
    }

    /// Parse an AFINN-format list. Lines without a tab-separated integer
    /// score are skipped.
    pub fn from_afinn(text: &str) -> Self {
        let mut weights = Vec::new();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let parsed = line
                .split_once('\t')
                .and_then(|(word, score)| Some((word.trim(), score.trim().parse::<i32>().ok()?)));
            match parsed {
                Some((word, score)) if !word.is_empty() => weights.push((word, score)),
                _ => tracing::warn!(line, "skipping malformed lexicon line"),
            }
        }
        Self::from_weights(weights)
    }

    pub fn from_weights<I, S>(weights: I) -> Self
    where
        I: IntoIterator<Item = (S, i32)>,
        S: Into<String>,
    {
        Self {
            weights: weights
                .into_iter()
                .map(|(word, weight)| (word.into().to_lowercase(), weight))
                .collect(),
            negators: NEGATORS.iter().copied().collect(),
        }
    }

    /// Index every emoji of `table` as a token weighted `floor(5 × score)`.
    /// Existing entries win over emoji of the same spelling.
    pub fn with_emoji(mut self, table: &EmojiSentimentTable) -> Self {
        for (emoji, score) in table.iter() {
            let weight = (5.0 * score).floor() as i32;
            if weight == 0 {
                continue;
            }
            let token: String = emoji.chars().filter(|c| *c != VARIATION_SELECTOR_16).collect();
            self.weights.entry(token).or_insert(weight);
        }
        self
    }

    /// Sum of the polarity weights of recognized tokens in `text`.
    pub fn score(&self, text: &str) -> i32 {
        let tokens = tokenize(text);
        let mut total = 0;

        for (i, token) in tokens.iter().enumerate() {
            let Some(weight) = self.weights.get(token.as_str()) else {
                continue;
            };
            let negated = i > 0 && self.negators.contains(tokens[i - 1].as_str());
            total += if negated { -weight } else { *weight };
        }

        total
    }

    pub fn weight_of(&self, token: &str) -> Option<i32> {
        self.weights.get(token).copied()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace(STRIPPED_PUNCTUATION, " ")
        .replace(VARIATION_SELECTOR_16, "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> Lexicon {
        Lexicon::from_weights([("love", 3), ("great", 3), ("bad", -3), ("bug", -2), ("good", 3)])
    }

    #[test]
    fn test_sums_known_words() {
        assert_eq!(lexicon().score("I love this, great job!"), 6);
        assert_eq!(lexicon().score("bad bug"), -5);
    }

    #[test]
    fn test_unknown_words_score_zero() {
        assert_eq!(lexicon().score("the deploy is at noon"), 0);
        assert_eq!(lexicon().score(""), 0);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        assert_eq!(lexicon().score("LOVE!!! (great)"), 6);
        assert_eq!(lexicon().score("great.love"), 6);
    }

    #[test]
    fn test_question_mark_is_stripped() {
        assert_eq!(lexicon().score("is this good?"), 3);
        assert_eq!(lexicon().score("bug?!"), -2);
    }

    #[test]
    fn test_negation_inverts_next_word() {
        assert_eq!(lexicon().score("not bad"), 3);
        assert_eq!(lexicon().score("don't love it"), -3);
        assert_eq!(lexicon().score("not really bad"), -3);
    }

    #[test]
    fn test_from_afinn_parses_tab_separated_lines() {
        let lexicon = Lexicon::from_afinn("abandon\t-2\ncan't stand\t-3\n\nbroken line\nworse\tx\n");
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.weight_of("abandon"), Some(-2));
        assert_eq!(lexicon.weight_of("can't stand"), Some(-3));
    }

    #[test]
    fn test_with_emoji_floors_scaled_scores() {
        let table = EmojiSentimentTable::from_weights([
            ("🎉", 0.717),
            ("😭", -0.093),
            ("😐", 0.15),
            ("\u{2764}\u{FE0F}", 0.746),
        ]);
        let lexicon = lexicon().with_emoji(&table);

        assert_eq!(lexicon.weight_of("🎉"), Some(3));
        assert_eq!(lexicon.weight_of("😭"), Some(-1));
        assert_eq!(lexicon.weight_of("😐"), None);
        assert_eq!(lexicon.weight_of("\u{2764}"), Some(3));
        assert_eq!(lexicon.score("love it \u{2764}\u{FE0F}"), 6);
    }

    #[test]
    fn test_with_emoji_keeps_existing_words() {
        let table = EmojiSentimentTable::from_weights([("love", -1.0)]);
        assert_eq!(lexicon().with_emoji(&table).weight_of("love"), Some(3));
    }

    #[test]
    fn test_bundled_lexicon() {
        let lexicon = Lexicon::bundled().unwrap();
        assert!(lexicon.len() > 3000);
        assert!(lexicon.score("thanks, this is awesome") > 0);
        assert!(lexicon.score("this is terrible") < 0);
        assert_eq!(lexicon.score("is this good?"), 3);
        assert!(lexicon.score("this sucks, wtf") < 0);
        assert_eq!(lexicon.score("release notes are in the channel"), 0);
    }

    #[test]
    fn test_bundled_emoji_in_text_counts() {
        let lexicon = Lexicon::bundled().unwrap();
        assert_eq!(lexicon.score("shipped 🎉"), 3);
        assert_eq!(lexicon.score("shipped 🎉 😍"), 6);
        assert_eq!(Lexicon::afinn().score("shipped 🎉"), 0);
    }
}
