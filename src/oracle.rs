//! Generative-text fallback scoring.
//!
//! When the lexical scorer returns exactly zero, the analyzer asks a
//! generative model for a judgment instead:
//!
//! - **[`score_via_oracle`]**: builds the rating prompt, parses the reply
//!   as a number, and clamps it to [-3, 3].
//! - **[`ModelCascade`]**: tries each candidate model in order until one
//!   produces a non-zero score.
//! - **[`GeminiClient`]**: the [`OracleClient`] used in production, calling
//!   the Gemini `generateContent` REST endpoint.
//!
//! # Cascade Outcomes
//!
//! | Attempt result | Outcome | Cascade |
//! |----------------|---------|---------|
//! | non-zero score | `Scored` | stop, adopt score |
//! | zero / unparseable reply | `Inconclusive` | next model |
//! | transport or API error | `Failed` | next model |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::OracleConfig;
use crate::error::OracleError;
use crate::traits::OracleClient;

/// Oracle scores are clamped to this magnitude.
pub const ORACLE_SCORE_BOUND: f64 = 3.0;

/// Build the rating prompt for one message.
pub fn build_prompt(text: &str, context: &str) -> String {
    let context_block = if context.is_empty() {
        String::new()
    } else {
        format!("Context:\n{}\n\n", context)
    };

    format!(
        "Analyze the sentiment of this message and return ONLY a number from -3 to +3:
- +3 = Very positive
- +2 = Positive
- +1 = Slightly positive
- 0 = Neutral
- -1 = Slightly negative
- -2 = Negative
- -3 = Very negative

{}Message: \"{}\"

Return ONLY the number, nothing else.",
        context_block, text
    )
}

/// Parse the longest leading decimal literal of `s` (after trimming).
///
/// Accepts `"2"`, `"-1.5"`, `"+2 (positive)"`, `".5"`, `"1e0"`; returns
/// `None` when no digits lead the string.
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Ask one model to rate `text`, returning a score in [-3, 3].
///
/// A reply that is not a number yields `0.0` and a warning; only transport
/// or API failures are errors.
pub async fn score_via_oracle(
    oracle: &dyn OracleClient,
    text: &str,
    context: &str,
    model: &str,
) -> Result<f64, OracleError> {
    let prompt = build_prompt(text, context);

    let reply = oracle.generate(&prompt, model).await.map_err(|e| {
        tracing::warn!(model, error = %e, "oracle model failed");
        e
    })?;
    let reply = reply.trim();

    match parse_leading_float(reply) {
        Some(score) => Ok(score.clamp(-ORACLE_SCORE_BOUND, ORACLE_SCORE_BOUND)),
        None => {
            tracing::warn!(model, reply, "oracle returned non-numeric value");
            Ok(0.0)
        }
    }
}

/// Result of one cascade attempt.
#[derive(Debug)]
pub enum OracleOutcome {
    /// A non-zero, clamped score.
    Scored(f64),
    /// The model answered zero (or something unparseable).
    Inconclusive,
    Failed(OracleError),
}

/// Ordered, deduplicated list of models to consult for one message.
#[derive(Clone)]
pub struct ModelCascade {
    oracle: Arc<dyn OracleClient>,
    models: Vec<String>,
}

impl ModelCascade {
    /// Create a cascade; blank and repeated model ids are dropped.
    pub fn new(oracle: Arc<dyn OracleClient>, models: impl IntoIterator<Item = String>) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for model in models {
            let model = model.trim();
            if !model.is_empty() && !unique.iter().any(|m| m == model) {
                unique.push(model.to_string());
            }
        }
        Self {
            oracle,
            models: unique,
        }
    }

    pub fn from_config(oracle: Arc<dyn OracleClient>, config: &OracleConfig) -> Self {
        Self::new(oracle, config.candidate_models())
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Try a single model.
    pub async fn attempt(&self, text: &str, context: &str, model: &str) -> OracleOutcome {
        match score_via_oracle(self.oracle.as_ref(), text, context, model).await {
            Ok(score) if score != 0.0 => OracleOutcome::Scored(score),
            Ok(_) => OracleOutcome::Inconclusive,
            Err(e) => OracleOutcome::Failed(e),
        }
    }

    /// Run the cascade, returning the first non-zero score, if any.
    pub async fn run(&self, text: &str, context: &str) -> Option<f64> {
        for model in &self.models {
            match self.attempt(text, context, model).await {
                OracleOutcome::Scored(score) => {
                    tracing::debug!(model = %model, score, "oracle produced a conclusive score");
                    return Some(score);
                }
                OracleOutcome::Inconclusive => {
                    tracing::debug!(model = %model, "oracle score inconclusive, trying next model");
                }
                OracleOutcome::Failed(_) => continue,
            }
        }
        None
    }
}

// ============ Gemini ============

/// [`OracleClient`] backed by the Gemini REST API.
///
/// Retry strategy, per model:
/// - HTTP 429 or 5xx → retry with exponential backoff (1s, 2s, 4s, ... capped
///   at 32s), up to `max_retries` times
/// - other HTTP errors → fail immediately
/// - network errors → retry
pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    max_retries: u32,
}

impl GeminiClient {
    pub fn new(config: &OracleConfig, api_key: impl Into<String>) -> Result<Self, OracleError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            max_retries: config.max_retries,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, model)
    }
}

#[async_trait]
impl OracleClient for GeminiClient {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, OracleError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .http
                .post(self.endpoint(model))
                .query(&[("key", self.api_key.as_str())])
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response
                            .json()
                            .await
                            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;
                        return parse_gemini_response(&json);
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    let err = OracleError::Unavailable(format!(
                        "Gemini API error {} for model {}: {}",
                        status, model, body_text
                    ));

                    if status.as_u16() == 429 || status.is_server_error() {
                        last_err = Some(err);
                        continue;
                    }
                    return Err(err);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            OracleError::Unavailable(format!("model {} failed after retries", model))
        }))
    }
}

/// Concatenate the text parts of the first candidate.
fn parse_gemini_response(json: &serde_json::Value) -> Result<String, OracleError> {
    let parts = json
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| OracleError::MalformedResponse("missing candidates[0].content.parts".into()))?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() {
        return Err(OracleError::MalformedResponse("candidate has no text".into()));
    }
    Ok(text)
}
