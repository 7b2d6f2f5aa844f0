use thiserror::Error;

/// Failures from the generative-text oracle.
///
/// Both variants are recovered by the model cascade; neither reaches the
/// caller of `ThreadAnalyzer::analyze`.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    #[error("oracle returned a malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        OracleError::Unavailable(err.to_string())
    }
}

/// Failures talking to the chat platform.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered with `ok: false`.
    #[error("{method} failed: {code}")]
    Api { method: String, code: String },

    #[error("failed to decode {method} response: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Request-level failures surfaced to the shortcut handler.
#[derive(Error, Debug)]
pub enum SentimentError {
    #[error("Slack payload missing trigger_id, channel, or message timestamp.")]
    InvalidPayload,

    #[error("Unable to read conversation messages (is the bot in the channel?)")]
    NoAnalyzableContent,

    #[error(transparent)]
    Platform(#[from] PlatformError),
}
