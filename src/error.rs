use thiserror::Error;

/// What went wrong inside a generation API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    /// Rejected credential (HTTP 401/403)
    Auth,
    /// Rate limit or quota exhaustion (HTTP 429)
    Quota,
    /// The request itself was unacceptable, including oversized transcripts
    MalformedInput,
    /// Transport-level failure before a response arrived
    Network,
    /// The API answered but not in the documented shape
    MalformedResponse,
}

impl std::fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            GenerationErrorKind::Auth => "authentication",
            GenerationErrorKind::Quota => "quota",
            GenerationErrorKind::MalformedInput => "malformed input",
            GenerationErrorKind::Network => "network",
            GenerationErrorKind::MalformedResponse => "malformed response",
        };
        write!(f, "{label}")
    }
}

/// Error type for ytsum operations. Each variant maps to one distinct
/// user-facing message.
#[derive(Error, Debug)]
pub enum YtsumError {
    #[error(
        "not a recognizable YouTube video URL: '{0}'\n\nSupported formats:\n  \
         https://www.youtube.com/watch?v=ID\n  \
         https://youtu.be/ID\n  \
         https://www.youtube.com/embed/ID\n  \
         https://www.youtube.com/shorts/ID\n  \
         <11-character video ID>"
    )]
    InvalidUrl(String),

    #[error("video '{0}' does not exist or is not publicly accessible")]
    VideoUnavailable(String),

    #[error("could not obtain a transcript: {0}")]
    TranscriptUnavailable(String),

    #[error("required tool '{tool}' not found on PATH. {hint}")]
    MissingAudioTooling { tool: String, hint: String },

    #[error("generation failed ({kind}): {message}")]
    Generation {
        kind: GenerationErrorKind,
        message: String,
    },

    #[error("{0} is not set (checked the environment and any .env file)")]
    MissingCredential(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl YtsumError {
    pub fn generation(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        YtsumError::Generation {
            kind,
            message: message.into(),
        }
    }
}

/// Result type alias for ytsum operations.
pub type Result<T> = std::result::Result<T, YtsumError>;
