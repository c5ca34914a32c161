pub mod chat;
pub mod config;
pub mod error;
pub mod gemini;
pub mod output;
pub mod whisper;
pub mod youtube;

pub use error::{GenerationErrorKind, Result, YtsumError};

/// A validated reference to a single YouTube video
#[derive(Debug, Clone)]
pub struct VideoReference {
    pub video_id: String,
    pub url: String,
}

impl VideoReference {
    /// Parse free-form user input into a video reference
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        match extract_video_id(input) {
            Some(video_id) => Ok(Self {
                video_id,
                url: input.to_string(),
            }),
            None => Err(YtsumError::InvalidUrl(input.to_string())),
        }
    }

    /// Canonical watch URL, used for audio download regardless of the
    /// original input shape
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

/// A single captioned segment
#[derive(Debug, Clone)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Origin of the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptSource {
    Captions,
    SpeechToText,
}

impl std::fmt::Display for TranscriptSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptSource::Captions => write!(f, "captions"),
            TranscriptSource::SpeechToText => write!(f, "speech-to-text"),
        }
    }
}

/// Complete transcript for a video
#[derive(Debug, Clone)]
pub struct Transcript {
    pub video_id: String,
    pub title: String,
    pub language: String,
    pub source: TranscriptSource,
    pub segments: Vec<Segment>,
}

impl Transcript {
    /// Whole transcript as one whitespace-normalized string
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// True when no segment carries any non-whitespace text
    pub fn is_blank(&self) -> bool {
        self.segments.iter().all(|s| s.text.trim().is_empty())
    }
}

/// Requested generation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Summary,
    Detailed,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Summary => write!(f, "summary"),
            Mode::Detailed => write!(f, "detailed"),
        }
    }
}

/// Text returned by the generation API, tagged with the mode that produced it
#[derive(Debug, Clone)]
pub struct GeneratedContent {
    pub mode: Mode,
    pub text: String,
}

const VIDEO_ID_PATTERN: &str = r"^[a-zA-Z0-9_-]{11}$";

const URL_PATTERNS: &[&str] = &[
    r"youtube\.com/watch\?.*v=([a-zA-Z0-9_-]{11})",
    r"youtu\.be/([a-zA-Z0-9_-]{11})",
    r"youtube\.com/embed/([a-zA-Z0-9_-]{11})",
    r"youtube\.com/shorts/([a-zA-Z0-9_-]{11})",
];

/// Extract a video ID from various YouTube URL formats or a bare ID
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    if regex::Regex::new(VIDEO_ID_PATTERN).unwrap().is_match(input) {
        return Some(input.to_string());
    }

    URL_PATTERNS.iter().find_map(|pattern| {
        regex::Regex::new(pattern)
            .unwrap()
            .captures(input)
            .map(|caps| caps[1].to_string())
    })
}

/// Run the transcript fallback chain: captions first, speech-to-text only
/// when captions are unavailable. Each source is attempted exactly once.
pub async fn acquire_transcript<CFut, SFut>(
    captions: impl FnOnce() -> CFut,
    speech_to_text: impl FnOnce() -> SFut,
) -> Result<Transcript>
where
    CFut: std::future::Future<Output = Result<Transcript>>,
    SFut: std::future::Future<Output = Result<Transcript>>,
{
    match captions().await {
        Ok(transcript) => Ok(transcript),
        Err(e) => {
            log::info!("Caption fetch failed: {e}");
            speech_to_text().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_video_id() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_short_url() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_shorts_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_invalid_url() {
        assert_eq!(extract_video_id("not-a-url"), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_whitespace_trimming() {
        assert_eq!(extract_video_id("  dQw4w9WgXcQ  "), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_parse_rejects_invalid_input() {
        let err = VideoReference::parse("https://example.com/video").unwrap_err();
        assert!(matches!(err, YtsumError::InvalidUrl(_)));
    }

    #[test]
    fn test_parse_builds_watch_url() {
        let video = VideoReference::parse("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(video.video_id, "dQw4w9WgXcQ");
        assert_eq!(video.watch_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[test]
    fn test_plain_text_normalizes_whitespace() {
        let t = Transcript {
            video_id: "test123".to_string(),
            title: "Test".to_string(),
            language: "en".to_string(),
            source: TranscriptSource::Captions,
            segments: vec![
                Segment {
                    text: "  Hello world ".to_string(),
                    start: 0.0,
                    duration: 1.0,
                },
                Segment {
                    text: "   ".to_string(),
                    start: 1.0,
                    duration: 0.5,
                },
                Segment {
                    text: "again".to_string(),
                    start: 1.5,
                    duration: 1.0,
                },
            ],
        };
        assert_eq!(t.plain_text(), "Hello world again");
        assert!(!t.is_blank());
    }

    #[test]
    fn test_blank_transcript() {
        let t = Transcript {
            video_id: "test123".to_string(),
            title: String::new(),
            language: "en".to_string(),
            source: TranscriptSource::SpeechToText,
            segments: vec![Segment {
                text: "  ".to_string(),
                start: 0.0,
                duration: 0.0,
            }],
        };
        assert!(t.is_blank());
        assert_eq!(t.plain_text(), "");
    }

    fn transcript_from(source: TranscriptSource) -> Transcript {
        Transcript {
            video_id: "abc123defgh".to_string(),
            title: "Test".to_string(),
            language: "en".to_string(),
            source,
            segments: vec![Segment {
                text: "Hello world.".to_string(),
                start: 0.0,
                duration: 1.0,
            }],
        }
    }

    #[tokio::test]
    async fn test_captions_win_and_fallback_is_never_invoked() {
        use std::cell::Cell;
        let fallback_called = Cell::new(false);

        let transcript = acquire_transcript(
            || async { Ok(transcript_from(TranscriptSource::Captions)) },
            || async {
                fallback_called.set(true);
                Ok(transcript_from(TranscriptSource::SpeechToText))
            },
        )
        .await
        .unwrap();

        assert_eq!(transcript.source, TranscriptSource::Captions);
        assert!(!fallback_called.get());
    }

    #[tokio::test]
    async fn test_fallback_runs_when_captions_unavailable() {
        let transcript = acquire_transcript(
            || async { Err(YtsumError::TranscriptUnavailable("no captions".to_string())) },
            || async { Ok(transcript_from(TranscriptSource::SpeechToText)) },
        )
        .await
        .unwrap();

        assert_eq!(transcript.source, TranscriptSource::SpeechToText);
    }

    #[tokio::test]
    async fn test_fallback_failure_propagates() {
        let err = acquire_transcript(
            || async { Err(YtsumError::TranscriptUnavailable("no captions".to_string())) },
            || async {
                Err(YtsumError::MissingAudioTooling {
                    tool: "whisper".to_string(),
                    hint: "install it".to_string(),
                })
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, YtsumError::MissingAudioTooling { .. }));
    }
}
