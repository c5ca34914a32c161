use log::debug;

use crate::error::{GenerationErrorKind, Result, YtsumError};
use crate::{GeneratedContent, Mode, Transcript};

/// Hard cap on transcript length sent to the API. Longer transcripts are
/// rejected up front rather than silently truncated.
pub const MAX_TRANSCRIPT_CHARS: usize = 60_000;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// One turn of a generateContent conversation
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: &'static str,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Turn { role: "user", text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Turn { role: "model", text: text.into() }
    }
}

/// Client for the Gemini generateContent API
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, api_key: String, model: String) -> Self {
        Self { client, api_key, model }
    }

    /// Produce a summary or detailed description for the transcript with a
    /// single blocking API call.
    pub async fn generate(&self, transcript: &Transcript, mode: Mode) -> Result<GeneratedContent> {
        let text = prepared_transcript(transcript)?;
        let prompt = build_prompt(mode, &transcript.title, &text);
        let answer = self.generate_content(&[Turn::user(prompt)]).await?;
        Ok(GeneratedContent { mode, text: answer })
    }

    /// Issue one generateContent call over the given turns and return the
    /// model's text response unmodified.
    pub async fn generate_content(&self, turns: &[Turn]) -> Result<String> {
        let url = format!("{API_BASE}/{}:generateContent?key={}", self.model, self.api_key);
        debug!("Calling Gemini model {} with {} turns", self.model, turns.len());

        let body = serde_json::json!({
            "contents": contents_json(turns),
            "generationConfig": {
                "temperature": 0.3,
                "maxOutputTokens": 4096
            }
        });

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                YtsumError::generation(GenerationErrorKind::Network, format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(YtsumError::Generation {
                kind: kind_for_status(status),
                message: format!("Gemini API returned {status}: {body}"),
            });
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            YtsumError::generation(
                GenerationErrorKind::MalformedResponse,
                format!("response body unreadable: {e}"),
            )
        })?;

        extract_candidate_text(&json)
    }
}

fn contents_json(turns: &[Turn]) -> serde_json::Value {
    serde_json::Value::Array(
        turns
            .iter()
            .map(|t| {
                serde_json::json!({
                    "role": t.role,
                    "parts": [{ "text": t.text }]
                })
            })
            .collect(),
    )
}

fn kind_for_status(status: reqwest::StatusCode) -> GenerationErrorKind {
    use reqwest::StatusCode;
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationErrorKind::Auth,
        StatusCode::TOO_MANY_REQUESTS => GenerationErrorKind::Quota,
        StatusCode::BAD_REQUEST => GenerationErrorKind::MalformedInput,
        _ => GenerationErrorKind::Network,
    }
}

fn extract_candidate_text(json: &serde_json::Value) -> Result<String> {
    let text = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(YtsumError::generation(
            GenerationErrorKind::MalformedResponse,
            "no candidate text in Gemini response",
        ));
    }
    Ok(text)
}

/// Flatten the transcript for prompt embedding, rejecting oversized input.
fn prepared_transcript(transcript: &Transcript) -> Result<String> {
    let text = transcript.plain_text();
    if text.len() > MAX_TRANSCRIPT_CHARS {
        return Err(YtsumError::generation(
            GenerationErrorKind::MalformedInput,
            format!(
                "transcript is {} characters, over the {MAX_TRANSCRIPT_CHARS} character limit",
                text.len()
            ),
        ));
    }
    Ok(text)
}

fn build_prompt(mode: Mode, title: &str, transcript_text: &str) -> String {
    match mode {
        Mode::Summary => format!(
            "You are a senior content analyst. Read the transcript of a YouTube video \
             titled \"{title}\" and produce an executive summary that:\n\
             - Uses crisp bullet points (at most 12).\n\
             - Uses clear language a layperson can follow.\n\
             - Covers every major argument, example, and data point.\n\
             - Opens with one sentence answering the question implied by the title.\n\
             - Notes in one bullet if the title over-promises.\n\n\
             Transcript:\n{transcript_text}"
        ),
        Mode::Detailed => format!(
            "You are a professional educator writing an in-depth explanation of a YouTube \
             video titled \"{title}\". Using only the transcript below plus widely-accepted \
             background knowledge, write a detailed description with these sections:\n\n\
             1. Overview - a short paragraph on the central topic.\n\
             2. Detailed Walk-through - headings mirroring the video's flow, with the \
             important details, facts, and figures.\n\
             3. Analysis - how strong the arguments, evidence, or demos are.\n\
             4. Key Takeaways - a numbered list.\n\n\
             Keep it comprehensive but under roughly 800 words.\n\n\
             Transcript:\n{transcript_text}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Segment, TranscriptSource};

    fn transcript_with_text(text: &str) -> Transcript {
        Transcript {
            video_id: "test123".to_string(),
            title: "Test Video".to_string(),
            language: "en".to_string(),
            source: TranscriptSource::Captions,
            segments: vec![Segment {
                text: text.to_string(),
                start: 0.0,
                duration: 1.0,
            }],
        }
    }

    #[test]
    fn test_kind_for_status() {
        use reqwest::StatusCode;
        assert_eq!(kind_for_status(StatusCode::UNAUTHORIZED), GenerationErrorKind::Auth);
        assert_eq!(kind_for_status(StatusCode::FORBIDDEN), GenerationErrorKind::Auth);
        assert_eq!(kind_for_status(StatusCode::TOO_MANY_REQUESTS), GenerationErrorKind::Quota);
        assert_eq!(kind_for_status(StatusCode::BAD_REQUEST), GenerationErrorKind::MalformedInput);
        assert_eq!(
            kind_for_status(StatusCode::INTERNAL_SERVER_ERROR),
            GenerationErrorKind::Network
        );
    }

    #[test]
    fn test_extract_candidate_text() {
        let json = serde_json::json!({
            "candidates": [
                {
                    "content": {
                        "role": "model",
                        "parts": [
                            { "text": "Here is " },
                            { "text": "the summary." }
                        ]
                    }
                }
            ]
        });
        assert_eq!(extract_candidate_text(&json).unwrap(), "Here is the summary.");
    }

    #[test]
    fn test_extract_candidate_text_empty() {
        let json = serde_json::json!({"candidates": []});
        let err = extract_candidate_text(&json).unwrap_err();
        assert!(matches!(
            err,
            YtsumError::Generation { kind: GenerationErrorKind::MalformedResponse, .. }
        ));
    }

    #[test]
    fn test_contents_json_shape() {
        let turns = [Turn::user("question"), Turn::model("answer")];
        let value = contents_json(&turns);
        assert_eq!(value[0]["role"], "user");
        assert_eq!(value[0]["parts"][0]["text"], "question");
        assert_eq!(value[1]["role"], "model");
        assert_eq!(value[1]["parts"][0]["text"], "answer");
    }

    #[test]
    fn test_prompts_differ_by_mode() {
        let summary = build_prompt(Mode::Summary, "Title", "the transcript body");
        let detailed = build_prompt(Mode::Detailed, "Title", "the transcript body");

        assert!(summary.contains("bullet points"));
        assert!(summary.contains("the transcript body"));

        assert!(detailed.contains("Overview"));
        assert!(detailed.contains("Key Takeaways"));
        assert!(detailed.contains("the transcript body"));

        assert_ne!(summary, detailed);
    }

    #[test]
    fn test_oversized_transcript_rejected() {
        let transcript = transcript_with_text(&"x".repeat(MAX_TRANSCRIPT_CHARS + 1));
        let err = prepared_transcript(&transcript).unwrap_err();
        assert!(matches!(
            err,
            YtsumError::Generation { kind: GenerationErrorKind::MalformedInput, .. }
        ));
    }

    #[test]
    fn test_fitting_transcript_accepted() {
        let transcript = transcript_with_text("short and sweet");
        assert_eq!(prepared_transcript(&transcript).unwrap(), "short and sweet");
    }
}
