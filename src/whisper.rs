use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;
use tempfile::TempDir;

use crate::error::{Result, YtsumError};
use crate::{Segment, Transcript, TranscriptSource, VideoReference};

/// Transcribe a video by downloading its audio track and running the local
/// Whisper engine on it.
///
/// All intermediate files (the audio and Whisper's JSON output) live in a
/// temporary directory that is removed when this function returns, whether
/// it succeeds or fails.
pub fn transcribe(video: &VideoReference, lang: &str, model: &str) -> Result<Transcript> {
    let workdir = TempDir::with_prefix("ytsum-audio-")?;

    let audio_path = download_audio(video, workdir.path())?;
    let title = fetch_title(video).unwrap_or_default();
    let segments = run_whisper(&audio_path, workdir.path(), lang, model)?;

    Ok(Transcript {
        video_id: video.video_id.clone(),
        title,
        language: lang.to_string(),
        source: TranscriptSource::SpeechToText,
        segments,
    })
}

fn download_audio(video: &VideoReference, dir: &Path) -> Result<PathBuf> {
    let url = video.watch_url();
    let output_template = dir.join(format!("{}.%(ext)s", video.video_id));
    let output_path = dir.join(format!("{}.mp3", video.video_id));

    debug!("Downloading audio via yt-dlp: {url}");

    let result = Command::new("yt-dlp")
        .args([
            "--extract-audio",
            "--audio-format",
            "mp3",
            "--audio-quality",
            "9", // lowest quality = smallest file (speech doesn't need high quality)
            "--no-playlist",
            "--no-warnings",
            "-o",
        ])
        .arg(&output_template)
        .arg(&url)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output();

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(YtsumError::MissingAudioTooling {
                tool: "yt-dlp".to_string(),
                hint: "Install it to enable the speech-to-text fallback:\n  \
                       pip install yt-dlp\n  or: brew install yt-dlp"
                    .to_string(),
            });
        }
        Err(e) => {
            return Err(YtsumError::TranscriptUnavailable(format!(
                "failed to run yt-dlp: {e}"
            )));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if mentions_missing_ffmpeg(&stderr) {
            return Err(YtsumError::MissingAudioTooling {
                tool: "ffmpeg".to_string(),
                hint: "yt-dlp needs it to extract audio. Install it via your package manager."
                    .to_string(),
            });
        }
        return Err(YtsumError::TranscriptUnavailable(format!(
            "yt-dlp exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    if !output_path.exists() {
        return Err(YtsumError::TranscriptUnavailable(format!(
            "yt-dlp did not produce expected output file: {}",
            output_path.display()
        )));
    }

    Ok(output_path)
}

fn mentions_missing_ffmpeg(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    lower.contains("ffmpeg") && (lower.contains("not found") || lower.contains("not installed"))
}

fn fetch_title(video: &VideoReference) -> Option<String> {
    Command::new("yt-dlp")
        .args(["--get-title", "--no-playlist"])
        .arg(video.watch_url())
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|t| !t.is_empty())
}

fn run_whisper(audio_path: &Path, out_dir: &Path, lang: &str, model: &str) -> Result<Vec<Segment>> {
    debug!("Transcribing {} with Whisper model {model}", audio_path.display());

    let result = Command::new("whisper")
        .arg(audio_path)
        .args(["--model", model, "--language", lang])
        .args(["--output_format", "json", "--output_dir"])
        .arg(out_dir)
        .args(["--fp16", "False", "--verbose", "False"])
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output();

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(YtsumError::MissingAudioTooling {
                tool: "whisper".to_string(),
                hint: "Install it to enable the speech-to-text fallback:\n  \
                       pip install openai-whisper (requires ffmpeg)"
                    .to_string(),
            });
        }
        Err(e) => {
            return Err(YtsumError::TranscriptUnavailable(format!(
                "failed to run whisper: {e}"
            )));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(YtsumError::TranscriptUnavailable(format!(
            "whisper exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    // Whisper writes <audio stem>.json next to the requested output dir
    let stem = audio_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "audio".to_string());
    let json_path = out_dir.join(format!("{stem}.json"));

    let data = std::fs::read_to_string(&json_path).map_err(|e| {
        YtsumError::TranscriptUnavailable(format!(
            "whisper output {} unreadable: {e}",
            json_path.display()
        ))
    })?;
    let json: serde_json::Value = serde_json::from_str(&data)?;

    parse_whisper_json(&json)
}

fn parse_whisper_json(json: &serde_json::Value) -> Result<Vec<Segment>> {
    if let Some(segments) = json.get("segments").and_then(|s| s.as_array()) {
        let parsed: Vec<Segment> = segments
            .iter()
            .filter_map(|seg| {
                let text = seg.get("text")?.as_str()?.trim().to_string();
                let start = seg.get("start")?.as_f64()?;
                let end = seg.get("end")?.as_f64()?;
                if text.is_empty() {
                    return None;
                }
                Some(Segment {
                    text,
                    start,
                    duration: end - start,
                })
            })
            .collect();
        if !parsed.is_empty() {
            return Ok(parsed);
        }
    }

    // Fallback: whole-file text with no timing
    if let Some(text) = json.get("text").and_then(|t| t.as_str()) {
        let text = text.trim();
        if !text.is_empty() {
            return Ok(vec![Segment {
                text: text.to_string(),
                start: 0.0,
                duration: 0.0,
            }]);
        }
    }

    Err(YtsumError::TranscriptUnavailable(
        "unexpected whisper output format".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whisper_json_segments() {
        let json = serde_json::json!({
            "text": "Hello world. This is a test.",
            "segments": [
                { "id": 0, "start": 0.0, "end": 1.5, "text": " Hello world." },
                { "id": 1, "start": 1.5, "end": 3.0, "text": " This is a test." }
            ]
        });

        let segments = parse_whisper_json(&json).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hello world.");
        assert!((segments[0].start - 0.0).abs() < f64::EPSILON);
        assert!((segments[0].duration - 1.5).abs() < f64::EPSILON);
        assert_eq!(segments[1].text, "This is a test.");
    }

    #[test]
    fn test_parse_whisper_json_plain_text() {
        let json = serde_json::json!({ "text": "Just plain text." });

        let segments = parse_whisper_json(&json).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "Just plain text.");
    }

    #[test]
    fn test_parse_whisper_json_empty_segments_falls_back_to_text() {
        let json = serde_json::json!({
            "text": "Spoken words.",
            "segments": [
                { "id": 0, "start": 0.0, "end": 1.0, "text": "  " }
            ]
        });

        let segments = parse_whisper_json(&json).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "Spoken words.");
    }

    #[test]
    fn test_parse_whisper_json_nothing_usable() {
        let json = serde_json::json!({ "language": "en" });
        assert!(parse_whisper_json(&json).is_err());
    }

    #[test]
    fn test_mentions_missing_ffmpeg() {
        assert!(mentions_missing_ffmpeg(
            "ERROR: Postprocessing: ffmpeg not found. Please install or provide the path"
        ));
        assert!(!mentions_missing_ffmpeg("ERROR: Video unavailable"));
        assert!(!mentions_missing_ffmpeg("ffmpeg version 6.0 found"));
    }
}
