use std::io;
use std::path::PathBuf;
use std::process::Command;

use eyre::Result;
use log::{debug, info};

mod cli;

use cli::Cli;
use ytsum::chat::GeminiSession;
use ytsum::config::Config;
use ytsum::gemini::GeminiClient;
use ytsum::output::{read_menu_choice, render_section};
use ytsum::{Mode, VideoReference};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytsum.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytsum")
        .join("logs")
}

fn tool_version(name: &str) -> Option<String> {
    Command::new(name)
        .arg("--version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| {
            String::from_utf8_lossy(&o.stdout)
                .trim()
                .lines()
                .next()
                .unwrap_or("")
                .to_string()
        })
}

fn tool_line(name: &str, missing_note: &str) -> String {
    match tool_version(name) {
        Some(v) => format!("  \x1b[32m✅\x1b[0m {name:<10} {v}"),
        None => format!("  \x1b[31m❌\x1b[0m {name:<10} (not found — {missing_note})"),
    }
}

fn build_after_help() -> String {
    let yt_dlp = tool_line("yt-dlp", "needed for the speech-to-text fallback");
    let ffmpeg = tool_line("ffmpeg", "needed for audio extraction");
    let whisper = tool_line("whisper", "needed for the speech-to-text fallback");

    let log_path = log_dir().join("ytsum.log");

    format!(
        "\nFALLBACK TOOLS:\n{yt_dlp}\n{ffmpeg}\n{whisper}\n\nLogs are written to: {}",
        log_path.display()
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Credentials are a startup-time concern: fail before touching the network
    let config = Config::resolve(cli.api_key.clone(), cli.lang.clone(), cli.model.clone())?;

    let video = VideoReference::parse(&cli.url)?;
    debug!("Resolved video id: {}", video.video_id);

    let client = reqwest::Client::new();

    if let Some(ref api_key) = config.youtube_api_key {
        ytsum::youtube::verify_available(&client, &video.video_id, api_key).await?;
    } else {
        debug!("No YouTube Data API key, skipping availability check");
    }

    eprintln!("Fetching transcript...");
    let transcript = if cli.whisper_only {
        ytsum::whisper::transcribe(&video, &config.lang, &config.whisper_model)?
    } else {
        ytsum::acquire_transcript(
            || ytsum::youtube::fetch_captions(&client, &video.video_id, &config.lang),
            || async {
                eprintln!("Captions unavailable, falling back to local transcription...");
                ytsum::whisper::transcribe(&video, &config.lang, &config.whisper_model)
            },
        )
        .await?
    };

    if cli.verbose {
        eprintln!(
            "Video: {} ({})\nSource: {}\nLanguage: {}\nSegments: {}",
            transcript.title,
            transcript.video_id,
            transcript.source,
            transcript.language,
            transcript.segments.len(),
        );
    }

    let stdin = io::stdin();
    let mut stdin = stdin.lock();
    let mut stdout = io::stdout();

    let Some(mode) = read_menu_choice(&mut stdin, &mut stdout)? else {
        return Ok(()); // end of input at the menu
    };

    let gemini = GeminiClient::new(client.clone(), config.gemini_api_key.clone(), config.model.clone());

    match mode {
        Mode::Summary => {
            eprintln!("Generating summary...");
            let content = gemini.generate(&transcript, Mode::Summary).await?;
            println!("{}", render_section("SUMMARY", &content.text));
        }
        Mode::Detailed => {
            eprintln!("Generating detailed description...");
            let content = gemini.generate(&transcript, Mode::Detailed).await?;
            println!("{}", render_section("DETAILED DESCRIPTION", &content.text));

            let mut session = GeminiSession::new(gemini, &transcript, &content);
            ytsum::chat::run_loop(&mut stdin, &mut stdout, &mut session).await?;
        }
    }

    Ok(())
}
