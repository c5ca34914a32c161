use clap::Parser;

#[derive(Parser)]
#[command(
    name = "ytsum",
    about = "Summarize YouTube videos from your terminal",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video URL or 11-character video ID
    pub url: String,

    /// YouTube Data API key for the availability pre-check (overrides YOUTUBE_DATA_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Preferred caption language
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Generation model
    #[arg(long)]
    pub model: Option<String>,

    /// Skip caption extraction, always transcribe the audio locally
    #[arg(long)]
    pub whisper_only: bool,

    /// Show acquisition method and metadata
    #[arg(short, long)]
    pub verbose: bool,
}
