use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ytscribe",
    about = "Download YouTube video transcripts in Markdown format.",
    version,
    long_about = "Fetch the transcript of a YouTube video and save it as a Markdown document. Human-authored captions are preferred over auto-generated ones unless a language is requested explicitly."
)]
pub struct Cli {
    /// YouTube video URL (prompted for when omitted)
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Output filename
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Transcript language code (e.g., en, es)
    #[arg(short, long, value_name = "CODE")]
    pub language: Option<String>,

    /// List available transcript languages for the provided URL and exit
    #[arg(long)]
    pub list_languages: bool,

    /// Document layout
    #[arg(short, long, value_enum)]
    pub mode: Option<RenderMode>,

    /// Where transcripts are fetched from
    #[arg(long, value_enum, env = "YTSCRIBE_BACKEND")]
    pub backend: Option<Backend>,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub show_config: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Language to request; a blank `--language` counts as none
    pub fn requested_language(&self) -> Option<&str> {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|language| !language.is_empty())
    }
}

/// Markdown layout of the rendered transcript
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// One timestamped bullet per caption segment
    #[default]
    Detailed,
    /// Title, URL and a single paragraph of text
    Condensed,
}

/// Transcript source implementation
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// YouTube watch page and InnerTube API over HTTP
    #[default]
    Web,
    /// Track discovery through the yt-dlp executable
    YtDlp,
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderMode::Detailed => write!(f, "detailed"),
            RenderMode::Condensed => write!(f, "condensed"),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Web => write!(f, "web"),
            Backend::YtDlp => write!(f, "yt-dlp"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "ytscribe",
            "https://youtu.be/dQw4w9WgXcQ",
            "-o",
            "rick.md",
            "-l",
            "es",
            "--mode",
            "condensed",
            "--backend",
            "yt-dlp",
        ])
        .unwrap();

        assert_eq!(cli.url.as_deref(), Some("https://youtu.be/dQw4w9WgXcQ"));
        assert_eq!(cli.output, Some(PathBuf::from("rick.md")));
        assert_eq!(cli.language.as_deref(), Some("es"));
        assert_eq!(cli.mode, Some(RenderMode::Condensed));
        assert_eq!(cli.backend, Some(Backend::YtDlp));
        assert!(!cli.list_languages);
    }

    #[test]
    fn test_blank_language_is_no_request() {
        let cli = Cli::try_parse_from(["ytscribe", "https://youtu.be/dQw4w9WgXcQ", "-l", ""]).unwrap();
        assert_eq!(cli.requested_language(), None);

        let cli = Cli::try_parse_from(["ytscribe", "https://youtu.be/dQw4w9WgXcQ", "-l", "  "]).unwrap();
        assert_eq!(cli.requested_language(), None);

        let cli = Cli::try_parse_from(["ytscribe", "https://youtu.be/dQw4w9WgXcQ", "-l", " es "]).unwrap();
        assert_eq!(cli.requested_language(), Some("es"));
    }

    #[test]
    fn test_url_is_optional() {
        let cli = Cli::try_parse_from(["ytscribe", "--list-languages"]).unwrap();
        assert!(cli.url.is_none());
        assert!(cli.list_languages);
    }
}
