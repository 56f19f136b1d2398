//! Command-line runner for the cookbook snippets.
//!
//! Reads the API key from `GEMINI_API_KEY` (or `GOOGLE_API_KEY`) and media
//! files from `--media-dir`. Log output goes to stderr and follows `RUST_LOG`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{builder::PossibleValuesParser, Parser, Subcommand};
use genai_cookbook::snippets::SNIPPET_NAMES;
use genai_cookbook::{Client, PollOptions, Snippets};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Run Gemini API cookbook snippets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one or more snippets in order
    Run(RunArgs),

    /// List available snippet names
    List,
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Snippet names
    #[arg(required = true, value_parser = PossibleValuesParser::new(SNIPPET_NAMES.iter().copied()))]
    snippets: Vec<String>,

    /// Directory holding the sample media files
    #[arg(long, env = "GENAI_MEDIA_DIR", default_value = "third_party")]
    media_dir: PathBuf,

    /// Seconds between file state queries (at least 1)
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval_secs: u64,

    /// Give up waiting for file processing after this many seconds (0 disables)
    #[arg(long, default_value_t = 300)]
    poll_timeout_secs: u64,

    /// Stop after this many state queries
    #[arg(long)]
    poll_max_attempts: Option<u32>,
}

impl RunArgs {
    fn poll_options(&self) -> PollOptions {
        let options = PollOptions::new().interval(Duration::from_secs(self.poll_interval_secs));
        let options = if self.poll_timeout_secs == 0 {
            options.no_timeout()
        } else {
            options.timeout(Duration::from_secs(self.poll_timeout_secs))
        };
        match self.poll_max_attempts {
            Some(attempts) => options.max_attempts(attempts),
            None => options,
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> genai_cookbook::Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Commands::List => {
            for name in SNIPPET_NAMES {
                println!("{name}");
            }
        }
        Commands::Run(args) => {
            let client = Client::from_env()?;
            let snippets =
                Snippets::new(&client, &args.media_dir).with_poll_options(args.poll_options());
            for name in &args.snippets {
                tracing::info!(snippet = %name, "running");
                let output = snippets.run(name).await?;
                println!("== {name} ==\n{output}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_poll_interval_is_rejected() {
        let result = Cli::try_parse_from([
            "genai-cookbook",
            "run",
            "files_list",
            "--poll-interval-secs",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn poll_flags_build_options() {
        let cli = Cli::try_parse_from([
            "genai-cookbook",
            "run",
            "files_create_video",
            "--poll-interval-secs",
            "2",
            "--poll-timeout-secs",
            "0",
            "--poll-max-attempts",
            "7",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        let options = args.poll_options();
        assert_eq!(options.interval, Duration::from_secs(2));
        assert_eq!(options.timeout, None);
        assert_eq!(options.max_attempts, Some(7));
    }
}
