//! # Thread Sentiment CLI (`thread-sentiment`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `thread-sentiment serve` | Start the Slack webhook receiver |
//! | `thread-sentiment analyze --channel C --ts T` | Score a thread from the terminal |
//! | `thread-sentiment score "<text>"` | Score a single piece of text |

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use thread_sentiment::analyzer::ThreadAnalyzer;
use thread_sentiment::config::{self, Config};
use thread_sentiment::logging::init_logging;
use thread_sentiment::models::ThreadSentimentReport;
use thread_sentiment::server;
use thread_sentiment::shortcut::analyze_thread;
use thread_sentiment::slack::SlackClient;

/// Thread Sentiment: on-demand sentiment scores for Slack threads.
///
/// Settings are read from a TOML file; credentials come from the
/// environment (`SLACK_BOT_TOKEN`, `SLACK_SIGNING_SECRET`, `GEMINI_API_KEY`).
#[derive(Parser)]
#[command(name = "thread-sentiment", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/sentiment.toml`. When the default file does not
    /// exist, built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/sentiment.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server that receives Slack message shortcuts.
    Serve,

    /// Fetch a thread from Slack and print its sentiment report.
    Analyze {
        /// Channel id (e.g. `C0123456`).
        #[arg(long)]
        channel: String,

        /// Timestamp of the thread's root message.
        #[arg(long)]
        ts: String,

        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Score a single text: lexical first, the oracle cascade if that is zero.
    Score {
        text: String,
    },
}

fn load(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        config::load_config(path)
    } else {
        Ok(Config::minimal().apply_env(|key| std::env::var(key).ok()))
    }
}

fn print_report(report: &ThreadSentimentReport) {
    println!(
        "{} {} (combined {:.1} = text {:.1} + reactions {:.1})",
        report.mood.emoji,
        report.mood.label.as_str(),
        report.combined_score,
        report.text_score,
        report.reaction_score
    );
    println!("{} messages analyzed", report.analyzed_message_count);
    println!("Reactions: {}", report.reaction_summary_text);
    println!();
    println!("{:<20} {:>6}  {:<6} SNIPPET", "TS", "SCORE", "ORACLE");
    for analysis in &report.message_analyses {
        println!(
            "{:<20} {:>6.1}  {:<6} {}",
            analysis.ts,
            analysis.score,
            if analysis.used_oracle { "yes" } else { "no" },
            analysis.snippet
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = load(&cli.config)?;
    init_logging(&cfg.logging.level);

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Analyze { channel, ts, json } => {
            let platform = SlackClient::new(&cfg.slack, cfg.secrets.slack_bot_token.clone())?;
            let analyzer = ThreadAnalyzer::from_config(&cfg)?;
            let report = analyze_thread(&platform, &analyzer, &channel, &ts).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Score { text } => {
            let analyzer = ThreadAnalyzer::from_config(&cfg)?;
            let (score, used_oracle) = analyzer.score_text(text.trim(), "").await;
            let source = if used_oracle { "oracle" } else { "lexicon" };
            println!("{:.1} ({})", score, source);
        }
    }

    Ok(())
}
