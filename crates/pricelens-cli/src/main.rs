use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pricelens_accuracy::ResolverContext;
use pricelens_core::UserFeedback;
use pricelens_scraper::HttpFetcher;

#[derive(Debug, Parser)]
#[command(name = "pricelens")]
#[command(about = "Resolve product listing URLs into confidence-scored product records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve a listing URL and print the scored result as JSON.
    Resolve {
        url: String,
        /// Platform product ID (ASIN, eBay item number, ...) overriding the URL's.
        #[arg(long)]
        product_id: Option<String>,
    },
    /// Print the accuracy report for the persisted metrics.
    Report,
    /// Record whether a resolved field was correct.
    Feedback(FeedbackArgs),
}

#[derive(Debug, Args)]
struct FeedbackArgs {
    #[arg(long)]
    url: String,
    #[arg(long)]
    field: String,
    #[command(flatten)]
    verdict: Verdict,
    #[arg(long)]
    expected: Option<String>,
    #[arg(long)]
    actual: Option<String>,
    #[arg(long)]
    email: Option<String>,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct Verdict {
    #[arg(long)]
    correct: bool,
    #[arg(long)]
    incorrect: bool,
}

impl FeedbackArgs {
    fn into_feedback(self) -> UserFeedback {
        UserFeedback {
            url: self.url,
            is_correct: self.verdict.correct,
            expected_value: self.expected,
            actual_value: self.actual,
            field: self.field,
            timestamp: chrono::Utc::now(),
            user_email: self.email,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = pricelens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let context = ResolverContext::from_config(&config);
    let outcome = run(cli.command, &context).await;
    context.shutdown();
    outcome
}

async fn run(command: Commands, context: &ResolverContext) -> anyhow::Result<()> {
    match command {
        Commands::Resolve { url, product_id } => {
            let fetcher = HttpFetcher::new().context("failed to build HTTP client")?;
            let enhancer = context.enhancer(Arc::new(fetcher));
            let result = enhancer
                .resolve_with_id(&url, product_id.as_deref())
                .await
                .with_context(|| format!("failed to resolve {url}"))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Report => {
            if context.config().metrics_path.is_none() {
                tracing::warn!("PRICELENS_METRICS_PATH is unset; report covers this process only");
            }
            let report = context.monitor().generate_report();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Feedback(args) => {
            let feedback = args.into_feedback();
            context.monitor().record_user_feedback(feedback.clone());
            println!("{}", serde_json::to_string_pretty(&feedback)?);
        }
    }
    Ok(())
}
