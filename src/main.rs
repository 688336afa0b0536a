use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use partner_scout::{
    Config, IndexSynchronizer, NotionStore, OllamaClient, QdrantIndex, QueryOutcome,
    QueryPipeline, RowAggregator, TelegramBot,
};

/// Scout - Retrieval-augmented Telegram gateway for partner discovery
#[derive(Parser)]
#[command(name = "scout", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the Telegram bot (default)
    Serve,
    /// Aggregate the document store and synchronize the vector index
    Ingest,
    /// Run a single query through the pipeline and print the outcome
    Query {
        /// The query text
        text: String,
    },
    /// Compare partner names between the document store and the index
    CheckSync,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,partner_scout=info",
        1 => "info,partner_scout=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::Ingest => ingest(&config).await,
        Command::Query { text } => query(&config, &text).await,
        Command::CheckSync => check_sync(&config).await,
    }
}

/// Run the Telegram bot until interrupted
async fn serve(config: &Config) -> anyhow::Result<()> {
    let token = config.require_telegram_token()?.to_string();
    let pipeline = Arc::new(build_pipeline(config));

    let bot = TelegramBot::new(token, pipeline);
    bot.connect().await?;
    bot.run().await?;
    Ok(())
}

/// Run a full ingestion pass and print the report
async fn ingest(config: &Config) -> anyhow::Result<()> {
    let synchronizer = build_synchronizer(config)?;
    let report = synchronizer.run().await?;
    println!(
        "Ingestion complete: {} upserted, {} skipped",
        report.upserted, report.skipped
    );
    Ok(())
}

/// Run one query through the pipeline and print the outcome
async fn query(config: &Config, text: &str) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config);

    match pipeline.run(text).await {
        QueryOutcome::Answered(answer) => println!("{answer}"),
        QueryOutcome::Rejected => println!("Query rejected by the relevance gate."),
        QueryOutcome::Failed => anyhow::bail!("query pipeline failed, see logs"),
    }
    Ok(())
}

/// Compare partner names between the document store and the index
async fn check_sync(config: &Config) -> anyhow::Result<()> {
    let synchronizer = build_synchronizer(config)?;
    let report = synchronizer.check_sync().await?;

    if report.is_synced() {
        println!("Document store and index hold the same partner set.");
    } else {
        if !report.store_only.is_empty() {
            println!("Missing from the index: {}", report.store_only.join(", "));
        }
        if !report.index_only.is_empty() {
            println!(
                "In the index but not the store: {}",
                report.index_only.join(", ")
            );
        }
    }
    Ok(())
}

/// Wire the query pipeline against the live services
fn build_pipeline(config: &Config) -> QueryPipeline {
    let model = Arc::new(OllamaClient::new(
        config.model_url.clone(),
        config.embed_model.clone(),
    ));
    let index = Arc::new(QdrantIndex::new(config.index_url.clone()));
    QueryPipeline::new(config, model, index)
}

/// Wire the index synchronizer against the live services
fn build_synchronizer(config: &Config) -> anyhow::Result<IndexSynchronizer> {
    let (api_key, database_id) = config.require_store()?;
    let store = Arc::new(NotionStore::new(
        api_key.to_string(),
        database_id.to_string(),
    ));
    let model = Arc::new(OllamaClient::new(
        config.model_url.clone(),
        config.embed_model.clone(),
    ));
    let index = Arc::new(QdrantIndex::new(config.index_url.clone()));

    Ok(IndexSynchronizer::new(
        RowAggregator::new(store),
        model,
        index,
        config.collection.clone(),
    ))
}
