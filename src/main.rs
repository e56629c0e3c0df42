use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use stylerag_cli::{
    display_banner, handle_input_with_history, print_answer, print_diagnostics, print_help,
};
use stylerag_core::{PipelineConfig, QaEngine, VectorIndex};
use stylerag_openai::{OpenAiClient, OpenAiConfig};
use stylerag_pinecone::{PineconeConfig, PineconeIndex};
use stylerag_rag::{InMemoryIndex, PassageStore, QaPipeline};

#[derive(Parser)]
#[command(name = "stylerag")]
#[command(about = "Code style Q&A grounded in indexed style guides", long_about = None)]
struct Cli {
    /// Ask a single question and exit
    #[arg(short, long)]
    question: Option<String>,

    /// Passage mapping persisted alongside the index
    #[arg(long, default_value = "./data/mapping.json")]
    passages: PathBuf,

    /// Query a local index snapshot instead of Pinecone
    #[arg(long)]
    index_snapshot: Option<PathBuf>,

    /// Token budget for the retrieved context
    #[arg(long)]
    max_context_tokens: Option<usize>,

    /// Number of passages to retrieve
    #[arg(long)]
    top_k: Option<usize>,

    /// Print index and model details and exit
    #[arg(long)]
    info: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "stylerag=debug,stylerag_rag=debug,stylerag_openai=debug,stylerag_pinecone=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn pipeline_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::default().with_env_overrides()?;
    if let Some(max_tokens) = cli.max_context_tokens {
        config.max_context_tokens = max_tokens;
    }
    if let Some(top_k) = cli.top_k {
        config.top_k = top_k;
    }
    config.validate()?;
    Ok(config)
}

// Single-threaded on purpose: each question runs end to end on this thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = pipeline_config(&cli)?;
    tracing::info!(
        top_k = config.top_k,
        max_context_tokens = config.max_context_tokens,
        timeout_secs = config.request_timeout.as_secs(),
        "starting stylerag"
    );
    let openai = OpenAiConfig::from_env()?;
    let passages = Arc::new(PassageStore::load(&cli.passages)?);

    match &cli.index_snapshot {
        Some(path) => {
            let index = InMemoryIndex::load(path)?;
            run(&cli, config, openai, index, passages).await
        }
        None => {
            println!("{} Connecting to Pinecone...", "🔌".blue());
            let index = PineconeIndex::connect(PineconeConfig::from_env()?).await?;
            run(&cli, config, openai, index, passages).await
        }
    }
}

async fn run<V: VectorIndex + 'static>(
    cli: &Cli,
    config: PipelineConfig,
    openai: OpenAiConfig,
    index: V,
    passages: Arc<PassageStore>,
) -> Result<()> {
    let embedder = Arc::new(OpenAiClient::new(openai.clone())?);
    let llm = OpenAiClient::new(openai)?;

    let mut engine = QaPipeline::new(embedder, Arc::new(index), passages, llm, config);
    engine.initialize().await?;

    if cli.info {
        if let Some(diagnostics) = engine.diagnostics() {
            print_diagnostics(&diagnostics);
        }
        return Ok(());
    }

    // Handle a one-shot question
    if let Some(question) = &cli.question {
        let response = engine.answer(question).await?;
        print_answer(&response);
        return Ok(());
    }

    // Interactive mode
    display_banner();

    let mut history = Vec::new();

    loop {
        let Some(input) = handle_input_with_history(&mut history).await? else {
            println!("{}", "👋 Goodbye!".green());
            break;
        };

        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "exit" | "quit" => {
                println!("{}", "👋 Goodbye!".green());
                break;
            }
            "help" => {
                print_help();
                continue;
            }
            "info" => {
                if let Some(diagnostics) = engine.diagnostics() {
                    print_diagnostics(&diagnostics);
                }
                continue;
            }
            _ => {}
        }

        println!("{} Retrieving, please wait...", "🔎".blue());

        match engine.answer(&input).await {
            Ok(response) => print_answer(&response),
            Err(e) => println!("{} Request failed: {}", "❌".red(), e),
        }
    }

    Ok(())
}
