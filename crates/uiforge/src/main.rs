use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use uiforge_common::{logger, AppConfig};
use uiforge_site::{ensure_catalog, render_page, write_page};
use uiforge_vector::{
    build_knowledge_base, encoder_from_config, ArtifactPaths, Encoder, QueryResult,
    RetrievalService,
};

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
        }
    } else {
        dotenv::dotenv().ok();
    }
}

#[derive(Parser)]
#[command(name = "uiforge")]
#[command(about = "UIForge - retrieve UI components and assemble websites from a description", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the component knowledge base
    Build {
        /// Rebuild even if the index already exists
        #[arg(long)]
        force: bool,
    },

    /// Print the components closest to a request
    Search {
        query: String,

        /// Number of results
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Generate a website for a request
    Generate {
        query: String,

        /// Number of components to use
        #[arg(long)]
        top_k: Option<usize>,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Build the knowledge base unless both artifacts already exist
async fn prepare_knowledge_base(config: &AppConfig, encoder: &dyn Encoder, force: bool) -> Result<()> {
    let paths = ArtifactPaths::from_config(config);
    if !force && paths.exist() {
        tracing::info!("Knowledge base found at {}", paths.index.display());
        return Ok(());
    }

    let catalog = ensure_catalog(&config.catalog_path).await?;
    let report = build_knowledge_base(&catalog, encoder, &paths).await?;
    println!(
        "Knowledge base ready: {} components, {} dims ({}, {:.1}s)",
        report.records,
        report.dimension,
        report.embedding_model,
        report.elapsed.as_secs_f32()
    );
    Ok(())
}

/// Open the retrieval service, rebuilding once if the artifacts are missing or stale
async fn open_service(config: &AppConfig, encoder: Arc<dyn Encoder>) -> Result<RetrievalService> {
    let paths = ArtifactPaths::from_config(config);

    match RetrievalService::open(&paths, Arc::clone(&encoder)).await {
        Ok(service) => Ok(service),
        Err(e) if e.needs_rebuild() => {
            tracing::warn!("Knowledge base unusable ({}), rebuilding", e);
            prepare_knowledge_base(config, encoder.as_ref(), true).await?;
            Ok(RetrievalService::open(&paths, encoder).await?)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_results(results: &[QueryResult]) {
    if results.is_empty() {
        println!("No matching components.");
        return;
    }

    for (rank, result) in results.iter().enumerate() {
        println!(
            "{:>2}. {} [{}] {} (score {:.3})",
            rank + 1,
            result.metadata.name,
            result.metadata.category,
            result.metadata.component_id,
            result.similarity_score
        );
        println!("    {}", result.metadata.description);
    }
}

async fn generate(service: &RetrievalService, query: &str, top_k: usize, output_dir: &std::path::Path) -> Result<PathBuf> {
    let results = service.retrieve(query, top_k).await?;
    print_results(&results);

    let html = render_page(query, &results);
    Ok(write_page(&html, output_dir).await?)
}

async fn interactive(config: &AppConfig, service: &RetrievalService) -> Result<()> {
    println!("UIForge - describe the website you want (quit/exit/q to leave)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();

        if query.is_empty() {
            continue;
        }
        if matches!(query.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }

        match generate(service, query, config.top_k, &config.output_dir).await {
            Ok(path) => println!("Website saved to {}", path.display()),
            Err(e) => {
                tracing::error!("Generation failed: {}", e);
                println!("Error: {}", e);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_dotenv_from_project_root();

    let config = AppConfig::from_env()?;
    config.validate()?;
    config.ensure_directories()?;
    logger::setup_logging(&config.log_dir, &config.log_level)?;

    tracing::info!("UIForge starting...");
    tracing::info!("  Backend: {} ({})", config.embedding_backend, config.embedding_model);
    tracing::info!("  Index: {}", config.index_path.display());

    let encoder = encoder_from_config(&config).await?;

    match cli.command {
        Some(Commands::Build { force }) => {
            prepare_knowledge_base(&config, encoder.as_ref(), force).await?;
        }
        Some(Commands::Search { query, top_k }) => {
            let service = open_service(&config, encoder).await?;
            let results = service.retrieve(&query, top_k.unwrap_or(config.top_k)).await?;
            print_results(&results);
        }
        Some(Commands::Generate { query, top_k, output }) => {
            let service = open_service(&config, encoder).await?;
            let output_dir = output.unwrap_or_else(|| config.output_dir.clone());
            let path = generate(&service, &query, top_k.unwrap_or(config.top_k), &output_dir).await?;
            println!("Website saved to {}", path.display());
        }
        None => {
            prepare_knowledge_base(&config, encoder.as_ref(), false).await?;
            let service = open_service(&config, encoder).await?;
            interactive(&config, &service).await?;
        }
    }

    Ok(())
}
