use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use thumbgraph_core::app::{LinkResolver, PipelineBuilder, ResolverRegistry, THUMBNAIL_FIELD};
use thumbgraph_core::config::ThumbnailConfig;
use thumbgraph_core::domain::DocumentId;
use thumbgraph_core::impls::{
    FsMaterializer, InMemoryEntityStore, JsonFileCacheStore, PdftoppmRasterizer, TracingProgress,
};
use thumbgraph_core::ports::{SystemClock, UlidGenerator};

#[derive(Parser)]
#[command(name = "thumbgraph")]
#[command(version)]
#[command(about = "Generate and link first-page thumbnails for PDF documents in a content graph")]
struct Cli {
    /// Configuration file (TOML). Environment variables `THUMBGRAPH_*` override it.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (ignored when RUST_LOG is set)
    #[arg(short = 'v', long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate missing thumbnails and link them onto their documents
    Generate {
        /// Graph snapshot (JSON)
        #[arg(short, long)]
        graph: PathBuf,
    },
    /// Print a document's resolved thumbnail, or null
    Resolve {
        #[arg(short, long)]
        graph: PathBuf,

        /// Node id of the document
        document: String,
    },
    /// Remove generated thumbnails not kept alive by the last generate pass
    Gc {
        #[arg(short, long)]
        graph: PathBuf,
    },
}

#[derive(Serialize)]
struct GcSummary {
    removed: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("thumbgraph={0},thumbgraph_core={0}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ThumbnailConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Command::Generate { graph } => generate(&config, &graph).await,
        Command::Resolve { graph, document } => resolve(&config, &graph, &document).await,
        Command::Gc { graph } => gc(&graph).await,
    }
}

async fn generate(config: &ThumbnailConfig, graph_path: &Path) -> Result<()> {
    let graph = InMemoryEntityStore::load(graph_path)
        .await
        .with_context(|| format!("loading graph {}", graph_path.display()))?;
    graph.begin_pass().await;

    let cache = JsonFileCacheStore::open(&config.cache.path)
        .await
        .with_context(|| format!("opening cache {}", config.cache.path.display()))?;

    let rasterizer = match &config.render.pdftoppm {
        Some(binary) => PdftoppmRasterizer::with_binary(binary),
        None => PdftoppmRasterizer::discover()?,
    }
    .with_timeout(Duration::from_secs(config.render.timeout_secs));

    let entities = Arc::new(graph.clone());
    let materializer = FsMaterializer::new(
        &config.output.dir,
        entities.clone(),
        Arc::new(UlidGenerator::new(SystemClock)),
    );

    let pipeline = PipelineBuilder::from_config(config)
        .entities(entities)
        .cache_store(Arc::new(cache))
        .rasterizer(Arc::new(rasterizer))
        .materializer(Arc::new(materializer))
        .progress(Arc::new(TracingProgress::new()))
        .build()?;

    let report = pipeline.run().await?;

    graph
        .save(graph_path)
        .await
        .with_context(|| format!("saving graph {}", graph_path.display()))?;
    info!(graph = %graph_path.display(), "graph saved");

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn resolve(config: &ThumbnailConfig, graph_path: &Path, document: &str) -> Result<()> {
    let graph = InMemoryEntityStore::load(graph_path)
        .await
        .with_context(|| format!("loading graph {}", graph_path.display()))?;
    let doc = graph
        .document(&DocumentId::new(document))
        .await
        .with_context(|| format!("no document with id {document}"))?;

    let mut registry = ResolverRegistry::new();
    registry.register_thumbnail_field(
        &config.source.document_type,
        LinkResolver::new(Arc::new(graph.clone())),
    )?;

    let value = registry
        .resolve(&doc.kind, THUMBNAIL_FIELD, &doc)
        .await?
        .unwrap_or(serde_json::Value::Null);
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn gc(graph_path: &Path) -> Result<()> {
    let graph = InMemoryEntityStore::load(graph_path)
        .await
        .with_context(|| format!("loading graph {}", graph_path.display()))?;

    let removed = graph.collect_garbage().await;
    graph
        .save(graph_path)
        .await
        .with_context(|| format!("saving graph {}", graph_path.display()))?;

    let summary = GcSummary {
        removed: removed.iter().map(|id| id.to_string()).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
