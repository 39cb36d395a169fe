use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use codechat_core::ingest::ChunkingConfig;
use codechat_core::session::TreeViewState;
use codechat_infrastructure::{CodechatPaths, ConfigService};

mod app;
mod files;
mod logging;
mod render;
mod repl;

use app::App;

#[derive(Parser, Debug)]
#[command(name = "codechat")]
#[command(about = "Chat with an AI about your code", long_about = None)]
struct Cli {
    /// Backend base URL (overrides config and CODECHAT_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show backend health and session state
    Status,
    /// Clear the backend session
    Reset,
    /// Print the ingested file tree
    Tree,
    /// Upload files or directories
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[command(flatten)]
        chunking: ChunkArgs,
    },
    /// Clone and ingest a GitHub repository
    Github {
        url: String,
        #[command(flatten)]
        chunking: ChunkArgs,
    },
    /// Interactive chat (default)
    Chat,
}

#[derive(Args, Debug, Default)]
struct ChunkArgs {
    /// Characters per chunk
    #[arg(long)]
    chunk_size: Option<u32>,
    /// Characters shared between neighbouring chunks
    #[arg(long)]
    chunk_overlap: Option<u32>,
}

impl ChunkArgs {
    fn resolve(&self, base: ChunkingConfig) -> ChunkingConfig {
        ChunkingConfig::new(
            self.chunk_size.unwrap_or(base.chunk_size),
            self.chunk_overlap.unwrap_or(base.chunk_overlap),
        )
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let paths = CodechatPaths::default();
    let _log_guard = logging::init_logging(paths.log_dir().ok());

    let service = match &cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(&paths)?,
    };
    let mut config = service.load_with_env().await?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    let config = config.normalized();
    tracing::debug!("[Main] Config loaded from {}", service.path().display());

    let mut app = App::new(config)?;
    let succeeded = match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => return repl::run(app).await.map(|_| ExitCode::SUCCESS),
        Commands::Status => {
            let health = app.health().await;
            let _ = app.store.refresh_session().await;
            let view = app.store.view().await;
            println!("{}", render::status(&view, health.as_ref(), None));
            health.is_some()
        }
        Commands::Reset => app.store.reset_session().await.is_ok(),
        Commands::Tree => {
            let result = app.store.refresh_file_tree().await;
            if result.is_ok() {
                let tree = app.store.tree().await;
                let mut view = TreeViewState::new();
                view.expand_all(&tree);
                println!("{}", render::tree(&tree, &view));
            }
            result.is_ok()
        }
        Commands::Upload { paths, chunking } => {
            let candidates = files::collect_candidates(&paths)?;
            let chunking = chunking.resolve(app.config.chunking);
            let result = app.upload.upload(candidates, chunking).await;
            println!("{}", render::upload_items(&app.upload.items().await));
            // A batch emptied by admission submits nothing and counts as failure.
            result.is_ok_and(|report| report.response.is_some())
        }
        Commands::Github { url, chunking } => {
            let chunking = chunking.resolve(app.config.chunking);
            let result = app.github.submit(&url, chunking).await;
            println!("{}", render::pipeline(&app.github.pipeline().await));
            result.is_ok()
        }
    };

    for notification in app.drain_notifications() {
        println!("{}", render::notification(&notification));
    }
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
