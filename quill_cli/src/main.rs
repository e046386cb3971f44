//! Quill command line front end.
//!
//! Every command prints its result as pretty JSON on stdout. Logs go to
//! stderr and are filtered with `RUST_LOG`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use quill_core::prelude::*;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "quill", version, about = "Posts with threaded comments")]
struct Cli {
    /// Storage backend, overriding the config file
    #[arg(long, env = "QUILL_STORAGE", global = true)]
    storage: Option<StorageKind>,

    /// Database connection string, overriding the config file
    #[arg(long, env = "QUILL_DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Directory holding config.json (defaults to the platform data dir)
    #[arg(long, env = "QUILL_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Publish a new post
    CreatePost {
        text: String,
        /// Reject comments on this post
        #[arg(long)]
        no_comments: bool,
    },
    /// Comment on a post, or reply to a comment with --parent
    CreateComment {
        post_id: String,
        text: String,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Show a post with one page of its comment threads
    GetPost {
        id: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// List posts oldest first
    GetPosts {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show one page of a post's comment threads
    GetComments {
        post_id: String,
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Debug, Args)]
struct PageArgs {
    #[arg(long, allow_negative_numbers = true)]
    page: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    limit: Option<i64>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] quill_core::config::ConfigError),
    #[error(transparent)]
    Posts(#[from] PostsServiceError),
    #[error(transparent)]
    Comments(#[from] CommentsServiceError),
    #[error("failed to encode output")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        let kind = match self {
            CliError::Posts(e) => e.kind(),
            CliError::Comments(e) => e.kind(),
            CliError::Core(_) | CliError::Config(_) | CliError::Json(_) => return 1,
        };
        match kind {
            ErrorKind::Validation => 2,
            ErrorKind::NotFound => 3,
            ErrorKind::PermissionDenied => 4,
            ErrorKind::Persistence => 5,
        }
    }
}

async fn load_config(cli: &Cli) -> Result<QuillConfig, CliError> {
    let dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => quill_core::config::default_dir()?,
    };
    let mut config = QuillConfig::load_or_init(&dir).await?;

    if let Some(storage) = cli.storage {
        config.storage = storage;
    }
    if let Some(url) = &cli.database_url {
        config.database_url = url.clone();
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<String, CliError> {
    let config = load_config(&cli).await?;
    let core = QuillCore::start(config).await?;

    let json = match cli.command {
        Command::CreatePost { text, no_comments } => {
            let post = core.posts.create_post(text, Some(!no_comments)).await?;
            serde_json::to_string_pretty(&post)?
        }
        Command::CreateComment {
            post_id,
            text,
            parent,
        } => {
            let comment = core
                .comments
                .create_comment(&post_id, text, parent.as_deref())
                .await?;
            serde_json::to_string_pretty(&comment)?
        }
        Command::GetPost { id, page } => {
            let post = core.posts.get_post(&id, page.page, page.limit).await?;
            serde_json::to_string_pretty(&post)?
        }
        Command::GetPosts { page } => {
            let posts = core.posts.get_posts(page.page, page.limit).await?;
            serde_json::to_string_pretty(&posts)?
        }
        Command::GetComments { post_id, page } => {
            let comments = core
                .comments
                .get_comments_for_post(&post_id, page.page, page.limit)
                .await?;
            serde_json::to_string_pretty(&comments)?
        }
    };
    Ok(json)
}

fn report(err: &CliError) {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    eprintln!("Error: {message}");
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            report(&err);
            ExitCode::from(err.exit_code())
        }
    }
}
