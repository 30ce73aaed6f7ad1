//! CLI entry point for gdg-site

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gdg_site::content::Category;

#[derive(Parser)]
#[command(name = "gdg-site")]
#[command(version)]
#[command(about = "Serve a GDG chapter site: MDX posts plus Supabase-backed events", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// List the posts of a category (blog, space)
    List {
        #[arg(default_value = "blog")]
        category: Category,
    },

    /// Show a single post
    Show {
        category: Category,

        slug: String,

        /// Print the rendered HTML instead of a text excerpt
        #[arg(long)]
        html: bool,
    },

    /// Create a new post
    New {
        category: Category,

        /// Title of the new post
        title: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "gdg_site=debug,info"
    } else {
        "gdg_site=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    // Supabase credentials usually live in .env next to _config.yml
    match dotenvy::from_path(base_dir.join(".env")) {
        Ok(()) => tracing::debug!("Loaded {:?}", base_dir.join(".env")),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Failed to read .env: {}", e),
    }

    match cli.command {
        Commands::Server { port, ip } => {
            let site = gdg_site::Site::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            gdg_site::server::start(&site, &ip, port).await?;
        }

        Commands::List { category } => {
            let site = gdg_site::Site::new(&base_dir)?;
            gdg_site::commands::list::run(&site, category).await?;
        }

        Commands::Show {
            category,
            slug,
            html,
        } => {
            let site = gdg_site::Site::new(&base_dir)?;
            gdg_site::commands::show::run(&site, category, &slug, html).await?;
        }

        Commands::New { category, title } => {
            let site = gdg_site::Site::new(&base_dir)?;
            tracing::info!("Creating new {} post with title: {}", category, title);
            let path = gdg_site::commands::new::create_post(&site, category, &title)?;
            println!("Created: {:?}", path);
        }

        Commands::Version => {
            println!("gdg-site version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
