//! CLI entry point for postdeck

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "postdeck")]
#[command(author = "Yukang Chen")]
#[command(version)]
#[command(about = "Load, validate and list the posts of a page-bundle blog", long_about = None)]
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
    /// List posts, tags or categories
    #[command(alias = "ls")]
    List {
        /// Type of content to list (post, tag, category)
        #[arg(default_value = "post")]
        r#type: String,

        /// Include drafts
        #[arg(long)]
        drafts: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show one post
    Show {
        /// Slug of the post
        slug: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate every post's front-matter
    Check,

    /// Create a new post bundle
    New {
        /// Title of the new post
        title: String,

        /// Directory name to use instead of the slugified title
        #[arg(short, long)]
        slug: Option<String>,

        /// Create the post as published rather than as a draft
        #[arg(long)]
        publish: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "postdeck=debug,info"
    } else {
        "postdeck=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot read current directory")?,
    };

    match cli.command {
        Commands::List {
            r#type,
            drafts,
            json,
        } => {
            let site = postdeck::Site::new(&base_dir)?;
            postdeck::commands::list::run(&site, &r#type, drafts, json)?;
        }

        Commands::Show { slug, json } => {
            let site = postdeck::Site::new(&base_dir)?;
            postdeck::commands::show::run(&site, &slug, json)?;
        }

        Commands::Check => {
            let site = postdeck::Site::new(&base_dir)?;
            let problems = postdeck::commands::check::run(&site)?;
            if problems > 0 {
                std::process::exit(1);
            }
        }

        Commands::New {
            title,
            slug,
            publish,
        } => {
            let site = postdeck::Site::new(&base_dir)?;
            let draft = site.config.new_post_draft && !publish;
            tracing::info!("Creating new post with title: {}", title);
            let path = site.new_post(&title, slug.as_deref(), draft)?;
            println!("Created: {:?}", path);
        }

        Commands::Version => {
            println!("postdeck version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
