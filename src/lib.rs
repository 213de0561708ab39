//! postdeck: a typed content store for page-bundle markdown blogs
//!
//! Posts live one per directory, each with an `index.md` holding YAML,
//! TOML or JSON front-matter followed by a markdown body. This crate loads,
//! validates and lists them for whatever renders the site.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;

use std::path::{Path, PathBuf};

pub use content::{ContentStore, Post, Violation};
pub use error::{Result, StoreError};

/// The site being worked on
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding the post bundles
    pub content_dir: PathBuf,
}

impl Site {
    /// Open a site from a directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Open a site with an explicit configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let content_dir = base_dir.join(&config.content_dir);
        Self {
            config,
            base_dir,
            content_dir,
        }
    }

    /// Load all posts
    pub fn load(&self) -> Result<ContentStore> {
        let loader = content::ContentLoader::new(
            &self.content_dir,
            &self.config.bundle_index,
            self.config.timezone()?,
        );
        ContentStore::load(&loader)
    }

    /// Scaffold a new post bundle
    pub fn new_post(&self, title: &str, slug: Option<&str>, draft: bool) -> Result<PathBuf> {
        commands::new::create_post(self, title, slug, draft)
    }
}
