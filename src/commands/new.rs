//! Create a new post bundle

use chrono::Utc;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::content::{is_valid_slug, Post};
use crate::error::{Result, StoreError};
use crate::helpers::date_rfc3339;
use crate::Site;

/// Create `<content_dir>/<slug>/<index>` for a new post and return its path
pub fn create_post(site: &Site, title: &str, slug: Option<&str>, draft: bool) -> Result<PathBuf> {
    let slug = match slug {
        Some(s) => s.to_string(),
        None => slug::slugify(title),
    };
    // Hidden directories are never loaded, so a dot slug would vanish
    if !is_valid_slug(&slug) || slug.starts_with('.') {
        return Err(StoreError::InvalidSlug(slug));
    }

    let bundle_dir = site.content_dir.join(&slug);
    let index_name = site
        .config
        .bundle_index
        .first()
        .map(String::as_str)
        .unwrap_or("index.md");
    let file_path = bundle_dir.join(index_name);

    if bundle_dir.exists() {
        return Err(StoreError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("post directory already exists: {:?}", bundle_dir),
        )));
    }

    let now = Utc::now().with_timezone(&site.config.timezone()?).fixed_offset();

    let scaffold_path = site.base_dir.join("scaffolds").join("post.md");
    let content = if scaffold_path.exists() {
        let title = serde_yaml::to_string(title)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        fs::read_to_string(&scaffold_path)?
            .replace("{{ title }}", title.trim_end())
            .replace("{{ date }}", &date_rfc3339(&now))
            .replace("{{ draft }}", if draft { "true" } else { "false" })
    } else {
        let mut post = Post::new(slug.clone(), title.to_string(), now);
        post.draft = draft;
        post.to_markdown()?
    };

    fs::create_dir_all(&bundle_dir)?;
    fs::write(&file_path, content)?;
    tracing::info!("Created post {} at {:?}", slug, file_path);

    Ok(file_path)
}
