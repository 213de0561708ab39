//! Content loader - finds post bundles under the content directory and parses them

use chrono_tz::Tz;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::validate::{Problem, Violation};
use super::{FrontMatter, Post};

/// A post directory and the content file inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub slug: String,
    pub index: PathBuf,
}

/// Everything found under the content directory
#[derive(Debug, Default)]
pub struct Loaded {
    pub posts: Vec<Post>,
    pub violations: Vec<Violation>,
}

/// Loads posts from page bundles
pub struct ContentLoader<'a> {
    content_dir: &'a Path,
    index_names: &'a [String],
    timezone: Tz,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(content_dir: &'a Path, index_names: &'a [String], timezone: Tz) -> Self {
        Self {
            content_dir,
            index_names,
            timezone,
        }
    }

    /// Find every bundle, sorted by path
    pub fn discover(&self) -> Vec<Bundle> {
        if !self.content_dir.exists() {
            tracing::debug!("Content directory {:?} does not exist", self.content_dir);
            return Vec::new();
        }

        let mut bundles = Vec::new();

        let mut walker = WalkDir::new(self.content_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()));

        while let Some(entry) = walker.next() {
            let Ok(entry) = entry else {
                continue;
            };
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                continue;
            }
            let dir = entry.path();
            let Some(index) = self.find_index(dir) else {
                continue;
            };
            let slug = dir
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            bundles.push(Bundle { slug, index });

            // Directories inside a bundle hold its assets
            walker.skip_current_dir();
        }

        bundles
    }

    fn find_index(&self, dir: &Path) -> Option<PathBuf> {
        self.index_names
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Parse every bundle.
    ///
    /// Parsing runs in parallel; a bundle that fails only contributes
    /// violations, and the result does not depend on the thread count.
    pub fn load(&self, bundles: &[Bundle]) -> Loaded {
        let results: Vec<Result<Post, Vec<Violation>>> = bundles
            .par_iter()
            .map(|bundle| self.load_post(bundle))
            .collect();

        let mut loaded = Loaded::default();
        for (bundle, result) in bundles.iter().zip(results) {
            match result {
                Ok(post) => {
                    tracing::debug!("Loaded post {} from {:?}", post.slug, bundle.index);
                    loaded.posts.push(post);
                }
                Err(violations) => {
                    for v in &violations {
                        tracing::warn!("Skipping {:?}: {}", bundle.index, v);
                    }
                    loaded.violations.extend(violations);
                }
            }
        }

        loaded
    }

    /// Load a single post from its bundle
    fn load_post(&self, bundle: &Bundle) -> Result<Post, Vec<Violation>> {
        let slug = bundle.slug.as_str();
        let content = fs::read_to_string(&bundle.index).map_err(|e| {
            vec![Violation::new(slug, None, Problem::Unreadable(e.to_string()))]
        })?;

        let (fm, _, body) = FrontMatter::parse(&content)
            .map_err(|problem| vec![Violation::new(slug, None, problem)])?;

        let mut post = fm.into_post(slug, body, self.timezone)?;
        post.source = Some(bundle.index.clone());
        Ok(post)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}
