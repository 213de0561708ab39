//! Post model

use chrono::{DateTime, FixedOffset};
use indexmap::IndexSet;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::frontmatter::FrontMatter;
use super::markdown;
use crate::error::Result;

/// A blog post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Name of the post's directory, unique across the store
    pub slug: String,

    /// Post title
    pub title: String,

    /// Publication date, with the offset it was written in
    pub date: DateTime<FixedOffset>,

    /// Drafts are left out of published listings
    pub draft: bool,

    /// Illustrative image, relative to the post directory
    pub hero: Option<String>,

    /// Short summary for listings
    pub description: Option<String>,

    /// Post tags
    pub tags: IndexSet<String>,

    /// Post categories
    pub categories: IndexSet<String>,

    /// Raw markdown content
    pub body: String,

    /// File the post was loaded from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Field-for-field equality on the authored content; `source` is ignored.
impl PartialEq for Post {
    fn eq(&self, other: &Self) -> bool {
        self.slug == other.slug
            && self.title == other.title
            && self.date == other.date
            && self.draft == other.draft
            && self.hero == other.hero
            && self.description == other.description
            && self.tags == other.tags
            && self.categories == other.categories
            && self.body == other.body
    }
}

impl Eq for Post {}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(slug: String, title: String, date: DateTime<FixedOffset>) -> Self {
        Self {
            slug,
            title,
            date,
            draft: false,
            hero: None,
            description: None,
            tags: IndexSet::new(),
            categories: IndexSet::new(),
            body: String::new(),
            source: None,
        }
    }

    /// Whether the post shows up in published listings
    pub fn is_published(&self) -> bool {
        !self.draft
    }

    /// Directory holding the post and its assets
    pub fn bundle_dir(&self) -> Option<&Path> {
        self.source.as_deref().and_then(Path::parent)
    }

    /// Location of the hero image, when both it and the source are known
    pub fn hero_path(&self) -> Option<PathBuf> {
        let hero = self.hero.as_ref()?;
        Some(self.bundle_dir()?.join(hero))
    }

    /// Text before the `<!--more-->` marker
    pub fn summary(&self) -> Option<&str> {
        markdown::summary(&self.body)
    }

    /// Languages of the fenced code blocks in the body
    pub fn code_languages(&self) -> Vec<String> {
        markdown::code_languages(&self.body)
    }

    /// Estimated reading time in minutes
    pub fn reading_time(&self, words_per_minute: usize) -> usize {
        markdown::reading_time(&self.body, words_per_minute)
    }

    /// Write the post back out as a YAML front-matter file
    pub fn to_markdown(&self) -> Result<String> {
        let yaml = FrontMatter::from_post(self).to_yaml()?;
        Ok(format!("---\n{}---\n\n{}", yaml, self.body))
    }
}
