//! Error types for the content store

use std::path::PathBuf;
use thiserror::Error;

use crate::content::Violation;

/// Errors surfaced to callers of the content store.
///
/// Malformed front-matter found while loading a whole directory never shows
/// up here; it is collected as [`Violation`]s instead. It only becomes an
/// error when a single post is parsed on its own.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("post not found: {0}")]
    NotFound(String),

    #[error("duplicate slug `{slug}`: {first:?} and {second:?}")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("malformed front-matter in `{slug}` ({} problem(s))", violations.len())]
    MalformedFrontMatter {
        slug: String,
        violations: Vec<Violation>,
    },

    #[error("invalid slug: {0:?}")]
    InvalidSlug(String),

    #[error("cannot serialize front-matter: {0}")]
    Serialize(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
