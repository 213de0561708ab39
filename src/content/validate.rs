//! Validation findings, reported as data

use serde::Serialize;
use std::fmt;

use super::Post;

/// What is wrong with a post's front-matter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Problem {
    /// No recognizable front-matter block at the top of the file
    MissingFrontMatter,
    /// Opening delimiter without a closing one
    Unterminated,
    /// The block is not valid YAML/TOML/JSON, or a value has the wrong type
    Syntax(String),
    /// A required key is absent or blank
    MissingField,
    /// The date does not parse to a point in time
    InvalidDate(String),
    /// A value is present but unusable
    InvalidValue(String),
    /// The content file could not be read
    Unreadable(String),
}

/// A single `MalformedFrontMatter` finding for one post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub slug: String,
    /// Offending front-matter key, when the problem is tied to one
    pub field: Option<String>,
    pub problem: Problem,
}

impl Violation {
    pub fn new(slug: &str, field: Option<&str>, problem: Problem) -> Self {
        Self {
            slug: slug.to_string(),
            field: field.map(str::to_string),
            problem,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.slug)?;
        if let Some(field) = &self.field {
            write!(f, "`{}` ", field)?;
        }
        match &self.problem {
            Problem::MissingFrontMatter => write!(f, "no front-matter block"),
            Problem::Unterminated => write!(f, "front-matter block is not closed"),
            Problem::Syntax(msg) => write!(f, "unparsable front-matter: {}", msg),
            Problem::MissingField => write!(f, "is required"),
            Problem::InvalidDate(raw) => write!(f, "is not a valid date: {:?}", raw),
            Problem::InvalidValue(msg) => write!(f, "{}", msg),
            Problem::Unreadable(msg) => write!(f, "cannot read file: {}", msg),
        }
    }
}

/// Check a post's required fields and value shapes.
///
/// Never fails; an empty list means the post is valid.
pub fn validate(post: &Post) -> Vec<Violation> {
    let mut violations = Vec::new();
    let slug = post.slug.as_str();

    if !is_valid_slug(slug) {
        violations.push(Violation::new(
            slug,
            Some("slug"),
            Problem::InvalidValue(format!("{:?} is not a usable slug", slug)),
        ));
    }

    if post.title.trim().is_empty() {
        violations.push(Violation::new(slug, Some("title"), Problem::MissingField));
    }

    if let Some(hero) = &post.hero {
        if !is_bare_filename(hero) {
            violations.push(Violation::new(
                slug,
                Some("hero"),
                Problem::InvalidValue(format!("{:?} must be a file inside the post directory", hero)),
            ));
        }
    }

    for (field, terms) in [("tags", &post.tags), ("categories", &post.categories)] {
        if terms.iter().any(|t| t.trim().is_empty()) {
            violations.push(Violation::new(
                slug,
                Some(field),
                Problem::InvalidValue("contains a blank entry".to_string()),
            ));
        }
    }

    violations
}

/// A slug names exactly one directory directly under the content dir
pub(crate) fn is_valid_slug(slug: &str) -> bool {
    !slug.trim().is_empty() && is_bare_filename(slug)
}

fn is_bare_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}
