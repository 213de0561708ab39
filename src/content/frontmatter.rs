//! Front-matter parsing and serialization

use chrono_tz::Tz;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer, Serialize};

use super::validate::{Problem, Violation};
use super::Post;
use crate::error::{Result, StoreError};
use crate::helpers::{date_rfc3339, parse_date};

/// A scalar front-matter value read as text (`title: 1984` is still a title)
struct Scalar(String);

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct ScalarVisitor;

        impl<'de> Visitor<'de> for ScalarVisitor {
            type Value = Scalar;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Scalar(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Scalar(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Scalar(value.to_string()))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Scalar(value.to_string()))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Scalar(value.to_string()))
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Scalar(value.to_string()))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

fn optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|s| s.0))
}

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_set<'de, D>(deserializer: D) -> Result<IndexSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrSet;

    impl<'de> Visitor<'de> for StringOrSet {
        type Value = IndexSet<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(IndexSet::from([value.to_string()]))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(IndexSet::from([value]))
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut set = IndexSet::new();
            while let Some(item) = seq.next_element::<Scalar>()? {
                set.insert(item.0);
            }
            Ok(set)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(IndexSet::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(IndexSet::new())
        }
    }

    deserializer.deserialize_any(StringOrSet)
}

/// Which syntax a front-matter block was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `---` delimited
    Yaml,
    /// `+++` delimited
    Toml,
    /// A leading JSON object
    Json,
}

/// Front-matter as written, before required fields are checked
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "optional_scalar", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "optional_scalar", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    #[serde(deserialize_with = "optional_scalar", skip_serializing_if = "Option::is_none")]
    pub hero: Option<String>,
    #[serde(deserialize_with = "optional_scalar", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "string_or_set", skip_serializing_if = "IndexSet::is_empty")]
    pub tags: IndexSet<String>,
    #[serde(deserialize_with = "string_or_set", skip_serializing_if = "IndexSet::is_empty")]
    pub categories: IndexSet<String>,

    /// Keys this store does not interpret
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, format, body)
    pub fn parse(content: &str) -> Result<(Self, Format, &str), Problem> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        if content.starts_with('{') {
            let (fm, body) = Self::parse_json(content)?;
            return Ok((fm, Format::Json, body));
        }

        let format = if content.starts_with("---") {
            Format::Yaml
        } else if content.starts_with("+++") {
            Format::Toml
        } else {
            return Err(Problem::MissingFrontMatter);
        };

        let delim = match format {
            Format::Yaml => "---",
            _ => "+++",
        };
        let (block, body) = split_block(content, delim)?;

        if block.trim().is_empty() {
            return Ok((FrontMatter::default(), format, body));
        }

        let fm = match format {
            Format::Yaml => serde_yaml::from_str::<FrontMatter>(block)
                .map_err(|e| Problem::Syntax(e.to_string()))?,
            _ => Self::parse_toml(block)?,
        };

        Ok((fm, format, body))
    }

    fn parse_toml(block: &str) -> Result<Self, Problem> {
        let mut table = block
            .parse::<toml::Table>()
            .map_err(|e| Problem::Syntax(first_line(&e.to_string())))?;

        // TOML has native datetimes; keep them as the text that was written
        for (_, value) in table.iter_mut() {
            if let toml::Value::Datetime(dt) = value {
                *value = toml::Value::String(dt.to_string());
            }
        }

        toml::Value::Table(table)
            .try_into::<FrontMatter>()
            .map_err(|e| Problem::Syntax(first_line(&e.to_string())))
    }

    fn parse_json(content: &str) -> Result<(Self, &str), Problem> {
        let mut stream =
            serde_json::Deserializer::from_str(content).into_iter::<serde_json::Value>();

        let value = match stream.next() {
            Some(Ok(value)) => value,
            Some(Err(e)) if e.is_eof() => return Err(Problem::Unterminated),
            Some(Err(e)) => return Err(Problem::Syntax(e.to_string())),
            None => return Err(Problem::MissingFrontMatter),
        };
        // Finish the line holding the closing brace, then the blank line
        let rest = content[stream.byte_offset()..].trim_start_matches([' ', '\t']);
        let body = strip_separator(strip_separator(rest));

        let fm = serde_json::from_value::<FrontMatter>(value)
            .map_err(|e| Problem::Syntax(e.to_string()))?;
        Ok((fm, body))
    }

    /// Build the front-matter that describes `post`
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: Some(post.title.clone()),
            date: Some(date_rfc3339(&post.date)),
            draft: Some(post.draft),
            hero: post.hero.clone(),
            description: post.description.clone(),
            tags: post.tags.clone(),
            categories: post.categories.clone(),
            extra: IndexMap::new(),
        }
    }

    /// Serialize as a YAML block, without delimiters
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| StoreError::Serialize(e.to_string()))
    }

    /// Turn the front-matter into a post, collecting every problem found.
    pub fn into_post(self, slug: &str, body: &str, tz: Tz) -> Result<Post, Vec<Violation>> {
        let mut violations = Vec::new();

        let title = match self.title {
            Some(t) if !t.trim().is_empty() => Some(t),
            _ => {
                violations.push(Violation::new(slug, Some("title"), Problem::MissingField));
                None
            }
        };

        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => {
                violations.push(Violation::new(slug, Some("date"), Problem::MissingField));
                None
            }
            Some(raw) => {
                let parsed = parse_date(raw, tz);
                if parsed.is_none() {
                    violations.push(Violation::new(
                        slug,
                        Some("date"),
                        Problem::InvalidDate(raw.to_string()),
                    ));
                }
                parsed
            }
        };

        match (title, date) {
            (Some(title), Some(date)) if violations.is_empty() => {
                let mut post = Post::new(slug.to_string(), title, date);
                post.draft = self.draft.unwrap_or(false);
                post.hero = self.hero;
                post.description = self.description;
                post.tags = self.tags;
                post.categories = self.categories;
                post.body = body.to_string();
                Ok(post)
            }
            _ => Err(violations),
        }
    }
}

/// Split `content` at the line closing a `delim` block.
/// Returns (block, body).
fn split_block<'a>(content: &'a str, delim: &str) -> Result<(&'a str, &'a str), Problem> {
    let mut lines = content.split_inclusive('\n');

    // The opening line must be the bare delimiter
    let opening = lines.next().ok_or(Problem::MissingFrontMatter)?;
    if opening.trim_end() != delim {
        return Err(Problem::MissingFrontMatter);
    }

    let start = opening.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == delim {
            let block = &content[start..offset];
            let body = strip_separator(&content[offset + line.len()..]);
            return Ok((block, body));
        }
        offset += line.len();
    }

    Err(Problem::Unterminated)
}

/// Drop the single blank line conventionally written after the block
fn strip_separator(rest: &str) -> &str {
    rest.strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest)
}

fn first_line(msg: &str) -> String {
    msg.lines().next().unwrap_or(msg).trim().to_string()
}

/// Parse a complete content file into a post.
///
/// Used when a single file is handled on its own; all problems are
/// returned together as [`StoreError::MalformedFrontMatter`].
pub fn parse_post(slug: &str, content: &str, tz: Tz) -> Result<Post> {
    let into_error = |violations| StoreError::MalformedFrontMatter {
        slug: slug.to_string(),
        violations,
    };

    let (fm, _, body) = FrontMatter::parse(content)
        .map_err(|problem| into_error(vec![Violation::new(slug, None, problem)]))?;
    fm.into_post(slug, body, tz).map_err(into_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UTC: Tz = chrono_tz::UTC;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: CQRS in practice
date: 2022-08-09T10:30:00+02:00
draft: false
hero: hero.png
description: Splitting reads from writes
tags:
  - cqrs
  - architecture
categories:
  - java
---

This is the content.
"#;

        let (fm, format, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(format, Format::Yaml);
        assert_eq!(fm.title.as_deref(), Some("CQRS in practice"));
        assert_eq!(fm.date.as_deref(), Some("2022-08-09T10:30:00+02:00"));
        assert_eq!(fm.draft, Some(false));
        assert_eq!(fm.hero.as_deref(), Some("hero.png"));
        assert_eq!(fm.tags, IndexSet::from(["cqrs".to_string(), "architecture".to_string()]));
        assert_eq!(fm.categories.len(), 1);
        assert_eq!(body, "This is the content.\n");
    }

    #[test]
    fn test_parse_toml_frontmatter() {
        let content = r#"+++
title = "Event buses"
date = 2022-05-01T09:00:00+01:00
draft = true
tags = ["events"]
+++
Body.
"#;

        let (fm, format, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(format, Format::Toml);
        assert_eq!(fm.title.as_deref(), Some("Event buses"));
        assert_eq!(fm.date.as_deref(), Some("2022-05-01T09:00:00+01:00"));
        assert_eq!(fm.draft, Some(true));
        assert!(fm.tags.contains("events"));
        assert_eq!(body, "Body.\n");
    }

    #[test]
    fn test_parse_json_frontmatter() {
        let content = r#"{"title": "Test Post", "date": "2024-01-15", "tags": ["a", "b"], "weight": 3}

This is content.
"#;

        let (fm, format, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(format, Format::Json);
        assert_eq!(fm.title.as_deref(), Some("Test Post"));
        assert_eq!(fm.tags.len(), 2);
        assert_eq!(fm.extra.get("weight"), Some(&serde_json::json!(3)));
        assert_eq!(body, "This is content.\n");
    }

    #[test]
    fn test_single_string_tags_and_scalar_title() {
        let content = r#"---
title: 1984
date: 2024-01-15
tags: Notes
categories: Blog
---
"#;

        let (fm, _, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("1984"));
        assert!(fm.tags.contains("Notes"));
        assert!(fm.categories.contains("Blog"));
    }

    #[test]
    fn test_no_frontmatter() {
        assert_eq!(
            FrontMatter::parse("# Just a heading\n").unwrap_err(),
            Problem::MissingFrontMatter
        );
    }

    #[test]
    fn test_unterminated_block() {
        let content = "---\ntitle: Open ended\n\nNo closing marker.\n";
        assert_eq!(FrontMatter::parse(content).unwrap_err(), Problem::Unterminated);
    }

    #[test]
    fn test_invalid_yaml_is_syntax_problem() {
        let content = "---\ntitle: [unclosed\n---\nbody\n";
        assert!(matches!(
            FrontMatter::parse(content).unwrap_err(),
            Problem::Syntax(_)
        ));
    }

    #[test]
    fn test_wrong_type_for_draft() {
        let content = "---\ntitle: T\ndate: 2024-01-15\ndraft: [yes]\n---\n";
        assert!(matches!(
            FrontMatter::parse(content).unwrap_err(),
            Problem::Syntax(_)
        ));
    }

    #[test]
    fn test_missing_title_and_bad_date_reported_together() {
        let content = "---\ndate: someday\n---\nbody\n";
        let err = parse_post("functional-java", content, UTC).unwrap_err();
        match err {
            StoreError::MalformedFrontMatter { slug, violations } => {
                assert_eq!(slug, "functional-java");
                assert_eq!(violations.len(), 2);
                assert_eq!(violations[0].field.as_deref(), Some("title"));
                assert_eq!(
                    violations[1].problem,
                    Problem::InvalidDate("someday".to_string())
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_date() {
        let content = "---\ntitle: Undated\n---\n";
        let err = parse_post("undated", content, UTC).unwrap_err();
        assert!(matches!(
            err,
            StoreError::MalformedFrontMatter { ref violations, .. }
                if violations[0].problem == Problem::MissingField
        ));
    }

    #[test]
    fn test_draft_defaults_to_false() {
        let post = parse_post("solid", "---\ntitle: SOLID\ndate: 2022-01-01\n---\n", UTC).unwrap();
        assert!(!post.draft);
        assert_eq!(post.slug, "solid");
    }

    #[test]
    fn test_round_trip() {
        let content = r#"---
title: "Records vs Lombok: a comparison"
date: 2022-07-09T18:00:00-03:00
draft: true
hero: records.png
description: When to pick which
tags: [java, records, lombok]
categories: [java]
---

Some *markdown* here.

```java
record Point(int x, int y) {}
```
"#;
        let post = parse_post("records-vs-lombok", content, UTC).unwrap();
        let written = post.to_markdown().unwrap();
        let reparsed = parse_post("records-vs-lombok", &written, UTC).unwrap();

        assert_eq!(reparsed, post);
        assert_eq!(reparsed.body, post.body);
        assert_eq!(reparsed.date.offset(), post.date.offset());
    }

    #[test]
    fn test_round_trip_keeps_leading_blank_lines_in_body() {
        let post = parse_post("p", "---\ntitle: P\ndate: 2022-01-01\n---\n\n\nindented start\n", UTC)
            .unwrap();
        assert_eq!(post.body, "\nindented start\n");
        let reparsed = parse_post("p", &post.to_markdown().unwrap(), UTC).unwrap();
        assert_eq!(reparsed.body, post.body);
    }
}
