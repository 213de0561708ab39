//! Show a single post

use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;

use crate::content::{ContentStore, Post};
use crate::helpers::format_date;
use crate::Site;

#[derive(Serialize)]
struct Details<'a> {
    #[serde(flatten)]
    post: &'a Post,
    code_languages: Vec<String>,
    reading_time: usize,
    summary: Option<&'a str>,
}

/// Print a post's metadata
pub fn run(site: &Site, slug: &str, json: bool) -> Result<()> {
    let store = site.load()?;
    print!("{}", render(site, &store, slug, json)?);
    Ok(())
}

/// Build the report printed by [`run`]
pub fn render(site: &Site, store: &ContentStore, slug: &str, json: bool) -> Result<String> {
    let post = store.get_post(slug)?;
    let details = Details {
        post,
        code_languages: post.code_languages(),
        reading_time: post.reading_time(site.config.words_per_minute),
        summary: post.summary(),
    };
    let mut out = String::new();

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&details)?)?;
        return Ok(out);
    }

    writeln!(out, "{}", post.title)?;
    writeln!(out, "  slug:        {}", post.slug)?;
    writeln!(
        out,
        "  date:        {}",
        format_date(&post.date, &site.config.date_format)
    )?;
    writeln!(out, "  draft:       {}", post.draft)?;
    if let Some(hero) = &post.hero {
        writeln!(out, "  hero:        {}", hero)?;
    }
    if let Some(description) = &post.description {
        writeln!(out, "  description: {}", description)?;
    }
    if !post.tags.is_empty() {
        writeln!(out, "  tags:        {}", join(post.tags.iter()))?;
    }
    if !post.categories.is_empty() {
        writeln!(out, "  categories:  {}", join(post.categories.iter()))?;
    }
    if !details.code_languages.is_empty() {
        writeln!(out, "  code:        {}", details.code_languages.join(", "))?;
    }
    writeln!(out, "  reading:     {} min", details.reading_time)?;

    Ok(out)
}

fn join<'a>(terms: impl Iterator<Item = &'a String>) -> String {
    terms.map(String::as_str).collect::<Vec<_>>().join(", ")
}
