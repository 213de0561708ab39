//! List site content

use anyhow::Result;
use std::fmt::Write;

use crate::content::ContentStore;
use crate::helpers::format_date;
use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str, include_drafts: bool, json: bool) -> Result<()> {
    let store = site.load()?;
    print!("{}", render(site, &store, content_type, include_drafts, json)?);
    Ok(())
}

/// Build the listing printed by [`run`]
pub fn render(
    site: &Site,
    store: &ContentStore,
    content_type: &str,
    include_drafts: bool,
    json: bool,
) -> Result<String> {
    let include_drafts = include_drafts || site.config.render_drafts;
    let mut out = String::new();

    match content_type {
        "post" | "posts" => {
            let posts: Vec<_> = store.list_posts(include_drafts).collect();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&posts)?)?;
                return Ok(out);
            }
            writeln!(out, "Posts ({}):", posts.len())?;
            for post in posts {
                writeln!(
                    out,
                    "  {} - {} [{}]{}",
                    format_date(&post.date, &site.config.date_format),
                    post.title,
                    post.slug,
                    if post.draft { " (draft)" } else { "" }
                )?;
            }
        }
        "tag" | "tags" => {
            let tags = store.tags(include_drafts);
            render_terms(&mut out, "Tags", &tags, json)?;
        }
        "category" | "categories" => {
            let categories = store.categories(include_drafts);
            render_terms(&mut out, "Categories", &categories, json)?;
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, category",
                content_type
            );
        }
    }

    Ok(out)
}

fn render_terms(
    out: &mut String,
    heading: &str,
    terms: &[(String, usize)],
    json: bool,
) -> Result<()> {
    if json {
        let map: indexmap::IndexMap<_, _> = terms.iter().cloned().collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&map)?)?;
        return Ok(());
    }
    writeln!(out, "{} ({}):", heading, terms.len())?;
    for (term, count) in terms {
        writeln!(out, "  {} ({})", term, count)?;
    }
    Ok(())
}
