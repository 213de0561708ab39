//! Read-only inspection of markdown bodies

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

const MORE_MARKER: &str = "<!--more-->";

fn parser(markdown: &str) -> Parser<'_> {
    // Front-matter is handled separately, so no metadata block options
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;
    Parser::new_ext(markdown, options)
}

/// Distinct fenced code block languages, in order of first appearance
pub fn code_languages(markdown: &str) -> Vec<String> {
    let mut languages: Vec<String> = Vec::new();

    for event in parser(markdown) {
        if let Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) = event {
            // Info strings may carry attributes after the language
            let lang = info.split([' ', ',', '{']).next().unwrap_or("").trim();
            if !lang.is_empty() && !languages.iter().any(|l| l == lang) {
                languages.push(lang.to_string());
            }
        }
    }

    languages
}

/// Words of prose, leaving out code blocks
pub fn word_count(markdown: &str) -> usize {
    let mut in_code_block = false;
    let mut count = 0;

    for event in parser(markdown) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(text) | Event::Code(text) if !in_code_block => {
                count += text.split_whitespace().count();
            }
            _ => {}
        }
    }

    count
}

/// Minutes needed to read the prose; at least one for a non-empty body
pub fn reading_time(markdown: &str, words_per_minute: usize) -> usize {
    if markdown.trim().is_empty() {
        return 0;
    }
    word_count(markdown)
        .div_ceil(words_per_minute.max(1))
        .max(1)
}

/// Text before the more marker, if the body has one
pub fn summary(markdown: &str) -> Option<&str> {
    let pos = markdown
        .find(MORE_MARKER)
        .or_else(|| markdown.find("<!-- more -->"))?;
    Some(markdown[..pos].trim_end())
}
