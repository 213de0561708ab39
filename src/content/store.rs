//! Content store - slug-addressed, date-ordered access to loaded posts

use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::PathBuf;

use super::loader::{Bundle, ContentLoader};
use super::validate::{self, Problem, Violation};
use super::Post;
use crate::error::{Result, StoreError};

/// All posts of a site, ordered newest first
#[derive(Debug, Default)]
pub struct ContentStore {
    /// Sorted by date descending, then slug
    posts: Vec<Post>,
    /// Slug -> position in `posts`
    index: HashMap<String, usize>,
    /// Front-matter problems of bundles that could not be loaded
    violations: Vec<Violation>,
}

impl ContentStore {
    /// Load every bundle found by `loader`.
    ///
    /// Bundles with malformed front-matter are left out and reported
    /// through [`ContentStore::violations`]. Two bundles sharing a slug
    /// fail the whole load.
    pub fn load(loader: &ContentLoader<'_>) -> Result<Self> {
        let bundles = loader.discover();
        check_unique(&bundles)?;

        let loaded = loader.load(&bundles);
        tracing::info!(
            "Loaded {} posts ({} rejected)",
            loaded.posts.len(),
            count_slugs(&loaded.violations)
        );

        let mut store = Self::from_posts(loaded.posts)?;
        store.violations = loaded.violations;
        Ok(store)
    }

    /// Build a store from posts held in memory
    pub fn from_posts(mut posts: Vec<Post>) -> Result<Self> {
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));

        let mut index = HashMap::with_capacity(posts.len());
        for (i, post) in posts.iter().enumerate() {
            if let Some(&first) = index.get(&post.slug) {
                let first: &Post = &posts[first];
                return Err(StoreError::DuplicateSlug {
                    slug: post.slug.clone(),
                    first: first.source.clone().unwrap_or_default(),
                    second: post.source.clone().unwrap_or_default(),
                });
            }
            index.insert(post.slug.clone(), i);
        }

        Ok(Self {
            posts,
            index,
            violations: Vec::new(),
        })
    }

    /// Posts newest first; drafts only when `include_drafts` is set.
    ///
    /// The iterator is lazy; call again to start over.
    pub fn list_posts(&self, include_drafts: bool) -> Posts<'_> {
        Posts {
            inner: self.posts.iter(),
            include_drafts,
        }
    }

    /// Look up a post by slug
    pub fn get_post(&self, slug: &str) -> Result<&Post> {
        self.index
            .get(slug)
            .map(|&i| &self.posts[i])
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))
    }

    /// Check a post's fields; see [`validate::validate`]
    pub fn validate(&self, post: &Post) -> Vec<Violation> {
        validate::validate(post)
    }

    /// Problems found while loading, for posts that are not in the store
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Load-time problems plus field checks of every stored post
    pub fn all_violations(&self) -> Vec<Violation> {
        let mut all = self.violations.clone();
        for post in &self.posts {
            all.extend(validate::validate(post));
        }
        all
    }

    /// Hero images that are named but not present next to the post
    pub fn missing_assets(&self) -> Vec<Violation> {
        self.posts
            .iter()
            .filter_map(|post| {
                let path = post.hero_path()?;
                if path.is_file() {
                    return None;
                }
                Some(Violation::new(
                    &post.slug,
                    Some("hero"),
                    Problem::InvalidValue(format!("asset {:?} does not exist", path)),
                ))
            })
            .collect()
    }

    /// Number of posts held, drafts included
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Tag name -> number of listed posts carrying it
    pub fn tags(&self, include_drafts: bool) -> Vec<(String, usize)> {
        self.count_terms(include_drafts, |p| p.tags.iter())
    }

    /// Category name -> number of listed posts in it
    pub fn categories(&self, include_drafts: bool) -> Vec<(String, usize)> {
        self.count_terms(include_drafts, |p| p.categories.iter())
    }

    fn count_terms<'s, F, I>(&'s self, include_drafts: bool, terms: F) -> Vec<(String, usize)>
    where
        F: Fn(&'s Post) -> I,
        I: Iterator<Item = &'s String>,
    {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for post in self.list_posts(include_drafts) {
            for term in terms(post) {
                *counts.entry(term.clone()).or_insert(0) += 1;
            }
        }
        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }

    /// Newer and older neighbours of a post within a listing
    pub fn neighbours(
        &self,
        slug: &str,
        include_drafts: bool,
    ) -> Result<(Option<&Post>, Option<&Post>)> {
        self.get_post(slug)?;
        let listing: Vec<&Post> = self.list_posts(include_drafts).collect();
        let Some(pos) = listing.iter().position(|p| p.slug == slug) else {
            return Ok((None, None));
        };
        let newer = pos.checked_sub(1).map(|i| listing[i]);
        let older = listing.get(pos + 1).copied();
        Ok((newer, older))
    }
}

/// Iterator returned by [`ContentStore::list_posts`]
#[derive(Clone)]
pub struct Posts<'a> {
    inner: std::slice::Iter<'a, Post>,
    include_drafts: bool,
}

impl<'a> Iterator for Posts<'a> {
    type Item = &'a Post;

    fn next(&mut self) -> Option<Self::Item> {
        let include_drafts = self.include_drafts;
        self.inner.find(|p| include_drafts || p.is_published())
    }
}

fn check_unique(bundles: &[Bundle]) -> Result<()> {
    let mut seen: HashMap<&str, &PathBuf> = HashMap::new();
    for bundle in bundles {
        if let Some(first) = seen.insert(&bundle.slug, &bundle.index) {
            return Err(StoreError::DuplicateSlug {
                slug: bundle.slug.clone(),
                first: first.clone(),
                second: bundle.index.clone(),
            });
        }
    }
    Ok(())
}

fn count_slugs(violations: &[Violation]) -> usize {
    let mut slugs: Vec<&str> = violations.iter().map(|v| v.slug.as_str()).collect();
    slugs.dedup();
    slugs.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::parse_post;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn post(slug: &str, date: &str, draft: bool) -> Post {
        let content = format!("---\ntitle: {slug}\ndate: {date}\ndraft: {draft}\n---\n");
        parse_post(slug, &content, chrono_tz::UTC).unwrap()
    }

    fn slugs<'a>(posts: impl Iterator<Item = &'a Post>) -> Vec<&'a str> {
        posts.map(|p| p.slug.as_str()).collect()
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn load(root: &Path) -> Result<ContentStore> {
        let names = vec!["index.md".to_string()];
        let loader = ContentLoader::new(root, &names, chrono_tz::UTC);
        ContentStore::load(&loader)
    }

    #[test]
    fn test_published_and_draft_scenario() {
        let store = ContentStore::from_posts(vec![
            post("jdk-upgrade", "2022-07-09", true),
            post("event-bus", "2022-08-09", false),
        ])
        .unwrap();

        assert_eq!(slugs(store.list_posts(false)), vec!["event-bus"]);
        assert_eq!(
            slugs(store.list_posts(true)),
            vec!["event-bus", "jdk-upgrade"]
        );
    }

    #[test]
    fn test_listing_is_date_descending() {
        let store = ContentStore::from_posts(vec![
            post("b", "2021-03-01", false),
            post("d", "2023-01-01T00:00:00+05:00", false),
            post("a", "2020-12-31", false),
            post("c", "2022-06-15", true),
        ])
        .unwrap();

        let listed: Vec<_> = store.list_posts(true).collect();
        assert!(listed.windows(2).all(|w| w[0].date >= w[1].date));
        assert_eq!(slugs(listed.into_iter()), vec!["d", "c", "b", "a"]);
    }

    #[test]
    fn test_listing_is_restartable() {
        let store = ContentStore::from_posts(vec![
            post("a", "2022-01-01", false),
            post("b", "2022-02-01", false),
        ])
        .unwrap();

        let mut first = store.list_posts(false);
        assert_eq!(first.next().map(|p| p.slug.as_str()), Some("b"));
        assert_eq!(slugs(store.list_posts(false)), vec!["b", "a"]);
    }

    #[test]
    fn test_draft_exclusion_holds_for_every_post() {
        let posts: Vec<_> = (1..=12)
            .map(|i| post(&format!("p{i}"), &format!("2022-{i:02}-01"), i % 3 == 0))
            .collect();
        let store = ContentStore::from_posts(posts.clone()).unwrap();
        let listed = slugs(store.list_posts(false));

        for p in &posts {
            assert_eq!(listed.contains(&p.slug.as_str()), !p.draft, "{}", p.slug);
        }
    }

    #[test]
    fn test_same_date_ordered_by_slug() {
        let store = ContentStore::from_posts(vec![
            post("zeta", "2022-01-01", false),
            post("alpha", "2022-01-01", false),
        ])
        .unwrap();
        assert_eq!(slugs(store.list_posts(false)), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_get_post() {
        let store = ContentStore::from_posts(vec![post("solid", "2022-01-01", true)]).unwrap();

        assert_eq!(store.get_post("solid").unwrap().slug, "solid");
        assert!(matches!(
            store.get_post("missing"),
            Err(StoreError::NotFound(ref s)) if s == "missing"
        ));
    }

    #[test]
    fn test_duplicate_slug_in_memory() {
        let err = ContentStore::from_posts(vec![
            post("cqrs", "2022-01-01", false),
            post("cqrs", "2022-02-01", false),
        ])
        .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateSlug { ref slug, .. } if slug == "cqrs"));
    }

    #[test]
    fn test_duplicate_slug_on_disk() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "java/cqrs/index.md", "---\ntitle: A\ndate: 2022-01-01\n---\n");
        write(root, "notes/cqrs/index.md", "---\ntitle: B\ndate: 2022-01-02\n---\n");

        match load(root) {
            Err(StoreError::DuplicateSlug { slug, first, second }) => {
                assert_eq!(slug, "cqrs");
                assert_eq!(first, root.join("java/cqrs/index.md"));
                assert_eq!(second, root.join("notes/cqrs/index.md"));
            }
            other => panic!("expected duplicate slug, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_title_does_not_block_other_posts() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "records/index.md", "---\ntitle: Records\ndate: 2022-08-09\n---\n");
        write(root, "lambdas/index.md", "---\ntitle: Lambdas\ndate: 2022-06-01\n---\n");
        write(root, "broken/index.md", "---\ndate: 2022-09-01\n---\nno title\n");

        let store = load(root).unwrap();
        assert_eq!(slugs(store.list_posts(false)), vec!["records", "lambdas"]);
        assert_eq!(store.violations().len(), 1);
        assert_eq!(store.violations()[0].slug, "broken");
        assert_eq!(store.violations()[0].field.as_deref(), Some("title"));
        assert!(matches!(store.get_post("broken"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_missing_assets() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "a/index.md", "---\ntitle: A\ndate: 2022-01-01\nhero: a.png\n---\n");
        write(root, "a/a.png", "png");
        write(root, "b/index.md", "---\ntitle: B\ndate: 2022-01-02\nhero: b.png\n---\n");

        let store = load(root).unwrap();
        let missing = store.missing_assets();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].slug, "b");
    }

    #[test]
    fn test_validate_reports_stored_post_problems() {
        let mut p = post("ok", "2022-01-01", false);
        p.title = String::new();
        let store = ContentStore::from_posts(vec![p]).unwrap();

        let post = store.get_post("ok").unwrap();
        assert_eq!(store.validate(post).len(), 1);
        assert_eq!(store.all_violations().len(), 1);
    }

    #[test]
    fn test_taxonomy_counts() {
        let mut a = post("a", "2022-01-01", false);
        a.tags.extend(["java".to_string(), "fp".to_string()]);
        let mut b = post("b", "2022-02-01", false);
        b.tags.insert("java".to_string());
        b.categories.insert("jvm".to_string());
        let mut c = post("c", "2022-03-01", true);
        c.tags.insert("draft-only".to_string());

        let store = ContentStore::from_posts(vec![a, b, c]).unwrap();
        assert_eq!(
            store.tags(false),
            vec![("java".to_string(), 2), ("fp".to_string(), 1)]
        );
        assert_eq!(store.tags(true).len(), 3);
        assert_eq!(store.categories(false), vec![("jvm".to_string(), 1)]);
    }

    #[test]
    fn test_neighbours() {
        let store = ContentStore::from_posts(vec![
            post("old", "2022-01-01", false),
            post("mid", "2022-02-01", true),
            post("new", "2022-03-01", false),
        ])
        .unwrap();

        let (newer, older) = store.neighbours("old", false).unwrap();
        assert_eq!(newer.map(|p| p.slug.as_str()), Some("new"));
        assert!(older.is_none());

        let (newer, older) = store.neighbours("mid", true).unwrap();
        assert_eq!(newer.map(|p| p.slug.as_str()), Some("new"));
        assert_eq!(older.map(|p| p.slug.as_str()), Some("old"));

        assert_eq!(store.neighbours("mid", false).unwrap(), (None, None));
    }
}
