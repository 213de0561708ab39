//! Content module - posts, front-matter, loading and validation

mod frontmatter;
pub mod loader;
pub mod markdown;
mod post;
pub mod store;
mod validate;

pub use frontmatter::{parse_post, Format, FrontMatter};
pub use loader::ContentLoader;
pub use post::Post;
pub use store::ContentStore;
pub use validate::{validate, Problem, Violation};
pub(crate) use validate::is_valid_slug;
