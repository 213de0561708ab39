//! Site configuration (_config.yml)

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Result, StoreError};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub timezone: String,

    // Directory
    pub content_dir: String,
    pub bundle_index: Vec<String>,

    // Listing
    pub render_drafts: bool,
    pub date_format: String,
    pub words_per_minute: usize,

    // Writing
    pub new_post_draft: bool,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            timezone: "UTC".to_string(),

            content_dir: "content/posts".to_string(),
            bundle_index: vec!["index.md".to_string(), "index.markdown".to_string()],

            render_drafts: false,
            date_format: "YYYY-MM-DD".to_string(),
            words_per_minute: 200,

            new_post_draft: true,

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .map_err(|e| StoreError::Config(format!("{:?}: {}", path.as_ref(), e)))?;
        config.timezone()?;
        if config.bundle_index.is_empty() {
            return Err(StoreError::Config(
                "bundle_index must name at least one file".to_string(),
            ));
        }
        Ok(config)
    }

    /// Timezone used for dates written without an offset
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| StoreError::Config(format!("unknown timezone: {}", self.timezone)))
    }
}
