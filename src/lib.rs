//! gdg-site: content pipeline and web front end for a GDG chapter site
//!
//! Long-form MDX posts are read from disk, parsed and serialized into a
//! render tree on every request; events and blog rows come from a hosted
//! Supabase project.

pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod remote;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A site rooted at a directory holding `_config.yml`, `content/` and `public/`
#[derive(Clone)]
pub struct Site {
    /// Site configuration, with environment overrides applied
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding one sub-directory per content category
    pub content_dir: PathBuf,
    /// Static files served as-is
    pub public_dir: PathBuf,
}

impl Site {
    /// Open the site in `base_dir`
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            public_dir,
        })
    }

    /// Content loader for this site
    pub fn loader(&self) -> content::ContentLoader {
        content::ContentLoader::from_config(&self.base_dir, &self.config)
    }
}
