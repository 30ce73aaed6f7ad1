//! Site configuration (_config.yml + environment)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Environment variable names checked for the Supabase URL, in priority order
const URL_VARS: [&str; 2] = ["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"];

/// Environment variable names checked for the Supabase anon key, in priority order
const KEY_VARS: [&str; 2] = ["SUPABASE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"];

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,

    // Writing
    pub default_author: String,
    pub default_image: String,
    pub highlight_theme: String,
    pub words_per_minute: usize,

    // Remote store
    #[serde(default)]
    pub supabase: SupabaseConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "GDG".to_string(),
            description: String::new(),

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),

            default_author: "GDG Team member".to_string(),
            default_image: "/blog-images/default.jpg".to_string(),
            highlight_theme: "base16-ocean.dark".to_string(),
            words_per_minute: 200,

            supabase: SupabaseConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Override Supabase credentials from the process environment.
    ///
    /// A non-blank environment value wins over `_config.yml`; blank values on
    /// either side count as absent.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(*name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };
        let merge = |current: &mut Option<String>, names: &[&str]| {
            let from_file = current
                .take()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty());
            *current = first(names).or(from_file);
        };

        merge(&mut self.supabase.url, &URL_VARS[..]);
        merge(&mut self.supabase.anon_key, &KEY_VARS[..]);
    }

    /// Whether the remote store is configured well enough to query it
    pub fn has_env_vars(&self) -> bool {
        self.supabase.is_configured()
    }
}

/// Supabase (PostgREST + storage) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    /// Storage bucket holding event images
    pub events_bucket: String,
    pub timeout_seconds: u64,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            events_bucket: "events".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl SupabaseConfig {
    pub fn is_configured(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.url) && present(&self.anon_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.content_dir, "content");
        assert_eq!(config.default_author, "GDG Team member");
        assert_eq!(config.default_image, "/blog-images/default.jpg");
        assert_eq!(config.words_per_minute, 200);
        assert!(!config.has_env_vars());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: GDG Pune
default_author: Organizers
words_per_minute: 250
supabase:
  url: https://abc.supabase.co
  anon_key: secret
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "GDG Pune");
        assert_eq!(config.default_author, "Organizers");
        assert_eq!(config.words_per_minute, 250);
        assert_eq!(config.supabase.events_bucket, "events");
        assert!(config.has_env_vars());
    }

    #[test]
    fn test_env_fills_missing_credentials() {
        let mut config = SiteConfig::default();
        config.apply_env_with(|name| match name {
            "NEXT_PUBLIC_SUPABASE_URL" => Some("https://env.supabase.co".to_string()),
            "SUPABASE_ANON_KEY" => Some("anon".to_string()),
            _ => None,
        });
        assert_eq!(
            config.supabase.url.as_deref(),
            Some("https://env.supabase.co")
        );
        assert_eq!(config.supabase.anon_key.as_deref(), Some("anon"));
        assert!(config.has_env_vars());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = SiteConfig::default();
        config.supabase.url = Some("https://file.supabase.co".to_string());
        config.supabase.anon_key = Some("file-key".to_string());
        config.apply_env_with(|name| match name {
            "SUPABASE_URL" => Some("https://env.supabase.co".to_string()),
            _ => None,
        });
        assert_eq!(
            config.supabase.url.as_deref(),
            Some("https://env.supabase.co")
        );
        assert_eq!(config.supabase.anon_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn test_blank_values_count_as_absent() {
        let yaml = "supabase:\n  url: \"\"\n  anon_key: \"  \"\n";
        let mut config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        config.apply_env_with(|name| match name {
            "SUPABASE_URL" => Some("   ".to_string()),
            "NEXT_PUBLIC_SUPABASE_URL" => Some("https://env.supabase.co".to_string()),
            _ => None,
        });
        assert_eq!(
            config.supabase.url.as_deref(),
            Some("https://env.supabase.co")
        );
        assert_eq!(config.supabase.anon_key, None);
        assert!(!config.has_env_vars());
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let mut config = SiteConfig::default();
        config.supabase.url = Some("https://abc.supabase.co".to_string());
        config.supabase.anon_key = Some("  ".to_string());
        assert!(!config.has_env_vars());
    }
}
