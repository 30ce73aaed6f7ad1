//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::ContentError;

/// Custom deserializer that accepts any YAML scalar as a string.
///
/// Authors write `date: 2024-01-15` or `title: 2024` without quotes; both
/// must land in the string fields instead of failing the whole block.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct ScalarString;

    impl<'de> Visitor<'de> for ScalarString {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number or boolean")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(ScalarString)
}

/// Front-matter data from an MDX file.
///
/// Every field is optional at parse time; [`FrontMatter::validate`] turns it
/// into a [`PostMeta`] with the required fields checked and defaults applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "scalar_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub author: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub image: Option<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

/// Fallbacks applied to optional front-matter fields
#[derive(Debug, Clone)]
pub struct MetaDefaults {
    pub author: String,
    pub image: String,
}

/// Validated post metadata
#[derive(Debug, Clone, PartialEq)]
pub struct PostMeta {
    pub title: String,
    pub description: String,
    /// Date as written by the author
    pub date: String,
    /// Parsed date, used for ordering
    pub published: NaiveDateTime,
    pub author: String,
    pub image: String,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), ContentError> {
        let trimmed = content.trim_start();

        if !trimmed.starts_with("---") {
            return Ok((FrontMatter::default(), content));
        }

        // Skip opening ---
        let rest = &trimmed[3..];
        let rest = rest.trim_start_matches(['\n', '\r']);

        // Closing --- either right after the opening one or on a later line
        let (yaml_content, remaining) = if let Some(after) = rest.strip_prefix("---") {
            ("", after)
        } else if let Some(end_pos) = rest.find("\n---") {
            (&rest[..end_pos], &rest[end_pos + 4..])
        } else {
            // No closing ---, treat as no front-matter
            return Ok((FrontMatter::default(), content));
        };
        let remaining = remaining.trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        // A leading thematic break followed by prose is body text, not metadata
        if !looks_like_yaml(yaml_content) {
            return Ok((FrontMatter::default(), content));
        }

        let fm = serde_yaml::from_str::<FrontMatter>(yaml_content).map_err(|e| {
            ContentError::FrontMatter {
                path: PathBuf::new(),
                message: e.to_string(),
            }
        })?;

        Ok((fm, remaining))
    }

    /// Check required fields and apply defaults
    pub fn validate(&self, path: &Path, defaults: &MetaDefaults) -> Result<PostMeta, ContentError> {
        let required = |value: &Option<String>, field: &'static str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ContentError::MissingField {
                    path: path.to_path_buf(),
                    field,
                })
        };
        let optional = |value: &Option<String>, fallback: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };

        let title = required(&self.title, "title")?;
        let description = required(&self.description, "description")?;
        let date = required(&self.date, "date")?;
        let published = parse_date_string(&date).ok_or_else(|| ContentError::InvalidDate {
            path: path.to_path_buf(),
            value: date.clone(),
        })?;

        Ok(PostMeta {
            title,
            description,
            date,
            published,
            author: optional(&self.author, &defaults.author),
            image: optional(&self.image, &defaults.image),
        })
    }
}

/// Valid YAML front-matter has at least one `key: value` line
fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];
        let is_valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp");
        let after_colon = &trimmed[colon_pos + 1..];
        is_valid_key && (after_colon.is_empty() || after_colon.starts_with(' '))
    })
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // RFC 3339 / ISO 8601 with offset, normalised to UTC
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> MetaDefaults {
        MetaDefaults {
            author: "GDG Team member".to_string(),
            image: "/blog-images/default.jpg".to_string(),
        }
    }

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
description: First post
date: 2024-01-15
author: Ada
tags: [rust, mdx]
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, Some("Hello World".to_string()));
        assert_eq!(fm.date, Some("2024-01-15".to_string()));
        assert_eq!(fm.author, Some("Ada".to_string()));
        assert!(fm.extra.contains_key("tags"));
        assert_eq!(remaining, "This is the content.\n");
    }

    #[test]
    fn test_no_frontmatter_keeps_full_body() {
        let content = "# Just a heading\n\nBody text.\n";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert!(fm.title.is_none());
        assert!(fm.extra.is_empty());
        assert_eq!(remaining, content);
    }

    #[test]
    fn test_empty_frontmatter_block() {
        let (fm, remaining) = FrontMatter::parse("---\n---\nBody").unwrap();
        assert!(fm.title.is_none());
        assert!(fm.extra.is_empty());
        assert_eq!(remaining, "Body");

        let (_, remaining) = FrontMatter::parse("---\r\n---\r\nBody").unwrap();
        assert_eq!(remaining, "Body");
    }

    #[test]
    fn test_numeric_scalars_become_strings() {
        let content = "---\ntitle: 2024\ndescription: true\ndate: 2024-03-01\n---\nBody";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("2024"));
        assert_eq!(fm.description.as_deref(), Some("true"));
    }

    #[test]
    fn test_broken_yaml_is_an_error() {
        let content = "---\ntitle: [unclosed\ndate: 2024-01-01\n---\nBody";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, ContentError::FrontMatter { .. }));
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        let content = r#"
---

Check out https://example.com/path and http://test.com

---
More content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, None);
        assert!(remaining.contains("https://example.com"));
    }

    #[test]
    fn test_validate_applies_defaults() {
        let content = "---\ntitle: T\ndescription: D\ndate: 2024-01-15\n---\nBody";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        let meta = fm.validate(Path::new("t.mdx"), &defaults()).unwrap();
        assert_eq!(meta.author, "GDG Team member");
        assert_eq!(meta.image, "/blog-images/default.jpg");
        assert_eq!(meta.date, "2024-01-15");
        assert_eq!(
            meta.published.format("%Y-%m-%d").to_string(),
            "2024-01-15"
        );
    }

    #[test]
    fn test_validate_missing_title() {
        let fm = FrontMatter {
            description: Some("D".to_string()),
            date: Some("2024-01-15".to_string()),
            ..Default::default()
        };
        let err = fm.validate(Path::new("t.mdx"), &defaults()).unwrap_err();
        assert!(matches!(
            err,
            ContentError::MissingField { field: "title", .. }
        ));
    }

    #[test]
    fn test_validate_bad_date() {
        let fm = FrontMatter {
            title: Some("T".to_string()),
            description: Some("D".to_string()),
            date: Some("last tuesday".to_string()),
            ..Default::default()
        };
        let err = fm.validate(Path::new("t.mdx"), &defaults()).unwrap_err();
        assert!(matches!(err, ContentError::InvalidDate { .. }));
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date_string("2024/01/15").is_some());
        assert!(parse_date_string("2024-01-15 10:30").is_some());
        let dt = parse_date_string("2024-01-15T10:30:00+02:00").unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "08:30");
    }
}
