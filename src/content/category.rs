//! Content categories and their listing order

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two fixed content groupings under `content/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Blog,
    Space,
}

/// How a category's posts are ordered after loading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    /// Newest first by front-matter date; ties keep enumeration order
    DateDescending,
    /// Directory enumeration order, as returned by the filesystem
    Enumeration,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Blog, Category::Space];

    /// Directory name under the content root
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Blog => "blog",
            Category::Space => "space",
        }
    }

    pub fn ordering(&self) -> Ordering {
        match self {
            Category::Blog => Ordering::DateDescending,
            Category::Space => Ordering::Enumeration,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blog" | "blogs" => Ok(Category::Blog),
            "space" | "spaces" => Ok(Category::Space),
            other => anyhow::bail!("Unknown category: {}. Available: blog, space", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        assert_eq!("blog".parse::<Category>().unwrap(), Category::Blog);
        assert_eq!("Spaces".parse::<Category>().unwrap(), Category::Space);
        assert!("news".parse::<Category>().is_err());
    }

    #[test]
    fn test_ordering_policy() {
        assert_eq!(Category::Blog.ordering(), Ordering::DateDescending);
        assert_eq!(Category::Space.ordering(), Ordering::Enumeration);
        assert_eq!(Category::Space.to_string(), "space");
    }
}
