//! Print a single post

use anyhow::Result;

use crate::content::{Category, Post};
use crate::helpers::{full_date, strip_html, truncate};
use crate::Site;

/// Print a post's metadata and either its rendered HTML or a plain-text excerpt
pub async fn run(site: &Site, category: Category, slug: &str, html: bool) -> Result<()> {
    match site.loader().get_post(category, slug).await {
        Some(post) => println!("{}", describe(&post, html)?),
        None => println!("No {} post named {:?}", category, slug),
    }

    Ok(())
}

/// Metadata block, a blank line, then the body
pub fn describe(post: &Post, html: bool) -> Result<String> {
    let rendered = post.content_html()?;
    let date = post
        .published
        .as_ref()
        .map(full_date)
        .unwrap_or_else(|| post.date.clone());

    let body = if html {
        rendered
    } else {
        truncate(strip_html(&rendered).trim(), 400, None)
    };

    Ok(format!(
        "Title:        {}\n\
         Description:  {}\n\
         Date:         {}\n\
         Author:       {}\n\
         Image:        {}\n\
         Reading time: {}\n\
         \n\
         {}",
        post.title, post.description, date, post.author, post.image, post.reading_time, body
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    async fn post() -> (TempDir, Post) {
        let dir = TempDir::new().unwrap();
        let space = dir.path().join("content/space");
        fs::create_dir_all(&space).unwrap();
        fs::write(
            space.join("lab.mdx"),
            "---\ntitle: Lab\ndescription: Hands-on\ndate: 2024-01-15\n---\n# Intro\n\nWelcome to the **lab**.\n",
        )
        .unwrap();

        let site = Site::new(dir.path()).unwrap();
        let post = site.loader().get_post(Category::Space, "lab").await.unwrap();
        (dir, post)
    }

    #[tokio::test]
    async fn test_describe_excerpt() {
        let (_dir, post) = post().await;
        let text = describe(&post, false).unwrap();

        assert!(text.starts_with("Title:        Lab\n"));
        assert!(text.contains("Date:         January 15, 2024\n"));
        assert!(text.contains("Author:       GDG Team member\n"));
        assert!(text.contains("Reading time: 1 min read\n"));
        let excerpt = text.split("\n\n").nth(1).unwrap();
        assert!(excerpt.starts_with("Intro Welcome to the"));
        assert!(excerpt.contains("lab"));
        assert!(!excerpt.contains('<'));
    }

    #[tokio::test]
    async fn test_describe_html() {
        let (_dir, post) = post().await;
        let text = describe(&post, true).unwrap();

        assert!(text.contains(r##"<h1 id="intro"><a href="#intro">Intro</a></h1>"##));
        assert!(text.contains("<strong>lab</strong>"));
    }
}
