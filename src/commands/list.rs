//! List the posts of a category

use anyhow::Result;

use crate::content::{Category, Post};
use crate::helpers::display_date;
use crate::Site;

/// Print one line per post, in listing order
pub async fn run(site: &Site, category: Category) -> Result<()> {
    let posts = site.loader().load_category(category).await?;

    for line in listing(category, &posts) {
        println!("{}", line);
    }

    Ok(())
}

/// Header line followed by `date - title (reading time) [slug]` per post
pub fn listing(category: Category, posts: &[Post]) -> Vec<String> {
    let mut lines = vec![format!("{} ({}):", category, posts.len())];
    lines.extend(posts.iter().map(|post| {
        format!(
            "  {} - {} ({}) [{}]",
            display_date(&post.date),
            post.title,
            post.reading_time,
            post.slug
        )
    }));
    lines
}
