//! Scaffold a new MDX post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::transforms::slugify;
use crate::content::Category;
use crate::Site;

/// Create `<content_dir>/<category>/<slug>.mdx` with a front-matter stub
pub fn create_post(site: &Site, category: Category, title: &str) -> Result<PathBuf> {
    let slug = slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Title {:?} does not produce a usable file name", title);
    }

    let target_dir = site.content_dir.join(category.dir_name());
    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(format!("{}.mdx", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let now = chrono::Local::now();
    let content = format!(
        "---\ntitle: {}\ndescription: {}\ndate: {}\nauthor: {}\n---\n\n# {}\n",
        yaml_string(title),
        yaml_string(title),
        now.format("%Y-%m-%d"),
        yaml_string(&site.config.default_author),
        title
    );

    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

fn yaml_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
