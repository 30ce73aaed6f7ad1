//! Content loader - lists, parses and serializes MDX files per category

use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use super::{
    Category, ContentError, ContentSerializer, FrontMatter, MetaDefaults, Ordering, Post,
    ReadingTime,
};
use crate::config::SiteConfig;

/// Loads posts from `<content_dir>/<category>/*.mdx`
#[derive(Clone)]
pub struct ContentLoader {
    content_dir: PathBuf,
    defaults: MetaDefaults,
    words_per_minute: usize,
    serializer: Arc<ContentSerializer>,
}

impl ContentLoader {
    /// Create a loader rooted at `base_dir` using the site configuration
    pub fn from_config(base_dir: &Path, config: &SiteConfig) -> Self {
        Self {
            content_dir: base_dir.join(&config.content_dir),
            defaults: MetaDefaults {
                author: config.default_author.clone(),
                image: config.default_image.clone(),
            },
            words_per_minute: config.words_per_minute,
            serializer: Arc::new(ContentSerializer::new(&config.highlight_theme)),
        }
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.content_dir.join(category.dir_name())
    }

    /// All blog posts, newest first
    pub async fn get_blog_posts(&self) -> Result<Vec<Post>, ContentError> {
        self.load_category(Category::Blog).await
    }

    /// All space entries, in directory order
    pub async fn get_space_entries(&self) -> Result<Vec<Post>, ContentError> {
        self.load_category(Category::Space).await
    }

    /// Load every post of a category.
    ///
    /// Files are processed concurrently and joined all-or-nothing: the first
    /// failing file fails the whole listing.
    pub async fn load_category(&self, category: Category) -> Result<Vec<Post>, ContentError> {
        let dir = self.category_dir(category);
        let files = list_mdx_files(&dir)?;
        tracing::debug!("Loading {} {} files from {:?}", files.len(), category, dir);

        let mut posts = try_join_all(files.iter().map(|path| self.read_post(path))).await?;
        sort_posts(&mut posts, category.ordering());

        tracing::info!("Loaded {} {} posts", posts.len(), category);
        Ok(posts)
    }

    /// Load a single post; any failure yields `None`
    pub async fn get_post(&self, category: Category, slug: &str) -> Option<Post> {
        if !is_safe_slug(slug) {
            tracing::debug!("Rejected slug {:?}", slug);
            return None;
        }

        let path = self.category_dir(category).join(format!("{}.mdx", slug));
        match self.read_post(&path).await {
            Ok(post) => Some(post),
            Err(ContentError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::debug!("No {} post named {:?}", category, slug);
                None
            }
            Err(e) => {
                tracing::warn!("Failed to load {} post {:?}: {}", category, slug, e);
                None
            }
        }
    }

    /// Read, parse and serialize one file
    pub async fn read_post(&self, path: &Path) -> Result<Post, ContentError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ContentError::io(path, e))?;

        let (fm, body) = FrontMatter::parse(&raw).map_err(|e| e.in_file(path))?;
        let meta = fm.validate(path, &self.defaults)?;
        let reading_time = ReadingTime::estimate(body, self.words_per_minute);

        let content = Arc::clone(&self.serializer)
            .serialize_async(body.to_string())
            .await
            .map_err(|e| e.in_file(path))?;

        let slug = slug_from_path(path);
        tracing::debug!("Serialized {:?} ({})", slug, reading_time.text);

        Ok(Post::new(meta, slug, content, reading_time))
    }
}

/// List `.mdx` files directly inside `dir`, in filesystem order
pub fn list_mdx_files(dir: &Path) -> Result<Vec<PathBuf>, ContentError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            ContentError::io(path, e.into())
        })?;

        if entry.file_type().is_file() && is_mdx_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Check if a file is an MDX file
fn is_mdx_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "mdx")
        .unwrap_or(false)
}

fn slug_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Slugs name a file inside the category directory and nothing else
fn is_safe_slug(slug: &str) -> bool {
    !matches!(slug, "" | "." | "..")
        && !slug.contains(['/', '\\'])
        && !slug.contains('\0')
}

/// Apply a category's ordering policy
pub fn sort_posts(posts: &mut [Post], ordering: Ordering) {
    match ordering {
        // `sort_by` is stable, so equal dates keep enumeration order
        Ordering::DateDescending => posts.sort_by(|a, b| b.published.cmp(&a.published)),
        Ordering::Enumeration => {}
    }
}
