//! Content module - MDX posts for the blog and space categories

mod category;
mod error;
mod frontmatter;
pub mod loader;
mod post;
pub mod reading_time;
pub mod render_tree;
mod serializer;
pub mod transforms;

pub use category::{Category, Ordering};
pub use error::ContentError;
pub use frontmatter::{parse_date_string, FrontMatter, MetaDefaults, PostMeta};
pub use loader::ContentLoader;
pub use post::Post;
pub use reading_time::ReadingTime;
pub use render_tree::{Element, Node, RenderTree};
pub use serializer::{ContentSerializer, HeadingEntry, SerializedContent, FORMAT_VERSION};
