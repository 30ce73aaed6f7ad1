//! Helper functions shared by the content pipeline and the HTTP views

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
