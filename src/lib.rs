#![deny(clippy::unwrap_used)]

pub mod amazon;
pub mod canonical;
pub mod config;
pub mod control;
pub mod detail;
pub mod page;
pub mod sitemap;
pub mod slug;
pub mod words;

pub use canonical::{generate_canonical_url, CanonicalUrlBuilder};
pub use page::{classify, classify_path, Category, PageType};
