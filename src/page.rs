use crate::amazon::{extract_asin, find_asin};
use itertools::Itertools;
use unicode_normalization::UnicodeNormalization;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Spirits,
    Beers,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Spirits => "spiritueux",
            Category::Beers => "bieres",
        }
    }

    pub fn from_path_segment(input: &str) -> Option<Self> {
        match normalize_segment(input).as_str() {
            "spiritueux" | "spirit" => Some(Category::Spirits),
            "bières" | "bieres" => Some(Category::Beers),
            _ => None,
        }
    }
}

/// Template selected for an incoming `/cl/...` path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageType {
    Root,
    Category(Category),
    Subtype,
    Country,
    Brand,
    Product,
    Unknown,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Root => "root",
            PageType::Category(c) => c.as_str(),
            PageType::Subtype => "whiskys",
            PageType::Country => "country",
            PageType::Brand => "brand",
            PageType::Product => "product",
            PageType::Unknown => "unknown",
        }
    }
}

fn normalize_segment(input: &str) -> String {
    input.nfc().collect::<String>().trim().to_lowercase()
}

fn is_subtype(input: &str) -> bool {
    matches!(
        normalize_segment(input).as_str(),
        "whiskys" | "whiskies" | "whiskeys"
    )
}

/// Page type of a path given as percent-encoded segments, first match wins:
/// segment count and fixed vocabulary, then an identifier anywhere in the
/// joined path.
pub fn classify<S: AsRef<str>>(segments: &[S]) -> PageType {
    classify_by(segments, |path| extract_asin(path).is_some())
}

/// [`classify`] for segments that are already percent-decoded.
pub fn classify_decoded<S: AsRef<str>>(segments: &[S]) -> PageType {
    classify_by(segments, |path| find_asin(path).is_some())
}

fn classify_by<S, F>(segments: &[S], has_identifier: F) -> PageType
where
    S: AsRef<str>,
    F: FnOnce(&str) -> bool,
{
    match segments {
        [] => return PageType::Root,
        [first] => {
            if let Some(category) = Category::from_path_segment(first.as_ref()) {
                return PageType::Category(category);
            }
        }
        [_, second] if is_subtype(second.as_ref()) => return PageType::Subtype,
        [_, _, _] => return PageType::Country,
        [_, _, _, _] => return PageType::Brand,
        _ => {}
    }
    let path = segments.iter().map(AsRef::as_ref).join("/");
    if has_identifier(&path) {
        PageType::Product
    } else {
        PageType::Unknown
    }
}

/// Splits a raw request path on `/`, ignoring empty segments.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.trim().is_empty()).collect()
}

pub fn classify_path(path: &str) -> PageType {
    classify(&split_path(path))
}
