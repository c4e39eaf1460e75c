use derive_more::{Display, Error};
use lazy_regex::regex;
use log_error::LogError;
use percent_encoding::percent_decode_str;

static DEFAULT_THUMBNAIL: &str = "/images/default-thumbnail.jpg";
static IMAGE_HOST: &str = "https://m.media-amazon.com/images/I";

#[derive(Debug, Display, Error)]
pub enum DecodeError {
    #[error(ignore)]
    #[display("Malformed percent escape at byte {_0}")]
    MalformedEscape(usize),
    #[display("Decoded path is not valid UTF-8: {_0}")]
    NotUtf8(std::str::Utf8Error),
}

/// Strict percent-decoding: a `%` must be followed by two hex digits and the
/// decoded bytes must form UTF-8.
pub fn decode_path(path: &str) -> Result<String, DecodeError> {
    let bytes = path.as_bytes();
    for (i, _) in path.match_indices('%') {
        let valid = bytes
            .get(i + 1..i + 3)
            .map(|h| h.iter().all(u8::is_ascii_hexdigit))
            .unwrap_or(false);
        if !valid {
            return Err(DecodeError::MalformedEscape(i));
        }
    }
    percent_decode_str(path)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(DecodeError::NotUtf8)
}

/// Finds the product identifier (a run of at least ten uppercase letters or
/// digits) anywhere in a percent-encoded path. Undecodable paths yield `None`.
pub fn extract_asin(path: &str) -> Option<String> {
    let decoded = decode_path(path).log_error("Unable to decode path for ASIN extraction")?;
    find_asin(&decoded)
}

/// Same as [`extract_asin`] for text that is already decoded.
pub fn find_asin(decoded: &str) -> Option<String> {
    regex!(r"[A-Z0-9]{10,}")
        .find(decoded)
        .map(|m| m.as_str().to_string())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub crop: bool,
    pub sr: bool,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            crop: true,
            sr: true,
        }
    }
}

impl ImageOptions {
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }
}

pub fn image_url(id: &str, options: ImageOptions) -> String {
    if id.trim().is_empty() {
        return DEFAULT_THUMBNAIL.to_string();
    }
    let mut modifiers = String::new();
    if options.crop {
        modifiers.push_str("._AC");
    }
    if let (true, Some(w), Some(h)) = (options.sr, options.width, options.height) {
        modifiers.push_str(&format!("._SR{w},{h}"));
    }
    format!("{IMAGE_HOST}/{id}{modifiers}.jpg")
}
