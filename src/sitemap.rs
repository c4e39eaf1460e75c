use crate::canonical::CanonicalUrlBuilder;
use alco_types::{Alcohol, RawTimestamp};
use derive_more::{Display, Error};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

pub static SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Display, Error)]
pub enum SitemapError {
    #[display("Unable to write sitemap: {_0}")]
    Xml(quick_xml::Error),
    #[display("Unable to write sitemap: {_0}")]
    Io(std::io::Error),
    #[display("Sitemap is not valid UTF-8: {_0}")]
    Utf8(std::string::FromUtf8Error),
}

impl From<quick_xml::Error> for SitemapError {
    fn from(value: quick_xml::Error) -> Self {
        Self::Xml(value)
    }
}

impl From<std::io::Error> for SitemapError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<std::string::FromUtf8Error> for SitemapError {
    fn from(value: std::string::FromUtf8Error) -> Self {
        Self::Utf8(value)
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct SitemapEntry {
    pub loc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<String>,
}

impl SitemapEntry {
    pub fn from_alcohol(builder: &CanonicalUrlBuilder, alcohol: &Alcohol) -> Self {
        let lastmod = alcohol.updated_at.as_ref().and_then(|raw| {
            let formatted = parse_timestamp(raw).and_then(format_lastmod);
            if formatted.is_none() {
                log::warn!("Unparseable updatedAt for {}: {raw:?}", alcohol.asin);
            }
            formatted
        });
        Self {
            loc: builder.build(Some(alcohol)),
            lastmod,
        }
    }
}

fn from_millis(millis: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
}

/// RFC 3339 text or Unix epoch milliseconds, as text or as a number.
pub fn parse_timestamp(raw: &RawTimestamp) -> Option<OffsetDateTime> {
    match raw {
        RawTimestamp::Millis(ms) => from_millis(*ms),
        RawTimestamp::Text(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(ms) => from_millis(ms),
                Err(_) => OffsetDateTime::parse(s, &Rfc3339).ok(),
            }
        }
    }
}

pub fn format_lastmod(dt: OffsetDateTime) -> Option<String> {
    dt.to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        ))
        .ok()
}

pub fn render_sitemap(entries: &[SitemapEntry]) -> Result<String, SitemapError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NS)]),
    ))?;
    for entry in entries {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        writer
            .create_element("loc")
            .write_text_content(BytesText::new(&entry.loc))?;
        if let Some(lastmod) = &entry.lastmod {
            writer
                .create_element("lastmod")
                .write_text_content(BytesText::new(lastmod))?;
        }
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("urlset")))?;
    Ok(String::from_utf8(writer.into_inner())?)
}

pub fn render_robots(site_root: &str) -> String {
    format!(
        "User-agent: *\nSitemap: {}/sitemap.xml",
        site_root.trim_end_matches('/')
    )
}
