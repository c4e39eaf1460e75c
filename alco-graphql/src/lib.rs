use alco_types::Alcohol;
use async_trait::async_trait;
use derive_more::{Display, Error};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

pub static SITEMAP_QUERY: &str = r#"query GetAlcoholsForSitemap($type: String, $langCode: String) {
  alcohols(filter: { type: $type, langCode: $langCode }) {
    asin
    name
    details { legend value }
    country { iso names { fr } regions { iso names { fr } } }
    type
    langCode
    updatedAt
  }
}"#;

pub static ALCOHOL_QUERY: &str = r#"query GetAlcohol($asin: String, $type: String, $langCode: String) {
  alcohols(filter: { asin: $asin, type: $type, langCode: $langCode }) {
    _id
    asin
    name
    details { legend value }
    country { iso iso3 names { fr } regions { iso names { fr } } }
    type
    langCode
    updatedAt
  }
}"#;

static NGROK_HEADER: &str = "ngrok-skip-browser-warning";

/// Query variables shared by every catalog query.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AlcoholFilter {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub alcohol_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asin: Option<String>,
}

impl AlcoholFilter {
    pub fn new<T: Into<String>, L: Into<String>>(alcohol_type: T, lang_code: L) -> Self {
        Self {
            alcohol_type: Some(alcohol_type.into()),
            lang_code: Some(lang_code.into()),
            asin: None,
        }
    }

    pub fn with_asin<S: Into<String>>(mut self, asin: S) -> Self {
        self.asin = Some(asin.into());
        self
    }
}

#[derive(Debug, Display, Error)]
pub enum SourceError {
    #[display("Unable to reach catalog API: {_0}")]
    Transport(reqwest::Error),
    #[error(ignore)]
    #[display("Catalog API answered with status {_0}")]
    Status(u16),
    #[error(ignore)]
    #[display("Catalog API returned errors: {_0}")]
    GraphQl(String),
    #[display("Unable to decode catalog response: {_0}")]
    Decode(serde_json::Error),
    #[display("No alcohols found")]
    NoData,
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err)
    }
}

/// Where product records come from. Failures are reported once, the caller
/// decides what an unavailable catalog means for its response.
#[async_trait]
pub trait AlcoholSource: Send + Sync {
    async fn fetch_alcohols(&self, filter: &AlcoholFilter) -> Result<Vec<Alcohol>, SourceError>;

    async fn fetch_alcohol(
        &self,
        asin: &str,
        filter: &AlcoholFilter,
    ) -> Result<Option<Alcohol>, SourceError>;
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: &'a AlcoholFilter,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<AlcoholsData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct AlcoholsData {
    alcohols: Option<Vec<Alcohol>>,
}

pub fn parse_alcohols(body: &[u8]) -> Result<Vec<Alcohol>, SourceError> {
    let response: GraphQlResponse = serde_json::from_slice(body)?;
    if !response.errors.is_empty() {
        let messages = response
            .errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(SourceError::GraphQl(messages));
    }
    response
        .data
        .and_then(|d| d.alcohols)
        .ok_or(SourceError::NoData)
}

#[derive(Clone)]
pub struct GraphQlSource {
    client: reqwest::Client,
    endpoint: String,
    ngrok_header: bool,
}

impl GraphQlSource {
    pub fn new<S: Into<String>>(endpoint: S, ngrok_header: bool) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            ngrok_header,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if self.ngrok_header {
            map.insert(NGROK_HEADER, HeaderValue::from_static("true"));
        }
        map
    }

    async fn query(
        &self,
        query: &str,
        filter: &AlcoholFilter,
    ) -> Result<Vec<Alcohol>, SourceError> {
        let body = serde_json::to_vec(&GraphQlRequest {
            query,
            variables: filter,
        })?;
        let resp = self
            .client
            .post(&self.endpoint)
            .headers(self.headers())
            .body(body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }
        let bytes = resp.bytes().await?;
        parse_alcohols(&bytes)
    }
}

#[async_trait]
impl AlcoholSource for GraphQlSource {
    async fn fetch_alcohols(&self, filter: &AlcoholFilter) -> Result<Vec<Alcohol>, SourceError> {
        let alcohols = self.query(SITEMAP_QUERY, filter).await?;
        log::debug!(
            "Fetched {} alcohols from {} ({filter:?})",
            alcohols.len(),
            self.endpoint
        );
        Ok(alcohols)
    }

    async fn fetch_alcohol(
        &self,
        asin: &str,
        filter: &AlcoholFilter,
    ) -> Result<Option<Alcohol>, SourceError> {
        let filter = filter.clone().with_asin(asin);
        match self.query(ALCOHOL_QUERY, &filter).await {
            Ok(alcohols) => Ok(alcohols.into_iter().find(|a| a.asin == asin)),
            Err(SourceError::NoData) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
