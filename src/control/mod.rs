use crate::amazon::{decode_path, find_asin};
use crate::canonical::CanonicalUrlBuilder;
use crate::page::{classify_decoded, split_path, PageType};
use crate::sitemap::{render_robots, render_sitemap, SitemapEntry, SitemapError};
use alco_graphql::{AlcoholFilter, AlcoholSource, SourceError};
use actix_web::{
    get,
    http::header::{ContentType, LOCATION},
    web::{Data, ServiceConfig},
    HttpRequest, HttpResponse,
};
use derive_more::{Display, Error};
use log_error::LogError;
use serde::Serialize;
use std::sync::Arc;

pub type Response = Result<HttpResponse, ControllerError>;

/// Shared handler state: the catalog, the URL builder for the configured
/// site and the filter every catalog query is made with.
pub struct AppState {
    pub source: Arc<dyn AlcoholSource>,
    pub builder: CanonicalUrlBuilder,
    pub filter: AlcoholFilter,
}

#[derive(Debug, Display, Error)]
pub enum ControllerError {
    NotFound,
    #[display("No alcohols found")]
    NoData,
    #[error(ignore)]
    InternalServerError(anyhow::Error),
}

impl From<anyhow::Error> for ControllerError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalServerError(err)
    }
}

impl From<SourceError> for ControllerError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NoData => Self::NoData,
            err => Self::InternalServerError(err.into()),
        }
    }
}

impl From<SitemapError> for ControllerError {
    fn from(err: SitemapError) -> Self {
        Self::InternalServerError(err.into())
    }
}

impl actix_web::error::ResponseError for ControllerError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            ControllerError::NotFound | ControllerError::NoData => StatusCode::NOT_FOUND,
            ControllerError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        log::warn!("{self:?}");
        let body = match self {
            ControllerError::NotFound => "Not Found",
            ControllerError::NoData => "No alcohols found",
            ControllerError::InternalServerError(_) => "Internal Server Error",
        };
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(body)
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PageDto {
    pub page_type: &'static str,
    pub canonical: String,
}

#[get("/sitemap.xml")]
pub async fn sitemap(state: Data<AppState>) -> Response {
    let alcohols = state.source.fetch_alcohols(&state.filter).await?;
    let entries = alcohols
        .iter()
        .map(|a| SitemapEntry::from_alcohol(&state.builder, a))
        .collect::<Vec<_>>();
    log::info!("Sitemap generated with {} urls", entries.len());
    Ok(HttpResponse::Ok()
        .content_type("application/xml")
        .body(render_sitemap(&entries)?))
}

#[get("/robots.txt")]
pub async fn robots(state: Data<AppState>) -> Response {
    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(render_robots(state.builder.site_root())))
}

#[get("/api/routes")]
pub async fn routes(state: Data<AppState>) -> Response {
    let alcohols = state.source.fetch_alcohols(&state.filter).await?;
    Ok(HttpResponse::Ok().json(state.builder.routes(&alcohols, true)))
}

/// Classifies a catalog path. Product pages are looked up and redirected to
/// their canonical URL when requested under any other path.
#[get("/cl{tail:.*}")]
pub async fn page(state: Data<AppState>, req: HttpRequest) -> Response {
    let raw = req.path().strip_prefix("/cl").unwrap_or_default();
    if !raw.is_empty() && !raw.starts_with('/') {
        return Err(ControllerError::NotFound);
    }
    // split before decoding so %2F stays inside its segment
    let segments = split_path(raw)
        .into_iter()
        .map(decode_path)
        .collect::<Result<Vec<_>, _>>()
        .log_error("Unable to decode page path")
        .ok_or(ControllerError::NotFound)?;
    let page_type = classify_decoded(&segments);
    let canonical = match page_type {
        PageType::Unknown => return Err(ControllerError::NotFound),
        PageType::Product => {
            let asin = find_asin(&segments.join("/")).ok_or(ControllerError::NotFound)?;
            let alcohol = state
                .source
                .fetch_alcohol(&asin, &state.filter)
                .await?
                .ok_or(ControllerError::NotFound)?;
            let canonical = state.builder.build(Some(&alcohol));
            let requested = format!(
                "{}{}",
                state.builder.site_root(),
                req.path().trim_end_matches('/')
            );
            if requested != canonical {
                log::debug!("Redirecting {requested} to {canonical}");
                return Ok(HttpResponse::MovedPermanently()
                    .insert_header((LOCATION, canonical))
                    .finish());
            }
            canonical
        }
        _ => state.builder.listing_canonical_url(&segments),
    };
    Ok(HttpResponse::Ok().json(PageDto {
        page_type: page_type.as_str(),
        canonical,
    }))
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(sitemap)
        .service(robots)
        .service(routes)
        .service(page);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use alco_types::{Alcohol, AlcoholType, CountryInfo, Detail, NameTranslations, RawTimestamp};
    use async_trait::async_trait;

    static CANONICAL: &str =
        "https://example.com/cl/spiritueux/whiskys/fr/glenfiddich/12ans-single-malt-france-12-B000ABCDEF";

    #[derive(Default)]
    struct MemorySource {
        alcohols: Vec<Alcohol>,
        unavailable: bool,
    }

    #[async_trait]
    impl AlcoholSource for MemorySource {
        async fn fetch_alcohols(
            &self,
            _filter: &AlcoholFilter,
        ) -> Result<Vec<Alcohol>, SourceError> {
            if self.unavailable {
                return Err(SourceError::Status(502));
            }
            if self.alcohols.is_empty() {
                return Err(SourceError::NoData);
            }
            Ok(self.alcohols.clone())
        }

        async fn fetch_alcohol(
            &self,
            asin: &str,
            _filter: &AlcoholFilter,
        ) -> Result<Option<Alcohol>, SourceError> {
            if self.unavailable {
                return Err(SourceError::Status(502));
            }
            Ok(self.alcohols.iter().find(|a| a.asin == asin).cloned())
        }
    }

    fn glenfiddich() -> Alcohol {
        Alcohol {
            asin: "B000ABCDEF".to_string(),
            name: "Glenfiddich 12 ans Single Malt".to_string(),
            alcohol_type: AlcoholType::Whisky,
            country: Some(CountryInfo {
                iso: Some("FR".to_string()),
                names: Some(NameTranslations {
                    en: None,
                    fr: Some("France".to_string()),
                }),
                ..Default::default()
            }),
            details: Some(vec![
                Detail::new("Marque", "Glenfiddich"),
                Detail::new("Âge", "12"),
            ]),
            updated_at: Some(RawTimestamp::Millis(1718000000000)),
            ..Default::default()
        }
    }

    fn state(source: MemorySource) -> Data<AppState> {
        Data::new(AppState {
            source: Arc::new(source),
            builder: CanonicalUrlBuilder::new("https://example.com/"),
            filter: AlcoholFilter::new("whisky", "fr_FR"),
        })
    }

    fn catalog() -> MemorySource {
        MemorySource {
            alcohols: vec![glenfiddich()],
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn serves_sitemap() {
        let app = test::init_service(App::new().app_data(state(catalog())).configure(configure)).await;
        let req = test::TestRequest::get().uri("/sitemap.xml").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(StatusCode::OK, resp.status());
        let body = test::read_body(resp).await;
        let body = std::str::from_utf8(&body).unwrap();
        assert!(body.contains(&format!("<loc>{CANONICAL}</loc>")));
        assert!(body.contains("<lastmod>2024-06-10T06:13:20.000Z</lastmod>"));
    }

    #[actix_web::test]
    async fn empty_catalog_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(state(MemorySource::default()))
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::get().uri("/sitemap.xml").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(StatusCode::NOT_FOUND, resp.status());
        assert_eq!("No alcohols found", test::read_body(resp).await);
    }

    #[actix_web::test]
    async fn unavailable_catalog_is_server_error() {
        let app = test::init_service(
            App::new()
                .app_data(state(MemorySource {
                    unavailable: true,
                    ..Default::default()
                }))
                .configure(configure),
        )
        .await;
        for uri in ["/sitemap.xml", "/api/routes"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, resp.status());
            assert_eq!("Internal Server Error", test::read_body(resp).await);
        }
    }

    #[actix_web::test]
    async fn serves_robots_and_routes() {
        let app = test::init_service(App::new().app_data(state(catalog())).configure(configure)).await;
        let req = test::TestRequest::get().uri("/robots.txt").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!("User-agent: *\nSitemap: https://example.com/sitemap.xml", body);

        let req = test::TestRequest::get().uri("/api/routes").to_request();
        let paths: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            vec![CANONICAL.strip_prefix("https://example.com").unwrap().to_string()],
            paths
        );
    }

    #[actix_web::test]
    async fn redirects_product_to_canonical() {
        let app = test::init_service(App::new().app_data(state(catalog())).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/cl/spiritueux/whiskys/fr/glenfiddich/old-B000ABCDEF")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(StatusCode::MOVED_PERMANENTLY, resp.status());
        assert_eq!(CANONICAL, resp.headers().get(LOCATION).unwrap());

        let req = test::TestRequest::get()
            .uri("/cl/a/b/c/d/50%25-B000ABCDEF")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(StatusCode::MOVED_PERMANENTLY, resp.status());
        assert_eq!(CANONICAL, resp.headers().get(LOCATION).unwrap());

        let path = CANONICAL.strip_prefix("https://example.com").unwrap();
        let req = test::TestRequest::get().uri(path).to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!("product", body["pageType"]);
        assert_eq!(CANONICAL, body["canonical"]);
    }

    #[actix_web::test]
    async fn classifies_listing_pages() {
        let app = test::init_service(App::new().app_data(state(catalog())).configure(configure)).await;
        let cases = [
            ("/cl", "root", "https://example.com/cl"),
            ("/cl/spiritueux", "spiritueux", "https://example.com/cl/spiritueux"),
            (
                "/cl/spiritueux/whiskys/FR/Glen%20Moray",
                "brand",
                "https://example.com/cl/spiritueux/whiskys/fr/glen-moray",
            ),
        ];
        for (uri, page_type, canonical) in cases {
            let req = test::TestRequest::get().uri(uri).to_request();
            let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(page_type, body["pageType"]);
            assert_eq!(canonical, body["canonical"]);
        }
    }

    #[actix_web::test]
    async fn unknown_pages_are_not_found() {
        let app = test::init_service(App::new().app_data(state(catalog())).configure(configure)).await;
        for uri in [
            "/cl/vins",
            "/cl/a/b/c/d/B0MISSING12",
            "/clothes",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(StatusCode::NOT_FOUND, resp.status(), "{uri}");
        }
    }
}
