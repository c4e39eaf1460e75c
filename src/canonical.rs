use crate::detail::{extract_detail, MISSING};
use crate::slug::{canonicalize_with, format_url, strip_accents};
use crate::words::WordLists;
use alco_types::{Alcohol, AlcoholType};
use itertools::Itertools;

/// Listing pages carry at most category, type, country and brand.
const LISTING_DEPTH: usize = 4;

/// Category and type path segments of a catalog category tag.
pub fn category_segments(alcohol_type: &AlcoholType) -> (&'static str, &'static str) {
    match alcohol_type {
        AlcoholType::Whisky => ("spiritueux", "whiskys"),
        AlcoholType::Other => (MISSING, MISSING),
    }
}

fn words_of(text: &str) -> Vec<String> {
    strip_accents(text)
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_number(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_digit())
}

/// First meaningful word of `title` after the brand.
///
/// Words listed in `skip` are passed over. A number is returned together
/// with the word following it (`12 ans`), a word of at most two characters
/// is replaced by the next one. The brand is given as a slug and may span
/// several words.
pub fn first_word_after(title: &str, brand: &str, skip: &[String]) -> Option<String> {
    let words = words_of(title);
    let brand = brand.split('-').filter(|t| !t.is_empty()).collect::<Vec<_>>();
    if brand.is_empty() || words.len() < brand.len() {
        return None;
    }
    let start = (0..=words.len() - brand.len()).find(|&i| {
        words[i..i + brand.len()]
            .iter()
            .zip(brand.iter())
            .all(|(w, b)| w.eq_ignore_ascii_case(b))
    })?;
    let last = words.len() - 1;
    let mut next = start + brand.len();
    if next > last {
        return None;
    }
    while next < last && skip.iter().any(|s| s.eq_ignore_ascii_case(&words[next])) {
        next += 1;
    }
    let word = &words[next];
    if next < last && is_number(word) {
        return Some(format!("{word} {}", words[next + 1]));
    }
    if next < last && word.len() <= 2 {
        return Some(words[next + 1].clone());
    }
    Some(word.clone())
}

/// Words of `title` that belong to `whitelist`, in title order.
pub fn filter_whitelist_words(title: &str, whitelist: &[String]) -> String {
    let whitelist = whitelist
        .iter()
        .map(|w| strip_accents(w))
        .collect::<Vec<_>>();
    words_of(title)
        .into_iter()
        .filter(|w| whitelist.iter().any(|k| k.eq_ignore_ascii_case(w)))
        .join(" ")
}

fn has_decimal_separator(value: &str) -> bool {
    value.contains([',', '.'])
}

/// Volume with a decimal separator is unusable in a slug; the separate unit
/// attribute is used instead unless it is decimal too.
pub fn volume_unit<'a>(volume: &'a str, unit: &'a str) -> &'a str {
    if !has_decimal_separator(volume) {
        return volume;
    }
    if has_decimal_separator(unit) {
        ""
    } else {
        unit
    }
}

/// Country and region words used in the product slug.
fn origin(alcohol: &Alcohol) -> (String, String) {
    let details = alcohol.details();
    let country = alcohol.country.as_ref();
    let country_detail = || extract_detail(details, &["pays", "country"]).to_string();
    let region_detail = || extract_detail(details, &["région", "region"]).to_string();
    let first_region = country
        .and_then(|c| c.first_region())
        .and_then(|r| r.name_fr())
        .map(str::to_string);

    if alcohol.country_is("GB") {
        // regions of GB are the nations, the attribute carries the whisky region
        return (first_region.unwrap_or_else(country_detail), region_detail());
    }
    let name = if alcohol.country_is("US") {
        MISSING.to_string()
    } else {
        country
            .and_then(|c| c.name_fr())
            .map(str::to_string)
            .unwrap_or_else(country_detail)
    };
    (name, first_region.unwrap_or_else(region_detail))
}

#[derive(Clone, Debug)]
pub struct CanonicalUrlBuilder {
    site_root: String,
    words: WordLists,
}

impl CanonicalUrlBuilder {
    pub fn new<S: AsRef<str>>(site_root: S) -> Self {
        Self::with_words(site_root, WordLists::default())
    }

    pub fn with_words<S: AsRef<str>>(site_root: S, words: WordLists) -> Self {
        Self {
            site_root: site_root.as_ref().trim().trim_end_matches('/').to_string(),
            words,
        }
    }

    pub fn site_root(&self) -> &str {
        &self.site_root
    }

    pub fn words(&self) -> &WordLists {
        &self.words
    }

    /// Slug of the product name built from the title and the structured
    /// attributes, stripped of category, type, brand and blacklisted words.
    pub fn product_slug(&self, alcohol: &Alcohol, category: &str, brand: &str) -> String {
        let details = alcohol.details();
        let (country, region) = origin(alcohol);
        let volume = extract_detail(details, &["volume"]);
        let unit = extract_detail(details, &["unité", "unite"]);
        let parts = [
            first_word_after(&alcohol.name, brand, &self.words.skip_after_brand)
                .unwrap_or_default(),
            filter_whitelist_words(&alcohol.name, &self.words.whitelist),
            extract_detail(details, &["type"]).to_string(),
            country,
            region,
            extract_detail(details, &["âge", "age"]).to_string(),
            volume_unit(volume, unit).to_string(),
        ];
        let stop_words = self.words.stop_words(category, brand);
        canonicalize_with(
            &parts.join(" "),
            &stop_words,
            &self.words.rules,
            &self.words.units,
        )
    }

    /// Path of the canonical URL, without the site root:
    /// `/cl/<category>/<type>/<country-iso>/<brand>/<product>-<asin>`.
    pub fn path(&self, alcohol: &Alcohol) -> String {
        let (category, kind) = category_segments(&alcohol.alcohol_type);
        let iso = alcohol
            .country
            .as_ref()
            .and_then(|c| c.iso())
            .map(str::to_lowercase)
            .unwrap_or_else(|| MISSING.to_string());
        let brand = format_url(extract_detail(alcohol.details(), &["marque", "brand"]));
        let brand = if brand.is_empty() {
            MISSING.to_string()
        } else {
            brand
        };
        let product = self.product_slug(alcohol, category, &brand);
        let asin = alcohol.asin.trim();
        let last = [product.as_str(), asin]
            .into_iter()
            .filter(|s| !s.is_empty())
            .join("-");
        let last = if last.is_empty() { MISSING } else { last.as_str() };
        format!("/cl/{category}/{kind}/{iso}/{brand}/{last}")
    }

    /// Canonical URL of a record; without a record only the site root.
    pub fn build(&self, alcohol: Option<&Alcohol>) -> String {
        let Some(alcohol) = alcohol else {
            return self.site_root.clone();
        };
        let url = format!("{}{}", self.site_root, self.path(alcohol));
        let url = url.trim_end_matches('/').to_string();
        log::debug!("Canonical URL for {}: {url}", alcohol.asin);
        url
    }

    /// Canonical URL of a listing page from its path segments. Product
    /// segments are not handled here, use [`CanonicalUrlBuilder::build`].
    pub fn listing_canonical_url<S: AsRef<str>>(&self, segments: &[S]) -> String {
        if segments.len() > LISTING_DEPTH {
            log::warn!(
                "Listing canonical URL requested for a product path, product segments are dropped"
            );
        }
        let path = segments
            .iter()
            .take(LISTING_DEPTH)
            .map(|s| format_url(s.as_ref()))
            .map(|s| if s.is_empty() { MISSING.to_string() } else { s })
            .join("/");
        format!("{}/cl/{path}", self.site_root)
            .trim_end_matches('/')
            .to_string()
    }

    /// Canonical URLs of every record, optionally relative to the site root.
    pub fn routes(&self, alcohols: &[Alcohol], strip_base: bool) -> Vec<String> {
        alcohols
            .iter()
            .map(|a| {
                if strip_base {
                    self.path(a)
                } else {
                    self.build(Some(a))
                }
            })
            .collect()
    }
}

/// Canonical URL with the default word lists.
pub fn generate_canonical_url(alcohol: Option<&Alcohol>, site_root: &str) -> String {
    CanonicalUrlBuilder::new(site_root).build(alcohol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alco_types::{CountryInfo, Detail, NameTranslations, RegionInfo};

    static ROOT: &str = "https://example.com";

    fn names(fr: &str) -> Option<NameTranslations> {
        Some(NameTranslations {
            en: None,
            fr: Some(fr.to_string()),
        })
    }

    fn glenfiddich() -> Alcohol {
        Alcohol {
            asin: "B000ABCDEF".to_string(),
            name: "Glenfiddich 12 ans Single Malt".to_string(),
            alcohol_type: AlcoholType::Whisky,
            country: Some(CountryInfo {
                iso: Some("FR".to_string()),
                names: names("France"),
                ..Default::default()
            }),
            details: Some(vec![
                Detail::new("Marque", "Glenfiddich"),
                Detail::new("Âge", "12"),
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn builds_canonical_url() {
        let url = generate_canonical_url(Some(&glenfiddich()), ROOT);
        assert_eq!(
            "https://example.com/cl/spiritueux/whiskys/fr/glenfiddich/12ans-single-malt-france-12-B000ABCDEF",
            url
        );
        let product = url
            .rsplit('/')
            .next()
            .and_then(|s| s.strip_suffix("-B000ABCDEF"))
            .unwrap();
        for word in ["whisky", "glenfiddich", "de", "premium"] {
            assert!(!product.split('-').any(|t| t == word));
        }
    }

    #[test]
    fn trims_site_root_slash() {
        let builder = CanonicalUrlBuilder::new("https://example.com/");
        assert_eq!("https://example.com", builder.site_root());
        assert!(builder
            .build(Some(&glenfiddich()))
            .starts_with("https://example.com/cl/"));
    }

    #[test]
    fn missing_record_is_site_root() {
        assert_eq!(ROOT, generate_canonical_url(None, ROOT));
    }

    #[test]
    fn uses_nation_as_country_for_gb() {
        let alcohol = Alcohol {
            asin: "B01234567X".to_string(),
            name: "The Macallan 18 ans Sherry Oak whisky".to_string(),
            alcohol_type: AlcoholType::Whisky,
            country: Some(CountryInfo {
                iso: Some("GB".to_string()),
                names: names("Royaume-Uni"),
                regions: Some(vec![RegionInfo {
                    iso: Some("SCT".to_string()),
                    names: names("Écosse"),
                }]),
                ..Default::default()
            }),
            details: Some(vec![
                Detail::new("Marque", "The Macallan"),
                Detail::new("Région", "Speyside"),
            ]),
            ..Default::default()
        };
        assert_eq!(
            "https://example.com/cl/spiritueux/whiskys/gb/the-macallan/18ans-ecosse-speyside-B01234567X",
            generate_canonical_url(Some(&alcohol), ROOT)
        );
    }

    #[test]
    fn drops_country_for_us_and_resolves_decimal_volume() {
        let alcohol = Alcohol {
            asin: "B00JDTN7XX".to_string(),
            name: "Jack Daniel's Old No. 7 Tennessee Whiskey".to_string(),
            alcohol_type: AlcoholType::Whisky,
            country: Some(CountryInfo {
                iso: Some("US".to_string()),
                names: names("États-Unis"),
                ..Default::default()
            }),
            details: Some(vec![
                Detail::new("Marque", "Jack Daniel's"),
                Detail::new("Type", "Tennessee Whiskey"),
                Detail::new("Volume", "0,7"),
                Detail::new("Unité", "cl"),
            ]),
            ..Default::default()
        };
        assert_eq!(
            "https://example.com/cl/spiritueux/whiskys/us/jack-daniel-s/old-tennessee-cl-B00JDTN7XX",
            generate_canonical_url(Some(&alcohol), ROOT)
        );
    }

    #[test]
    fn missing_fields_render_placeholder() {
        let alcohol = Alcohol {
            asin: "B0NOTHING1".to_string(),
            name: "Mystery bottle".to_string(),
            ..Default::default()
        };
        assert_eq!(
            "https://example.com/cl/-/-/-/-/B0NOTHING1",
            generate_canonical_url(Some(&alcohol), ROOT)
        );
    }

    #[test]
    fn accepts_substituted_word_lists() {
        let words = WordLists {
            blacklist: vec!["malt".to_string()],
            ..Default::default()
        };
        let builder = CanonicalUrlBuilder::with_words(ROOT, words);
        assert_eq!(
            "https://example.com/cl/spiritueux/whiskys/fr/glenfiddich/12ans-single-france-12-B000ABCDEF",
            builder.build(Some(&glenfiddich()))
        );
    }

    #[test]
    fn finds_first_word_after_brand() {
        let skip = WordLists::default().skip_after_brand;
        assert_eq!(
            Some("12 ans".to_string()),
            first_word_after("Glenfiddich 12 ans", "glenfiddich", &skip)
        );
        assert_eq!(
            Some("Reserve".to_string()),
            first_word_after("Glenfiddich Whisky Reserve", "glenfiddich", &skip)
        );
        assert_eq!(
            Some("Origine".to_string()),
            first_word_after("Chivas de Origine", "chivas", &skip)
        );
        assert_eq!(
            Some("Doublewood".to_string()),
            first_word_after("The Balvenie Doublewood", "the-balvenie", &skip)
        );
        assert_eq!(None, first_word_after("Glenfiddich", "glenfiddich", &skip));
        assert_eq!(None, first_word_after("Talisker 10", "ardbeg", &skip));
        assert_eq!(None, first_word_after("Talisker 10", "", &skip));
    }

    #[test]
    fn filters_whitelist_words() {
        let whitelist = WordLists::default().whitelist;
        assert_eq!(
            "Single Malt Tourbe",
            filter_whitelist_words("Ardbeg Single Malt Tourbé 10 ans", &whitelist)
        );
        assert_eq!("", filter_whitelist_words("Ardbeg 10", &whitelist));
    }

    #[test]
    fn resolves_volume_unit() {
        assert_eq!("70", volume_unit("70", "cl"));
        assert_eq!("cl", volume_unit("0,7", "cl"));
        assert_eq!("", volume_unit("0.7", "0,5"));
    }

    #[test]
    fn builds_listing_canonical_url() {
        let builder = CanonicalUrlBuilder::new(ROOT);
        assert_eq!(
            "https://example.com/cl/spiritueux/whiskys/fr/glen-moray",
            builder.listing_canonical_url(&["Spiritueux", "whiskys", "FR", "Glen Moray"])
        );
        assert_eq!(
            "https://example.com/cl/spiritueux",
            builder.listing_canonical_url(&["spiritueux"])
        );
        assert_eq!(
            "https://example.com/cl/a/b/c/d",
            builder.listing_canonical_url(&["a", "b", "c", "d", "e-B07XYZ12345"])
        );
        assert_eq!("https://example.com/cl", builder.listing_canonical_url::<&str>(&[]));
    }

    #[test]
    fn lists_routes() {
        let builder = CanonicalUrlBuilder::new(ROOT);
        let alcohols = vec![glenfiddich()];
        assert_eq!(
            vec!["/cl/spiritueux/whiskys/fr/glenfiddich/12ans-single-malt-france-12-B000ABCDEF"],
            builder.routes(&alcohols, true)
        );
        assert!(builder.routes(&alcohols, false)[0].starts_with(ROOT));
    }
}
