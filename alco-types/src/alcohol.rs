use crate::country::CountryInfo;
use crate::{AlcoholType, Detail, RawTimestamp};
use serde::{Deserialize, Serialize};

/// Product record as returned by the catalog API. Read-only input of the
/// URL pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Alcohol {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub asin: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: Option<CountryInfo>,
    #[serde(default)]
    pub details: Option<Vec<Detail>>,
    #[serde(rename = "type", default)]
    pub alcohol_type: AlcoholType,
    #[serde(default)]
    pub lang_code: Option<String>,
    #[serde(default)]
    pub updated_at: Option<RawTimestamp>,
    #[serde(default)]
    pub created_at: Option<RawTimestamp>,
}

impl Alcohol {
    pub fn details(&self) -> &[Detail] {
        self.details.as_deref().unwrap_or_default()
    }

    pub fn country_is(&self, iso: &str) -> bool {
        self.country.as_ref().map(|c| c.is(iso)).unwrap_or(false)
    }
}
