use derive_more::Display;
use serde::{Deserialize, Serialize};

pub mod alcohol;
pub mod country;

pub use alcohol::Alcohol;
pub use country::{CountryInfo, NameTranslations, RegionInfo};

/// Catalog category tag of a record. Only whisky is in active use,
/// everything else collapses into `Other`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "snake_case")]
pub enum AlcoholType {
    #[display("whisky")]
    Whisky,
    #[default]
    #[serde(other)]
    #[display("other")]
    Other,
}

impl AlcoholType {
    pub fn from_tag<S: AsRef<str>>(s: S) -> Self {
        match s.as_ref().trim().to_lowercase().as_str() {
            "whisky" => Self::Whisky,
            _ => Self::Other,
        }
    }
}

/// One legend/value pair of the free-form attribute list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    #[serde(default)]
    pub legend: String,
    #[serde(default)]
    pub value: String,
}

impl Detail {
    pub fn new<L: Into<String>, V: Into<String>>(legend: L, value: V) -> Self {
        Self {
            legend: legend.into(),
            value: value.into(),
        }
    }
}

/// `updatedAt` arrives either as an ISO string or as epoch milliseconds,
/// depending on the resolver.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Text(String),
}
