use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTranslations {
    pub en: Option<String>,
    pub fr: Option<String>,
}

impl NameTranslations {
    pub fn fr(&self) -> Option<&str> {
        self.fr.as_deref().filter(|s| !s.trim().is_empty())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionInfo {
    #[serde(default)]
    pub iso: Option<String>,
    #[serde(default)]
    pub names: Option<NameTranslations>,
}

impl RegionInfo {
    pub fn name_fr(&self) -> Option<&str> {
        self.names.as_ref().and_then(NameTranslations::fr)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryInfo {
    #[serde(default)]
    pub iso: Option<String>,
    #[serde(default)]
    pub iso3: Option<String>,
    #[serde(default)]
    pub names: Option<NameTranslations>,
    #[serde(default)]
    pub regions: Option<Vec<RegionInfo>>,
}

impl CountryInfo {
    pub fn iso(&self) -> Option<&str> {
        self.iso.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn is(&self, iso: &str) -> bool {
        self.iso().map(|i| i.eq_ignore_ascii_case(iso)).unwrap_or(false)
    }

    pub fn name_fr(&self) -> Option<&str> {
        self.names.as_ref().and_then(NameTranslations::fr)
    }

    /// An empty region list is treated the same as a missing one.
    pub fn first_region(&self) -> Option<&RegionInfo> {
        self.regions.as_ref().and_then(|r| r.first())
    }
}
