//! Per-jurisdiction regulation profiles.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Static employment-law description for one jurisdiction.
///
/// Loaded from a country guide file. `regulations` is passed through to the
/// prompt untouched, in file order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegulationProfile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub key_features: Vec<String>,
    /// category → requirement detail
    #[serde(default)]
    pub regulations: Map<String, Value>,
}

/// Listing entry for an available country guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySummary {
    /// Upper-case country code, e.g. `GERMANY`.
    pub code: String,
    pub name: String,
    pub description: String,
    pub key_features: Vec<String>,
}

impl CountrySummary {
    pub fn from_profile(code: &str, profile: &RegulationProfile) -> Self {
        Self {
            code: code.to_uppercase(),
            name: profile.name.clone(),
            description: profile.description.clone(),
            key_features: profile.key_features.clone(),
        }
    }
}
