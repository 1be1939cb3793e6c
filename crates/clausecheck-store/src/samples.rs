//! Catalogue of bundled sample contracts.
//!
//! Files are named `<hint>_<country>_<description>.txt`, e.g.
//! `non-compliant_germany_no_notice.txt`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use crate::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleContract {
    pub filename: String,
    #[serde(skip)]
    pub path: PathBuf,
    /// Expected outcome, e.g. `compliant`, `non_compliant`, `partial`.
    pub compliance_hint: String,
    /// Upper-case country code the sample targets.
    pub target_country: String,
    pub description: String,
}

impl SampleContract {
    fn from_filename(dir: &Path, filename: &str) -> Self {
        let stem = filename.strip_suffix(".txt").unwrap_or(filename);
        let mut parts = stem.split('_');
        let hint = parts.next().unwrap_or_default();
        let country = parts
            .next()
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| "UNKNOWN".to_string());

        Self {
            filename: filename.to_string(),
            path: dir.join(filename),
            compliance_hint: hint.replace('-', "_"),
            target_country: country,
            description: title_case(stem),
        }
    }
}

pub struct SampleCatalogue;

impl SampleCatalogue {
    /// List `*.txt` samples in `dir`, sorted by filename.
    ///
    /// A missing directory yields an empty catalogue.
    pub fn list(dir: &Path) -> Result<Vec<SampleContract>, StoreError> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(dir = %dir.display(), "sample directory missing");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let file_name = entry?.file_name();
            if let Some(name) = file_name.to_str()
                && name.ends_with(".txt")
            {
                names.push(name.to_string());
            }
        }
        names.sort();

        Ok(names
            .iter()
            .map(|n| SampleContract::from_filename(dir, n))
            .collect())
    }
}

/// `non-compliant_germany_no_notice` → `Non-compliant Germany No Notice`
fn title_case(stem: &str) -> String {
    stem.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
