//! File-backed country guide lookup.

use std::path::{Path, PathBuf};

use clausecheck_core::{CountrySummary, RegulationProfile};
use tracing::{info, warn};

use crate::StoreError;

/// Country guides stored as `<code>.json` files in a single directory.
///
/// Codes are case-insensitive; files are named in lower case (`germany.json`).
/// The store holds no cached state, so every lookup reads the file afresh.
pub struct GuideStore {
    dir: PathBuf,
}

impl GuideStore {
    /// Open a guide directory. Fails if the directory does not exist.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        if !dir.is_dir() {
            return Err(StoreError::DirNotFound(dir.to_path_buf()));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Load the guide for a country code.
    pub fn get(&self, code: &str) -> Result<RegulationProfile, StoreError> {
        if !is_valid_code(code) {
            return Err(StoreError::NotFound(code.to_string()));
        }
        let path = self.dir.join(format!("{}.json", code.to_lowercase()));
        if !path.is_file() {
            return Err(StoreError::NotFound(code.to_string()));
        }
        let content = std::fs::read_to_string(&path)?;
        let profile: RegulationProfile =
            serde_json::from_str(&content).map_err(|source| StoreError::Json {
                code: code.to_string(),
                source,
            })?;
        info!(code, name = %profile.name, categories = profile.regulations.len(), "loaded country guide");
        Ok(profile)
    }

    /// Summaries of every guide in the directory, sorted by code.
    ///
    /// Guides that fail to load are logged and left out of the listing.
    pub fn list(&self) -> Result<Vec<CountrySummary>, StoreError> {
        let mut codes = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                codes.push(stem.to_string());
            }
        }
        codes.sort();

        let mut out = Vec::with_capacity(codes.len());
        for code in codes {
            match self.get(&code) {
                Ok(profile) => out.push(CountrySummary::from_profile(&code, &profile)),
                Err(e) => warn!(code = %code, error = %e, "skipping country guide"),
            }
        }
        Ok(out)
    }
}

/// Codes become file names, so only plain identifiers are accepted.
fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_guide(dir: &Path, code: &str, body: &str) {
        std::fs::write(dir.join(format!("{code}.json")), body).unwrap();
    }

    fn fixture() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        write_guide(
            tmp.path(),
            "germany",
            r#"{
                "name": "Germany",
                "description": "Strong employee protections",
                "keyFeatures": ["Works councils", "Statutory notice"],
                "regulations": {"terminationNotice": "4 weeks", "annualLeave": "20 days"}
            }"#,
        );
        write_guide(
            tmp.path(),
            "uk",
            r#"{"name": "United Kingdom", "regulations": {"minimumWage": "National Living Wage"}}"#,
        );
        tmp
    }

    #[test]
    fn get_is_case_insensitive() {
        let tmp = fixture();
        let store = GuideStore::open(tmp.path()).unwrap();
        let profile = store.get("GERMANY").unwrap();
        assert_eq!(profile.name, "Germany");
        assert_eq!(profile.regulations.len(), 2);
    }

    #[test]
    fn missing_guide_is_not_found() {
        let tmp = fixture();
        let store = GuideStore::open(tmp.path()).unwrap();
        assert!(matches!(store.get("france"), Err(StoreError::NotFound(c)) if c == "france"));
    }

    #[test]
    fn path_like_codes_are_rejected() {
        let tmp = fixture();
        let store = GuideStore::open(tmp.path()).unwrap();
        assert!(matches!(store.get("../uk"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.get(""), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn invalid_json_is_reported() {
        let tmp = fixture();
        write_guide(tmp.path(), "broken", "{ not json");
        let store = GuideStore::open(tmp.path()).unwrap();
        assert!(matches!(store.get("broken"), Err(StoreError::Json { .. })));
    }

    #[test]
    fn list_is_sorted_and_skips_broken_guides() {
        let tmp = fixture();
        write_guide(tmp.path(), "broken", "{ not json");
        std::fs::write(tmp.path().join("notes.txt"), "ignore me").unwrap();
        let store = GuideStore::open(tmp.path()).unwrap();

        let list = store.list().unwrap();
        let codes: Vec<_> = list.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["GERMANY", "UK"]);
        assert_eq!(list[0].key_features.len(), 2);
        assert!(list[1].description.is_empty());
    }

    #[test]
    fn open_missing_dir_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        assert!(matches!(
            GuideStore::open(&missing),
            Err(StoreError::DirNotFound(_))
        ));
    }

    #[test]
    fn shipped_guides_parse() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/country-guides");
        let store = GuideStore::open(&dir).unwrap();
        let list = store.list().unwrap();
        assert_eq!(list.len(), 3);
        for summary in &list {
            let profile = store.get(&summary.code).unwrap();
            assert!(!profile.regulations.is_empty(), "{} has no regulations", summary.code);
        }
    }
}
