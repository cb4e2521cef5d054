//! Scaffold answers: the values that drive one project generation.
//!
//! Answers come from three places, highest precedence first: CLI flags,
//! an optional JSON answers file, and interactive prompts seeded with the
//! defaults below. Only the file format lives here; the CLI layers them.
//!
//! ```json
//! {
//!   "project_name": "nft-gallery",
//!   "domain": "mygallery",
//!   "variant": "manifold",
//!   "contract_address": "",
//!   "rpc_endpoint": ""
//! }
//! ```

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::error::{GalleryError, Result};
use crate::store::DEFAULT_VARIANT;

pub const DEFAULT_PROJECT_NAME: &str = "nft-gallery";
pub const DEFAULT_DOMAIN: &str = "mygallery";

/// Placeholder written for `DEPLOY_KEY` in the generated `.env`.
pub const DEPLOY_KEY_PLACEHOLDER: &str = "a base64 of your arweave wallet key";

/// Fully resolved answers for one scaffold run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaffoldConfig {
    pub project_name: String,
    /// ArNS name the gallery will be served from.
    pub domain: String,
    pub variant: String,
    pub contract_address: String,
    pub rpc_endpoint: String,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.into(),
            domain: DEFAULT_DOMAIN.into(),
            variant: DEFAULT_VARIANT.into(),
            contract_address: String::new(),
            rpc_endpoint: String::new(),
        }
    }
}

/// Partially filled answers, as read from an answers file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Answers {
    pub project_name: Option<String>,
    pub domain: Option<String>,
    pub variant: Option<String>,
    pub contract_address: Option<String>,
    pub rpc_endpoint: Option<String>,
}

impl Answers {
    /// Load answers from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| GalleryError::ConfigNotFound {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| GalleryError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Save answers as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| GalleryError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Fill every field missing here from `other`.
    pub fn or(self, other: Answers) -> Answers {
        Answers {
            project_name: self.project_name.or(other.project_name),
            domain: self.domain.or(other.domain),
            variant: self.variant.or(other.variant),
            contract_address: self.contract_address.or(other.contract_address),
            rpc_endpoint: self.rpc_endpoint.or(other.rpc_endpoint),
        }
    }

    /// Resolve into a full config using the defaults for missing fields.
    pub fn with_defaults(self) -> ScaffoldConfig {
        let defaults = ScaffoldConfig::default();
        ScaffoldConfig {
            project_name: self.project_name.unwrap_or(defaults.project_name),
            domain: self.domain.unwrap_or(defaults.domain),
            variant: self.variant.unwrap_or(defaults.variant),
            contract_address: self.contract_address.unwrap_or(defaults.contract_address),
            rpc_endpoint: self.rpc_endpoint.unwrap_or(defaults.rpc_endpoint),
        }
    }
}

/// A project name must be exactly one normal path component.
pub fn validate_project_name(name: &str) -> Result<()> {
    let invalid = || GalleryError::InvalidProjectName(name.to_string());
    if name.trim().is_empty() || name.contains(['/', '\\']) {
        return Err(invalid());
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScaffoldConfig::default();
        assert_eq!(config.project_name, "nft-gallery");
        assert_eq!(config.domain, "mygallery");
        assert_eq!(config.variant, "manifold");
        assert!(config.contract_address.is_empty());
    }

    #[test]
    fn test_answers_layering() {
        let flags = Answers {
            domain: Some("cli-domain".into()),
            ..Default::default()
        };
        let file = Answers {
            domain: Some("file-domain".into()),
            variant: Some("metaplex".into()),
            ..Default::default()
        };
        let config = flags.or(file).with_defaults();
        assert_eq!(config.domain, "cli-domain");
        assert_eq!(config.variant, "metaplex");
        assert_eq!(config.project_name, "nft-gallery");
    }

    #[test]
    fn test_answers_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.json");
        let answers = Answers {
            project_name: Some("gallery".into()),
            rpc_endpoint: Some("https://rpc.example".into()),
            ..Default::default()
        };
        answers.save(&path).unwrap();
        assert_eq!(Answers::load(&path).unwrap(), answers);
    }

    #[test]
    fn test_answers_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            Answers::load(&missing).unwrap_err(),
            GalleryError::ConfigNotFound { .. }
        ));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"{"project_name": "x", "colour": "red"}"#).unwrap();
        assert!(matches!(
            Answers::load(&bad).unwrap_err(),
            GalleryError::ConfigParse { .. }
        ));
    }

    #[test]
    fn test_validate_project_name() {
        assert!(validate_project_name("nft-gallery").is_ok());
        assert!(validate_project_name("my.gallery").is_ok());
        for bad in ["", "  ", ".", "..", "a/b", "a\\b", "/abs"] {
            assert!(validate_project_name(bad).is_err(), "{bad:?} accepted");
        }
    }
}
