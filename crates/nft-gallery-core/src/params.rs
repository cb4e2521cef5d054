//! The parameter set substituted into every template file.
//!
//! | Name                   | Value                                     |
//! |------------------------|-------------------------------------------|
//! | `name`, `projectName`  | project name                              |
//! | `domain`, `ARNS_NAME`  | ArNS domain                               |
//! | `variant`              | chosen variant                            |
//! | `include<Variant>`     | `true` only for the chosen variant        |
//! | `NFT_CONTRACT_ADDRESS` | free-form answer, may be empty            |
//! | `RPC_ENDPOINT`         | free-form answer, may be empty            |

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ScaffoldConfig;

/// Name-to-value mapping used uniformly across all parametrized files.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the parameters for a project. Every variant in `variants` gets an
    /// `include<Variant>` flag.
    pub fn for_project(config: &ScaffoldConfig, variants: &[String]) -> Self {
        let mut params = Self::new()
            .with("name", config.project_name.as_str())
            .with("projectName", config.project_name.as_str())
            .with("domain", config.domain.as_str())
            .with("ARNS_NAME", config.domain.as_str())
            .with("variant", config.variant.as_str())
            .with("NFT_CONTRACT_ADDRESS", config.contract_address.as_str())
            .with("RPC_ENDPOINT", config.rpc_endpoint.as_str());

        for variant in variants.iter().chain(std::iter::once(&config.variant)) {
            params.insert(variant_flag(variant), variant == &config.variant);
        }
        params
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// `manifold` -> `includeManifold`, `magic-eden` -> `includeMagicEden`.
///
/// Separators are dropped, so `magic-eden` and `magic_eden` share a flag;
/// [`TemplateStore::variants`](crate::store::TemplateStore::variants) rejects
/// stores containing both.
pub fn variant_flag(variant: &str) -> String {
    let mut flag = String::from("include");
    for part in variant.split(['-', '_', '.', ' ']).filter(|p| !p.is_empty()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            flag.extend(first.to_uppercase());
            flag.push_str(chars.as_str());
        }
    }
    flag
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(variant: &str) -> ScaffoldConfig {
        ScaffoldConfig {
            project_name: "my-gallery".into(),
            domain: "art".into(),
            variant: variant.into(),
            contract_address: "0xabc".into(),
            rpc_endpoint: String::new(),
        }
    }

    #[test]
    fn test_variant_flag() {
        assert_eq!(variant_flag("manifold"), "includeManifold");
        assert_eq!(variant_flag("metaplex"), "includeMetaplex");
        assert_eq!(variant_flag("magic-eden"), "includeMagicEden");
        assert_eq!(variant_flag("zora_v3"), "includeZoraV3");
    }

    #[test]
    fn test_for_project_flags() {
        let variants = vec!["manifold".to_string(), "metaplex".to_string()];
        let params = Params::for_project(&config("metaplex"), &variants);

        assert_eq!(params.get("includeManifold"), Some(&Value::Bool(false)));
        assert_eq!(params.get("includeMetaplex"), Some(&Value::Bool(true)));
        assert_eq!(params.get("name").unwrap(), "my-gallery");
        assert_eq!(params.get("projectName").unwrap(), "my-gallery");
        assert_eq!(params.get("ARNS_NAME").unwrap(), "art");
        assert_eq!(params.get("NFT_CONTRACT_ADDRESS").unwrap(), "0xabc");
        assert_eq!(params.get("RPC_ENDPOINT").unwrap(), "");
    }

    #[test]
    fn test_for_project_chosen_variant_always_flagged() {
        let params = Params::for_project(&config("manifold"), &[]);
        assert_eq!(params.get("includeManifold"), Some(&Value::Bool(true)));
        assert_eq!(params.len(), 8);
    }
}
