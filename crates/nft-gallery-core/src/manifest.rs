//! `package.json` merging between the base tree and a variant overlay.
//!
//! The merge is table-driven: every field name maps to a [`MergeStrategy`], and
//! fields absent from the table fall back to [`MergePolicy::fallback`]. The
//! default policy keeps the identity fields from the base manifest, unions the
//! three dependency/script mappings with the variant winning per key, and lets
//! the variant override anything else.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{GalleryError, Result};
use crate::store::MANIFEST_TEMPLATE;

/// How a single manifest field is combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Variant value if present, otherwise base value.
    Override,
    /// Object union: base entries, then variant entries on top.
    UnionLastWins,
    /// Base value only; the variant cannot change it.
    IgnoreVariant,
}

/// Field-name to strategy table.
#[derive(Debug, Clone)]
pub struct MergePolicy {
    rules: Vec<(String, MergeStrategy)>,
    fallback: MergeStrategy,
}

impl MergePolicy {
    pub fn new(fallback: MergeStrategy) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Add or replace the strategy for `field`.
    pub fn with(mut self, field: &str, strategy: MergeStrategy) -> Self {
        match self.rules.iter_mut().find(|(name, _)| name == field) {
            Some(rule) => rule.1 = strategy,
            None => self.rules.push((field.to_string(), strategy)),
        }
        self
    }

    pub fn strategy_for(&self, field: &str) -> MergeStrategy {
        self.rules
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, s)| *s)
            .unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> MergeStrategy {
        self.fallback
    }

    /// Merge `variant` into `base`.
    ///
    /// Output order: base fields in their original order, then fields only the
    /// variant has, in the variant's order.
    pub fn merge(&self, base: &Map<String, Value>, variant: &Map<String, Value>) -> Map<String, Value> {
        let mut merged = Map::new();

        let base_fields = base.keys().map(String::as_str);
        let variant_fields = variant.keys().map(String::as_str);

        for field in base_fields.chain(variant_fields) {
            if merged.contains_key(field) {
                continue;
            }
            let value = merge_field(
                self.strategy_for(field),
                base.get(field),
                variant.get(field),
            );
            if let Some(value) = value {
                merged.insert(field.to_string(), value);
            }
        }

        merged
    }
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self::new(MergeStrategy::Override)
            .with("name", MergeStrategy::IgnoreVariant)
            .with("version", MergeStrategy::IgnoreVariant)
            .with("private", MergeStrategy::IgnoreVariant)
            .with("type", MergeStrategy::IgnoreVariant)
            .with("scripts", MergeStrategy::UnionLastWins)
            .with("dependencies", MergeStrategy::UnionLastWins)
            .with("devDependencies", MergeStrategy::UnionLastWins)
    }
}

fn merge_field(strategy: MergeStrategy, base: Option<&Value>, variant: Option<&Value>) -> Option<Value> {
    match strategy {
        MergeStrategy::IgnoreVariant => base.cloned(),
        MergeStrategy::Override => variant.or(base).cloned(),
        MergeStrategy::UnionLastWins => match (base, variant) {
            (None, None) => None,
            (Some(Value::Object(b)), Some(Value::Object(v))) => {
                let mut out = b.clone();
                for (key, value) in v {
                    out.insert(key.clone(), value.clone());
                }
                Some(Value::Object(out))
            }
            // A non-object on either side cannot be unioned; the variant wins
            // like a plain override.
            (b, v) => v.or(b).cloned(),
        },
    }
}

/// Parse a manifest template as a JSON object.
pub fn parse_manifest(path: &Path, contents: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(contents).map_err(|e| GalleryError::ManifestParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(GalleryError::ManifestParse {
            path: path.to_path_buf(),
            message: format!("expected a JSON object, found {}", json_kind(&other)),
        }),
    }
}

/// Load a manifest template from disk.
pub fn load_manifest(path: &Path) -> Result<Map<String, Value>> {
    let contents = std::fs::read_to_string(path)?;
    parse_manifest(path, &contents)
}

/// The manifest used when a variant ships no fragment of its own.
pub fn empty_variant_manifest() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("scripts".into(), Value::Object(Map::new()));
    map.insert("dependencies".into(), Value::Object(Map::new()));
    map.insert("devDependencies".into(), Value::Object(Map::new()));
    map
}

/// Merge the base and variant manifests and write the result over the
/// project's manifest template.
///
/// The base manifest is always read from the base tree, since composition may
/// already have replaced the project copy with the variant's file.
pub fn merge_into_project(
    base_tree: &Path,
    variant_tree: &Path,
    project_dir: &Path,
    policy: &MergePolicy,
) -> Result<Map<String, Value>> {
    let base = load_manifest(&base_tree.join(MANIFEST_TEMPLATE))?;

    let variant_path = variant_tree.join(MANIFEST_TEMPLATE);
    let variant = if variant_path.is_file() {
        load_manifest(&variant_path)?
    } else {
        tracing::debug!("variant has no {MANIFEST_TEMPLATE}, using empty fragment");
        empty_variant_manifest()
    };

    let merged = policy.merge(&base, &variant);
    let out_path = project_dir.join(MANIFEST_TEMPLATE);
    let json = serde_json::to_string_pretty(&merged).map_err(|e| GalleryError::ManifestParse {
        path: out_path.clone(),
        message: e.to_string(),
    })?;
    std::fs::write(&out_path, json)?;

    tracing::info!("merged manifest written to {}", out_path.display());
    Ok(merged)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
