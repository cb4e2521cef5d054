//! Read-only access to a template store.
//!
//! ## Layout
//!
//! ```text
//! templates/
//! ├── base/                  # always applied
//! └── variants/
//!     ├── manifold/          # overlay, selected with --variant
//!     └── metaplex/
//! ```
//!
//! Files whose name ends in [`TEMPLATE_SUFFIX`] are rendered after composition;
//! everything else is copied verbatim.
//!
//! The crate's own `templates/` tree is compiled into the library. A store is
//! either a directory on disk ([`TemplateStore::open`]) or that embedded tree
//! unpacked into a temporary directory ([`TemplateStore::bundled`]).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use include_dir::{include_dir, Dir};
use tempfile::TempDir;

use crate::error::{GalleryError, Result};
use crate::params::variant_flag;

/// Suffix marking a file as render-pending (`package.json.ejs` -> `package.json`).
pub const TEMPLATE_SUFFIX: &str = ".ejs";

/// Name of the manifest template inside every tree.
pub const MANIFEST_TEMPLATE: &str = "package.json.ejs";

/// Variant selected when none is given.
pub const DEFAULT_VARIANT: &str = "manifold";

/// The template store shipped with this crate.
pub static BUNDLED_TEMPLATES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// Handle on a template store rooted at a directory.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
    // Keeps an unpacked bundled store alive for as long as any handle exists.
    _unpacked: Option<Arc<TempDir>>,
}

impl TemplateStore {
    /// Open a store, checking that its `base/` tree exists.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.join("base").is_dir() {
            return Err(GalleryError::TemplateStoreNotFound(root));
        }
        Ok(Self {
            root,
            _unpacked: None,
        })
    }

    /// Unpack the embedded templates into a temporary directory and open them.
    ///
    /// The directory is removed when the last clone of the store is dropped.
    pub fn bundled() -> Result<Self> {
        Self::unpack(&BUNDLED_TEMPLATES)
    }

    /// Unpack an embedded tree laid out like a store.
    pub fn unpack(tree: &Dir<'_>) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("create-nft-gallery-")
            .tempdir()?;
        tree.extract(dir.path())?;
        tracing::debug!("unpacked bundled templates into {}", dir.path().display());

        let store = Self::open(dir.path())?;
        Ok(Self {
            _unpacked: Some(Arc::new(dir)),
            ..store
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the always-applied base tree.
    pub fn base_tree(&self) -> PathBuf {
        self.root.join("base")
    }

    /// Names of all variant trees, sorted.
    ///
    /// Fails with [`GalleryError::VariantCollision`] when two names map to the
    /// same `include<Variant>` flag (`magic-eden` and `magic_eden`).
    pub fn variants(&self) -> Result<Vec<String>> {
        let dir = self.root.join("variants");
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();

        let mut flags: BTreeMap<String, &str> = BTreeMap::new();
        for name in &names {
            let flag = variant_flag(name);
            if let Some(first) = flags.insert(flag.clone(), name) {
                return Err(GalleryError::VariantCollision {
                    first: first.to_string(),
                    second: name.clone(),
                    flag,
                });
            }
        }
        Ok(names)
    }

    /// Resolve a variant name to its tree, failing with
    /// [`GalleryError::TemplateNotFound`] for unknown names.
    pub fn variant_tree(&self, name: &str) -> Result<PathBuf> {
        let variants = self.variants()?;
        if !variants.iter().any(|v| v == name) {
            return Err(GalleryError::TemplateNotFound {
                name: name.to_string(),
                available: variants.join(", "),
            });
        }
        Ok(self.root.join("variants").join(name))
    }
}

/// Returns true if the file name carries the template suffix.
///
/// A file named exactly `.ejs` is not a template.
pub fn is_template(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.len() > TEMPLATE_SUFFIX.len() && n.ends_with(TEMPLATE_SUFFIX))
}

/// Strip exactly one template suffix, keeping any inner extension.
pub fn rendered_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let stripped = name.strip_suffix(TEMPLATE_SUFFIX)?;
    if stripped.is_empty() {
        return None;
    }
    Some(path.with_file_name(stripped))
}
