//! The end-to-end scaffold pipeline, minus bootstrap.
//!
//! Steps, in order:
//! 1. validate the project name and make sure the destination is empty
//! 2. resolve the variant (nothing is written for an unknown variant)
//! 3. compose base + variant trees into the destination
//! 4. merge the manifest fragments
//! 5. write `.env`
//! 6. render every `.ejs` file
//!
//! A failure at any step leaves the destination as it was at that point.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::compose;
use crate::config::{validate_project_name, ScaffoldConfig};
use crate::env_file;
use crate::error::{GalleryError, Result};
use crate::manifest::{self, MergePolicy};
use crate::params::Params;
use crate::store::TemplateStore;
use crate::templates::TemplateRenderer;

/// What a scaffold run produced.
#[derive(Debug, Clone)]
pub struct ScaffoldReport {
    pub project_dir: PathBuf,
    pub variant: String,
    /// Relative paths copied from the template trees.
    pub files: BTreeSet<PathBuf>,
    /// Relative paths the variant replaced.
    pub overridden: BTreeSet<PathBuf>,
    /// Absolute paths written by the render pass.
    pub rendered: Vec<PathBuf>,
}

/// Create the destination directory, which may already exist only if empty.
pub fn prepare_destination(dest: &Path) -> Result<()> {
    if dest.exists() {
        let occupied = !dest.is_dir() || std::fs::read_dir(dest)?.next().is_some();
        if occupied {
            return Err(GalleryError::ProjectExists(dest.to_path_buf()));
        }
    }
    std::fs::create_dir_all(dest)?;
    Ok(())
}

/// Run the scaffold pipeline into `dest`.
pub fn scaffold(store: &TemplateStore, config: &ScaffoldConfig, dest: &Path) -> Result<ScaffoldReport> {
    validate_project_name(&config.project_name)?;
    prepare_destination(dest)?;

    let base_tree = store.base_tree();
    let variant_tree = store.variant_tree(&config.variant)?;

    let composition = compose::compose(&base_tree, &variant_tree, dest)?;
    manifest::merge_into_project(&base_tree, &variant_tree, dest, &MergePolicy::default())?;
    env_file::write(dest, config)?;

    let params = Params::for_project(config, &store.variants()?);
    let rendered = TemplateRenderer::new().render_all(dest, &params)?;

    tracing::info!(
        "scaffolded {} ({} files, {} rendered)",
        dest.display(),
        composition.files.len(),
        rendered.len()
    );

    Ok(ScaffoldReport {
        project_dir: dest.to_path_buf(),
        variant: config.variant.clone(),
        files: composition.files,
        overridden: composition.overridden,
        rendered,
    })
}
