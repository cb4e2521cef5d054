//! Layered composition of template trees into a project directory.
//!
//! Layers are applied lowest precedence first. Each file is copied to the same
//! relative path under the destination, so a later layer replaces an earlier
//! layer's file while directories accumulate the union of their entries.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{GalleryError, Result};

/// Summary of a composition pass.
#[derive(Debug, Clone, Default)]
pub struct Composition {
    /// Every relative file path present in the destination after composition.
    pub files: BTreeSet<PathBuf>,
    /// Relative paths written by more than one layer.
    pub overridden: BTreeSet<PathBuf>,
}

/// Copy `layers` into `dest` in order, last writer wins per path.
pub fn compose_layers(layers: &[&Path], dest: &Path) -> Result<Composition> {
    let mut composition = Composition::default();

    for layer in layers {
        if !layer.is_dir() {
            return Err(GalleryError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("template tree not found: {}", layer.display()),
            )));
        }

        let mut copied = 0usize;
        for entry in WalkDir::new(layer).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            let relative = entry
                .path()
                .strip_prefix(layer)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
            let target = dest.join(relative);

            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target)?;
                continue;
            }

            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
            copied += 1;

            if !composition.files.insert(relative.to_path_buf()) {
                tracing::debug!("overriding {}", relative.display());
                composition.overridden.insert(relative.to_path_buf());
            }
        }

        tracing::info!("copied {copied} files from {}", layer.display());
    }

    Ok(composition)
}

/// Copy the base tree, then overlay the variant tree on top of it.
pub fn compose(base: &Path, variant: &Path, dest: &Path) -> Result<Composition> {
    compose_layers(&[base, variant], dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_compose_union_and_override() {
        let base = tempfile::tempdir().unwrap();
        let variant = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();

        write(base.path(), "index.html", "base index");
        write(base.path(), "src/main.js", "base main");
        write(base.path(), "src/lib/util.js", "util");
        write(variant.path(), "src/main.js", "variant main");
        write(variant.path(), "src/lib/manifold.js", "manifold");

        let result = compose(base.path(), variant.path(), dest.path()).unwrap();

        assert_eq!(result.files.len(), 4);
        assert_eq!(
            result.overridden.iter().collect::<Vec<_>>(),
            vec![&PathBuf::from("src/main.js")]
        );
        let read = |rel: &str| std::fs::read_to_string(dest.path().join(rel)).unwrap();
        assert_eq!(read("index.html"), "base index");
        assert_eq!(read("src/main.js"), "variant main");
        assert_eq!(read("src/lib/util.js"), "util");
        assert_eq!(read("src/lib/manifold.js"), "manifold");
    }

    #[test]
    fn test_compose_three_layers_highest_wins() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let c = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();

        write(a.path(), "x.txt", "a");
        write(b.path(), "x.txt", "b");
        write(c.path(), "x.txt", "c");

        compose_layers(&[a.path(), b.path(), c.path()], dest.path()).unwrap();
        assert_eq!(std::fs::read_to_string(dest.path().join("x.txt")).unwrap(), "c");
    }

    #[test]
    fn test_compose_keeps_empty_directories() {
        let base = tempfile::tempdir().unwrap();
        let variant = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();

        std::fs::create_dir_all(base.path().join("public/assets")).unwrap();

        let result = compose(base.path(), variant.path(), dest.path()).unwrap();
        assert!(result.files.is_empty());
        assert!(dest.path().join("public/assets").is_dir());
    }

    #[test]
    fn test_compose_missing_layer() {
        let base = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let missing = base.path().join("nope");

        let err = compose(base.path(), &missing, dest.path()).unwrap_err();
        assert!(matches!(err, GalleryError::Io(_)));
    }
}
