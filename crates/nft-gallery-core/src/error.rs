//! Unified error types for the create-nft-gallery toolkit.

use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur while scaffolding a gallery project.
#[derive(Error, Debug)]
pub enum GalleryError {
    // --- Configuration ---

    /// The answers file passed with `--answers` was not found.
    #[error("config file not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The answers file exists but contains invalid JSON.
    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The project name cannot be used as a directory name.
    #[error("invalid project name '{0}': must be a single, non-empty path component")]
    InvalidProjectName(String),

    // --- Template store ---

    /// The template store root (or its `base/` tree) does not exist.
    #[error("template store not found at {0}")]
    TemplateStoreNotFound(PathBuf),

    /// The requested variant has no tree under `templates/variants/`.
    #[error("unknown variant: {name} (available: {available})")]
    TemplateNotFound { name: String, available: String },

    /// Two variant directories map to the same `include<Variant>` flag.
    #[error("variants '{first}' and '{second}' both map to template flag {flag}")]
    VariantCollision {
        first: String,
        second: String,
        flag: String,
    },

    // --- Manifest ---

    /// A `package.json.ejs` template is not a valid JSON object.
    #[error("failed to parse manifest at {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    // --- Rendering ---

    /// A template expression could not be parsed or evaluated.
    #[error("template rendering failed for {path}: {message}")]
    Render { path: PathBuf, message: String },

    // --- Bootstrap ---

    /// A required external tool (`npm`, `git`) is not installed.
    #[error("required tool '{name}' not found (install: {install})")]
    MissingTool { name: String, install: String },

    /// An external command exited unsuccessfully.
    #[error("`{command}` failed: {message}")]
    Subprocess { command: String, message: String },

    // --- Project ---

    /// The destination directory already exists and is not empty.
    #[error("project directory already exists and is not empty: {0}")]
    ProjectExists(PathBuf),

    // --- General ---

    /// A filesystem I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Alias for `Result<T, GalleryError>`.
pub type Result<T> = std::result::Result<T, GalleryError>;
