//! Template language for parametrized project files.
//!
//! Files ending in `.ejs` are parsed by [`syntax`] into a small node tree and
//! evaluated by [`renderer::TemplateRenderer`] against a [`Params`] set. Only
//! the subset of EJS the gallery templates use is supported: interpolation
//! and `if` / `else if` / `else` blocks over parameter names.
//!
//! ## Template variables
//!
//! - `<%= name %>`: project name (also `projectName`)
//! - `<%= domain %>`: ArNS domain (also `ARNS_NAME`)
//! - `includeManifold`, `includeMetaplex`, ...: one flag per variant
//! - `NFT_CONTRACT_ADDRESS`, `RPC_ENDPOINT`: free-form answers
//!
//! [`Params`]: crate::params::Params

pub mod renderer;
pub mod syntax;

pub use renderer::TemplateRenderer;
pub use syntax::TemplateError;
