//! CLI command implementations for create-nft-gallery.

pub mod create;
pub mod prompts;
