//! Core library for the create-nft-gallery scaffolder.
//!
//! Builds a new gallery project from an on-disk template store in four steps:
//! [`compose`] the base and variant trees, merge their [`manifest`] fragments,
//! write the [`env_file`], and render every parametrized file with the
//! [`templates`] interpreter. [`scaffold::scaffold`] runs the whole pipeline;
//! [`bootstrap`] finishes the project with `npm install` and `git init`.

pub mod bootstrap;
pub mod compose;
pub mod config;
pub mod env_file;
pub mod error;
pub mod manifest;
pub mod params;
pub mod scaffold;
pub mod store;
pub mod templates;
