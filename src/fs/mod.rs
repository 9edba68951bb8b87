//! Filesystem module.
//!
//! Provides:
//! - Download folder layout
//! - Filename sanitizing

pub mod naming;
pub mod paths;

pub use naming::{sanitize_filename, sanitize_path_component};
pub use paths::{account_folder, artwork_folder};
