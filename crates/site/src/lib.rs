//! UIForge site assembly
//!
//! Component catalog snapshot and the HTML page generator that turns
//! retrieved components into a single-file website.

pub mod catalog;
pub mod generator;

pub use catalog::{builtin_catalog, ensure_catalog, load_catalog, save_catalog};
pub use generator::{render_page, write_page, SiteKind, OUTPUT_FILE_NAME};
