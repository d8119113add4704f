//! UIForge vector knowledge base
//!
//! Component records are formatted to text, encoded to embeddings and stored
//! in a flat L2 index alongside a position-aligned metadata store. The
//! retrieval service answers free-text requests with the nearest components.

pub mod artifact;
pub mod builder;
pub mod encoder;
pub mod engine;
pub mod formatter;
pub mod index;
pub mod metadata;
pub mod types;

#[cfg(test)]
mod test_support;

pub use artifact::ArtifactPaths;
pub use builder::{build_knowledge_base, BuildReport};
pub use encoder::{encoder_from_config, Encoder};
pub use engine::RetrievalService;
pub use formatter::{extract_metadata, format_record};
pub use index::{FlatIndex, IndexManifest, Neighbor};
pub use metadata::MetadataStore;
pub use types::{similarity_score, ComponentRecord, Embedding, IndexStats, MetadataRecord, QueryResult};
