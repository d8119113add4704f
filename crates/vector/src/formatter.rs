//! Encoder input text for catalog records
//!
//! The template fixes what every stored vector means. Changing it invalidates
//! persisted indexes, so it is versioned and folded into the catalog fingerprint.

use sha2::{Digest, Sha256};

use crate::types::{ComponentRecord, MetadataRecord};

/// Bumped whenever `format_record` output changes
pub const TEMPLATE_VERSION: u32 = 1;

/// `"{name} - {category}. {description}. Use cases: {use_cases}"`
pub fn format_record(record: &ComponentRecord) -> String {
    format_fields(&record.name, &record.category, &record.description, &record.use_cases)
}

/// Same text for a stored metadata row
pub fn format_metadata(record: &MetadataRecord) -> String {
    format_fields(&record.name, &record.category, &record.description, &record.use_cases)
}

fn format_fields(name: &str, category: &str, description: &str, use_cases: &str) -> String {
    format!("{} - {}. {}. Use cases: {}", name, category, description, use_cases)
}

/// Metadata payload retained for a record
pub fn extract_metadata(record: &ComponentRecord) -> MetadataRecord {
    MetadataRecord::from(record)
}

/// SHA-256 over the template version and every formatted text, in order
pub fn catalog_fingerprint<'a, I>(texts: I) -> [u8; 32]
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = Sha256::new();
    hasher.update(TEMPLATE_VERSION.to_le_bytes());
    for text in texts {
        // Length prefix keeps ["ab", "c"] and ["a", "bc"] apart
        hasher.update((text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
    }
    hasher.finalize().into()
}

/// Fingerprint of a stored metadata sequence
pub fn metadata_fingerprint(records: &[MetadataRecord]) -> [u8; 32] {
    let texts: Vec<String> = records.iter().map(format_metadata).collect();
    catalog_fingerprint(texts.iter().map(String::as_str))
}
