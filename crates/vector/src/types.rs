use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dense embedding vector
pub type Embedding = Vec<f32>;

/// Catalog entry describing one UI component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Unique component ID (e.g., "keep_007")
    pub component_id: String,

    /// Display name
    pub name: String,

    /// Category (e.g., "Foundation", "UI Components")
    pub category: String,

    /// Free-text description
    pub description: String,

    /// HTML snippet
    pub code_snippet: String,

    /// Comma-separated use cases
    pub use_cases: String,
}

/// Per-row metadata stored alongside the vector at the same position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub component_id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub code_snippet: String,
    pub use_cases: String,
}

impl From<&ComponentRecord> for MetadataRecord {
    fn from(record: &ComponentRecord) -> Self {
        Self {
            component_id: record.component_id.clone(),
            name: record.name.clone(),
            category: record.category.clone(),
            description: record.description.clone(),
            code_snippet: record.code_snippet.clone(),
            use_cases: record.use_cases.clone(),
        }
    }
}

/// Search result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Matched component
    #[serde(flatten)]
    pub metadata: MetadataRecord,

    /// Squared Euclidean distance to the query
    pub distance: f32,

    /// `1 / (1 + distance)`, in (0.0, 1.0]
    pub similarity_score: f32,
}

impl QueryResult {
    pub fn new(metadata: MetadataRecord, distance: f32) -> Self {
        Self {
            metadata,
            distance,
            similarity_score: similarity_score(distance),
        }
    }
}

/// Map a squared L2 distance to a score; 1.0 only at zero distance
///
/// Never reaches 0.0: distances that overflow `f32` still score
/// `f32::MIN_POSITIVE`.
pub fn similarity_score(distance: f32) -> f32 {
    let score = 1.0 / (1.0 + f64::from(distance));
    (score as f32).max(f32::MIN_POSITIVE)
}

/// Loaded knowledge base statistics
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    /// Rows in the vector index
    pub index_rows: usize,

    /// Rows in the metadata store
    pub metadata_rows: usize,

    /// Embedding dimension
    pub dimension: usize,

    /// Encoder model the index was built with
    pub embedding_model: String,

    /// Catalog fingerprint (hex SHA-256)
    pub fingerprint: String,

    /// Build time
    pub built_at: DateTime<Utc>,
}
