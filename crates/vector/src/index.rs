//! Exact nearest-neighbour index over squared Euclidean distance
//!
//! Rows are stored in insertion order in an `n x d` matrix; a query scans every
//! row (O(n·d)). Catalogs are small, so exactness wins over speed here.
//!
//! # File format
//!
//! A bincode (standard configuration) encoding of:
//!
//! ```text
//! magic "UIFXIDX1" | version | dimension | rows | model id
//! [u8; 32] fingerprint | built_at (ms) | rows * dimension f32
//! ```
//!
//! The magic is a fixed array, so it is always the first eight bytes.

use bincode::{config, Decode, Encode};
use chrono::{DateTime, TimeZone, Utc};
use ndarray::{Array2, ArrayView1, Axis};
use std::path::Path;
use tracing::{debug, info};
use uiforge_common::{Result, UiForgeError};

use crate::artifact;
use crate::types::Embedding;

/// File signature
pub const INDEX_MAGIC: &[u8; 8] = b"UIFXIDX1";

/// Current file format version
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Build provenance stored in the index header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexManifest {
    /// Encoder model the vectors came from
    pub embedding_model: String,

    /// Catalog fingerprint
    pub fingerprint: [u8; 32],

    /// Build time (millisecond precision)
    pub built_at: DateTime<Utc>,
}

impl IndexManifest {
    /// Manifest stamped with the current time
    pub fn new(embedding_model: impl Into<String>, fingerprint: [u8; 32]) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            embedding_model: embedding_model.into(),
            fingerprint,
            built_at: Utc.timestamp_millis_opt(now).single().unwrap_or_else(Utc::now),
        }
    }

    /// Fingerprint as lowercase hex
    pub fn fingerprint_hex(&self) -> String {
        hex::encode(self.fingerprint)
    }
}

/// One search hit: row position and squared L2 distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Flat (brute-force) vector index
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    vectors: Array2<f32>,
    manifest: IndexManifest,
}

impl FlatIndex {
    /// Build from embeddings in catalog order
    ///
    /// Fails on an empty sequence or inconsistent dimensions.
    pub fn build(embeddings: &[Embedding], manifest: IndexManifest) -> Result<Self> {
        let first = embeddings
            .first()
            .ok_or_else(|| UiForgeError::index("Cannot build an index from zero embeddings"))?;

        let dimension = first.len();
        if dimension == 0 {
            return Err(UiForgeError::index("Embeddings must have at least one dimension"));
        }

        let mut data = Vec::with_capacity(embeddings.len() * dimension);
        for embedding in embeddings {
            if embedding.len() != dimension {
                return Err(UiForgeError::DimensionMismatch {
                    expected: dimension,
                    actual: embedding.len(),
                });
            }
            data.extend_from_slice(embedding);
        }

        let vectors = Array2::from_shape_vec((embeddings.len(), dimension), data)
            .map_err(|e| UiForgeError::index(format!("Failed to shape index matrix: {}", e)))?;

        debug!("Built flat index: {} rows x {} dims", embeddings.len(), dimension);
        Ok(Self { vectors, manifest })
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        self.vectors.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embedding dimension
    pub fn dimension(&self) -> usize {
        self.vectors.ncols()
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    /// Stored vector at `position`
    pub fn vector(&self, position: usize) -> Option<ArrayView1<'_, f32>> {
        (position < self.len()).then(|| self.vectors.row(position))
    }

    /// `min(k, len)` nearest rows, ascending by distance, ties by position
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 {
            return Err(UiForgeError::invalid_input("k must be a positive integer"));
        }

        if query.len() != self.dimension() {
            return Err(UiForgeError::DimensionMismatch {
                expected: self.dimension(),
                actual: query.len(),
            });
        }

        let query = ArrayView1::from(query);
        let mut diff = &self.vectors - &query;
        diff.mapv_inplace(|x| x * x);
        let distances = diff.sum_axis(Axis(1));

        let mut neighbors: Vec<Neighbor> = distances
            .iter()
            .enumerate()
            .map(|(position, &distance)| Neighbor { position, distance })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        neighbors.truncate(k);

        Ok(neighbors)
    }

    /// Write the index to `path` (via a temporary sibling file)
    pub async fn persist(&self, path: &Path) -> Result<()> {
        artifact::write_file(path, &self.to_bytes()?).await?;
        info!("Saved vector index ({} rows) to {}", self.len(), path.display());
        Ok(())
    }

    /// Read an index written by `persist`
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = artifact::read_file(path).await?;
        let index = Self::from_bytes(&bytes)
            .map_err(|e| UiForgeError::index(format!("{}: {}", path.display(), e)))?;
        info!(
            "Loaded vector index from {} - {} rows x {} dims",
            path.display(),
            index.len(),
            index.dimension()
        );
        Ok(index)
    }

    /// Serialize to the on-disk format
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let file = IndexFile {
            magic: *INDEX_MAGIC,
            version: INDEX_FORMAT_VERSION,
            dimension: self.dimension() as u32,
            rows: self.len() as u64,
            embedding_model: self.manifest.embedding_model.clone(),
            fingerprint: self.manifest.fingerprint,
            built_at_ms: self.manifest.built_at.timestamp_millis(),
            data: self.vectors.iter().copied().collect(),
        };

        bincode::encode_to_vec(&file, config::standard())
            .map_err(|e| UiForgeError::serialization(format!("Failed to encode index: {}", e)))
    }

    /// Parse the on-disk format
    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, String> {
        // Checked before decoding so foreign files never reach the length prefixes
        if !bytes.starts_with(INDEX_MAGIC) {
            return Err("not a vector index file (bad magic)".to_string());
        }

        let (file, consumed): (IndexFile, usize) =
            bincode::decode_from_slice(bytes, config::standard())
                .map_err(|e| format!("corrupt index file: {}", e))?;

        if consumed != bytes.len() {
            return Err(format!(
                "{} trailing bytes after index data",
                bytes.len() - consumed
            ));
        }

        if file.version != INDEX_FORMAT_VERSION {
            return Err(format!("unsupported index format version {}", file.version));
        }

        let dimension = file.dimension as usize;
        let rows = usize::try_from(file.rows)
            .map_err(|_| "row count does not fit in memory".to_string())?;

        if rows == 0 || dimension == 0 {
            return Err(format!("empty index ({} rows x {} dims)", rows, dimension));
        }

        if rows.checked_mul(dimension) != Some(file.data.len()) {
            return Err(format!(
                "header declares {} rows x {} dims but file holds {} values",
                rows,
                dimension,
                file.data.len()
            ));
        }

        let built_at = Utc
            .timestamp_millis_opt(file.built_at_ms)
            .single()
            .ok_or_else(|| format!("invalid build timestamp {}", file.built_at_ms))?;

        let vectors =
            Array2::from_shape_vec((rows, dimension), file.data).map_err(|e| e.to_string())?;

        Ok(Self {
            vectors,
            manifest: IndexManifest {
                embedding_model: file.embedding_model,
                fingerprint: file.fingerprint,
                built_at,
            },
        })
    }
}

/// On-disk layout of an index file
#[derive(Encode, Decode)]
struct IndexFile {
    magic: [u8; 8],
    version: u32,
    dimension: u32,
    rows: u64,
    embedding_model: String,
    fingerprint: [u8; 32],
    built_at_ms: i64,
    data: Vec<f32>,
}
