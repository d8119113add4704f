use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uiforge_common::{Result, UiForgeError};

use crate::artifact::ArtifactPaths;
use crate::encoder::Encoder;
use crate::formatter;
use crate::index::FlatIndex;
use crate::metadata::MetadataStore;
use crate::types::{IndexStats, QueryResult};

/// Retrieval service: encode, search, join, score
///
/// Index and metadata are read-only once loaded, so a shared service answers
/// concurrent queries without locking.
pub struct RetrievalService {
    encoder: Arc<dyn Encoder>,
    index: Arc<FlatIndex>,
    metadata: Arc<MetadataStore>,
    skipped: AtomicU64,
    in_sync: bool,
}

impl RetrievalService {
    /// Create from already loaded artifacts
    ///
    /// The encoder must produce vectors of the index's dimension. A row-count
    /// or fingerprint difference between the artifacts is logged, not rejected.
    pub fn new(
        encoder: Arc<dyn Encoder>,
        index: FlatIndex,
        metadata: MetadataStore,
    ) -> Result<Self> {
        if encoder.dimension() != index.dimension() {
            return Err(UiForgeError::DimensionMismatch {
                expected: index.dimension(),
                actual: encoder.dimension(),
            });
        }

        if encoder.model_id() != index.manifest().embedding_model {
            warn!(
                "Index was built with model '{}' but the encoder is '{}'; scores may be meaningless",
                index.manifest().embedding_model,
                encoder.model_id()
            );
        }

        let in_sync = if index.len() != metadata.len() {
            warn!(
                "Data integrity: index has {} rows but metadata has {}; out-of-range results will be skipped",
                index.len(),
                metadata.len()
            );
            false
        } else if formatter::metadata_fingerprint(metadata.records()) != index.manifest().fingerprint {
            warn!(
                "Data integrity: metadata does not match the catalog the index was built from (stale or mixed artifacts); rebuild recommended"
            );
            false
        } else {
            true
        };

        Ok(Self {
            encoder,
            index: Arc::new(index),
            metadata: Arc::new(metadata),
            skipped: AtomicU64::new(0),
            in_sync,
        })
    }

    /// Load both artifacts and create the service
    pub async fn open(paths: &ArtifactPaths, encoder: Arc<dyn Encoder>) -> Result<Self> {
        let index = FlatIndex::load(&paths.index).await?;
        let metadata = MetadataStore::load(&paths.metadata).await?;

        info!(
            "Retrieval service initialized - {} entries, model {}",
            index.len(),
            index.manifest().embedding_model
        );

        Self::new(encoder, index, metadata)
    }

    /// Top-`k` components for a free-text request
    ///
    /// Results are ordered by descending score; fewer than `k` are returned
    /// when the index is smaller or index positions have no metadata row.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<QueryResult>> {
        if query.trim().is_empty() {
            return Err(UiForgeError::invalid_input("Query cannot be empty"));
        }
        if k == 0 {
            return Err(UiForgeError::invalid_input("k must be a positive integer"));
        }

        debug!("Searching for: {} (top_k={})", query, k);

        let embedding = self.encoder.encode_one(query).await?;
        self.retrieve_by_embedding(&embedding, k)
    }

    /// Top-`k` components for a precomputed query embedding
    pub fn retrieve_by_embedding(&self, embedding: &[f32], k: usize) -> Result<Vec<QueryResult>> {
        let neighbors = self.index.search(embedding, k)?;

        let mut results = Vec::with_capacity(neighbors.len());
        for neighbor in neighbors {
            match self.metadata.get(neighbor.position) {
                Some(record) => results.push(QueryResult::new(record.clone(), neighbor.distance)),
                None => {
                    self.skipped.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        "Data integrity: index position {} has no metadata row ({} rows); skipped",
                        neighbor.position,
                        self.metadata.len()
                    );
                }
            }
        }

        debug!("Search completed - {} results", results.len());
        Ok(results)
    }

    /// Results skipped so far because their position had no metadata row
    pub fn skipped_results(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Whether the metadata rows are the ones the index was built from
    pub fn artifacts_in_sync(&self) -> bool {
        self.in_sync
    }

    /// Get index statistics
    pub fn stats(&self) -> IndexStats {
        let manifest = self.index.manifest();
        IndexStats {
            index_rows: self.index.len(),
            metadata_rows: self.metadata.len(),
            dimension: self.index.dimension(),
            embedding_model: manifest.embedding_model.clone(),
            fingerprint: manifest.fingerprint_hex(),
            built_at: manifest.built_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_knowledge_base;
    use crate::index::IndexManifest;
    use crate::test_support::{component, ToyEncoder};
    use crate::types::ComponentRecord;

    fn toy_catalog() -> Vec<ComponentRecord> {
        vec![
            component("keep_001", "Colors"),
            component("keep_002", "Typography"),
            component("keep_003", "Shadow"),
        ]
    }

    fn toy_vectors() -> Vec<Vec<f32>> {
        vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.9, 0.1]]
    }

    fn toy_service() -> RetrievalService {
        let catalog = toy_catalog();
        let encoder = ToyEncoder::new(toy_vectors()).with_query("brand colors", vec![1.0, 0.0]);
        let texts: Vec<String> = catalog.iter().map(formatter::format_record).collect();
        let manifest = IndexManifest::new(
            "toy",
            formatter::catalog_fingerprint(texts.iter().map(String::as_str)),
        );
        let index = FlatIndex::build(&toy_vectors(), manifest).unwrap();
        RetrievalService::new(Arc::new(encoder), index, MetadataStore::from_catalog(&catalog))
            .unwrap()
    }

    #[tokio::test]
    async fn test_retrieve_toy_scenario() {
        let service = toy_service();
        let results = service.retrieve("brand colors", 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].metadata.component_id, "keep_001");
        assert_eq!(results[0].distance, 0.0);
        assert_eq!(results[0].similarity_score, 1.0);
        assert_eq!(results[1].metadata.component_id, "keep_003");
        assert!((results[1].distance - 0.02).abs() < 1e-6);
        assert!((results[1].similarity_score - 0.980).abs() < 1e-3);
    }

    #[test]
    fn test_self_match_for_every_row() {
        let service = toy_service();
        let catalog = toy_catalog();

        for (position, vector) in toy_vectors().iter().enumerate() {
            let results = service.retrieve_by_embedding(vector, 3).unwrap();
            assert_eq!(results[0].metadata.component_id, catalog[position].component_id);
            assert_eq!(results[0].similarity_score, 1.0);
        }
    }

    #[test]
    fn test_k_bound_and_ordering() {
        let service = toy_service();

        for k in 1..=5 {
            let results = service.retrieve_by_embedding(&[0.2, 0.7], k).unwrap();
            assert_eq!(results.len(), k.min(3));
            assert!(results
                .iter()
                .all(|r| r.similarity_score > 0.0 && r.similarity_score <= 1.0));
            assert!(results
                .windows(2)
                .all(|w| w[0].similarity_score >= w[1].similarity_score));
        }
    }

    #[test]
    fn test_missing_metadata_rows_are_skipped_and_counted() {
        let catalog = toy_catalog();
        let index = FlatIndex::build(&toy_vectors(), IndexManifest::new("toy", [0; 32])).unwrap();
        // Only the first two rows have metadata
        let metadata = MetadataStore::from_catalog(&catalog[..2]);
        let service =
            RetrievalService::new(Arc::new(ToyEncoder::new(toy_vectors())), index, metadata)
                .unwrap();

        let results = service.retrieve_by_embedding(&[1.0, 0.0], 3).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].metadata.component_id, "keep_001");
        assert_eq!(results[1].metadata.component_id, "keep_002");
        assert_eq!(service.skipped_results(), 1);
        assert!(!service.artifacts_in_sync());
    }

    #[test]
    fn test_encoder_dimension_must_match_index() {
        let index = FlatIndex::build(&toy_vectors(), IndexManifest::new("toy", [0; 32])).unwrap();
        let encoder = ToyEncoder::new(vec![vec![0.0; 3]]);
        let err = RetrievalService::new(
            Arc::new(encoder),
            index,
            MetadataStore::from_catalog(&toy_catalog()),
        )
        .err()
        .unwrap();
        assert!(matches!(
            err,
            UiForgeError::DimensionMismatch { expected: 2, actual: 3 }
        ));
    }

    #[tokio::test]
    async fn test_rejects_invalid_queries() {
        let service = toy_service();
        assert!(matches!(
            service.retrieve("   ", 3).await.unwrap_err(),
            UiForgeError::InvalidInput(_)
        ));
        assert!(matches!(
            service.retrieve("brand colors", 0).await.unwrap_err(),
            UiForgeError::InvalidInput(_)
        ));
        assert!(matches!(
            service.retrieve_by_embedding(&[1.0], 1).unwrap_err(),
            UiForgeError::DimensionMismatch { .. }
        ));
    }

    #[tokio::test]
    async fn test_open_after_build_preserves_correspondence() {
        let temp = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(
            temp.path().join("index.bin"),
            temp.path().join("metadata.json"),
        );
        let catalog = toy_catalog();
        let encoder = Arc::new(ToyEncoder::new(toy_vectors()).with_query("heading sizes", vec![0.0, 1.0]));

        build_knowledge_base(&catalog, encoder.as_ref(), &paths).await.unwrap();
        let service = RetrievalService::open(&paths, encoder.clone()).await.unwrap();

        let results = service.retrieve("heading sizes", 1).await.unwrap();
        assert_eq!(results[0].metadata.name, "Typography");
        assert_eq!(results[0].metadata.code_snippet, "<div>Typography</div>");

        let stats = service.stats();
        assert_eq!(stats.index_rows, 3);
        assert_eq!(stats.metadata_rows, 3);
        assert_eq!(stats.dimension, 2);
        assert_eq!(stats.embedding_model, "toy");
        // One batch for the build, one for the query
        assert_eq!(encoder.calls(), 2);
    }

    #[tokio::test]
    async fn test_open_with_stale_metadata_warns_but_serves() {
        let temp = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(
            temp.path().join("index.bin"),
            temp.path().join("metadata.json"),
        );
        let encoder = Arc::new(ToyEncoder::new(toy_vectors()));
        build_knowledge_base(&toy_catalog(), encoder.as_ref(), &paths).await.unwrap();

        let fresh = RetrievalService::open(&paths, encoder.clone()).await.unwrap();
        assert!(fresh.artifacts_in_sync());

        // Same row count, different catalog: only the fingerprint can tell
        let replaced = vec![
            component("keep_101", "Buttons"),
            component("keep_102", "Badges"),
            component("keep_103", "Tabs"),
        ];
        MetadataStore::from_catalog(&replaced)
            .save(&paths.metadata)
            .await
            .unwrap();

        let service = RetrievalService::open(&paths, encoder).await.unwrap();
        assert!(!service.artifacts_in_sync());

        let stats = service.stats();
        assert_eq!(stats.index_rows, stats.metadata_rows);
        assert_ne!(
            stats.fingerprint,
            hex::encode(formatter::metadata_fingerprint(
                MetadataStore::from_catalog(&replaced).records()
            ))
        );

        let results = service.retrieve_by_embedding(&[0.0, 1.0], 1).unwrap();
        assert_eq!(results[0].metadata.component_id, "keep_102");
        assert_eq!(service.skipped_results(), 0);
    }

    #[tokio::test]
    async fn test_open_missing_artifacts() {
        let temp = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(
            temp.path().join("index.bin"),
            temp.path().join("metadata.json"),
        );
        let err = RetrievalService::open(&paths, Arc::new(ToyEncoder::new(toy_vectors())))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, UiForgeError::MissingArtifact(_)));
    }

    #[tokio::test]
    async fn test_concurrent_readers() {
        let service = Arc::new(toy_service());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.retrieve("brand colors", 3).await })
            })
            .collect();

        for handle in handles {
            let results = handle.await.unwrap().unwrap();
            assert_eq!(results[0].metadata.component_id, "keep_001");
        }
    }
}
