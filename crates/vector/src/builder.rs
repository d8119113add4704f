use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::info;
use uiforge_common::{Result, UiForgeError};

use crate::artifact::{self, ArtifactPaths};
use crate::encoder::Encoder;
use crate::formatter;
use crate::index::{FlatIndex, IndexManifest};
use crate::metadata::MetadataStore;
use crate::types::{ComponentRecord, Embedding};

/// Outcome of a knowledge-base build
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub records: usize,
    pub dimension: usize,
    pub embedding_model: String,
    pub fingerprint: String,
    pub elapsed: Duration,
}

/// Pair embeddings with catalog rows
///
/// Position `i` of the index and of the store describe the same record, so the
/// two sequences must have equal length.
pub fn assemble(
    catalog: &[ComponentRecord],
    embeddings: &[Embedding],
    manifest: IndexManifest,
) -> Result<(FlatIndex, MetadataStore)> {
    if embeddings.len() != catalog.len() {
        return Err(UiForgeError::ArtifactMismatch {
            index_rows: embeddings.len(),
            metadata_rows: catalog.len(),
        });
    }

    let index = FlatIndex::build(embeddings, manifest)?;
    let metadata = MetadataStore::from_catalog(catalog);
    Ok((index, metadata))
}

/// Reject an empty catalog or duplicate component IDs
pub fn validate_catalog(catalog: &[ComponentRecord]) -> Result<()> {
    if catalog.is_empty() {
        return Err(UiForgeError::invalid_input("Catalog is empty"));
    }

    let mut seen = HashSet::with_capacity(catalog.len());
    for record in catalog {
        if !seen.insert(record.component_id.as_str()) {
            return Err(UiForgeError::invalid_input(format!(
                "Duplicate component_id: {}",
                record.component_id
            )));
        }
    }

    Ok(())
}

/// Encode the catalog and replace both persisted artifacts
///
/// Encoding finishes before the index is built. Both files are fully written
/// to temporary siblings before either target is replaced. A failed swap
/// restores the previous metadata, so the pair on disk keeps matching row
/// counts.
pub async fn build_knowledge_base(
    catalog: &[ComponentRecord],
    encoder: &dyn Encoder,
    paths: &ArtifactPaths,
) -> Result<BuildReport> {
    let started = Instant::now();
    validate_catalog(catalog)?;

    let texts: Vec<String> = catalog.iter().map(formatter::format_record).collect();
    let fingerprint = formatter::catalog_fingerprint(texts.iter().map(String::as_str));

    info!(
        "Creating embeddings for {} components with {}",
        texts.len(),
        encoder.model_id()
    );
    let embeddings = encoder.encode(&texts).await?;

    if let Some(first) = embeddings.first() {
        if first.len() != encoder.dimension() {
            return Err(UiForgeError::DimensionMismatch {
                expected: encoder.dimension(),
                actual: first.len(),
            });
        }
    }

    let manifest = IndexManifest::new(encoder.model_id(), fingerprint);
    let (index, metadata) = assemble(catalog, &embeddings, manifest)?;

    let index_bytes = index.to_bytes()?;
    let staged_metadata = artifact::stage_file(&paths.metadata, &metadata.to_json()?).await?;
    let staged_index = match artifact::stage_file(&paths.index, &index_bytes).await {
        Ok(path) => path,
        Err(e) => {
            artifact::discard(&staged_metadata).await;
            artifact::discard(&artifact::temp_path(&paths.index)).await;
            return Err(e);
        }
    };

    artifact::commit_pair(paths, &staged_metadata, &staged_index).await?;

    let report = BuildReport {
        records: index.len(),
        dimension: index.dimension(),
        embedding_model: encoder.model_id().to_string(),
        fingerprint: index.manifest().fingerprint_hex(),
        elapsed: started.elapsed(),
    };

    info!(
        "Vector database built: {} rows x {} dims -> {}, {} ({:?})",
        report.records,
        report.dimension,
        paths.index.display(),
        paths.metadata.display(),
        report.elapsed
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{component, ToyEncoder};

    #[test]
    fn test_validate_catalog() {
        assert!(matches!(
            validate_catalog(&[]).unwrap_err(),
            UiForgeError::InvalidInput(_)
        ));

        let catalog = vec![component("keep_001", "Colors"), component("keep_001", "Typography")];
        assert!(matches!(
            validate_catalog(&catalog).unwrap_err(),
            UiForgeError::InvalidInput(_)
        ));

        let catalog = vec![component("keep_001", "Colors"), component("keep_002", "Typography")];
        assert!(validate_catalog(&catalog).is_ok());
    }

    #[test]
    fn test_assemble_rejects_length_mismatch() {
        let catalog = vec![component("a", "A"), component("b", "B")];
        let err = assemble(&catalog, &[vec![1.0, 0.0]], IndexManifest::new("m", [0; 32]))
            .unwrap_err();
        assert!(matches!(
            err,
            UiForgeError::ArtifactMismatch { index_rows: 1, metadata_rows: 2 }
        ));
    }

    #[tokio::test]
    async fn test_build_writes_both_artifacts() {
        let temp = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(
            temp.path().join("embeddings/index.bin"),
            temp.path().join("embeddings/metadata.json"),
        );
        let catalog = vec![
            component("keep_001", "Colors"),
            component("keep_002", "Typography"),
            component("keep_003", "Shadow"),
        ];
        let encoder = ToyEncoder::new(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.9, 0.1]]);

        let report = build_knowledge_base(&catalog, &encoder, &paths).await.unwrap();

        assert_eq!(report.records, 3);
        assert_eq!(report.dimension, 2);
        assert_eq!(report.embedding_model, "toy");
        assert_eq!(report.fingerprint.len(), 64);
        assert!(paths.exist());
        assert!(!artifact::temp_path(&paths.index).exists());
        assert!(!artifact::temp_path(&paths.metadata).exists());

        let index = FlatIndex::load(&paths.index).await.unwrap();
        let metadata = MetadataStore::load(&paths.metadata).await.unwrap();
        assert_eq!(index.len(), metadata.len());
        assert_eq!(metadata.get(2).unwrap().name, "Shadow");
        assert_eq!(index.vector(2).unwrap().to_vec(), vec![0.9, 0.1]);
        assert_eq!(
            index.manifest().fingerprint,
            formatter::metadata_fingerprint(metadata.records())
        );
    }

    #[tokio::test]
    async fn test_failed_encode_leaves_previous_artifacts() {
        let temp = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(
            temp.path().join("index.bin"),
            temp.path().join("metadata.json"),
        );
        let catalog = vec![component("a", "A"), component("b", "B")];
        let good = ToyEncoder::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        build_knowledge_base(&catalog, &good, &paths).await.unwrap();
        let before = std::fs::read(&paths.index).unwrap();

        // Returns one vector for two records
        let short = ToyEncoder::new(vec![vec![1.0, 0.0]]).truncating();
        let err = build_knowledge_base(&catalog, &short, &paths).await.unwrap_err();

        assert!(matches!(err, UiForgeError::ArtifactMismatch { .. }));
        assert_eq!(std::fs::read(&paths.index).unwrap(), before);
        assert_eq!(MetadataStore::load(&paths.metadata).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_index_swap_keeps_previous_metadata() {
        let temp = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(
            temp.path().join("index.bin"),
            temp.path().join("metadata.json"),
        );
        let previous = MetadataStore::from_catalog(&[component("a", "A")]);
        previous.save(&paths.metadata).await.unwrap();
        // Index target is a non-empty directory, so its rename fails
        std::fs::create_dir_all(paths.index.join("occupied")).unwrap();

        let catalog = vec![component("a", "A"), component("b", "B")];
        let encoder = ToyEncoder::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert!(build_knowledge_base(&catalog, &encoder, &paths).await.is_err());

        assert_eq!(MetadataStore::load(&paths.metadata).await.unwrap(), previous);
        assert!(!artifact::temp_path(&paths.index).exists());
        assert!(!artifact::temp_path(&paths.metadata).exists());
        assert!(!artifact::backup_path(&paths.metadata).exists());
    }
}
