//! Component catalog snapshot
//!
//! The Keep Design component set ships inside the binary; a JSON snapshot on
//! disk is what the knowledge-base build actually reads, so it can be edited
//! or replaced without recompiling.

use std::collections::HashSet;
use std::path::Path;
use tracing::info;
use uiforge_common::{Result, UiForgeError};
use uiforge_vector::ComponentRecord;

const BUILTIN_CATALOG_JSON: &str = include_str!("../data/components.json");

/// Built-in Keep Design components (`keep_001`..`keep_049`)
pub fn builtin_catalog() -> Result<Vec<ComponentRecord>> {
    parse_catalog(BUILTIN_CATALOG_JSON.as_bytes(), "built-in catalog")
}

/// Load a catalog snapshot
pub async fn load_catalog(path: &Path) -> Result<Vec<ComponentRecord>> {
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(UiForgeError::catalog(format!(
                "Catalog not found: {}",
                path.display()
            )))
        }
        Err(e) => return Err(e.into()),
    };

    let records = parse_catalog(&data, &path.display().to_string())?;
    info!("Loaded {} components from {}", records.len(), path.display());
    Ok(records)
}

/// Write a catalog snapshot as pretty JSON
pub async fn save_catalog(records: &[ComponentRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, serde_json::to_vec_pretty(records)?).await?;
    info!("Saved {} components to {}", records.len(), path.display());
    Ok(())
}

/// Use the snapshot at `path`, writing the built-in catalog there first if absent
pub async fn ensure_catalog(path: &Path) -> Result<Vec<ComponentRecord>> {
    if tokio::fs::try_exists(path).await? {
        return load_catalog(path).await;
    }

    info!("No catalog at {}, writing built-in components", path.display());
    let records = builtin_catalog()?;
    save_catalog(&records, path).await?;
    Ok(records)
}

fn parse_catalog(data: &[u8], source: &str) -> Result<Vec<ComponentRecord>> {
    let records: Vec<ComponentRecord> = serde_json::from_slice(data)
        .map_err(|e| UiForgeError::catalog(format!("Invalid catalog in {}: {}", source, e)))?;

    let mut seen = HashSet::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        if record.component_id.trim().is_empty() {
            return Err(UiForgeError::catalog(format!(
                "Component at position {} in {} has an empty component_id",
                position, source
            )));
        }
        if record.name.trim().is_empty() {
            return Err(UiForgeError::catalog(format!(
                "Component {} in {} has an empty name",
                record.component_id, source
            )));
        }
        if !seen.insert(record.component_id.as_str()) {
            return Err(UiForgeError::catalog(format!(
                "Duplicate component_id {} in {}",
                record.component_id, source
            )));
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sha2::{Digest, Sha256};
    use std::sync::Arc;
    use uiforge_vector::{
        build_knowledge_base, format_record, ArtifactPaths, Embedding, Encoder, RetrievalService,
    };

    /// Same text, same vector; unrelated texts land far apart
    struct HashingEncoder;

    #[async_trait]
    impl Encoder for HashingEncoder {
        async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
            Ok(texts
                .iter()
                .map(|text| {
                    Sha256::digest(text.as_bytes())
                        .iter()
                        .take(8)
                        .map(|b| *b as f32 / 255.0)
                        .collect()
                })
                .collect())
        }

        fn model_id(&self) -> &str {
            "sha256-8"
        }

        fn dimension(&self) -> usize {
            8
        }
    }

    #[tokio::test]
    async fn test_retrieval_over_builtin_catalog() {
        let temp = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(
            temp.path().join("components_index.bin"),
            temp.path().join("metadata.json"),
        );
        let catalog = builtin_catalog().unwrap();

        let report = build_knowledge_base(&catalog, &HashingEncoder, &paths)
            .await
            .unwrap();
        assert_eq!(report.records, 49);

        let service = RetrievalService::open(&paths, Arc::new(HashingEncoder))
            .await
            .unwrap();

        let results = service.retrieve("qwxz plorf zzzz", 5).await.unwrap();
        assert_eq!(results.len(), 5);
        assert!(results
            .windows(2)
            .all(|w| w[0].similarity_score >= w[1].similarity_score));

        let exact = format_record(&catalog[10]);
        let results = service.retrieve(&exact, 1).await.unwrap();
        assert_eq!(results[0].metadata.component_id, catalog[10].component_id);
        assert_eq!(results[0].similarity_score, 1.0);
        assert_eq!(service.skipped_results(), 0);
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = builtin_catalog().unwrap();
        assert_eq!(catalog.len(), 49);
        assert_eq!(catalog[0].component_id, "keep_001");
        assert_eq!(catalog[0].name, "Colors");
        assert_eq!(catalog[48].component_id, "keep_049");

        for category in ["Foundation", "UI Components", "Dashboard"] {
            assert!(catalog.iter().any(|c| c.category == category));
        }
        assert!(catalog.iter().all(|c| !c.code_snippet.is_empty()));
    }

    #[tokio::test]
    async fn test_ensure_catalog_writes_then_reads_snapshot() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("processed/components.json");

        let written = ensure_catalog(&path).await.unwrap();
        assert!(path.exists());

        // An edited snapshot wins over the built-in set
        save_catalog(&written[..3], &path).await.unwrap();
        let loaded = ensure_catalog(&path).await.unwrap();
        assert_eq!(loaded, written[..3].to_vec());
    }

    #[tokio::test]
    async fn test_load_rejects_duplicates_and_empty_ids() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("components.json");
        let mut records = builtin_catalog().unwrap();
        records.truncate(2);

        records[1].component_id = records[0].component_id.clone();
        save_catalog(&records, &path).await.unwrap();
        assert!(matches!(
            load_catalog(&path).await.unwrap_err(),
            UiForgeError::Catalog(_)
        ));

        records[1].component_id = "  ".to_string();
        save_catalog(&records, &path).await.unwrap();
        assert!(matches!(
            load_catalog(&path).await.unwrap_err(),
            UiForgeError::Catalog(_)
        ));
    }

    #[tokio::test]
    async fn test_load_errors() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("components.json");
        assert!(matches!(
            load_catalog(&path).await.unwrap_err(),
            UiForgeError::Catalog(_)
        ));

        // Missing use_cases field
        std::fs::write(&path, r#"[{"component_id":"x","name":"X","category":"c","description":"d","code_snippet":"s"}]"#).unwrap();
        assert!(matches!(
            load_catalog(&path).await.unwrap_err(),
            UiForgeError::Catalog(_)
        ));
    }
}
