use std::path::Path;
use tracing::info;
use uiforge_common::Result;

use crate::artifact;
use crate::formatter;
use crate::types::{ComponentRecord, MetadataRecord};

/// Positional metadata rows, parallel to the vector index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataStore {
    records: Vec<MetadataRecord>,
}

impl MetadataStore {
    pub fn new(records: Vec<MetadataRecord>) -> Self {
        Self { records }
    }

    /// Metadata for each catalog record, same order
    pub fn from_catalog(catalog: &[ComponentRecord]) -> Self {
        Self::new(catalog.iter().map(formatter::extract_metadata).collect())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Row at ordinal `position`
    pub fn get(&self, position: usize) -> Option<&MetadataRecord> {
        self.records.get(position)
    }

    pub fn records(&self) -> &[MetadataRecord] {
        &self.records
    }

    /// Pretty JSON array, one object per row
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.records)?)
    }

    /// Save to file
    pub async fn save(&self, path: &Path) -> Result<()> {
        artifact::write_file(path, &self.to_json()?).await?;
        info!("Saved metadata ({} rows) to {}", self.len(), path.display());
        Ok(())
    }

    /// Load from file
    pub async fn load(path: &Path) -> Result<Self> {
        let data = artifact::read_file(path).await?;
        let records: Vec<MetadataRecord> = serde_json::from_slice(&data)?;
        info!("Loaded metadata from {} - {} rows", path.display(), records.len());
        Ok(Self::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uiforge_common::UiForgeError;

    fn record(id: &str, name: &str) -> MetadataRecord {
        MetadataRecord {
            component_id: id.to_string(),
            name: name.to_string(),
            category: "UI Components".to_string(),
            description: format!("{} description, with \"quotes\"", name),
            code_snippet: "<div class=\"p-4\">\n  <span>ünïcødé</span>\n</div>".to_string(),
            use_cases: "Forms, dashboards".to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("metadata.json");
        let store = MetadataStore::new(vec![
            record("keep_010", "Accordion"),
            record("keep_007", "Button"),
            record("keep_011", "Alert"),
        ]);

        store.save(&path).await.unwrap();
        let loaded = MetadataStore::load(&path).await.unwrap();

        assert_eq!(loaded, store);
        assert_eq!(loaded.get(1).unwrap().component_id, "keep_007");
        assert!(loaded.get(3).is_none());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let err = MetadataStore::load(&temp.path().join("metadata.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, UiForgeError::MissingArtifact(_)));
    }

    #[tokio::test]
    async fn test_load_invalid_json() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("metadata.json");
        std::fs::write(&path, b"{not json").unwrap();

        let err = MetadataStore::load(&path).await.unwrap_err();
        assert!(matches!(err, UiForgeError::Json(_)));
    }

    #[test]
    fn test_from_catalog_preserves_order() {
        let catalog: Vec<ComponentRecord> = ["b", "a", "c"]
            .iter()
            .map(|id| ComponentRecord {
                component_id: id.to_string(),
                name: id.to_uppercase(),
                category: "Foundation".to_string(),
                description: String::new(),
                code_snippet: String::new(),
                use_cases: String::new(),
            })
            .collect();

        let store = MetadataStore::from_catalog(&catalog);
        let ids: Vec<&str> = store.records().iter().map(|r| r.component_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }
}
