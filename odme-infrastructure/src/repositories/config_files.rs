use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use tokio::fs;

use odme_domain::ports::ScoringConfigRepository;
use odme_domain::ScoringTable;

use crate::config::validate_scoring_table;

/// Reads the scoring table from a YAML file.
pub struct ScoringTableFileRepository;

impl ScoringTableFileRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ScoringTableFileRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScoringConfigRepository for ScoringTableFileRepository {
    /// A missing file yields the built-in table; an unreadable, malformed or
    /// invalid one is an error. Validation runs before the verbal table is
    /// lowercased.
    async fn load_scoring_table(&self, path: &str) -> anyhow::Result<ScoringTable> {
        if !Path::new(path).exists() {
            return Ok(ScoringTable::default());
        }
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read scoring table {}", path))?;
        let table: ScoringTable = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse scoring table {}", path))?;
        validate_scoring_table(&table)
            .with_context(|| format!("invalid scoring table {}", path))?;
        Ok(table.normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_yields_default_table() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scoring.yaml");
        let table = ScoringTableFileRepository::new()
            .load_scoring_table(&path.to_string_lossy())
            .await
            .expect("load");
        assert_eq!(table, ScoringTable::default());
    }

    #[tokio::test]
    async fn file_overrides_and_lowercases_verbal_table() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scoring.yaml");
        std::fs::write(
            &path,
            "default_base: 5\n\
category_base:\n  Bazilišek: 90\n\
numeric_keys: [agresivita]\n\
verbal_keys: [agresivita_odhad]\n\
verbal_adjustments:\n  EXTRÉMNÍ: 40\n",
        )
        .expect("write");

        let table = ScoringTableFileRepository::new()
            .load_scoring_table(&path.to_string_lossy())
            .await
            .expect("load");

        assert_eq!(table.base_score("Bazilišek"), 90);
        assert_eq!(table.base_score("Elementál"), 5);
        assert_eq!(table.numeric_weight, 2);
        assert_eq!(table.verbal_adjustments.get("extrémní"), Some(&40));
    }

    #[tokio::test]
    async fn case_colliding_verbal_words_are_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scoring.yaml");
        std::fs::write(&path, "verbal_adjustments:\n  HIGH: 20\n  high: 30\n").expect("write");

        let err = ScoringTableFileRepository::new()
            .load_scoring_table(&path.to_string_lossy())
            .await
            .expect_err("duplicate words");
        assert!(format!("{:#}", err).contains("more than once"));
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scoring.yaml");
        std::fs::write(&path, "category_base: [not, a, map]\n").expect("write");

        let result = ScoringTableFileRepository::new()
            .load_scoring_table(&path.to_string_lossy())
            .await;
        assert!(result.is_err());
    }
}
