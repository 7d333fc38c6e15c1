use std::collections::HashSet;

use anyhow::{anyhow, Result};

use odme_domain::ScoringTable;

pub fn validate_scoring_table(table: &ScoringTable) -> Result<()> {
    if table.numeric_keys.is_empty() {
        return Err(anyhow!("numeric_keys must not be empty"));
    }
    if table.verbal_keys.is_empty() {
        return Err(anyhow!("verbal_keys must not be empty"));
    }
    for key in table.numeric_keys.iter().chain(table.verbal_keys.iter()) {
        if key.trim().is_empty() {
            return Err(anyhow!("scoring attribute keys must not be empty"));
        }
    }
    if table.verbal_adjustments.keys().any(|word| word.trim().is_empty()) {
        return Err(anyhow!("verbal adjustment words must not be empty"));
    }
    // Lookups are case-insensitive, so words equal after lowercasing collide.
    let mut words = HashSet::new();
    let mut raw_words: Vec<&String> = table.verbal_adjustments.keys().collect();
    raw_words.sort();
    for word in raw_words {
        if !words.insert(word.trim().to_lowercase()) {
            return Err(anyhow!(
                "verbal adjustment word {} is listed more than once ignoring case",
                word
            ));
        }
    }
    let numeric: HashSet<&str> = table.numeric_keys.iter().map(String::as_str).collect();
    if let Some(shared) = table
        .verbal_keys
        .iter()
        .find(|key| numeric.contains(key.as_str()))
    {
        return Err(anyhow!(
            "attribute key {} cannot be both numeric and verbal",
            shared
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_valid() {
        assert!(validate_scoring_table(&ScoringTable::default()).is_ok());
    }

    #[test]
    fn overlapping_keys_are_rejected() {
        let mut table = ScoringTable::default();
        table.verbal_keys.push("agresivita".to_string());
        let err = validate_scoring_table(&table).expect_err("overlap");
        assert!(err.to_string().contains("agresivita"));
    }

    #[test]
    fn empty_key_lists_are_rejected() {
        let mut table = ScoringTable::default();
        table.verbal_keys.clear();
        let err = validate_scoring_table(&table).expect_err("empty list");
        assert!(err.to_string().contains("verbal_keys"));
    }

    #[test]
    fn verbal_words_differing_only_by_case_are_rejected() {
        let mut table = ScoringTable::default();
        table.verbal_adjustments.insert("HIGH".to_string(), 30);
        let err = validate_scoring_table(&table).expect_err("duplicate word");
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn blank_keys_are_rejected() {
        let mut table = ScoringTable::default();
        table.numeric_keys.push("  ".to_string());
        assert!(validate_scoring_table(&table).is_err());
    }
}
