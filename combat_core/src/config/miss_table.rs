//! Miss consequence table loading

use super::ConfigError;
use crate::combat::MissConsequence;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One row of the miss consequence table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissEntry {
    pub roll: u32,
    pub consequence: MissConsequence,
    #[serde(default)]
    pub description: String,
}

/// Table consulted after a critical miss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissTable {
    pub entries: Vec<MissEntry>,
}

impl MissTable {
    /// Consequence for a table roll; unlisted rolls are a simple miss
    pub fn lookup(&self, roll: u32) -> MissConsequence {
        self.entries
            .iter()
            .find(|e| e.roll == roll)
            .map(|e| e.consequence)
            .unwrap_or(MissConsequence::SimpleMiss)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for entry in &self.entries {
            if entry.roll == 0 {
                return Err(ConfigError::ValidationError(
                    "miss table rolls start at 1".to_string(),
                ));
            }
            if !seen.insert(entry.roll) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate miss table roll {}",
                    entry.roll
                )));
            }
        }
        Ok(())
    }
}

/// Load the miss table from a TOML file
pub fn load_miss_table(path: &Path) -> Result<MissTable, ConfigError> {
    let table: MissTable = super::load_toml(path)?;
    table.validate()?;
    Ok(table)
}

/// Load the miss table from a TOML string
pub fn parse_miss_table(content: &str) -> Result<MissTable, ConfigError> {
    let table: MissTable = super::parse_toml(content)?;
    table.validate()?;
    Ok(table)
}

/// Miss table bundled with the crate
pub fn default_miss_table() -> MissTable {
    let toml = include_str!("../../config/miss_consequences.toml");
    parse_miss_table(toml).unwrap_or_else(|_| MissTable {
        entries: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_has_ten_rows() {
        let table = default_miss_table();
        assert_eq!(table.entries.len(), 10);
        assert_eq!(table.lookup(2), MissConsequence::SelfInflictedWound);
        assert_eq!(table.lookup(10), MissConsequence::SimpleMiss);
    }

    #[test]
    fn test_unlisted_roll_is_simple_miss() {
        let table = parse_miss_table(
            r#"
[[entries]]
roll = 1
consequence = "fumble"
"#,
        )
        .unwrap();
        assert_eq!(table.lookup(1), MissConsequence::Fumble);
        assert_eq!(table.lookup(7), MissConsequence::SimpleMiss);
    }

    #[test]
    fn test_duplicate_rolls_rejected() {
        let result = parse_miss_table(
            r#"
[[entries]]
roll = 3
consequence = "fumble"

[[entries]]
roll = 3
consequence = "overextension"
"#,
        );
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
