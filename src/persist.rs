//! Save/load of storage-node state.
//!
//! Only scalar state survives a save: the stored quantity, the configured
//! maximum flow rate, and the performance modifier (including whether it
//! has been bound).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::sim::bootstrap::PerformanceModifier;

/// Persisted state of one storage node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedStorage {
    pub stored: f32,
    pub max_flow_rate: f32,
    pub modifier: PerformanceModifier,
}

/// A named saved node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedNode {
    pub name: String,
    pub state: SavedStorage,
}

/// Contents of a save file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    #[serde(default, rename = "node")]
    pub nodes: Vec<SavedNode>,
}

impl SaveFile {
    pub fn find(&self, name: &str) -> Option<&SavedStorage> {
        self.nodes.iter().find(|n| n.name == name).map(|n| &n.state)
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// Returns `PersistError::Serialize` if TOML output fails.
    pub fn to_toml_string(&self) -> Result<String, PersistError> {
        Ok(toml::to_string(self)?)
    }

    /// Parses a save from TOML.
    ///
    /// # Errors
    ///
    /// Returns `PersistError::Deserialize` if the TOML is invalid.
    pub fn from_toml_str(s: &str) -> Result<Self, PersistError> {
        Ok(toml::from_str(s)?)
    }

    /// Writes the save to `path`.
    ///
    /// # Errors
    ///
    /// Returns a `PersistError` if serialization or the write fails.
    pub fn write(&self, path: &Path) -> Result<(), PersistError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Reads a save from `path`.
    ///
    /// # Errors
    ///
    /// Returns a `PersistError` if the file cannot be read or parsed.
    pub fn read(path: &Path) -> Result<Self, PersistError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SaveFile {
        SaveFile {
            nodes: vec![
                SavedNode {
                    name: "bat-a".into(),
                    state: SavedStorage {
                        stored: 398.25,
                        max_flow_rate: 3.0,
                        modifier: PerformanceModifier::Bound { value: 1.5 },
                    },
                },
                SavedNode {
                    name: "bat-b".into(),
                    state: SavedStorage {
                        stored: 0.35,
                        max_flow_rate: 1.0,
                        modifier: PerformanceModifier::Unbound { default: 1.0 },
                    },
                },
            ],
        }
    }

    #[test]
    fn toml_preserves_every_field() {
        let save = sample();
        let text = save.to_toml_string().unwrap();
        let back = SaveFile::from_toml_str(&text).unwrap();
        assert_eq!(back, save);
    }

    #[test]
    fn modifier_state_is_readable() {
        let text = sample().to_toml_string().unwrap();
        assert!(text.contains("state = \"bound\""));
        assert!(text.contains("state = \"unbound\""));
    }

    #[test]
    fn find_by_name() {
        let save = sample();
        assert_eq!(save.find("bat-b").map(|s| s.max_flow_rate), Some(1.0));
        assert!(save.find("missing").is_none());
    }

    #[test]
    fn empty_file_has_no_nodes() {
        assert_eq!(SaveFile::from_toml_str("").unwrap(), SaveFile::default());
    }
}
