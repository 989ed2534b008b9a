//! Price lists for permanent upgrades.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::StorageError;

/// One purchasable level of an upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeLevel {
    /// Stat value granted by the level.
    pub value: f32,
    /// Coins required to buy the level.
    pub cost: u64,
}

/// Ordered levels of a named upgrade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeList {
    /// Name the upgrade is bought by.
    pub name: String,
    /// Levels in purchase order.
    #[serde(default)]
    pub levels: Vec<UpgradeLevel>,
}

/// Every upgrade available for purchase.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UpgradeCatalog {
    /// Upgrade lists in display order.
    #[serde(default)]
    pub upgrades: Vec<UpgradeList>,
}

impl UpgradeCatalog {
    /// Parses a catalog from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, StorageError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads a catalog from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| StorageError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Looks up an upgrade by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&UpgradeList> {
        self.upgrades.iter().find(|list| list.name == name)
    }
}
