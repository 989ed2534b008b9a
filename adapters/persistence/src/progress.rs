//! Coin balance and purchased upgrade levels.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{KeyValueStore, StorageError, UpgradeCatalog, UpgradeLevel};

/// Key the progress record is stored under.
pub const USER_DATA_KEY: &str = "UserData";

/// Reasons an upgrade purchase may be refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PurchaseError {
    /// The catalog has no upgrade with this name.
    #[error("unknown upgrade `{0}`")]
    UnknownUpgrade(String),
    /// Every level of the upgrade is already owned.
    #[error("upgrade `{0}` is already at its highest level")]
    MaxLevel(String),
    /// The balance does not cover the next level.
    #[error("need {cost} coins, have {balance}")]
    InsufficientCoins {
        /// Price of the next level.
        cost: u64,
        /// Coins available.
        balance: u64,
    },
}

/// Progress persisted between rounds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserData {
    /// Coin balance.
    pub coins: u64,
    /// Number of levels bought per upgrade name.
    pub levels: BTreeMap<String, usize>,
}

impl UserData {
    /// Number of levels bought for an upgrade.
    #[must_use]
    pub fn level(&self, name: &str) -> usize {
        self.levels.get(name).copied().unwrap_or(0)
    }

    /// Buys the next level of the named upgrade.
    pub fn purchase(
        &mut self,
        catalog: &UpgradeCatalog,
        name: &str,
    ) -> Result<UpgradeLevel, PurchaseError> {
        let list = catalog
            .get(name)
            .ok_or_else(|| PurchaseError::UnknownUpgrade(name.to_owned()))?;
        let bought = self.level(name);
        let next = *list
            .levels
            .get(bought)
            .ok_or_else(|| PurchaseError::MaxLevel(name.to_owned()))?;

        if self.coins < next.cost {
            return Err(PurchaseError::InsufficientCoins {
                cost: next.cost,
                balance: self.coins,
            });
        }

        self.coins -= next.cost;
        let _ = self.levels.insert(name.to_owned(), bought + 1);
        tracing::debug!(
            upgrade = name,
            level = bought + 1,
            coins = self.coins,
            "upgrade purchased"
        );
        Ok(next)
    }
}

/// Loads, saves and clears [`UserData`] in a key-value store.
#[derive(Debug)]
pub struct ProgressStore<S> {
    store: S,
    user: UserData,
}

impl<S: KeyValueStore> ProgressStore<S> {
    /// Loads the stored record; a missing record starts fresh progress.
    pub fn open(store: S) -> Result<Self, StorageError> {
        let user = match store.get(USER_DATA_KEY) {
            Some(json) => serde_json::from_str(&json)?,
            None => UserData::default(),
        };
        Ok(Self { store, user })
    }

    /// Current progress.
    #[must_use]
    pub fn user(&self) -> &UserData {
        &self.user
    }

    /// Mutable access to the current progress.
    pub fn user_mut(&mut self) -> &mut UserData {
        &mut self.user
    }

    /// Writes the current progress and flushes the store.
    pub fn save(&mut self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.user)?;
        self.store.set(USER_DATA_KEY, json);
        self.store.flush()
    }

    /// Deletes everything in the store and resets progress.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.store.delete_all();
        self.user = UserData::default();
        self.store.flush()
    }

    /// Returns the backing store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{UpgradeLevel, UpgradeList};

    fn catalog() -> UpgradeCatalog {
        UpgradeCatalog {
            upgrades: vec![UpgradeList {
                name: "speed".to_owned(),
                levels: vec![
                    UpgradeLevel {
                        value: 5.5,
                        cost: 10,
                    },
                    UpgradeLevel {
                        value: 6.0,
                        cost: 30,
                    },
                ],
            }],
        }
    }

    #[test]
    fn purchase_spends_coins_and_advances_the_level() {
        let mut user = UserData {
            coins: 45,
            ..UserData::default()
        };

        let level = user.purchase(&catalog(), "speed").expect("affordable");
        assert_eq!(level.cost, 10);
        assert_eq!(user.coins, 35);
        assert_eq!(user.level("speed"), 1);

        let _ = user.purchase(&catalog(), "speed").expect("affordable");
        assert_eq!(user.coins, 5);
        assert_eq!(
            user.purchase(&catalog(), "speed"),
            Err(PurchaseError::MaxLevel("speed".to_owned()))
        );
    }

    #[test]
    fn refused_purchases_leave_progress_untouched() {
        let mut user = UserData {
            coins: 5,
            ..UserData::default()
        };

        assert_eq!(
            user.purchase(&catalog(), "speed"),
            Err(PurchaseError::InsufficientCoins {
                cost: 10,
                balance: 5
            })
        );
        assert_eq!(
            user.purchase(&catalog(), "armour"),
            Err(PurchaseError::UnknownUpgrade("armour".to_owned()))
        );
        assert_eq!(user.coins, 5);
        assert_eq!(user.level("speed"), 0);
    }
}
