#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player progress persisted between rounds.
//!
//! Progress is a single [`UserData`] record serialized as JSON under the
//! [`USER_DATA_KEY`] of a [`KeyValueStore`]. Upgrade prices come from an
//! [`UpgradeCatalog`] loaded from TOML.

mod progress;
mod store;
mod upgrades;

pub use progress::{ProgressStore, PurchaseError, UserData, USER_DATA_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use upgrades::{UpgradeCatalog, UpgradeLevel, UpgradeList};
