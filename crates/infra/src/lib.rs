//! Infrastructure layer: persistence for the inventory and project domains.

pub mod store;

pub use store::{InventoryStore, ProjectStore, StoreError, StoreResult};
