//! Store boundary for godowns, products, batches, allocations, customers,
//! projects, tasks and payments.
//!
//! Two backends: in-memory (tests/dev) and PostgreSQL.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::{InMemoryInventoryStore, InMemoryProjectStore};
pub use postgres::{ensure_schema, PgInventoryStore, PgProjectStore};
pub use r#trait::{InventoryStore, ProjectStore, StoreError, StoreResult};
