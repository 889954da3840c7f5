use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use solarworks_core::{
    CustomerId, DomainError, GodownId, ProductId, ProjectId, TaskId,
};
use solarworks_inventory::{Allocation, Batch, BatchSelection, Godown, Product};
use solarworks_projects::{Customer, Payment, Project, Task};

/// Store operation error.
///
/// Infrastructure failures plus domain errors raised while applying a change
/// inside the store (e.g. an allocation that no longer fits the batches).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Godowns, products, purchase batches and committed allocations.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn insert_godown(&self, godown: Godown) -> StoreResult<()>;
    async fn list_godowns(&self) -> StoreResult<Vec<Godown>>;
    async fn get_godown(&self, id: GodownId) -> StoreResult<Option<Godown>>;

    async fn insert_product(&self, product: Product) -> StoreResult<()>;
    async fn list_products(&self) -> StoreResult<Vec<Product>>;
    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>>;

    /// Record a purchase batch. The product and godown must exist.
    async fn insert_batch(&self, batch: Batch) -> StoreResult<()>;

    /// Batches of a product, oldest purchase first (ties in insertion order).
    async fn list_batches(&self, product_id: ProductId) -> StoreResult<Vec<Batch>>;

    /// Atomically validate `selections` against the product's batches, consume
    /// them and record the allocation. Nothing changes on error.
    async fn commit_allocation(
        &self,
        product_id: ProductId,
        project_id: Option<ProjectId>,
        selections: &[BatchSelection],
        committed_at: DateTime<Utc>,
    ) -> StoreResult<Allocation>;

    async fn list_allocations(&self, product_id: ProductId) -> StoreResult<Vec<Allocation>>;
    async fn list_project_allocations(&self, project_id: ProjectId) -> StoreResult<Vec<Allocation>>;
}

/// Customers, projects, tasks and payments.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn insert_customer(&self, customer: Customer) -> StoreResult<()>;
    async fn list_customers(&self) -> StoreResult<Vec<Customer>>;
    async fn get_customer(&self, id: CustomerId) -> StoreResult<Option<Customer>>;

    /// The customer must exist.
    async fn insert_project(&self, project: Project) -> StoreResult<()>;
    async fn list_projects(&self) -> StoreResult<Vec<Project>>;
    async fn get_project(&self, id: ProjectId) -> StoreResult<Option<Project>>;

    /// The project must exist.
    async fn insert_task(&self, task: Task) -> StoreResult<()>;
    /// Tasks of a project ordered by start date.
    async fn list_tasks(&self, project_id: ProjectId) -> StoreResult<Vec<Task>>;
    async fn get_task(&self, id: TaskId) -> StoreResult<Option<Task>>;
    /// Persist progress / completion of an existing task.
    async fn update_task(&self, task: &Task) -> StoreResult<()>;

    /// The project must exist.
    async fn insert_payment(&self, payment: Payment) -> StoreResult<()>;
    /// Payments of a project ordered by payment date.
    async fn list_payments(&self, project_id: ProjectId) -> StoreResult<Vec<Payment>>;
}
