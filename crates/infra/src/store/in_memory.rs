use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use solarworks_core::{
    AllocationId, CustomerId, Entity, GodownId, ProductId, ProjectId, TaskId,
};
use solarworks_inventory::{
    apply_allocation, sort_fifo, Allocation, Batch, BatchSelection, Godown, Product,
};
use solarworks_projects::{Customer, Payment, Project, Task};

use super::r#trait::{InventoryStore, ProjectStore, StoreError, StoreResult};

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
}

fn ensure_new<E: Entity>(existing: &[E], id: &E::Id, what: &str) -> StoreResult<()> {
    if existing.iter().any(|e| e.id() == id) {
        return Err(StoreError::Conflict(format!("{what} {id:?} already exists")));
    }
    Ok(())
}

#[derive(Debug, Default)]
struct InventoryState {
    godowns: Vec<Godown>,
    products: Vec<Product>,
    batches: Vec<Batch>,
    allocations: Vec<Allocation>,
}

/// In-memory inventory store for tests/dev.
///
/// One lock guards all collections, so an allocation commit is atomic.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    state: RwLock<InventoryState>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn insert_godown(&self, godown: Godown) -> StoreResult<()> {
        let mut state = write(&self.state)?;
        ensure_new(&state.godowns, &godown.id, "godown")?;
        state.godowns.push(godown);
        Ok(())
    }

    async fn list_godowns(&self) -> StoreResult<Vec<Godown>> {
        Ok(read(&self.state)?.godowns.clone())
    }

    async fn get_godown(&self, id: GodownId) -> StoreResult<Option<Godown>> {
        let state = read(&self.state)?;
        Ok(state.godowns.iter().find(|g| g.id == id).cloned())
    }

    async fn insert_product(&self, product: Product) -> StoreResult<()> {
        let mut state = write(&self.state)?;
        ensure_new(&state.products, &product.id, "product")?;
        state.products.push(product);
        Ok(())
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(read(&self.state)?.products.clone())
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let state = read(&self.state)?;
        Ok(state.products.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_batch(&self, batch: Batch) -> StoreResult<()> {
        let mut state = write(&self.state)?;
        if !state.products.iter().any(|p| p.id == batch.product_id()) {
            return Err(StoreError::NotFound(format!("product {}", batch.product_id())));
        }
        if !state.godowns.iter().any(|g| g.id == batch.godown_id()) {
            return Err(StoreError::NotFound(format!("godown {}", batch.godown_id())));
        }
        ensure_new(&state.batches, batch.id(), "batch")?;
        state.batches.push(batch);
        Ok(())
    }

    async fn list_batches(&self, product_id: ProductId) -> StoreResult<Vec<Batch>> {
        let state = read(&self.state)?;
        let mut batches: Vec<Batch> = state
            .batches
            .iter()
            .filter(|b| b.product_id() == product_id)
            .cloned()
            .collect();
        sort_fifo(&mut batches);
        Ok(batches)
    }

    async fn commit_allocation(
        &self,
        product_id: ProductId,
        project_id: Option<ProjectId>,
        selections: &[BatchSelection],
        committed_at: DateTime<Utc>,
    ) -> StoreResult<Allocation> {
        let mut state = write(&self.state)?;

        // Work on a copy so a failed validation leaves the store untouched.
        let mut batches: Vec<Batch> = state
            .batches
            .iter()
            .filter(|b| b.product_id() == product_id)
            .cloned()
            .collect();
        let lines = apply_allocation(&mut batches, selections)?;

        for updated in batches {
            if let Some(slot) = state.batches.iter_mut().find(|b| b.id() == updated.id()) {
                *slot = updated;
            }
        }

        let allocation = Allocation {
            id: AllocationId::new(),
            product_id,
            project_id,
            lines,
            committed_at,
        };
        state.allocations.push(allocation.clone());

        tracing::debug!(
            allocation_id = %allocation.id,
            product_id = %product_id,
            lines = allocation.lines.len(),
            "allocation committed"
        );

        Ok(allocation)
    }

    async fn list_allocations(&self, product_id: ProductId) -> StoreResult<Vec<Allocation>> {
        let state = read(&self.state)?;
        Ok(state
            .allocations
            .iter()
            .filter(|a| a.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn list_project_allocations(&self, project_id: ProjectId) -> StoreResult<Vec<Allocation>> {
        let state = read(&self.state)?;
        Ok(state
            .allocations
            .iter()
            .filter(|a| a.project_id == Some(project_id))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
struct ProjectState {
    customers: Vec<Customer>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    payments: Vec<Payment>,
}

/// In-memory project store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    state: RwLock<ProjectState>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectState {
    fn require_project(&self, id: ProjectId) -> StoreResult<()> {
        if self.projects.iter().any(|p| p.id == id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("project {id}")))
        }
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn insert_customer(&self, customer: Customer) -> StoreResult<()> {
        let mut state = write(&self.state)?;
        ensure_new(&state.customers, &customer.id, "customer")?;
        state.customers.push(customer);
        Ok(())
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        Ok(read(&self.state)?.customers.clone())
    }

    async fn get_customer(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        let state = read(&self.state)?;
        Ok(state.customers.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_project(&self, project: Project) -> StoreResult<()> {
        let mut state = write(&self.state)?;
        if !state.customers.iter().any(|c| c.id == project.customer_id) {
            return Err(StoreError::NotFound(format!("customer {}", project.customer_id)));
        }
        ensure_new(&state.projects, &project.id, "project")?;
        state.projects.push(project);
        Ok(())
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        Ok(read(&self.state)?.projects.clone())
    }

    async fn get_project(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        let state = read(&self.state)?;
        Ok(state.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_task(&self, task: Task) -> StoreResult<()> {
        let mut state = write(&self.state)?;
        state.require_project(task.project_id())?;
        ensure_new(&state.tasks, task.id(), "task")?;
        state.tasks.push(task);
        Ok(())
    }

    async fn list_tasks(&self, project_id: ProjectId) -> StoreResult<Vec<Task>> {
        let state = read(&self.state)?;
        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| t.project_id() == project_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.start_date());
        Ok(tasks)
    }

    async fn get_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let state = read(&self.state)?;
        Ok(state.tasks.iter().find(|t| t.id_typed() == id).cloned())
    }

    async fn update_task(&self, task: &Task) -> StoreResult<()> {
        let mut state = write(&self.state)?;
        let slot = state
            .tasks
            .iter_mut()
            .find(|t| t.id_typed() == task.id_typed())
            .ok_or_else(|| StoreError::NotFound(format!("task {}", task.id_typed())))?;
        *slot = task.clone();
        Ok(())
    }

    async fn insert_payment(&self, payment: Payment) -> StoreResult<()> {
        let mut state = write(&self.state)?;
        state.require_project(payment.project_id)?;
        ensure_new(&state.payments, &payment.id, "payment")?;
        state.payments.push(payment);
        Ok(())
    }

    async fn list_payments(&self, project_id: ProjectId) -> StoreResult<Vec<Payment>> {
        let state = read(&self.state)?;
        let mut payments: Vec<Payment> = state
            .payments
            .iter()
            .filter(|p| p.project_id == project_id)
            .cloned()
            .collect();
        payments.sort_by_key(|p| p.paid_on);
        Ok(payments)
    }
}
