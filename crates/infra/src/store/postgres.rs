//! PostgreSQL-backed stores.
//!
//! ## Error Mapping
//!
//! | SQLx error | SQLSTATE | StoreError |
//! |------------|----------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `NotFound` (referenced row missing) |
//! | Database (other) | any | `Backend` |
//! | PoolClosed / Io / other | n/a | `Backend` |
//!
//! Rows that fail domain validation on load surface as `StoreError::Domain`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use solarworks_core::{
    AllocationId, BatchId, CustomerId, GodownId, PaymentId, ProductId, ProjectId, TaskId,
};
use solarworks_inventory::{
    apply_allocation, Allocation, AllocationLine, Batch, BatchSelection, Godown, NewBatch,
    Product,
};
use solarworks_projects::{Customer, NewTask, Payment, PaymentMethod, Project, Task};

use super::r#trait::{InventoryStore, ProjectStore, StoreError, StoreResult};

/// Tables, created idempotently by [`ensure_schema`].
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS godowns (
        id          UUID PRIMARY KEY,
        name        TEXT NOT NULL,
        location    TEXT NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id          UUID PRIMARY KEY,
        name        TEXT NOT NULL,
        unit        TEXT NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS batches (
        id                  UUID PRIMARY KEY,
        product_id          UUID NOT NULL REFERENCES products(id),
        godown_id           UUID NOT NULL REFERENCES godowns(id),
        purchased_quantity  NUMERIC NOT NULL CHECK (purchased_quantity > 0),
        remaining_quantity  NUMERIC NOT NULL CHECK (remaining_quantity >= 0),
        unit_price          NUMERIC NOT NULL CHECK (unit_price >= 0),
        purchase_date       DATE NOT NULL,
        created_at          TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS batches_product_fifo ON batches (product_id, purchase_date, created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS customers (
        id          UUID PRIMARY KEY,
        name        TEXT NOT NULL,
        phone       TEXT,
        email       TEXT,
        address     TEXT,
        created_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS projects (
        id              UUID PRIMARY KEY,
        customer_id     UUID NOT NULL REFERENCES customers(id),
        name            TEXT NOT NULL,
        capacity_kw     NUMERIC NOT NULL,
        contract_value  NUMERIC NOT NULL,
        start_date      DATE NOT NULL,
        end_date        DATE NOT NULL,
        created_at      TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS allocations (
        id            UUID PRIMARY KEY,
        product_id    UUID NOT NULL REFERENCES products(id),
        project_id    UUID REFERENCES projects(id),
        committed_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS allocation_lines (
        allocation_id  UUID NOT NULL REFERENCES allocations(id),
        line_no        INTEGER NOT NULL,
        batch_id       UUID NOT NULL REFERENCES batches(id),
        quantity       NUMERIC NOT NULL CHECK (quantity > 0),
        unit_price     NUMERIC NOT NULL,
        PRIMARY KEY (allocation_id, line_no)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id            UUID PRIMARY KEY,
        project_id    UUID NOT NULL REFERENCES projects(id),
        name          TEXT NOT NULL,
        start_date    DATE NOT NULL,
        due_date      DATE NOT NULL,
        progress      SMALLINT NOT NULL CHECK (progress BETWEEN 0 AND 100),
        completed_on  DATE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payments (
        id          UUID PRIMARY KEY,
        project_id  UUID NOT NULL REFERENCES projects(id),
        amount      NUMERIC NOT NULL CHECK (amount > 0),
        paid_on     DATE NOT NULL,
        method      TEXT NOT NULL,
        reference   TEXT,
        created_at  TIMESTAMPTZ NOT NULL
    )
    "#,
];

/// Create all tables and indexes if they do not exist yet.
#[instrument(skip(pool), err)]
pub async fn ensure_schema(pool: &PgPool) -> StoreResult<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    }
    Ok(())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23503") => StoreError::NotFound(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> StoreResult<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| StoreError::Backend(format!("failed to read column {name}: {e}")))
}

const BATCH_COLUMNS: &str = "id, product_id, godown_id, purchased_quantity, remaining_quantity, \
                             unit_price, purchase_date, created_at";

fn batch_from_row(row: &PgRow) -> StoreResult<Batch> {
    let new = NewBatch {
        product_id: ProductId::from_uuid(column(row, "product_id")?),
        godown_id: GodownId::from_uuid(column(row, "godown_id")?),
        quantity: column(row, "purchased_quantity")?,
        unit_price: column(row, "unit_price")?,
        purchase_date: column(row, "purchase_date")?,
    };
    Ok(Batch::restore(
        BatchId::from_uuid(column(row, "id")?),
        new,
        column(row, "remaining_quantity")?,
        column(row, "created_at")?,
    )?)
}

fn godown_from_row(row: &PgRow) -> StoreResult<Godown> {
    Ok(Godown {
        id: GodownId::from_uuid(column(row, "id")?),
        name: column(row, "name")?,
        location: column(row, "location")?,
        created_at: column(row, "created_at")?,
    })
}

fn product_from_row(row: &PgRow) -> StoreResult<Product> {
    Ok(Product {
        id: ProductId::from_uuid(column(row, "id")?),
        name: column(row, "name")?,
        unit: column(row, "unit")?,
        created_at: column(row, "created_at")?,
    })
}

/// Fold joined allocation/line rows (ordered by allocation) into allocations.
fn allocations_from_rows(rows: &[PgRow]) -> StoreResult<Vec<Allocation>> {
    let mut out: Vec<Allocation> = Vec::new();
    for row in rows {
        let id = AllocationId::from_uuid(column(row, "id")?);
        let line = AllocationLine {
            batch_id: BatchId::from_uuid(column(row, "batch_id")?),
            quantity: column(row, "quantity")?,
            unit_price: column(row, "unit_price")?,
        };

        match out.last_mut() {
            Some(current) if current.id == id => current.lines.push(line),
            _ => {
                let project_id: Option<Uuid> = column(row, "project_id")?;
                out.push(Allocation {
                    id,
                    product_id: ProductId::from_uuid(column(row, "product_id")?),
                    project_id: project_id.map(ProjectId::from_uuid),
                    lines: vec![line],
                    committed_at: column(row, "committed_at")?,
                });
            }
        }
    }
    Ok(out)
}

/// PostgreSQL inventory store.
///
/// Allocation commits run in one transaction and lock the product's batch rows
/// (`SELECT ... FOR UPDATE`), so concurrent commits against the same product
/// serialise instead of over-drawing a batch.
#[derive(Debug, Clone)]
pub struct PgInventoryStore {
    pool: PgPool,
}

impl PgInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_allocations(&self, filter_column: &str, id: Uuid) -> StoreResult<Vec<Allocation>> {
        let sql = format!(
            r#"
            SELECT a.id, a.product_id, a.project_id, a.committed_at,
                   l.batch_id, l.quantity, l.unit_price
            FROM allocations a
            JOIN allocation_lines l ON l.allocation_id = a.id
            WHERE a.{filter_column} = $1
            ORDER BY a.committed_at, a.id, l.line_no
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_allocations", e))?;
        allocations_from_rows(&rows)
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    #[instrument(skip(self, godown), fields(godown_id = %godown.id), err)]
    async fn insert_godown(&self, godown: Godown) -> StoreResult<()> {
        sqlx::query("INSERT INTO godowns (id, name, location, created_at) VALUES ($1, $2, $3, $4)")
            .bind(godown.id.as_uuid())
            .bind(&godown.name)
            .bind(&godown.location)
            .bind(godown.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_godown", e))?;
        Ok(())
    }

    async fn list_godowns(&self) -> StoreResult<Vec<Godown>> {
        let rows = sqlx::query("SELECT id, name, location, created_at FROM godowns ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_godowns", e))?;
        rows.iter().map(godown_from_row).collect()
    }

    async fn get_godown(&self, id: GodownId) -> StoreResult<Option<Godown>> {
        let row = sqlx::query("SELECT id, name, location, created_at FROM godowns WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_godown", e))?;
        row.as_ref().map(godown_from_row).transpose()
    }

    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn insert_product(&self, product: Product) -> StoreResult<()> {
        sqlx::query("INSERT INTO products (id, name, unit, created_at) VALUES ($1, $2, $3, $4)")
            .bind(product.id.as_uuid())
            .bind(&product.name)
            .bind(&product.unit)
            .bind(product.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(())
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query("SELECT id, name, unit, created_at FROM products ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;
        rows.iter().map(product_from_row).collect()
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let row = sqlx::query("SELECT id, name, unit, created_at FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?;
        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self, batch), fields(batch_id = %batch.id_typed(), product_id = %batch.product_id()), err)]
    async fn insert_batch(&self, batch: Batch) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO batches (
                id, product_id, godown_id, purchased_quantity, remaining_quantity,
                unit_price, purchase_date, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(batch.id_typed().as_uuid())
        .bind(batch.product_id().as_uuid())
        .bind(batch.godown_id().as_uuid())
        .bind(batch.purchased_quantity())
        .bind(batch.remaining_quantity())
        .bind(batch.unit_price())
        .bind(batch.purchase_date())
        .bind(batch.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_batch", e))?;
        Ok(())
    }

    async fn list_batches(&self, product_id: ProductId) -> StoreResult<Vec<Batch>> {
        let sql = format!(
            "SELECT {BATCH_COLUMNS} FROM batches WHERE product_id = $1 \
             ORDER BY purchase_date, created_at, id"
        );
        let rows = sqlx::query(&sql)
            .bind(product_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_batches", e))?;
        rows.iter().map(batch_from_row).collect()
    }

    #[instrument(skip(self, selections, committed_at), fields(product_id = %product_id, selections = selections.len()), err)]
    async fn commit_allocation(
        &self,
        product_id: ProductId,
        project_id: Option<ProjectId>,
        selections: &[BatchSelection],
        committed_at: DateTime<Utc>,
    ) -> StoreResult<Allocation> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("commit_allocation.begin", e))?;

        let sql = format!(
            "SELECT {BATCH_COLUMNS} FROM batches WHERE product_id = $1 \
             ORDER BY purchase_date, created_at, id FOR UPDATE"
        );
        let rows = sqlx::query(&sql)
            .bind(product_id.as_uuid())
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("commit_allocation.lock_batches", e))?;
        let mut batches = rows.iter().map(batch_from_row).collect::<StoreResult<Vec<_>>>()?;

        // Dropping `tx` on error rolls the transaction back.
        let lines = apply_allocation(&mut batches, selections)?;

        for line in &lines {
            let remaining = batches
                .iter()
                .find(|b| b.id_typed() == line.batch_id)
                .map(Batch::remaining_quantity)
                .ok_or_else(|| StoreError::Backend(format!("batch {} vanished", line.batch_id)))?;
            sqlx::query("UPDATE batches SET remaining_quantity = $1 WHERE id = $2")
                .bind(remaining)
                .bind(line.batch_id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("commit_allocation.update_batch", e))?;
        }

        let allocation = Allocation {
            id: AllocationId::new(),
            product_id,
            project_id,
            lines,
            committed_at,
        };

        sqlx::query("INSERT INTO allocations (id, product_id, project_id, committed_at) VALUES ($1, $2, $3, $4)")
            .bind(allocation.id.as_uuid())
            .bind(product_id.as_uuid())
            .bind(project_id.map(|p| *p.as_uuid()))
            .bind(committed_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("commit_allocation.insert_allocation", e))?;

        for (line_no, line) in allocation.lines.iter().enumerate() {
            sqlx::query(
                "INSERT INTO allocation_lines (allocation_id, line_no, batch_id, quantity, unit_price) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(allocation.id.as_uuid())
            .bind(line_no as i32)
            .bind(line.batch_id.as_uuid())
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("commit_allocation.insert_line", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_allocation.commit", e))?;

        Ok(allocation)
    }

    async fn list_allocations(&self, product_id: ProductId) -> StoreResult<Vec<Allocation>> {
        self.fetch_allocations("product_id", *product_id.as_uuid()).await
    }

    async fn list_project_allocations(&self, project_id: ProjectId) -> StoreResult<Vec<Allocation>> {
        self.fetch_allocations("project_id", *project_id.as_uuid()).await
    }
}

const PROJECT_COLUMNS: &str =
    "id, customer_id, name, capacity_kw, contract_value, start_date, end_date, created_at";
const TASK_COLUMNS: &str = "id, project_id, name, start_date, due_date, progress, completed_on";
const PAYMENT_COLUMNS: &str = "id, project_id, amount, paid_on, method, reference, created_at";

fn customer_from_row(row: &PgRow) -> StoreResult<Customer> {
    Ok(Customer {
        id: CustomerId::from_uuid(column(row, "id")?),
        name: column(row, "name")?,
        phone: column(row, "phone")?,
        email: column(row, "email")?,
        address: column(row, "address")?,
        created_at: column(row, "created_at")?,
    })
}

fn project_from_row(row: &PgRow) -> StoreResult<Project> {
    Ok(Project {
        id: ProjectId::from_uuid(column(row, "id")?),
        customer_id: CustomerId::from_uuid(column(row, "customer_id")?),
        name: column(row, "name")?,
        capacity_kw: column(row, "capacity_kw")?,
        contract_value: column(row, "contract_value")?,
        start_date: column(row, "start_date")?,
        end_date: column(row, "end_date")?,
        created_at: column(row, "created_at")?,
    })
}

fn task_from_row(row: &PgRow) -> StoreResult<Task> {
    let progress: i16 = column(row, "progress")?;
    let progress = u8::try_from(progress)
        .map_err(|_| StoreError::Backend(format!("task progress out of range: {progress}")))?;
    let completed_on: Option<NaiveDate> = column(row, "completed_on")?;

    Ok(Task::restore(
        TaskId::from_uuid(column(row, "id")?),
        ProjectId::from_uuid(column(row, "project_id")?),
        NewTask {
            name: column(row, "name")?,
            start_date: column(row, "start_date")?,
            due_date: column(row, "due_date")?,
        },
        progress,
        completed_on,
    )?)
}

fn payment_from_row(row: &PgRow) -> StoreResult<Payment> {
    let method: String = column(row, "method")?;
    let amount: Decimal = column(row, "amount")?;
    Ok(Payment {
        id: PaymentId::from_uuid(column(row, "id")?),
        project_id: ProjectId::from_uuid(column(row, "project_id")?),
        amount,
        paid_on: column(row, "paid_on")?,
        method: method.parse::<PaymentMethod>()?,
        reference: column(row, "reference")?,
        created_at: column(row, "created_at")?,
    })
}

/// PostgreSQL project store.
#[derive(Debug, Clone)]
pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    #[instrument(skip(self, customer), fields(customer_id = %customer.id), err)]
    async fn insert_customer(&self, customer: Customer) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO customers (id, name, phone, email, address, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(customer.id.as_uuid())
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_customer", e))?;
        Ok(())
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        let rows = sqlx::query(
            "SELECT id, name, phone, email, address, created_at FROM customers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_customers", e))?;
        rows.iter().map(customer_from_row).collect()
    }

    async fn get_customer(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        let row = sqlx::query(
            "SELECT id, name, phone, email, address, created_at FROM customers WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_customer", e))?;
        row.as_ref().map(customer_from_row).transpose()
    }

    #[instrument(skip(self, project), fields(project_id = %project.id), err)]
    async fn insert_project(&self, project: Project) -> StoreResult<()> {
        let sql = format!("INSERT INTO projects ({PROJECT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)");
        sqlx::query(&sql)
            .bind(project.id.as_uuid())
            .bind(project.customer_id.as_uuid())
            .bind(&project.name)
            .bind(project.capacity_kw)
            .bind(project.contract_value)
            .bind(project.start_date)
            .bind(project.end_date)
            .bind(project.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_project", e))?;
        Ok(())
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY start_date, created_at");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_projects", e))?;
        rows.iter().map(project_from_row).collect()
    }

    async fn get_project(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_project", e))?;
        row.as_ref().map(project_from_row).transpose()
    }

    #[instrument(skip(self, task), fields(task_id = %task.id_typed()), err)]
    async fn insert_task(&self, task: Task) -> StoreResult<()> {
        let sql = format!("INSERT INTO tasks ({TASK_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)");
        sqlx::query(&sql)
            .bind(task.id_typed().as_uuid())
            .bind(task.project_id().as_uuid())
            .bind(task.name())
            .bind(task.start_date())
            .bind(task.due_date())
            .bind(i16::from(task.progress()))
            .bind(task.completed_on())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_task", e))?;
        Ok(())
    }

    async fn list_tasks(&self, project_id: ProjectId) -> StoreResult<Vec<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = $1 ORDER BY start_date, id");
        let rows = sqlx::query(&sql)
            .bind(project_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_tasks", e))?;
        rows.iter().map(task_from_row).collect()
    }

    async fn get_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_task", e))?;
        row.as_ref().map(task_from_row).transpose()
    }

    #[instrument(skip(self, task), fields(task_id = %task.id_typed(), progress = task.progress()), err)]
    async fn update_task(&self, task: &Task) -> StoreResult<()> {
        let result = sqlx::query("UPDATE tasks SET progress = $1, completed_on = $2 WHERE id = $3")
            .bind(i16::from(task.progress()))
            .bind(task.completed_on())
            .bind(task.id_typed().as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_task", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("task {}", task.id_typed())));
        }
        Ok(())
    }

    #[instrument(skip(self, payment), fields(payment_id = %payment.id, project_id = %payment.project_id), err)]
    async fn insert_payment(&self, payment: Payment) -> StoreResult<()> {
        let sql = format!("INSERT INTO payments ({PAYMENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)");
        sqlx::query(&sql)
            .bind(payment.id.as_uuid())
            .bind(payment.project_id.as_uuid())
            .bind(payment.amount)
            .bind(payment.paid_on)
            .bind(payment.method.as_str())
            .bind(&payment.reference)
            .bind(payment.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_payment", e))?;
        Ok(())
    }

    async fn list_payments(&self, project_id: ProjectId) -> StoreResult<Vec<Payment>> {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE project_id = $1 ORDER BY paid_on, created_at"
        );
        let rows = sqlx::query(&sql)
            .bind(project_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_payments", e))?;
        rows.iter().map(payment_from_row).collect()
    }
}
