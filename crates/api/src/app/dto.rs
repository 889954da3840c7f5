use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use solarworks_inventory::{Allocation, AllocationSuggestion, Batch, SelectionReview};
use solarworks_projects::Task;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateGodownRequest {
    pub name: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub unit: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateBatchRequest {
    pub godown_id: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub purchase_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct SuggestAllocationRequest {
    pub required_quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub batch_id: String,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CommitAllocationRequest {
    pub required_quantity: Decimal,
    pub selections: Vec<SelectionRequest>,
    pub project_id: Option<String>,
    /// Accept a selection whose total differs from `required_quantity`.
    #[serde(default)]
    pub confirm_partial: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub customer_id: String,
    pub name: String,
    #[serde(default)]
    pub capacity_kw: Decimal,
    pub contract_value: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub name: String,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProgressRequest {
    pub progress: u8,
    /// Day the progress was observed; defaults to today.
    pub on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    pub paid_on: NaiveDate,
    pub method: String,
    pub reference: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    pub as_of: Option<NaiveDate>,
}

// -------------------------
// Response mapping
// -------------------------

pub fn batch_to_json(batch: &Batch) -> Value {
    json!({
        "id": batch.id_typed().to_string(),
        "product_id": batch.product_id().to_string(),
        "godown_id": batch.godown_id().to_string(),
        "purchased_quantity": batch.purchased_quantity(),
        "remaining_quantity": batch.remaining_quantity(),
        "unit_price": batch.unit_price(),
        "purchase_date": batch.purchase_date(),
        "created_at": batch.created_at(),
        "exhausted": batch.is_exhausted(),
    })
}

pub fn suggestion_to_json(suggestion: &AllocationSuggestion) -> Value {
    json!({
        "required_quantity": suggestion.required(),
        "allocated_quantity": suggestion.allocated(),
        "shortfall": suggestion.shortfall(),
        "fulfillment": suggestion.fulfillment(),
        "cost": suggestion.cost(),
        "lines": suggestion.lines(),
    })
}

pub fn review_to_json(review: &SelectionReview) -> Value {
    json!({
        "required_quantity": review.required,
        "selected_quantity": review.selected,
        "difference": review.difference(),
        "needs_confirmation": review.needs_confirmation(),
        "fulfillment": review.fulfillment(),
    })
}

pub fn allocation_to_json(allocation: &Allocation) -> Value {
    json!({
        "id": allocation.id.to_string(),
        "product_id": allocation.product_id.to_string(),
        "project_id": allocation.project_id.map(|p| p.to_string()),
        "lines": allocation.lines,
        "total_quantity": allocation.total_quantity(),
        "cost": allocation.cost(),
        "committed_at": allocation.committed_at,
    })
}

pub fn task_to_json(task: &Task, today: NaiveDate) -> Value {
    json!({
        "id": task.id_typed().to_string(),
        "project_id": task.project_id().to_string(),
        "name": task.name(),
        "start_date": task.start_date(),
        "due_date": task.due_date(),
        "progress": task.progress(),
        "completed_on": task.completed_on(),
        "status": task.status(),
        "delay_days": task.delay_days(today),
        "expected_progress": task.expected_progress(today),
        "health": task.health(today),
    })
}
