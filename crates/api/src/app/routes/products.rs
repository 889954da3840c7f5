use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;

use solarworks_core::{BatchId, GodownId, ProductId, ProjectId};
use solarworks_inventory::{
    review_selection, suggest, Batch, BatchSelection, NewBatch, Product, StockSummary,
};

use crate::app::routes::common::{parse_id, require_product, require_project};
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product))
        .route("/:id/batches", get(list_batches).post(create_batch))
        .route("/:id/stock", get(get_stock))
        .route("/:id/allocations/suggest", post(suggest_allocation))
        .route("/:id/allocations", get(list_allocations).post(commit_allocation))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    let product = match Product::new(ProductId::new(), body.name, body.unit, Utc::now()) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.inventory.insert_product(product.clone()).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(product)).into_response()
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.inventory.list_products().await {
        Ok(items) => (StatusCode::OK, Json(json!({ "items": items }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match parse_id(&id, "product") {
        Ok(v) => v,
        Err(res) => return res,
    };

    match require_product(&services, id).await {
        Ok(p) => (StatusCode::OK, Json(p)).into_response(),
        Err(res) => res,
    }
}

pub async fn create_batch(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::CreateBatchRequest>,
) -> axum::response::Response {
    let product_id: ProductId = match parse_id(&id, "product") {
        Ok(v) => v,
        Err(res) => return res,
    };
    let godown_id: GodownId = match parse_id(&body.godown_id, "godown") {
        Ok(v) => v,
        Err(res) => return res,
    };

    let new = NewBatch {
        product_id,
        godown_id,
        quantity: body.quantity,
        unit_price: body.unit_price,
        purchase_date: body.purchase_date,
    };
    let batch = match Batch::create(BatchId::new(), new, Utc::now()) {
        Ok(b) => b,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.inventory.insert_batch(batch.clone()).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(dto::batch_to_json(&batch))).into_response()
}

/// Loads the product's batches in FIFO order after checking the product exists.
async fn product_batches(
    services: &AppServices,
    raw_id: &str,
) -> Result<(ProductId, Vec<Batch>), axum::response::Response> {
    let product_id: ProductId = parse_id(raw_id, "product")?;
    require_product(services, product_id).await?;
    let batches = services
        .inventory
        .list_batches(product_id)
        .await
        .map_err(errors::store_error_to_response)?;
    Ok((product_id, batches))
}

pub async fn list_batches(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let (_, batches) = match product_batches(&services, &id).await {
        Ok(v) => v,
        Err(res) => return res,
    };

    let items = batches.iter().map(dto::batch_to_json).collect::<Vec<_>>();
    (StatusCode::OK, Json(json!({ "items": items }))).into_response()
}

pub async fn get_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let (product_id, batches) = match product_batches(&services, &id).await {
        Ok(v) => v,
        Err(res) => return res,
    };

    let summary = StockSummary::from_batches(&batches);
    (
        StatusCode::OK,
        Json(json!({ "product_id": product_id.to_string(), "stock": summary })),
    )
        .into_response()
}

pub async fn suggest_allocation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::SuggestAllocationRequest>,
) -> axum::response::Response {
    let (_, batches) = match product_batches(&services, &id).await {
        Ok(v) => v,
        Err(res) => return res,
    };

    let suggestion = suggest(body.required_quantity, &batches);
    (StatusCode::OK, Json(dto::suggestion_to_json(&suggestion))).into_response()
}

pub async fn commit_allocation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::CommitAllocationRequest>,
) -> axum::response::Response {
    let product_id: ProductId = match parse_id(&id, "product") {
        Ok(v) => v,
        Err(res) => return res,
    };
    if let Err(res) = require_product(&services, product_id).await {
        return res;
    }

    if body.required_quantity <= Decimal::ZERO {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "required_quantity must be positive",
        );
    }

    let project_id: Option<ProjectId> = match body.project_id.as_deref() {
        Some(raw) => match parse_id(raw, "project") {
            Ok(v) => Some(v),
            Err(res) => return res,
        },
        None => None,
    };
    if let Some(project_id) = project_id {
        if let Err(res) = require_project(&services, project_id).await {
            return res;
        }
    }

    let mut selections = Vec::with_capacity(body.selections.len());
    for s in &body.selections {
        let batch_id: BatchId = match parse_id(&s.batch_id, "batch") {
            Ok(v) => v,
            Err(res) => return res,
        };
        selections.push(BatchSelection {
            batch_id,
            quantity: s.quantity,
        });
    }

    let review = review_selection(body.required_quantity, &selections);
    if review.needs_confirmation() && !body.confirm_partial {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "confirmation_required",
                "message": "selected quantity differs from the required quantity; resend with confirm_partial",
                "review": dto::review_to_json(&review),
            })),
        )
            .into_response();
    }

    let allocation = match services
        .inventory
        .commit_allocation(product_id, project_id, &selections, Utc::now())
        .await
    {
        Ok(a) => a,
        Err(e) => return errors::store_error_to_response(e),
    };

    tracing::info!(
        allocation_id = %allocation.id,
        product_id = %product_id,
        quantity = %allocation.total_quantity(),
        "allocation committed"
    );

    (
        StatusCode::CREATED,
        Json(json!({
            "allocation": dto::allocation_to_json(&allocation),
            "review": dto::review_to_json(&review),
        })),
    )
        .into_response()
}

pub async fn list_allocations(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match parse_id(&id, "product") {
        Ok(v) => v,
        Err(res) => return res,
    };
    if let Err(res) = require_product(&services, product_id).await {
        return res;
    }

    match services.inventory.list_allocations(product_id).await {
        Ok(allocations) => {
            let items = allocations.iter().map(dto::allocation_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
