use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use solarworks_core::CustomerId;
use solarworks_projects::{Customer, NewCustomer};

use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/:id", get(get_customer))
}

pub async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateCustomerRequest>,
) -> axum::response::Response {
    let new = NewCustomer {
        name: body.name,
        phone: body.phone,
        email: body.email,
        address: body.address,
    };
    let customer = match Customer::create(CustomerId::new(), new, Utc::now()) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.projects.insert_customer(customer.clone()).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(customer)).into_response()
}

pub async fn list_customers(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.projects.list_customers().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CustomerId = match parse_id(&id, "customer") {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.projects.get_customer(id).await {
        Ok(Some(c)) => (StatusCode::OK, Json(c)).into_response(),
        Ok(None) => errors::not_found("customer"),
        Err(e) => errors::store_error_to_response(e),
    }
}
