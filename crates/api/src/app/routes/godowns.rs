use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use solarworks_core::GodownId;
use solarworks_inventory::Godown;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", get(list_godowns).post(create_godown))
}

pub async fn create_godown(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateGodownRequest>,
) -> axum::response::Response {
    let godown = match Godown::new(GodownId::new(), body.name, body.location, Utc::now()) {
        Ok(g) => g,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.inventory.insert_godown(godown.clone()).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(godown)).into_response()
}

pub async fn list_godowns(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.inventory.list_godowns().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
