//! Helpers shared by the route handlers.

use core::str::FromStr;

use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};

use solarworks_core::{DomainError, ProductId, ProjectId};
use solarworks_inventory::Product;
use solarworks_projects::Project;

use crate::app::errors;
use crate::app::services::AppServices;

/// Parse a path or body id, answering `400 invalid_id` on failure.
pub fn parse_id<T>(raw: &str, what: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.trim()
        .parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}

pub async fn require_product(
    services: &AppServices,
    id: ProductId,
) -> Result<Product, axum::response::Response> {
    match services.inventory.get_product(id).await {
        Ok(Some(p)) => Ok(p),
        Ok(None) => Err(errors::not_found("product")),
        Err(e) => Err(errors::store_error_to_response(e)),
    }
}

pub async fn require_project(
    services: &AppServices,
    id: ProjectId,
) -> Result<Project, axum::response::Response> {
    match services.projects.get_project(id).await {
        Ok(Some(p)) => Ok(p),
        Ok(None) => Err(errors::not_found("project")),
        Err(e) => Err(errors::store_error_to_response(e)),
    }
}

/// Current calendar day (UTC).
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
