use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use solarworks_core::{CustomerId, PaymentId, ProjectId, TaskId};
use solarworks_projects::{
    NewPayment, NewProject, NewTask, Payment, PaymentMethod, PaymentSummary, Project,
    ProjectCostReport, ProjectProgress, Task,
};

use crate::app::routes::common::{parse_id, require_project, today};
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route("/:id", get(get_project))
        .route("/:id/tasks", get(list_tasks).post(create_task))
        .route("/:id/tasks/:task_id/progress", post(update_task_progress))
        .route("/:id/progress", get(get_progress))
        .route("/:id/payments", get(list_payments).post(record_payment))
        .route("/:id/payments/summary", get(get_payment_summary))
        .route("/:id/cost-report", get(get_cost_report))
}

async fn load_project(services: &AppServices, raw_id: &str) -> Result<Project, axum::response::Response> {
    let id: ProjectId = parse_id(raw_id, "project")?;
    require_project(services, id).await
}

pub async fn create_project(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateProjectRequest>,
) -> axum::response::Response {
    let customer_id: CustomerId = match parse_id(&body.customer_id, "customer") {
        Ok(v) => v,
        Err(res) => return res,
    };

    let new = NewProject {
        customer_id,
        name: body.name,
        capacity_kw: body.capacity_kw,
        contract_value: body.contract_value,
        start_date: body.start_date,
        end_date: body.end_date,
    };
    let project = match Project::create(ProjectId::new(), new, Utc::now()) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.projects.insert_project(project.clone()).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(project)).into_response()
}

pub async fn list_projects(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.projects.list_projects().await {
        Ok(items) => (StatusCode::OK, Json(json!({ "items": items }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_project(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match load_project(&services, &id).await {
        Ok(p) => (StatusCode::OK, Json(p)).into_response(),
        Err(res) => res,
    }
}

pub async fn create_task(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::CreateTaskRequest>,
) -> axum::response::Response {
    let project = match load_project(&services, &id).await {
        Ok(p) => p,
        Err(res) => return res,
    };

    let new = NewTask {
        name: body.name,
        start_date: body.start_date,
        due_date: body.due_date,
    };
    let task = match Task::create(TaskId::new(), project.id, new) {
        Ok(t) => t,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.projects.insert_task(task.clone()).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(dto::task_to_json(&task, today()))).into_response()
}

pub async fn list_tasks(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(query): Query<dto::AsOfQuery>,
) -> axum::response::Response {
    let project = match load_project(&services, &id).await {
        Ok(p) => p,
        Err(res) => return res,
    };
    let as_of = query.as_of.unwrap_or_else(today);

    match services.projects.list_tasks(project.id).await {
        Ok(tasks) => {
            let items = tasks.iter().map(|t| dto::task_to_json(t, as_of)).collect::<Vec<_>>();
            (StatusCode::OK, Json(json!({ "as_of": as_of, "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_task_progress(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, task_id)): Path<(String, String)>,
    Json(body): Json<dto::UpdateProgressRequest>,
) -> axum::response::Response {
    let project_id: ProjectId = match parse_id(&id, "project") {
        Ok(v) => v,
        Err(res) => return res,
    };
    let task_id: TaskId = match parse_id(&task_id, "task") {
        Ok(v) => v,
        Err(res) => return res,
    };

    let mut task = match services.projects.get_task(task_id).await {
        Ok(Some(t)) if t.project_id() == project_id => t,
        Ok(_) => return errors::not_found("task"),
        Err(e) => return errors::store_error_to_response(e),
    };

    let on = body.on.unwrap_or_else(today);
    if let Err(e) = task.update_progress(body.progress, on) {
        return errors::domain_error_to_response(e);
    }
    if let Err(e) = services.projects.update_task(&task).await {
        return errors::store_error_to_response(e);
    }

    tracing::info!(
        task_id = %task_id,
        progress = task.progress(),
        completed = task.completed_on().is_some(),
        "task progress updated"
    );

    // Health is reported as of the day the update describes.
    (StatusCode::OK, Json(dto::task_to_json(&task, on))).into_response()
}

pub async fn get_progress(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(query): Query<dto::AsOfQuery>,
) -> axum::response::Response {
    let project = match load_project(&services, &id).await {
        Ok(p) => p,
        Err(res) => return res,
    };

    match services.projects.list_tasks(project.id).await {
        Ok(tasks) => {
            let progress = ProjectProgress::compute(&project, &tasks, query.as_of.unwrap_or_else(today));
            (StatusCode::OK, Json(progress)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn record_payment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::RecordPaymentRequest>,
) -> axum::response::Response {
    let project = match load_project(&services, &id).await {
        Ok(p) => p,
        Err(res) => return res,
    };
    let method: PaymentMethod = match body.method.parse() {
        Ok(m) => m,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let new = NewPayment {
        amount: body.amount,
        paid_on: body.paid_on,
        method,
        reference: body.reference,
    };
    let payment = match Payment::create(PaymentId::new(), project.id, new, Utc::now()) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.projects.insert_payment(payment.clone()).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(payment)).into_response()
}

pub async fn list_payments(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let project = match load_project(&services, &id).await {
        Ok(p) => p,
        Err(res) => return res,
    };

    match services.projects.list_payments(project.id).await {
        Ok(items) => (StatusCode::OK, Json(json!({ "items": items }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_payment_summary(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let project = match load_project(&services, &id).await {
        Ok(p) => p,
        Err(res) => return res,
    };

    match services.projects.list_payments(project.id).await {
        Ok(payments) => {
            let summary = PaymentSummary::compute(project.contract_value, &payments);
            (StatusCode::OK, Json(summary)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_cost_report(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let project = match load_project(&services, &id).await {
        Ok(p) => p,
        Err(res) => return res,
    };

    let allocations = match services.inventory.list_project_allocations(project.id).await {
        Ok(a) => a,
        Err(e) => return errors::store_error_to_response(e),
    };
    let payments = match services.projects.list_payments(project.id).await {
        Ok(p) => p,
        Err(e) => return errors::store_error_to_response(e),
    };

    let report = ProjectCostReport::compute(&project, &allocations, &payments);
    (StatusCode::OK, Json(report)).into_response()
}
