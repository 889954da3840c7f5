use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use solarworks_api::config::AppConfig;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod (in-memory stores), bound to an ephemeral port.
        let app = solarworks_api::app::build_app(&AppConfig::default())
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn create(&self, path: &str, body: Value) -> Value {
        let (status, created) = self.post(path, body).await;
        assert_eq!(status, StatusCode::CREATED, "POST {path} returned {created}");
        created
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn dec(v: &Value) -> Decimal {
    match v {
        Value::String(s) => s.parse().unwrap(),
        Value::Number(n) => n.to_string().parse().unwrap(),
        other => panic!("not a decimal: {other}"),
    }
}

fn id(v: &Value) -> String {
    v["id"].as_str().unwrap().to_string()
}

/// Product with batches A (30 @ 10, 2024-01-01) and B (50 @ 12, 2024-02-01).
/// B is recorded first so FIFO order has to come from the purchase dates.
async fn seed_stock(srv: &TestServer) -> (String, String, String) {
    let godown = srv
        .create("/godowns", json!({ "name": "Main yard", "location": "Ring road" }))
        .await;
    let product = srv
        .create("/products", json!({ "name": "Mono panel 550W", "unit": "pcs" }))
        .await;
    let product_id = id(&product);

    let b = srv
        .create(
            &format!("/products/{product_id}/batches"),
            json!({
                "godown_id": id(&godown),
                "quantity": "50",
                "unit_price": "12",
                "purchase_date": "2024-02-01",
            }),
        )
        .await;
    let a = srv
        .create(
            &format!("/products/{product_id}/batches"),
            json!({
                "godown_id": id(&godown),
                "quantity": "30",
                "unit_price": "10",
                "purchase_date": "2024-01-01",
            }),
        )
        .await;

    (product_id, id(&a), id(&b))
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = srv
        .client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn suggest_then_commit_consumes_oldest_batches() {
    let srv = TestServer::spawn().await;
    let (product_id, a, b) = seed_stock(&srv).await;

    let (status, batches) = srv.get(&format!("/products/{product_id}/batches")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(batches["items"][0]["id"], a.as_str());

    let (status, suggestion) = srv
        .post(
            &format!("/products/{product_id}/allocations/suggest"),
            json!({ "required_quantity": "40" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(suggestion["fulfillment"], "complete");
    let lines = suggestion["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["batch_id"], a.as_str());
    assert_eq!(dec(&lines[0]["quantity"]), Decimal::from(30));
    assert_eq!(lines[1]["batch_id"], b.as_str());
    assert_eq!(dec(&lines[1]["quantity"]), Decimal::from(10));
    assert_eq!(dec(&suggestion["cost"]), Decimal::from(420));

    let selections: Vec<Value> = lines
        .iter()
        .map(|l| json!({ "batch_id": l["batch_id"], "quantity": l["quantity"] }))
        .collect();
    let committed = srv
        .create(
            &format!("/products/{product_id}/allocations"),
            json!({ "required_quantity": "40", "selections": selections }),
        )
        .await;
    assert_eq!(dec(&committed["allocation"]["total_quantity"]), Decimal::from(40));

    let (_, stock) = srv.get(&format!("/products/{product_id}/stock")).await;
    assert_eq!(dec(&stock["stock"]["total_remaining"]), Decimal::from(40));
    assert_eq!(stock["stock"]["active_batches"], 1);

    let (_, history) = srv.get(&format!("/products/{product_id}/allocations")).await;
    assert_eq!(history["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn short_selection_requires_confirmation() {
    let srv = TestServer::spawn().await;
    let (product_id, a, _) = seed_stock(&srv).await;
    let path = format!("/products/{product_id}/allocations");
    let selections = json!([{ "batch_id": a, "quantity": "20" }]);

    let (status, body) = srv
        .post(&path, json!({ "required_quantity": "25", "selections": selections }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "confirmation_required");
    assert_eq!(body["review"]["fulfillment"], "partial");
    assert_eq!(dec(&body["review"]["difference"]), Decimal::from(-5));

    let (status, _) = srv
        .post(
            &path,
            json!({ "required_quantity": "25", "selections": selections, "confirm_partial": true }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn over_allocation_is_rejected_and_changes_nothing() {
    let srv = TestServer::spawn().await;
    let (product_id, a, b) = seed_stock(&srv).await;

    let (status, body) = srv
        .post(
            &format!("/products/{product_id}/allocations"),
            json!({
                "required_quantity": "36",
                "selections": [
                    { "batch_id": b, "quantity": "5" },
                    { "batch_id": a, "quantity": "31" },
                ],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invariant_violation");

    let (_, stock) = srv.get(&format!("/products/{product_id}/stock")).await;
    assert_eq!(dec(&stock["stock"]["total_remaining"]), Decimal::from(80));
}

#[tokio::test]
async fn oversized_batch_is_rejected_and_stock_stays_readable() {
    let srv = TestServer::spawn().await;
    let (product_id, _, _) = seed_stock(&srv).await;
    let (_, godowns) = srv.get("/godowns").await;
    let godown_id = godowns["items"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = srv
        .post(
            &format!("/products/{product_id}/batches"),
            json!({
                "godown_id": godown_id,
                "quantity": "100000000000000000000",
                "unit_price": "100000000000000000000",
                "purchase_date": "2023-06-01",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, stock) = srv.get(&format!("/products/{product_id}/stock")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&stock["stock"]["total_remaining"]), Decimal::from(80));

    let (status, suggestion) = srv
        .post(
            &format!("/products/{product_id}/allocations/suggest"),
            json!({ "required_quantity": "79000000000000000000000000000" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(suggestion["fulfillment"], "partial");
    assert_eq!(dec(&suggestion["cost"]), Decimal::from(900));
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.get("/products/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");

    let (status, body) = srv
        .get("/products/0190a8f2-0000-7000-8000-000000000000/stock")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn project_progress_payments_and_costs() {
    let srv = TestServer::spawn().await;
    let (product_id, a, _) = seed_stock(&srv).await;

    let customer = srv
        .create("/customers", json!({ "name": "R. Sharma", "phone": "98450 00000" }))
        .await;
    let project = srv
        .create(
            "/projects",
            json!({
                "customer_id": id(&customer),
                "name": "Rooftop 5kW",
                "capacity_kw": "5",
                "contract_value": "1000",
                "start_date": "2024-01-01",
                "end_date": "2024-01-31",
            }),
        )
        .await;
    let project_id = id(&project);

    let task = srv
        .create(
            &format!("/projects/{project_id}/tasks"),
            json!({ "name": "Mount structure", "start_date": "2024-01-01", "due_date": "2024-01-11" }),
        )
        .await;
    assert_eq!(task["status"], "not_started");

    let progress_path = format!("/projects/{project_id}/tasks/{}/progress", id(&task));
    let (status, task) = srv
        .post(&progress_path, json!({ "progress": 20, "on": "2024-01-06" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["status"], "in_progress");
    assert_eq!(task["expected_progress"], 50.0);
    assert_eq!(task["delay_days"], 0);
    assert_eq!(task["health"], json!({ "state": "behind" }));

    let (status, task) = srv
        .post(&progress_path, json!({ "progress": 100, "on": "2024-01-15" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["completed_on"], "2024-01-15");
    assert_eq!(task["health"], json!({ "state": "completed_late", "delay_days": 4 }));

    let (_, progress) = srv
        .get(&format!("/projects/{project_id}/progress?as_of=2024-01-16"))
        .await;
    assert_eq!(progress["completed_tasks"], 1);
    assert_eq!(progress["max_delay_days"], 4);
    assert_eq!(progress["expected_progress"], 50.0);
    assert_eq!(progress["variance"], 50.0);

    srv.create(
        &format!("/projects/{project_id}/payments"),
        json!({ "amount": "400", "paid_on": "2024-01-05", "method": "bank_transfer" }),
    )
    .await;
    let (status, _) = srv
        .post(
            &format!("/projects/{project_id}/payments"),
            json!({ "amount": "10", "paid_on": "2024-01-05", "method": "barter" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, summary) = srv.get(&format!("/projects/{project_id}/payments/summary")).await;
    assert_eq!(dec(&summary["outstanding"]), Decimal::from(600));
    assert_eq!(dec(&summary["paid_percent"]), Decimal::from(40));

    srv.create(
        &format!("/products/{product_id}/allocations"),
        json!({
            "required_quantity": "20",
            "selections": [{ "batch_id": a, "quantity": "20" }],
            "project_id": project_id,
        }),
    )
    .await;

    let (_, report) = srv.get(&format!("/projects/{project_id}/cost-report")).await;
    assert_eq!(dec(&report["material_cost"]), Decimal::from(200));
    assert_eq!(dec(&report["gross_margin"]), Decimal::from(800));
}
