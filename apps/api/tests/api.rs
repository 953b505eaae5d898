//! Router-level tests: real services on an in-memory database, an in-process
//! payment gateway that signs and verifies webhooks like the provider does.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use tower::ServiceExt;
use uuid::Uuid;

use smartsales_api::transcription::{Transcriber, TranscriptionError};
use smartsales_api::{build_router, AppState};
use smartsales_core::gateway::{
    CheckoutSession, GatewayError, GatewayEvent, PaymentGateway, SessionRequest, SessionStatus,
};
use smartsales_core::report::ReportParser;
use smartsales_core::{Client, OrderStatus, Product, Sale, SaleStatus};
use smartsales_db::{Database, DbConfig, SaleRepository};
use smartsales_gateway::{parse_event, verify_signature};

const WEBHOOK_SECRET: &str = "whsec_router_tests";
const USER: &str = "admin-1";

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Default)]
struct MockGateway {
    created: Mutex<Vec<SessionRequest>>,
    statuses: Mutex<VecDeque<SessionStatus>>,
}

impl MockGateway {
    fn queue_paid(&self, session_id: &str) {
        self.statuses.lock().unwrap().push_back(SessionStatus {
            session_id: session_id.to_string(),
            payment_status: "paid".to_string(),
            payment_intent_id: Some("pi_poll".to_string()),
            amount_total_cents: None,
            currency: Some("usd".to_string()),
        });
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_session(&self, request: SessionRequest) -> Result<CheckoutSession, GatewayError> {
        let mut created = self.created.lock().unwrap();
        created.push(request);
        let n = created.len();
        Ok(CheckoutSession {
            session_id: format!("cs_mock_{n}"),
            redirect_url: format!("https://pay.example.com/cs_mock_{n}"),
        })
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionStatus, GatewayError> {
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| GatewayError::Malformed(format!("no status queued for {session_id}")))
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<GatewayEvent, GatewayError> {
        verify_signature(payload, signature, WEBHOOK_SECRET, Utc::now().timestamp())?;
        parse_event(payload)
    }
}

/// Answers every transcription with a fixed result.
struct FixedTranscriber(Result<&'static str, ()>);

#[async_trait]
impl Transcriber for FixedTranscriber {
    async fn transcribe(&self, _audio: Vec<u8>, _content_type: Option<&str>) -> Result<String, TranscriptionError> {
        self.0.map(String::from).map_err(|_| TranscriptionError::Unrecognized)
    }
}

struct TestApp {
    router: Router,
    db: Database,
    gateway: Arc<MockGateway>,
}

async fn test_app_with(transcriber: Option<FixedTranscriber>) -> TestApp {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let gateway = Arc::new(MockGateway::default());
    let mut state = AppState::new(db.clone(), gateway.clone(), "usd")
        .unwrap()
        .with_report_parser(ReportParser::with_today(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()));
    if let Some(t) = transcriber {
        state = state.with_transcriber(Arc::new(t));
    }
    TestApp {
        router: build_router(Arc::new(state)),
        db,
        gateway,
    }
}

async fn test_app() -> TestApp {
    test_app_with(None).await
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
        (status, headers, body)
    }

    async fn json(&self, method: Method, uri: &str, identity: (&str, &str), body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri).header(identity.0, identity.1);
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let (status, _, bytes) = self.send(builder.body(body).unwrap()).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn webhook(&self, payload: &Value, secret: &str) -> (StatusCode, Value) {
        let body = payload.to_string();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/webhooks/stripe")
            .header("stripe-signature", sign(body.as_bytes(), secret))
            .body(Body::from(body))
            .unwrap();
        let (status, _, bytes) = self.send(request).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn client(&self, name: &str, email: &str) -> Client {
        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            address: None,
            is_active: true,
            created_at: Utc::now(),
        };
        self.db.clients().insert(&client).await.unwrap()
    }

    async fn product(&self, name: &str, price_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: None,
            category_id: None,
            price_cents,
            stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.db.products().insert(&product).await.unwrap()
    }

    async fn stock_of(&self, product_id: &str) -> i64 {
        self.db.products().get_by_id(product_id).await.unwrap().unwrap().stock
    }
}

fn sign(payload: &[u8], secret: &str) -> String {
    let t = Utc::now().timestamp();
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{t}.").as_bytes());
    mac.update(payload);
    format!("t={t},v1={}", hex::encode(mac.finalize().into_bytes()))
}

fn session_event(kind: &str, session_id: &str) -> Value {
    json!({
        "id": format!("evt_{}", Uuid::new_v4()),
        "type": kind,
        "data": { "object": { "id": session_id, "payment_intent": "pi_webhook" } }
    })
}

fn as_client(id: &str) -> (&'static str, &str) {
    ("x-client-id", id)
}

fn as_user() -> (&'static str, &'static str) {
    ("x-user-id", USER)
}

// =============================================================================
// Health / identity
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = test_app().await;
    let (status, body) = app.json(Method::GET, "/health", ("x-trace", "1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_identity_is_unauthorized() {
    let app = test_app().await;
    let (status, body) = app.json(Method::GET, "/cart", ("x-trace", "1"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

// =============================================================================
// Reports
// =============================================================================

async fn seed_march_sales(app: &TestApp) {
    let ana = app.client("Ana", "ana@example.com").await;
    let mouse = app.product("Mouse", 1500, 50).await;
    let pad = app.product("Pad", 300, 50).await;

    let mut conn = app.db.pool().acquire().await.unwrap();
    for (product, qty, day) in [(&mouse, 2, 3), (&mouse, 1, 15), (&pad, 4, 20)] {
        let sold_at = Utc.with_ymd_and_hms(2024, 3, day, 10, 0, 0).unwrap();
        let mut sale = Sale {
            id: Uuid::new_v4().to_string(),
            client_id: ana.id.clone(),
            product_id: product.id.clone(),
            quantity: qty,
            unit_price_cents: product.price_cents,
            total_cents: 0,
            status: SaleStatus::Completed,
            sold_at,
            updated_at: sold_at,
        };
        sale.recompute_total();
        SaleRepository::insert(&mut conn, &sale).await.unwrap();
    }
}

#[tokio::test]
async fn test_text_report_json_and_history() {
    let app = test_app().await;
    seed_march_sales(&app).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/reports/text")
        .header("x-user-id", USER)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "prompt": "ventas agrupadas por producto del mes de marzo" }).to_string(),
        ))
        .unwrap();
    let (status, headers, bytes) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert!(headers.contains_key("x-report-id"));
    assert!(!headers.contains_key(header::CONTENT_DISPOSITION));

    let doc: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(doc["group_by"], "product");
    assert_eq!(doc["row_count"], 2);
    // Ordered by total: Mouse 45.00, Pad 12.00
    assert_eq!(doc["rows"][0]["product_name"], "Mouse");
    assert_eq!(doc["rows"][0]["units_sold"], 3);
    assert_eq!(doc["rows"][0]["total_amount"], 45.0);

    let (status, history) = app.json(Method::GET, "/reports/history", as_user(), None).await;
    assert_eq!(status, StatusCode::OK);
    let reports = history["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["row_count"], 2);
    assert_eq!(reports[0]["format"], "JSON");
}

#[tokio::test]
async fn test_text_report_pdf_download() {
    let app = test_app().await;
    seed_march_sales(&app).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/reports/text")
        .header("x-user-id", USER)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "prompt": "ventas de marzo", "format": "pdf" }).to_string()))
        .unwrap();
    let (status, headers, bytes) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"report_"));
    assert!(disposition.ends_with(".pdf\""));
    assert!(bytes.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_text_report_validation() {
    let app = test_app().await;

    let (status, body) = app
        .json(Method::POST, "/reports/text", as_user(), Some(json!({ "prompt": "   " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .json(
            Method::POST,
            "/reports/text",
            as_user(),
            Some(json!({ "prompt": "ventas", "format": "csv" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn voice_request(audio: &[u8]) -> Request<Body> {
    let boundary = "smartsales-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"cmd.wav\"\r\n\
             Content-Type: audio/wav\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(audio);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/reports/voice")
        .header("x-user-id", USER)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_voice_report_runs_transcribed_text() {
    let app = test_app_with(Some(FixedTranscriber(Ok("ventas agrupadas por cliente")))).await;
    seed_march_sales(&app).await;

    let (status, _, bytes) = app.send(voice_request(b"RIFF....WAVE")).await;
    assert_eq!(status, StatusCode::OK);

    let doc: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(doc["group_by"], "client");
    assert_eq!(doc["original_text"], "ventas agrupadas por cliente");
    assert_eq!(doc["rows"][0]["client_name"], "Ana");
}

#[tokio::test]
async fn test_voice_report_surfaces_transcription_errors() {
    let app = test_app_with(Some(FixedTranscriber(Err(())))).await;
    let (status, _, bytes) = app.send(voice_request(b"noise")).await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNRECOGNIZED_AUDIO");

    // Nothing was generated
    let (_, history) = app.json(Method::GET, "/reports/history", as_user(), None).await;
    assert!(history["reports"].as_array().unwrap().is_empty());

    let unconfigured = test_app().await;
    let (status, _, bytes) = unconfigured.send(voice_request(b"RIFF")).await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
}

// =============================================================================
// Cart → checkout → webhook
// =============================================================================

#[tokio::test]
async fn test_cart_checkout_and_completed_webhook() {
    let app = test_app().await;
    let ana = app.client("Ana", "ana@example.com").await;
    let mouse = app.product("Mouse", 1500, 5).await;

    let (status, cart) = app
        .json(
            Method::POST,
            "/cart/items",
            as_client(&ana.id),
            Some(json!({ "product_id": mouse.id, "quantity": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["summary"]["total_quantity"], 3);
    assert_eq!(cart["summary"]["total_price_cents"], 4500);

    let (status, receipt) = app.json(Method::POST, "/cart/checkout", as_client(&ana.id), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt["total_cents"], 4500);
    assert_eq!(receipt["session_id"], "cs_mock_1");
    assert_eq!(app.gateway.created.lock().unwrap().len(), 1);

    let (_, orders) = app.json(Method::GET, "/orders", as_client(&ana.id), None).await;
    assert_eq!(orders[0]["status"], "pending");

    let (status, ack) = app
        .webhook(&session_event("checkout.session.completed", "cs_mock_1"), WEBHOOK_SECRET)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["outcome"], "completed");
    assert_eq!(ack["sales_created"], 1);

    let (_, cart) = app.json(Method::GET, "/cart", as_client(&ana.id), None).await;
    assert!(cart["items"].as_array().unwrap().is_empty());

    let (_, order) = app
        .json(
            Method::GET,
            &format!("/orders/{}", receipt["order_id"].as_str().unwrap()),
            as_client(&ana.id),
            None,
        )
        .await;
    assert_eq!(order["status"], "completed");

    // Checkout never touches stock
    assert_eq!(app.stock_of(&mouse.id).await, 5);

    // Redelivery is acknowledged without a second sale
    let (status, ack) = app
        .webhook(&session_event("checkout.session.completed", "cs_mock_1"), WEBHOOK_SECRET)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["outcome"], "ignored");
    assert_eq!(app.db.sales().list_for_client(&ana.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_expired_webhook_cancels_order() {
    let app = test_app().await;
    let ana = app.client("Ana", "ana@example.com").await;
    let mouse = app.product("Mouse", 1500, 5).await;

    app.json(
        Method::POST,
        "/cart/items",
        as_client(&ana.id),
        Some(json!({ "product_id": mouse.id, "quantity": 2 })),
    )
    .await;
    let (_, receipt) = app.json(Method::POST, "/cart/checkout", as_client(&ana.id), None).await;

    let (status, ack) = app
        .webhook(&session_event("checkout.session.expired", "cs_mock_1"), WEBHOOK_SECRET)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["outcome"], "expired");

    let payment_uri = format!("/payments/{}/status", receipt["payment_id"].as_str().unwrap());
    let (_, payment) = app.json(Method::GET, &payment_uri, as_client(&ana.id), None).await;
    assert_eq!(payment["status"], "failed");

    let stored = app.db.payments().get_by_session("cs_mock_1").await.unwrap().unwrap();
    assert_eq!(stored.order_id.as_deref(), receipt["order_id"].as_str());
    let order = app.db.orders().get_by_id(receipt["order_id"].as_str().unwrap()).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);

    // Cart kept for another attempt, no sales
    let (_, cart) = app.json(Method::GET, "/cart", as_client(&ana.id), None).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert!(app.db.sales().list_for_client(&ana.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_webhook_rejections_and_ignored_events() {
    let app = test_app().await;

    let event = session_event("checkout.session.completed", "cs_unknown");
    let (status, body) = app.webhook(&event, "whsec_wrong").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_SIGNATURE");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/webhooks/stripe")
        .body(Body::from(event.to_string()))
        .unwrap();
    let (status, _, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Verified but unmatched or uninteresting events are acknowledged
    let (status, ack) = app.webhook(&event, WEBHOOK_SECRET).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["outcome"], "ignored");

    let other = json!({ "id": "evt_x", "type": "invoice.paid", "data": { "object": {} } });
    let (status, ack) = app.webhook(&other, WEBHOOK_SECRET).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["received"], true);
}

#[tokio::test]
async fn test_checkout_rejections() {
    let app = test_app().await;
    let ana = app.client("Ana", "ana@example.com").await;
    let mouse = app.product("Mouse", 1500, 2).await;

    let (status, body) = app.json(Method::POST, "/cart/checkout", as_client(&ana.id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CART_ERROR");

    let (status, body) = app
        .json(
            Method::POST,
            "/cart/items",
            as_client(&ana.id),
            Some(json!({ "product_id": mouse.id, "quantity": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    assert!(app.gateway.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cart_item_update_and_remove() {
    let app = test_app().await;
    let ana = app.client("Ana", "ana@example.com").await;
    let mouse = app.product("Mouse", 1500, 10).await;
    let pad = app.product("Pad", 300, 10).await;

    for product in [&mouse, &pad] {
        app.json(
            Method::POST,
            "/cart/items",
            as_client(&ana.id),
            Some(json!({ "product_id": product.id })),
        )
        .await;
    }
    let (_, cart) = app.json(Method::GET, "/cart", as_client(&ana.id), None).await;
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let mouse_item = items
        .iter()
        .find(|i| i["product_id"] == mouse.id.as_str())
        .unwrap()["item_id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, cart) = app
        .json(
            Method::PATCH,
            &format!("/cart/items/{mouse_item}"),
            as_client(&ana.id),
            Some(json!({ "quantity": 4 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["summary"]["total_quantity"], 5);

    let (status, cart) = app
        .json(Method::DELETE, &format!("/cart/items/{mouse_item}"), as_client(&ana.id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["summary"]["total_items"], 1);

    // Another client cannot see the row
    let luis = app.client("Luis", "luis@example.com").await;
    let (status, _) = app
        .json(Method::DELETE, &format!("/cart/items/{mouse_item}"), as_client(&luis.id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, cleared) = app.json(Method::DELETE, "/cart", as_client(&ana.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["removed"], 1);
}

// =============================================================================
// Payments
// =============================================================================

#[tokio::test]
async fn test_direct_amount_session_settles_on_poll() {
    let app = test_app().await;
    let ana = app.client("Ana", "ana@example.com").await;

    let (status, receipt) = app
        .json(
            Method::POST,
            "/payments/session",
            as_client(&ana.id),
            Some(json!({ "amount_cents": 2500, "description": "Deposit" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt["total_cents"], 2500);

    app.gateway.queue_paid(receipt["session_id"].as_str().unwrap());
    let payment_uri = format!("/payments/{}/status", receipt["payment_id"].as_str().unwrap());
    let (status, payment) = app.json(Method::GET, &payment_uri, as_client(&ana.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payment["status"], "completed");

    // Other clients cannot poll it
    let luis = app.client("Luis", "luis@example.com").await;
    let (status, _) = app.json(Method::GET, &payment_uri, as_client(&luis.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .json(
            Method::POST,
            "/payments/session",
            as_client(&ana.id),
            Some(json!({ "amount_cents": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Direct sales
// =============================================================================

#[tokio::test]
async fn test_direct_sale_lifecycle() {
    let app = test_app().await;
    let ana = app.client("Ana", "ana@example.com").await;
    let mouse = app.product("Mouse", 1500, 5).await;

    let (status, sale) = app
        .json(
            Method::POST,
            "/sales",
            as_user(),
            Some(json!({ "client_id": ana.id, "product_id": mouse.id, "quantity": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sale["total_cents"], 3000);
    assert_eq!(app.stock_of(&mouse.id).await, 3);

    let (status, body) = app
        .json(
            Method::POST,
            "/sales",
            as_user(),
            Some(json!({ "client_id": ana.id, "product_id": mouse.id, "quantity": 4 })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    assert_eq!(app.stock_of(&mouse.id).await, 3);

    let (status, stats) = app.json(Method::GET, "/sales/stats", as_user(), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_sales"], 1);
    assert_eq!(stats["best_selling_product"], "Mouse");

    let (status, listed) = app.json(Method::GET, "/sales?limit=10", as_user(), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let sale_uri = format!("/sales/{}", sale["id"].as_str().unwrap());
    let (status, _) = app.json(Method::DELETE, &sale_uri, as_user(), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.stock_of(&mouse.id).await, 5);

    let (status, body) = app.json(Method::DELETE, &sale_uri, as_user(), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}
