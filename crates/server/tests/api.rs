use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for username in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![username.into(), "secret".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    server::app(engine, db)
}

fn basic(username: &str, password: &str) -> String {
    let encoded =
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {encoded}")
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: &str,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic(user, "secret"));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    user: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, user, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn office_config() -> Value {
    json!({
        "name": "Office",
        "cleaning_cost": "10",
        "products_per_day": 50,
        "ingredients": {"coffee_beans": 20.0, "milk": "1.2"},
        "drinks": [
            {"name": "Espresso", "ingredients": {"coffee_beans": 0.007}, "vending_price": 1.2},
            {"name": "Latte", "ingredients": {"coffee_beans": 0.007, "milk": 0.15}, "vending_price": ""}
        ]
    })
}

#[tokio::test]
async fn requests_need_valid_credentials() {
    let app = test_app().await;

    let request = Request::builder()
        .uri("/configs")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/configs")
        .header(header::AUTHORIZATION, basic("alice", "wrong"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/configs")
        .header(header::AUTHORIZATION, basic("alice", "secre"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn calculate_returns_breakdown_and_profit() {
    let app = test_app().await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/calculate",
        "alice",
        Some(json!({
            "cleaning_cost": 10,
            "products_per_day": 50,
            "ingredients": {"coffee_beans": 20},
            "tea_bags": {"Mint": 0.1},
            "drinks": [
                {"name": "Espresso", "ingredients": {"coffee_beans": 0.007}, "vending_price": 1.0},
                {"name": "Empty"},
                {"name": "Mint Tea", "tea_bags": {"Mint": "1"}}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    let espresso = &results[0];
    assert_eq!(espresso["name"], "Espresso");
    assert!((espresso["total_cost"].as_f64().unwrap() - 0.34).abs() < 1e-9);
    assert_eq!(espresso["breakdown"][0]["display_name"], "Coffee Beans");
    assert_eq!(espresso["breakdown"][0]["amount_display"], "7.0 g");
    assert_eq!(espresso["breakdown"][1]["kind"], "cleaning");
    assert_eq!(espresso["breakdown"][1]["amount_display"], "Per product");
    assert!((espresso["profit"]["profit"].as_f64().unwrap() - 0.66).abs() < 1e-9);
    assert_eq!(espresso["profit"]["is_loss"], false);

    let tea = &results[1];
    assert_eq!(tea["breakdown"][0]["kind"], "per_unit");
    assert!(tea["profit"].is_null());
}

#[tokio::test]
async fn calculate_accepts_flat_cost_inputs() {
    let app = test_app().await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/calculate",
        "alice",
        Some(json!({
            "cleaning_cost": 10,
            "products_per_day": 50,
            "ingredients": {"coffee_beans": 20},
            "drinks": [{"name": "Espresso", "ingredients": {"coffee_beans": 0.007}}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let espresso = &body["results"][0];
    assert!((espresso["breakdown"][0]["total_cost"].as_f64().unwrap() - 0.14).abs() < 1e-9);
    assert!((espresso["cleaning_cost_per_product"].as_f64().unwrap() - 0.2).abs() < 1e-9);
    assert!((espresso["total_cost"].as_f64().unwrap() - 0.34).abs() < 1e-9);
    assert!(espresso["profit"].is_null());
}

#[tokio::test]
async fn calculate_uses_stored_tea_bags() {
    let app = test_app().await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/tea-bags",
        "alice",
        Some(json!({"name": "Earl Grey", "cost_per_unit": "0.15"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_json(
        &app,
        "POST",
        "/calculate",
        "alice",
        Some(json!({"drinks": [{"name": "Tea", "tea_bags": {"Earl Grey": 2}}]})),
    )
    .await;
    assert!((body["results"][0]["total_cost"].as_f64().unwrap() - 0.3).abs() < 1e-9);
}

#[tokio::test]
async fn export_returns_csv_attachment() {
    let app = test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/calculate/export")
        .header(header::AUTHORIZATION, basic("alice", "secret"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "ingredients": {"coffee_beans": 20},
                "drinks": [{"name": "Espresso", "ingredients": {"coffee_beans": 0.007}}]
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"vending_costs_"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.starts_with("drink,item,kind,amount,unit_cost,total_cost"));
    assert!(csv.contains("Espresso,TOTAL,total,,,0.1400,,,"));

    let (status, body) = send_json(
        &app,
        "POST",
        "/calculate/export",
        "alice",
        Some(json!({"drinks": [{"name": ""}]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn configurations_are_saved_and_shared() {
    let app = test_app().await;

    let (status, saved) =
        send_json(&app, "POST", "/configs", "alice", Some(office_config())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved["created"], true);
    let id = saved["id"].as_str().unwrap().to_string();

    let mut update = office_config();
    update["id"] = json!(id);
    update["cleaning_cost"] = json!(12);
    let (status, saved) = send_json(&app, "POST", "/configs", "alice", Some(update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["created"], false);
    assert_eq!(saved["id"], id.as_str());

    let (status, _) = send_json(&app, "POST", "/configs", "alice", Some(office_config())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, view) = send_json(&app, "GET", &format!("/configs/{id}"), "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["access"], "owner");
    assert_eq!(view["cleaning_cost"], 12.0);
    assert_eq!(view["products_per_day"], 50);
    assert_eq!(view["ingredients"]["milk"], 1.2);
    assert_eq!(view["drinks"][1]["vending_price"], Value::Null);

    let (status, _) = send_json(&app, "GET", &format!("/configs/{id}"), "bob", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/configs/{id}/share"),
        "alice",
        Some(json!({"username": "bob"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = send_json(&app, "GET", "/configs", "bob", None).await;
    assert_eq!(list["configs"][0]["access"], "viewer");
    assert_eq!(list["configs"][0]["owner"], "alice");
    assert_eq!(list["configs"][0]["drinks_count"], 2);

    let (_, shared) = send_json(
        &app,
        "GET",
        &format!("/configs/{id}/shared-users"),
        "alice",
        None,
    )
    .await;
    assert_eq!(shared["shared_users"], json!([{"username": "bob", "can_edit": false}]));

    let (status, _) = send_json(&app, "DELETE", &format!("/configs/{id}"), "bob", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/configs/{id}/unshare/bob"),
        "alice",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send_json(&app, "GET", &format!("/configs/{id}"), "bob", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(&app, "DELETE", &format!("/configs/{id}"), "alice", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, list) = send_json(&app, "GET", "/configs", "alice", None).await;
    assert_eq!(list["configs"], json!([]));
}

#[tokio::test]
async fn readings_produce_sales_balance_and_statistics() {
    let app = test_app().await;

    let (_, saved) = send_json(&app, "POST", "/configs", "alice", Some(office_config())).await;
    let id = saved["id"].as_str().unwrap().to_string();

    let (status, first) = send_json(
        &app,
        "POST",
        "/counter-readings",
        "alice",
        Some(json!({
            "config_id": id,
            "counter_data": {"Espresso": 10, "Latte": 4},
            "cash_in_register": 50
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["sales_calculated"], json!([]));

    let (status, second) = send_json(
        &app,
        "POST",
        "/counter-readings",
        "alice",
        Some(json!({
            "config_id": id,
            "counter_data": {"Espresso": "15", "Latte": 2},
            "cash_in_register": "56.00",
            "notes": "  weekly  "
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let espresso = &second["sales_calculated"][0];
    assert_eq!(espresso["product"], "Espresso");
    assert_eq!(espresso["units_sold"], 5);
    assert_eq!(espresso["price_source"], "recorded");
    assert!((espresso["revenue"].as_f64().unwrap() - 6.0).abs() < 1e-9);
    assert_eq!(second["counter_resets"], json!(["Latte"]));

    let (status, _) = send_json(
        &app,
        "POST",
        "/cash-register/events",
        "alice",
        Some(json!({"event_type": "withdrawal", "amount": 6, "config_id": id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, balance) = send_json(
        &app,
        "GET",
        &format!("/cash-register/balance?config_id={id}"),
        "alice",
        None,
    )
    .await;
    assert_eq!(balance["expected_cash"], 50.0);
    assert_eq!(balance["actual_cash"], 56.0);
    assert_eq!(balance["difference"], 6.0);
    assert_eq!(balance["status"], "warning");

    let (_, events) = send_json(
        &app,
        "GET",
        &format!("/cash-register/events?config_id={id}"),
        "alice",
        None,
    )
    .await;
    assert_eq!(events["events"][0]["event_type"], "withdrawal");

    let (_, stats) = send_json(
        &app,
        "GET",
        &format!("/sales-statistics?config_id={id}&days=7"),
        "alice",
        None,
    )
    .await;
    assert_eq!(stats["readings_count"], 2);
    assert_eq!(stats["period_days"], 7);
    assert_eq!(stats["total_items_sold"], 5);
    assert_eq!(stats["products"][0]["name"], "Espresso");

    let (_, readings) = send_json(
        &app,
        "GET",
        &format!("/counter-readings?config_id={id}"),
        "alice",
        None,
    )
    .await;
    let readings = readings["readings"].as_array().unwrap();
    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0]["notes"], "weekly");
    let latest = readings[0]["id"].as_str().unwrap();

    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/counter-readings/{latest}"),
        "bob",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/counter-readings/{latest}"),
        "alice",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn invalid_input_is_rejected() {
    let app = test_app().await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/cash-register/events",
        "alice",
        Some(json!({"event_type": "deposit", "amount": "0"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    let (status, _) = send_json(
        &app,
        "POST",
        "/counter-readings",
        "alice",
        Some(json!({"counter_data": {"Espresso": -1}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send_json(
        &app,
        "POST",
        "/configs",
        "alice",
        Some(json!({"name": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send_json(
        &app,
        "GET",
        "/cash-register/balance?config_id=7f0c43b4-5bd6-4f4e-8bd4-6e4a3c9b5c11",
        "alice",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(&app, "DELETE", "/tea-bags/not-a-uuid", "alice", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
