use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, NewUser, Role};
use migration::MigratorTrait;
use server::{ServerState, WelcomeNotifier, router};

const ADMIN: (&str, &str) = ("admin@haulage.test", "admin-pass");
const OWNER: (&str, &str) = ("owner@haulage.test", "owner-pass");
const DRIVER: (&str, &str) = ("driver@haulage.test", "driver-pass");

async fn app() -> (Router, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    for ((email, password), role) in [(ADMIN, Role::Admin), (OWNER, Role::Owner), (DRIVER, Role::Driver)] {
        let hash = bcrypt::hash(password, 4).unwrap();
        engine
            .provision_user(NewUser::new(email, role, hash).name("Test", role.label()))
            .await
            .unwrap();
    }
    let state = ServerState::new(engine, WelcomeNotifier::Log).password_cost(4);
    (router(state), db)
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    credentials: Option<(&str, &str)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some((user, password)) = credentials {
        let token = STANDARD.encode(format!("{user}:{password}"));
        request = request.header(header::AUTHORIZATION, format!("Basic {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn order_body() -> Value {
    let pickup = Utc::now() + Duration::days(1);
    json!({
        "pickup": {"location": "Pune MIDC", "contact": "Kiran", "phone": "+91 98200 00001"},
        "delivery": {"location": "Nagpur Depot", "contact": "Farah", "phone": "+91 98200 00002"},
        "pickup_date": pickup.to_rfc3339(),
        "estimated_delivery_date": (pickup + Duration::days(2)).to_rfc3339(),
        "load_type": "Steel coils",
        "weight_kg": 12000,
        "total_amount_minor": 5_000_000,
        "advance_amount_minor": 1_000_000
    })
}

#[tokio::test]
async fn requests_without_valid_credentials_are_unauthorized() {
    let (app, _db) = app().await;

    let (status, _) = call(&app, Method::GET, "/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, Method::GET, "/orders", Some((ADMIN.0, "wrong")), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &app,
        Method::GET,
        "/orders",
        Some(("ghost@haulage.test", "x")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, Method::GET, "/orders", Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn inactive_users_and_unknown_roles_are_unauthorized() {
    let (app, db) = app().await;

    db.execute_unprepared("UPDATE users SET is_active = 0 WHERE email = 'owner@haulage.test'")
        .await
        .unwrap();
    let (status, _) = call(&app, Method::GET, "/users/profile", Some(OWNER), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    db.execute_unprepared("UPDATE users SET role = 'dispatcher' WHERE email = 'driver@haulage.test'")
        .await
        .unwrap();
    let (status, _) = call(&app, Method::GET, "/users/profile", Some(DRIVER), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn owner_creates_and_tracks_an_order() {
    let (app, _db) = app().await;

    let (status, order) = call(&app, Method::POST, "/orders", Some(OWNER), Some(order_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(order["order_number"].as_str().unwrap().starts_with("TRANS"));
    assert_eq!(order["balance_amount_minor"], 4_000_000);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["status_display"], "Pending");
    let id = order["id"].as_str().unwrap().to_string();

    let (status, listing) = call(&app, Method::GET, "/orders", Some(OWNER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["count"], 1);

    let (status, moved) = call(
        &app,
        Method::POST,
        &format!("/orders/{id}/status"),
        Some(OWNER),
        Some(json!({"status": "in_transit"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["status_display"], "In Transit");

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/orders/{id}/status"),
        Some(OWNER),
        Some(json!({"status": "lost"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid status: lost");

    let (status, timeline) = call(
        &app,
        Method::GET,
        &format!("/orders/{id}/timeline"),
        Some(OWNER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(timeline["count"], 3);
}

#[tokio::test]
async fn order_errors_map_to_http_statuses() {
    let (app, _db) = app().await;

    let mut bad = order_body();
    bad["advance_amount_minor"] = json!(9_000_000);
    let (status, body) = call(&app, Method::POST, "/orders", Some(OWNER), Some(bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Advance amount cannot be greater than total amount."
    );

    let (status, body) = call(&app, Method::POST, "/orders", Some(DRIVER), Some(order_body())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"],
        "you do not have permission to perform this action"
    );

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/orders/{}", uuid::Uuid::new_v4()),
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "order not exists");

    let (status, body) = call(&app, Method::POST, "/orders", Some(ADMIN), Some(order_body())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "owner_id is required");

    let (status, _) = call(
        &app,
        Method::POST,
        "/transfers",
        Some(OWNER),
        Some(json!({"order_id": uuid::Uuid::new_v4(), "transfer_type": "sideways", "amount_minor": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn driver_transfer_needs_an_assigned_driver() {
    let (app, _db) = app().await;
    let (_, order) = call(&app, Method::POST, "/orders", Some(OWNER), Some(order_body())).await;
    let id = order["id"].as_str().unwrap().to_string();

    let transfer = json!({"order_id": id, "transfer_type": "to_driver", "amount_minor": 250_000});
    let (status, body) = call(&app, Method::POST, "/transfers", Some(ADMIN), Some(transfer.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No driver assigned to this order.");

    let (_, drivers) = call(&app, Method::GET, "/users/drivers", Some(ADMIN), None).await;
    let driver_id = drivers["results"][0]["id"].clone();
    let (status, updated) = call(
        &app,
        Method::PATCH,
        &format!("/orders/{id}"),
        Some(ADMIN),
        Some(json!({"driver_id": driver_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["driver_id"], driver_id);

    let (status, created) = call(&app, Method::POST, "/transfers", Some(ADMIN), Some(transfer)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "completed");
    assert_eq!(created["transfer_type_display"], "To Driver");

    let (status, cleared) = call(
        &app,
        Method::PATCH,
        &format!("/orders/{id}"),
        Some(ADMIN),
        Some(json!({"driver_id": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["driver_id"], Value::Null);
}

#[tokio::test]
async fn admin_manages_users() {
    let (app, _db) = app().await;
    let new_user = json!({
        "email": "new.driver@haulage.test",
        "password": "secret",
        "role": "driver",
        "first_name": "Imran",
        "last_name": "Shaikh"
    });

    let (status, created) = call(&app, Method::POST, "/users", Some(ADMIN), Some(new_user.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["full_name"], "Imran Shaikh");
    assert_eq!(created["role_display"], "Driver");

    let (status, _) = call(&app, Method::POST, "/users", Some(ADMIN), Some(new_user)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, profile) = call(
        &app,
        Method::GET,
        "/users/profile",
        Some(("new.driver@haulage.test", "secret")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "new.driver@haulage.test");

    let (status, _) = call(
        &app,
        Method::POST,
        "/users",
        Some(OWNER),
        Some(json!({"email": "x@haulage.test", "password": "p", "role": "owner"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The role gate runs before the body is validated or hashed.
    let (status, body) = call(
        &app,
        Method::POST,
        "/users",
        Some(DRIVER),
        Some(json!({"email": "y@haulage.test", "password": "", "role": "dispatcher"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"],
        "you do not have permission to perform this action"
    );

    let (status, directory) = call(&app, Method::GET, "/users", Some(OWNER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(directory["count"], 3);

    let id = created["id"].as_str().unwrap().to_string();
    let (status, _) = call(&app, Method::DELETE, &format!("/users/{id}"), Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn dashboards_start_empty() {
    let (app, _db) = app().await;

    let (status, stats) = call(&app, Method::GET, "/dashboard/stats", Some(DRIVER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_orders"], 0);
    assert_eq!(stats["total_profit_minor"], 0);
    assert_eq!(stats["recent_orders"], json!([]));

    let (status, owner) = call(&app, Method::GET, "/dashboard/owner", Some(OWNER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(owner["truck_count"], 0);
    assert_eq!(owner["revenue_by_month"], json!([]));

    let (status, _) = call(&app, Method::GET, "/dashboard/owner", Some(DRIVER), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
