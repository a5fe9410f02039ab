use actix_web::{App, http::StatusCode, test, web::Data};
use serde_json::{Value, json};
use std::net::SocketAddr;

use crate::config::Config;
use crate::routes;
use crate::store::test_utils::{FixedClock, TestStores, day};

pub(crate) fn test_config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".into(),
        data_dir: String::new(),
        database_url: None,
        jwt_secret: "test-secret".into(),
        access_token_ttl: 3600,
        rate_login_per_min: 1000,
        rate_protected_per_min: 10_000,
        api_prefix: "/api".into(),
        log_dir: "logs".into(),
        hash_passwords: false,
    }
}

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

fn api(req: test::TestRequest, uri: &str, token: &str) -> test::TestRequest {
    req.uri(uri)
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {token}")))
}

macro_rules! test_app {
    ($stores:expr, $config:expr) => {{
        let config = $config;
        test::init_service(
            App::new()
                .app_data(Data::new(config.clone()))
                .app_data(Data::new($stores.settings.clone()))
                .app_data(Data::new($stores.directory.clone()))
                .app_data(Data::new($stores.ledger.clone()))
                .configure(move |cfg| routes::configure(cfg, config)),
        )
        .await
    }};
}

macro_rules! login {
    ($app:expr, $username:expr, $password:expr) => {{
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .peer_addr(peer())
            .set_json(json!({ "username": $username, "password": $password }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body["accessToken"].as_str().expect("access token").to_string()
    }};
}

macro_rules! create_staff {
    ($app:expr, $token:expr, $username:expr, $full_name:expr) => {{
        let req = api(test::TestRequest::post(), "/api/staff", &$token)
            .set_json(json!({
                "username": $username,
                "password": "Welcome@1",
                "fullName": $full_name,
                "designation": "Teacher",
                "dailyWage": 1500.0
            }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        body["id"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn login_returns_token_and_hides_password() {
    let stores = TestStores::open(FixedClock::at(day(2026, 3, 2), 8, 0)).await;
    let app = test_app!(stores, test_config());

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .peer_addr(peer())
        .set_json(json!({ "username": "admin", "password": "Admin@123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["accessToken"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["id"], "admin-001");
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("password").is_none());
}

#[actix_web::test]
async fn login_failures_share_one_response() {
    let stores = TestStores::open(FixedClock::at(day(2026, 3, 2), 8, 0)).await;
    let app = test_app!(stores, test_config());

    let mut bodies = Vec::new();
    for (username, password) in [("admin", "wrong"), ("nobody", "Admin@123")] {
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .peer_addr(peer())
            .set_json(json!({ "username": username, "password": password }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        bodies.push(body);
    }

    assert_eq!(bodies[0], json!({ "message": "Invalid credentials" }));
    assert_eq!(bodies[0], bodies[1]);
}

#[actix_web::test]
async fn protected_routes_require_a_token() {
    let stores = TestStores::open(FixedClock::at(day(2026, 3, 2), 8, 0)).await;
    let app = test_app!(stores, test_config());

    let req = test::TestRequest::get().uri("/api/me").peer_addr(peer()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = api(test::TestRequest::get(), "/api/me", "not-a-jwt").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn staff_day_from_check_in_to_check_out() {
    let stores = TestStores::open(FixedClock::at(day(2026, 3, 2), 9, 14)).await;
    let app = test_app!(stores, test_config());

    let admin = login!(app, "admin", "Admin@123");
    let jane_id = create_staff!(app, admin, "jane", "Jane Doe");
    let jane = login!(app, "jane", "Welcome@1");

    // nothing yet today
    let req = api(test::TestRequest::get(), "/api/attendance/today", &jane).to_request();
    let today: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(today, Value::Null);

    let req = api(test::TestRequest::post(), "/api/attendance/check-in", &jane)
        .set_json(json!({ "photo": "img-in" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let record: Value = test::read_body_json(resp).await;
    assert_eq!(record["status"], "present");
    assert_eq!(record["userId"], jane_id.as_str());
    assert_eq!(record["userName"], "Jane Doe");
    assert_eq!(record["date"], "2026-03-02");

    // second check-in the same day is refused
    let req = api(test::TestRequest::post(), "/api/attendance/check-in", &jane)
        .set_json(json!({ "photo": "img-in-again" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Already checked in today");

    stores.clock.set(day(2026, 3, 2), 17, 30);
    let req = api(test::TestRequest::post(), "/api/attendance/check-out", &jane)
        .set_json(json!({ "photo": "img-out" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let record: Value = test::read_body_json(resp).await;
    assert_eq!(record["workingHours"], json!(8.27));
    assert_eq!(record["checkOutPhoto"], "img-out");

    // already checked out
    let req = api(test::TestRequest::post(), "/api/attendance/check-out", &jane)
        .set_json(json!({ "photo": "img-out-again" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = api(test::TestRequest::get(), "/api/attendance/history", &jane).to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn late_check_in_after_grace() {
    let stores = TestStores::open(FixedClock::at(day(2026, 3, 2), 9, 16)).await;
    let app = test_app!(stores, test_config());

    let admin = login!(app, "admin", "Admin@123");
    create_staff!(app, admin, "ram", "Ram Thapa");
    let ram = login!(app, "ram", "Welcome@1");

    let req = api(test::TestRequest::post(), "/api/attendance/check-in", &ram)
        .set_json(json!({ "photo": "img" }))
        .to_request();
    let record: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(record["status"], "late");
}

#[actix_web::test]
async fn cancelled_capture_records_nothing() {
    let stores = TestStores::open(FixedClock::at(day(2026, 3, 2), 9, 0)).await;
    let app = test_app!(stores, test_config());

    let admin = login!(app, "admin", "Admin@123");
    create_staff!(app, admin, "jane", "Jane Doe");
    let jane = login!(app, "jane", "Welcome@1");

    let req = api(test::TestRequest::post(), "/api/attendance/check-in", &jane)
        .set_json(json!({ "photo": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = api(test::TestRequest::post(), "/api/attendance/check-out", &jane)
        .set_json(json!({ "photo": "img" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "No active check-in found for today");

    assert!(stores.ledger.all().await.unwrap().is_empty());
}

#[actix_web::test]
async fn admin_reviews_filtered_records() {
    let stores = TestStores::open(FixedClock::at(day(2026, 3, 2), 8, 50)).await;
    let app = test_app!(stores, test_config());

    let admin = login!(app, "admin", "Admin@123");
    let jane_id = create_staff!(app, admin, "jane", "Jane Doe");
    create_staff!(app, admin, "ram", "Ram Thapa");
    let jane = login!(app, "jane", "Welcome@1");
    let ram = login!(app, "ram", "Welcome@1");

    for token in [&jane, &ram] {
        let req = api(test::TestRequest::post(), "/api/attendance/check-in", token)
            .set_json(json!({ "photo": "img" }))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());
    }
    stores.clock.set(day(2026, 3, 3), 9, 5);
    let req = api(test::TestRequest::post(), "/api/attendance/check-in", &jane)
        .set_json(json!({ "photo": "img" }))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let uri = format!("/api/attendance?userId={jane_id}");
    let req = api(test::TestRequest::get(), &uri, &admin).to_request();
    let records: Value = test::call_and_read_body_json(&app, req).await;
    let dates: Vec<_> = records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["date"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(dates, vec!["2026-03-03", "2026-03-02"]);

    let uri = format!("/api/attendance?date=2026-03-02&userId={jane_id}");
    let req = api(test::TestRequest::get(), &uri, &admin).to_request();
    let records: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(records.as_array().unwrap().len(), 1);

    let req = api(test::TestRequest::get(), "/api/attendance?date=2026-03-02", &admin).to_request();
    let records: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(records.as_array().unwrap().len(), 2);

    // staff cannot review
    let req = api(test::TestRequest::get(), "/api/attendance", &jane).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn dashboard_projects_who_is_not_in_yet() {
    let stores = TestStores::open(FixedClock::at(day(2026, 3, 2), 9, 30)).await;
    let app = test_app!(stores, test_config());

    let admin = login!(app, "admin", "Admin@123");
    create_staff!(app, admin, "jane", "Jane Doe");
    create_staff!(app, admin, "ram", "Ram Thapa");
    create_staff!(app, admin, "sita", "Sita Rai");
    let jane = login!(app, "jane", "Welcome@1");

    let req = api(test::TestRequest::post(), "/api/attendance/check-in", &jane)
        .set_json(json!({ "photo": "img" }))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = api(test::TestRequest::get(), "/api/dashboard", &admin).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body["today"],
        json!({ "totalStaff": 3, "present": 0, "late": 1, "notYetIn": 2 })
    );
    let recent = body["recent"].as_array().unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[4], json!({ "date": "2026-03-02", "checkedIn": 1 }));
    assert_eq!(recent[0]["date"], "2026-02-26");
}

#[actix_web::test]
async fn settings_are_admin_managed() {
    let stores = TestStores::open(FixedClock::at(day(2026, 3, 2), 9, 20)).await;
    let app = test_app!(stores, test_config());

    let admin = login!(app, "admin", "Admin@123");
    create_staff!(app, admin, "jane", "Jane Doe");
    let jane = login!(app, "jane", "Welcome@1");

    let req = api(test::TestRequest::get(), "/api/settings", &jane).to_request();
    let current: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(current, json!({ "officeStartTime": "09:00", "lateGracePeriodMinutes": 15 }));

    let new_rules = json!({ "officeStartTime": "09:00", "lateGracePeriodMinutes": 30 });
    let req = api(test::TestRequest::put(), "/api/settings", &jane)
        .set_json(&new_rules)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = api(test::TestRequest::put(), "/api/settings", &admin)
        .set_json(json!({ "officeStartTime": "9am", "lateGracePeriodMinutes": 30 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = api(test::TestRequest::put(), "/api/settings", &admin)
        .set_json(&new_rules)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // 09:20 is within the wider grace period
    let req = api(test::TestRequest::post(), "/api/attendance/check-in", &jane)
        .set_json(json!({ "photo": "img" }))
        .to_request();
    let record: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(record["status"], "present");
}

#[actix_web::test]
async fn staff_edit_is_full_replace_and_keeps_password() {
    let stores = TestStores::open(FixedClock::at(day(2026, 3, 2), 8, 0)).await;
    let app = test_app!(stores, test_config());

    let admin = login!(app, "admin", "Admin@123");
    let jane_id = create_staff!(app, admin, "jane", "Jane Doe");

    let uri = format!("/api/staff/{jane_id}");
    let req = api(test::TestRequest::put(), &uri, &admin)
        .set_json(json!({ "username": "jane", "fullName": "Jane Smith" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["fullName"], "Jane Smith");
    assert_eq!(body["designation"], Value::Null);
    assert_eq!(body["dailyWage"], Value::Null);

    // the old password still works
    login!(app, "jane", "Welcome@1");

    let req = api(test::TestRequest::put(), "/api/staff/missing", &admin)
        .set_json(json!({ "username": "x", "fullName": "X" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = api(test::TestRequest::post(), "/api/staff", &admin)
        .set_json(json!({ "username": "jane", "password": "p", "fullName": "Other Jane" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = api(test::TestRequest::post(), "/api/staff", &admin)
        .set_json(json!({ "username": "neg", "password": "p", "fullName": "Neg", "dailyWage": -5.0 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn deleted_staff_cannot_sign_in() {
    let stores = TestStores::open(FixedClock::at(day(2026, 3, 2), 8, 0)).await;
    let app = test_app!(stores, test_config());

    let admin = login!(app, "admin", "Admin@123");
    let jane_id = create_staff!(app, admin, "jane", "Jane Doe");

    let uri = format!("/api/staff/{jane_id}");
    let req = api(test::TestRequest::delete(), &uri, &admin).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // deleting again is a no-op
    let req = api(test::TestRequest::delete(), &uri, &admin).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = api(test::TestRequest::get(), "/api/staff", &admin).to_request();
    let staff: Value = test::call_and_read_body_json(&app, req).await;
    assert!(staff.as_array().unwrap().is_empty());

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .peer_addr(peer())
        .set_json(json!({ "username": "jane", "password": "Welcome@1" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn change_own_password_with_hashing_enabled() {
    let stores = TestStores::open(FixedClock::at(day(2026, 3, 2), 8, 0)).await;
    let config = Config { hash_passwords: true, ..test_config() };
    let app = test_app!(stores, config);

    let admin = login!(app, "admin", "Admin@123");
    let req = api(test::TestRequest::put(), "/api/me/password", &admin)
        .set_json(json!({ "newPassword": "Str0nger!" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let stored = stores.directory.get("admin-001").await.unwrap().password;
    assert!(stored.starts_with("$argon2"));

    login!(app, "admin", "Str0nger!");

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .peer_addr(peer())
        .set_json(json!({ "username": "admin", "password": "Admin@123" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn simultaneous_check_ins_record_once() {
    let stores = TestStores::open_yielding(FixedClock::at(day(2026, 3, 2), 9, 0)).await;
    let app = test_app!(stores, test_config());
    let admin = login!(app, "admin", "Admin@123");

    let check_in = || {
        api(test::TestRequest::post(), "/api/attendance/check-in", &admin)
            .set_json(json!({ "photo": "img" }))
            .to_request()
    };
    let (first, second) = futures::join!(
        test::call_service(&app, check_in()),
        test::call_service(&app, check_in()),
    );
    let mut statuses = [first.status().as_u16(), second.status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, [200, 400]);

    stores.clock.set(day(2026, 3, 2), 17, 0);
    let check_out = || {
        api(test::TestRequest::post(), "/api/attendance/check-out", &admin)
            .set_json(json!({ "photo": "img" }))
            .to_request()
    };
    let (first, second) = futures::join!(
        test::call_service(&app, check_out()),
        test::call_service(&app, check_out()),
    );
    let mut statuses = [first.status().as_u16(), second.status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, [200, 400]);

    assert_eq!(stores.ledger.all().await.unwrap().len(), 1);
}

#[actix_web::test]
async fn summary_tallies_days_and_pay() {
    let stores = TestStores::open(FixedClock::at(day(2026, 3, 2), 9, 0)).await;
    let app = test_app!(stores, test_config());

    let admin = login!(app, "admin", "Admin@123");
    create_staff!(app, admin, "jane", "Jane Doe");
    let jane = login!(app, "jane", "Welcome@1");

    for (d, h) in [(2, 9), (3, 10)] {
        stores.clock.set(day(2026, 3, d), h, 0);
        let req = api(test::TestRequest::post(), "/api/attendance/check-in", &jane)
            .set_json(json!({ "photo": "img" }))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());
    }

    let req = api(test::TestRequest::get(), "/api/attendance/summary", &jane).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "daysPresent": 2, "estimatedSalary": 3000.0 }));

    // no wage on file
    let req = api(test::TestRequest::get(), "/api/attendance/summary", &admin).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "daysPresent": 0, "estimatedSalary": 0.0 }));
}
