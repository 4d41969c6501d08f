mod common;

use axum::http::{Method, StatusCode};
use common::{get, json_request, post, send, TestDb};
use serde_json::json;
use sigea::models::{det_af::CategoryKind, user::Role};

#[tokio::test]
async fn ping_and_public_routes_need_no_token() {
    let db = TestDb::new().await;
    let app = db.app();
    db.insert_category(CategoryKind::Det, "Club de Ajedrez", 2).await;

    let (status, body) = send(&app, get("/api/ping", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "pong");

    let (status, body) = send(&app, get("/api/detaf/categories", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let categories = body["data"].as_array().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["kind"], "DET");
    assert_eq!(categories[0]["available_spots"], 2);
    assert_eq!(categories[0]["has_availability"], true);

    let (status, body) = send(&app, get("/api/detaf/stats", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["det_categories"], 1);
}

#[tokio::test]
async fn protected_routes_reject_missing_or_bad_tokens() {
    let db = TestDb::new().await;
    let app = db.app();

    let (status, body) = send(&app, get("/api/detaf/my-status", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, get("/api/detaf/my-inscriptions", Some("no.es.un.token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, post("/api/detaf/enroll", None, json!({ "categoryId": 1 }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn enroll_flow_over_http() {
    let db = TestDb::new().await;
    let app = db.app();
    let category = db.insert_category(CategoryKind::Af, "Fútbol", 1).await;
    let user = db.insert_user("ana@uni.mx", Role::Student).await;
    let token = db.token_for(user, "ana@uni.mx", Role::Student);

    let (status, body) = send(
        &app,
        get(&format!("/api/detaf/check-eligibility/{}", category), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["canEnroll"], true);
    assert_eq!(body["data"]["categoryInfo"]["name"], "Fútbol");

    let (status, body) = send(
        &app,
        post("/api/detaf/enroll", Some(&token), json!({ "categoryId": category })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Te has inscrito exitosamente en Fútbol");
    let enrollment_id = body["data"]["enrollment_id"].as_i64().unwrap();

    let (status, body) = send(&app, get("/api/detaf/my-status", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["af_enrolled"], true);
    assert_eq!(body["data"]["af_category"], "Fútbol");
    assert_eq!(body["data"]["det_enrolled"], false);
    assert!(body["data"].get("det_category").is_none());

    let (status, body) = send(&app, get("/api/detaf/my-inscriptions", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["enrollment_id"], enrollment_id);

    let unenroll = json!({ "inscriptionId": enrollment_id });
    let (status, body) = send(&app, post("/api/detaf/unenroll", Some(&token), unenroll.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Te has dado de baja exitosamente");

    let (status, body) = send(&app, post("/api/detaf/unenroll", Some(&token), unenroll)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Ya te habías dado de baja anteriormente");
    assert_eq!(body["data"]["already_withdrawn"], true);
}

#[tokio::test]
async fn enroll_errors_map_to_status_codes() {
    let db = TestDb::new().await;
    let app = db.app();
    let full = db.insert_category(CategoryKind::Det, "Club de Ajedrez", 1).await;
    let robotics = db.insert_category(CategoryKind::Det, "Robótica", 5).await;
    let owner = db.insert_user("owner@uni.mx", Role::Student).await;
    let user = db.insert_user("late@uni.mx", Role::Student).await;
    let owner_token = db.token_for(owner, "owner@uni.mx", Role::Student);
    let token = db.token_for(user, "late@uni.mx", Role::Student);

    let (status, _) = send(&app, post("/api/detaf/enroll", Some(&owner_token), json!({ "categoryId": full }))).await;
    assert_eq!(status, StatusCode::OK);

    // Cupo esgotado
    let (status, body) = send(&app, post("/api/detaf/enroll", Some(&token), json!({ "categoryId": full }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Club de Ajedrez"));

    // Segundo DET
    let (status, _) = send(&app, post("/api/detaf/enroll", Some(&token), json!({ "categoryId": robotics }))).await;
    assert_eq!(status, StatusCode::OK);
    let other = db.insert_category(CategoryKind::Det, "Teatro", 5).await;
    let (status, body) = send(&app, post("/api/detaf/enroll", Some(&token), json!({ "categoryId": other }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Robótica"));

    // Categoria inexistente
    let (status, _) = send(&app, post("/api/detaf/enroll", Some(&token), json!({ "categoryId": 4040 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Inscrição de outro utilizador
    let (status, _) = send(&app, post("/api/detaf/unenroll", Some(&token), json!({ "inscriptionId": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_requests_are_validation_errors() {
    let db = TestDb::new().await;
    let app = db.app();
    let user = db.insert_user("val@uni.mx", Role::Student).await;
    let token = db.token_for(user, "val@uni.mx", Role::Student);

    let (status, body) = send(&app, post("/api/detaf/enroll", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "categoryId es requerido");

    let (status, _) = send(&app, post("/api/detaf/enroll", Some(&token), json!({ "categoryId": "tres" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, post("/api/detaf/unenroll", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "inscriptionId es requerido");

    let (status, body) = send(&app, get("/api/detaf/check-eligibility/abc", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn admin_routes_require_admin_role() {
    let db = TestDb::new().await;
    let app = db.app();
    let student = db.insert_user("student@uni.mx", Role::Student).await;
    let admin = db.insert_user("admin@uni.mx", Role::Admin).await;
    let student_token = db.token_for(student, "student@uni.mx", Role::Student);
    let admin_token = db.token_for(admin, "admin@uni.mx", Role::Admin);

    let (status, _) = send(&app, get("/api/detaf/admin/inscriptions", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, get("/api/detaf/admin/inscriptions", Some(&student_token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    // O rol é relido da base de dados, não confiado ao token
    let forged = db.token_for(student, "student@uni.mx", Role::Admin);
    let (status, _) = send(&app, get("/api/detaf/admin/inscriptions", Some(&forged))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let new_category = json!({
        "kind": "AF",
        "name": "Natación",
        "description": "Alberca olímpica",
        "capacity": 20
    });
    let (status, body) = send(&app, post("/api/detaf/admin/categories", Some(&admin_token), new_category)).await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["kind"], "AF");

    let (status, _) = send(&app, post("/api/detaf/enroll", Some(&student_token), json!({ "categoryId": category_id }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/api/detaf/admin/inscriptions", Some(&admin_token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stats"]["active_enrollments"], 1);
    assert_eq!(body["data"]["enrollments"][0]["user_email"], "student@uni.mx");

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/detaf/admin/categories/{}", category_id),
            Some(&admin_token),
            json!({ "capacity": 0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/detaf/admin/categories/{}", category_id),
            Some(&admin_token),
            json!({ "capacity": 25, "name": "Natación Avanzada" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["capacity"], 25);
    assert_eq!(body["data"]["name"], "Natación Avanzada");
}
