#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use sigea::{
    config::{AppConfig, DbConfig, JwtConfig},
    db,
    models::{
        det_af::{CategoryKind, NewCategory},
        user::Role,
    },
    services::{auth_service, det_af_service},
    state::AppState,
    web::routes,
};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "contrasena-segura";

/// Base de dados SQLite num diretório temporário, já migrada.
/// O diretório é apagado quando o `TestDb` sai de âmbito.
pub struct TestDb {
    pub pool: SqlitePool,
    pub config: AppConfig,
    _dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let database = DbConfig {
            url: format!("sqlite://{}", dir.path().join("sigea.db").display()),
            max_connections: 8,
        };
        let pool = db::create_db_pool(&database)
            .await
            .expect("test database should be created and migrated");

        let config = AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            database,
            jwt: JwtConfig {
                secret: "segredo-de-teste-suficientemente-longo-para-hmac".into(),
                expiry_hours: 1,
            },
            cors_origins: vec!["http://localhost:8080".into()],
        };

        Self {
            pool,
            config,
            _dir: dir,
        }
    }

    pub fn app(&self) -> Router {
        routes::create_app(AppState::new(self.pool.clone(), self.config.clone()))
    }

    pub fn token_for(&self, user_id: i64, email: &str, role: Role) -> String {
        auth_service::generate_token(user_id, email, role, &self.config.jwt)
            .expect("token generation should succeed")
    }

    /// Insere um utilizador diretamente (bcrypt com custo baixo para os testes).
    pub async fn insert_user(&self, email: &str, role: Role) -> i64 {
        let hash = bcrypt::hash(TEST_PASSWORD, 4).expect("hashing should succeed");
        sqlx::query(
            r#"
            INSERT INTO usuarios (nombre, email, password_hash, rol, matricula, area_estudios, semestre, activo)
            VALUES (?1, ?2, ?3, ?4, '240000', 'Arquitectura', 3, 1)
            "#,
        )
        .bind(format!("Usuario {}", email))
        .bind(email)
        .bind(hash)
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .expect("user insert should succeed")
        .last_insert_rowid()
    }

    pub async fn insert_category(&self, kind: CategoryKind, name: &str, capacity: i64) -> i64 {
        let input = NewCategory {
            kind,
            name: name.into(),
            description: format!("Descripción de {}", name),
            capacity,
        };
        det_af_service::create_category(&self.pool, &input)
            .await
            .expect("category insert should succeed")
            .id
    }

    pub async fn active_count(&self, category_id: i64) -> i64 {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM inscripciones_det_af WHERE categoria_id = ?1 AND estado = 'activa'",
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await
        .expect("count should succeed")
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should not fail");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, json)
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("request should build")
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

pub fn post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    json_request(Method::POST, uri, token, body)
}
