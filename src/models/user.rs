// src/models/user.rs
use super::UnknownVariant;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "estudiante")]
    Student,
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "estudiante",
            Role::Admin => "admin",
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "estudiante" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownVariant { field: "rol", value }),
        }
    }
}

// Representa um utilizador lido da tabela 'usuarios'
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub enrollment_number: String,
    pub study_area: String,
    pub semester: i64,
    pub active: bool,
    pub created_at: Option<NaiveDateTime>,
}

/// Dados públicos do utilizador (nunca inclui o hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub enrollment_number: String,
    pub study_area: String,
    pub semester: i64,
    pub active: bool,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            enrollment_number: user.enrollment_number,
            study_area: user.study_area,
            semester: user.semester,
            active: user.active,
        }
    }
}

// Corpo de POST /api/auth/login
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

// Corpo de POST /api/auth/register. O rol nunca vem do cliente.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub enrollment_number: Option<String>,
    pub study_area: Option<String>,
    pub semester: Option<i64>,
}

/// Registo já validado, pronto a inserir.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub enrollment_number: String,
    pub study_area: String,
    pub semester: i64,
}

/// Utilizador autenticado, extraído do token Bearer pelo middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
}
