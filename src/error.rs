// src/error.rs
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Erro na base de dados: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Erro de migração da base de dados: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Erro de variável de ambiente: {0}")]
    EnvVarError(#[from] std::env::VarError),

    #[error("Configuração inválida: {0}")]
    ConfigError(String),

    #[error("Erro ao processar password")]
    PasswordHashingError,

    #[error("Erro ao gerar token: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Não autorizado: {0}")]
    Unauthorized(String),

    #[error("Acesso negado")]
    Forbidden,

    #[error("Dados inválidos: {0}")]
    ValidationError(String),

    #[error("Utilizador não encontrado")]
    UserNotFound,

    // --- Erros de domínio DET/AF ---
    #[error("Categoria inexistente ou inativa")]
    CategoryNotFound,

    #[error("Categoria sem cupo: {0}")]
    CategoryFull(String),

    #[error("Já existe inscrição ativa em {kind} ({category})")]
    DuplicateKindEnrollment { kind: String, category: String },

    #[error("Inscrição não encontrada")]
    EnrollmentNotFound,

    #[error("Erro interno inesperado")]
    InternalServerError,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::UserNotFound
            | AppError::CategoryNotFound
            | AppError::EnrollmentNotFound => StatusCode::NOT_FOUND,
            AppError::CategoryFull(_) | AppError::DuplicateKindEnrollment { .. } => {
                StatusCode::CONFLICT
            }
            AppError::SqlxError(_)
            | AppError::SqlxMigrateError(_)
            | AppError::EnvVarError(_)
            | AppError::ConfigError(_)
            | AppError::PasswordHashingError
            | AppError::TokenError(_)
            | AppError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Mensagem mostrada ao estudante (o frontend é em espanhol).
    pub fn user_message(&self) -> String {
        match self {
            // Falhas de persistência expõem a mensagem original
            AppError::SqlxError(e) => format!("Error en la base de datos: {}", e),
            AppError::SqlxMigrateError(e) => format!("Error en la migración: {}", e),
            AppError::EnvVarError(_) | AppError::ConfigError(_) => {
                "Error de configuración del servidor".to_string()
            }
            AppError::PasswordHashingError => "Error al procesar credenciales".to_string(),
            AppError::TokenError(_) => "Error al generar el token de sesión".to_string(),
            AppError::InvalidCredentials => "Email o contraseña incorrectos".to_string(),
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Forbidden => {
                "Acceso denegado. Solo administradores pueden realizar esta acción".to_string()
            }
            AppError::ValidationError(msg) => msg.clone(),
            AppError::UserNotFound => "Usuario no encontrado".to_string(),
            AppError::CategoryNotFound => "La categoría no existe o está inactiva".to_string(),
            AppError::CategoryFull(name) => {
                format!("No hay cupo disponible en la categoría {}", name)
            }
            AppError::DuplicateKindEnrollment { kind, category } => format!(
                "Ya tienes una inscripción activa en {} ({}). Debes darte de baja primero.",
                kind, category
            ),
            AppError::EnrollmentNotFound => {
                "La inscripción no existe o no pertenece al usuario".to_string()
            }
            AppError::InternalServerError => "Error interno del servidor".to_string(),
        }
    }
}

// Como converter AppError numa resposta HTTP ({ success: false, error })
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Erro processado: {:?}", self);
        } else {
            tracing::warn!("Pedido recusado ({}): {}", status.as_u16(), self);
        }

        let body = json!({
            "success": false,
            "error": self.user_message(),
        });

        (status, Json(body)).into_response()
    }
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;
