// src/web/response.rs
use crate::error::{AppError, AppResult};
use axum::{extract::rejection::JsonRejection, Json};
use serde::Serialize;

/// Envelope de sucesso: `{ "success": true, "data": ..., "message"?: ... }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        message: None,
        data,
    })
}

pub fn ok_with_message<T: Serialize>(message: impl Into<String>, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        message: Some(message.into()),
        data,
    })
}

/// Converte uma rejeição do extractor `Json` num erro de validação, para que
/// corpos inválidos também usem o envelope `{ success: false, error }`.
pub fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        AppError::ValidationError(format!("Cuerpo JSON inválido: {}", rejection.body_text()))
    })
}
