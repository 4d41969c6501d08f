// src/web/admin_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::det_af::{AdminOverview, Category, CategoryUpdate, NewCategory},
    services::det_af_service,
    state::AppState,
    web::response::{ok, ok_with_message, parse_body, ApiResponse},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};

// GET /api/detaf/admin/inscriptions
pub async fn handle_get_all_inscriptions(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<AdminOverview>>> {
    tracing::debug!("👑 Admin pediu todas as inscrições");
    let stats = det_af_service::get_general_stats(&state.db_pool).await?;
    let enrollments = det_af_service::list_active_enrollments(&state.db_pool).await?;
    Ok(ok(AdminOverview { stats, enrollments }))
}

// POST /api/detaf/admin/categories
pub async fn handle_create_category(
    State(state): State<AppState>,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let input = parse_body(payload)?;
    let category = det_af_service::create_category(&state.db_pool, &input).await?;
    Ok((
        StatusCode::CREATED,
        ok_with_message("Categoría creada", category),
    ))
}

// PUT /api/detaf/admin/categories/{id}
pub async fn handle_update_category(
    State(state): State<AppState>,
    category_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CategoryUpdate>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let Path(category_id) = category_id
        .map_err(|_| AppError::ValidationError("id debe ser un número válido".into()))?;
    let update = parse_body(payload)?;

    let category = det_af_service::update_category(&state.db_pool, category_id, &update).await?;
    Ok(ok(category))
}
