// src/web/user_handlers.rs
use crate::{
    error::AppResult,
    models::{
        grades::{AcademicSummary, SubjectGrades},
        user::{AuthUser, UserProfile},
    },
    services::{grades_service, user_service},
    state::AppState,
    web::response::{ok, ApiResponse},
};
use axum::{
    extract::{Extension, State},
    Json,
};

// GET /api/auth/profile
pub async fn handle_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    tracing::debug!("GET /profile: acesso para {}", user.user_id);
    let profile = user_service::get_profile(&state.db_pool, user.user_id).await?;
    Ok(ok(profile))
}

// GET /api/auth/grades
pub async fn handle_grades(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<ApiResponse<Vec<SubjectGrades>>>> {
    let grades = grades_service::get_user_grades(&state.db_pool, user.user_id).await?;
    Ok(ok(grades))
}

// GET /api/auth/academic-summary
pub async fn handle_academic_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<ApiResponse<AcademicSummary>>> {
    let summary = grades_service::get_academic_summary(&state.db_pool, user.user_id).await?;
    Ok(ok(summary))
}
