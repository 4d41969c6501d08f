// src/web/det_af_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        det_af::{
            CategoryAvailability, Eligibility, EnrollPayload, EnrollmentOutcome, GeneralStats,
            InscriptionStatus, UnenrollOutcome, UnenrollPayload, UserEnrollment,
        },
        user::AuthUser,
    },
    services::det_af_service,
    state::AppState,
    web::response::{ok, ok_with_message, parse_body, ApiResponse},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path, State,
    },
    Json,
};

// GET /api/detaf/categories (público)
pub async fn handle_get_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<CategoryAvailability>>>> {
    let categories = det_af_service::list_available_categories(&state.db_pool).await?;
    Ok(ok(categories))
}

// GET /api/detaf/stats (público)
pub async fn handle_get_stats(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<GeneralStats>>> {
    let stats = det_af_service::get_general_stats(&state.db_pool).await?;
    Ok(ok(stats))
}

// GET /api/detaf/my-inscriptions
pub async fn handle_get_my_inscriptions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<ApiResponse<Vec<UserEnrollment>>>> {
    let enrollments = det_af_service::get_user_enrollments(&state.db_pool, user.user_id).await?;
    Ok(ok(enrollments))
}

// GET /api/detaf/my-status
pub async fn handle_get_my_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<ApiResponse<InscriptionStatus>>> {
    let status = det_af_service::get_user_status(&state.db_pool, user.user_id).await?;
    Ok(ok(status))
}

// POST /api/detaf/enroll { categoryId }
pub async fn handle_enroll(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<EnrollPayload>, JsonRejection>,
) -> AppResult<Json<ApiResponse<EnrollmentOutcome>>> {
    let category_id = parse_body(payload)?
        .category_id
        .ok_or_else(|| AppError::ValidationError("categoryId es requerido".into()))?;

    tracing::info!(
        "Utilizador {} tenta inscrever-se na categoria {}",
        user.user_id,
        category_id
    );

    // Verificação prévia para devolver o motivo; `enroll` volta a validar
    // atomicamente no momento da escrita.
    let eligibility = det_af_service::can_enroll(&state.db_pool, user.user_id, category_id).await?;
    if let Some(err) = det_af_service::eligibility_error(&eligibility) {
        return Err(err);
    }

    let outcome = det_af_service::enroll(&state.db_pool, user.user_id, category_id).await?;
    let message = format!("Te has inscrito exitosamente en {}", outcome.category_name);
    Ok(ok_with_message(message, outcome))
}

// POST /api/detaf/unenroll { inscriptionId }
pub async fn handle_unenroll(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<UnenrollPayload>, JsonRejection>,
) -> AppResult<Json<ApiResponse<UnenrollOutcome>>> {
    let inscription_id = parse_body(payload)?
        .inscription_id
        .ok_or_else(|| AppError::ValidationError("inscriptionId es requerido".into()))?;

    let outcome = det_af_service::unenroll(&state.db_pool, user.user_id, inscription_id).await?;
    let message = if outcome.already_withdrawn {
        "Ya te habías dado de baja anteriormente"
    } else {
        "Te has dado de baja exitosamente"
    };
    Ok(ok_with_message(message, outcome))
}

// GET /api/detaf/check-eligibility/{category_id}
pub async fn handle_check_eligibility(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    category_id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<ApiResponse<Eligibility>>> {
    let Path(category_id) = category_id.map_err(|_| {
        AppError::ValidationError("categoryId debe ser un número válido".into())
    })?;

    let eligibility = det_af_service::can_enroll(&state.db_pool, user.user_id, category_id).await?;
    Ok(ok(eligibility))
}
