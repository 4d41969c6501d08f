// src/models/det_af.rs
//! Categorias extracurriculares DET/AF e as inscrições dos estudantes.

use super::UnknownVariant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// DET (Desarrollo de Talentos) ou AF (Actividades Físicas).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryKind {
    #[serde(rename = "DET")]
    Det,
    #[serde(rename = "AF")]
    Af,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Det => "DET",
            CategoryKind::Af => "AF",
        }
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for CategoryKind {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "DET" => Ok(CategoryKind::Det),
            "AF" => Ok(CategoryKind::Af),
            _ => Err(UnknownVariant { field: "tipo", value }),
        }
    }
}

/// Estado de uma inscrição: `activa → baja` (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnrollmentStatus {
    #[serde(rename = "activa")]
    Active,
    #[serde(rename = "baja")]
    Withdrawn,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "activa",
            EnrollmentStatus::Withdrawn => "baja",
        }
    }
}

impl TryFrom<String> for EnrollmentStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "activa" => Ok(EnrollmentStatus::Active),
            "baja" => Ok(EnrollmentStatus::Withdrawn),
            _ => Err(UnknownVariant { field: "estado", value }),
        }
    }
}

// Linha completa de 'categorias_det_af'
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: i64,
    #[sqlx(try_from = "String")]
    pub kind: CategoryKind,
    pub name: String,
    pub description: String,
    pub capacity: i64,
    pub active: bool,
}

// Linha de 'v_categorias_disponibles'
#[derive(Debug, Clone, FromRow)]
pub struct CategoryOccupancyRow {
    pub id: i64,
    #[sqlx(try_from = "String")]
    pub kind: CategoryKind,
    pub name: String,
    pub description: String,
    pub capacity: i64,
    pub enrolled_count: i64,
    pub available_spots: i64,
}

/// Categoria ativa com a ocupação calculada.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAvailability {
    pub id: i64,
    pub kind: CategoryKind,
    pub name: String,
    pub description: String,
    pub capacity: i64,
    pub enrolled_count: i64,
    pub available_spots: i64,
    pub has_availability: bool,
}

impl From<CategoryOccupancyRow> for CategoryAvailability {
    fn from(row: CategoryOccupancyRow) -> Self {
        Self {
            id: row.id,
            kind: row.kind,
            name: row.name,
            description: row.description,
            capacity: row.capacity,
            enrolled_count: row.enrolled_count,
            available_spots: row.available_spots,
            has_availability: row.available_spots > 0,
        }
    }
}

// Linha de 'v_inscripciones_usuario'
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserEnrollment {
    pub enrollment_id: i64,
    #[sqlx(try_from = "String")]
    pub kind: CategoryKind,
    pub category_id: i64,
    pub category_name: String,
    pub description: String,
    pub enrolled_at: DateTime<Utc>,
}

/// Resumo de forma fixa das inscrições ativas de um utilizador.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InscriptionStatus {
    pub det_enrolled: bool,
    pub af_enrolled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub det_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub af_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub det_enrollment_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub af_enrollment_id: Option<i64>,
}

impl InscriptionStatus {
    pub fn from_enrollments(enrollments: &[UserEnrollment]) -> Self {
        let mut status = Self::default();
        for enrollment in enrollments {
            match enrollment.kind {
                CategoryKind::Det => {
                    status.det_enrolled = true;
                    status.det_category = Some(enrollment.category_name.clone());
                    status.det_enrollment_id = Some(enrollment.enrollment_id);
                }
                CategoryKind::Af => {
                    status.af_enrolled = true;
                    status.af_category = Some(enrollment.category_name.clone());
                    status.af_enrollment_id = Some(enrollment.enrollment_id);
                }
            }
        }
        status
    }

    /// Nome da categoria ativa do tipo pedido, se houver.
    pub fn category_for(&self, kind: CategoryKind) -> Option<&str> {
        match kind {
            CategoryKind::Det => self.det_category.as_deref(),
            CategoryKind::Af => self.af_category.as_deref(),
        }
    }
}

/// Motivo pelo qual um utilizador não se pode inscrever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IneligibleReason {
    CategoryNotFound,
    CategoryFull,
    DuplicateKindEnrollment,
}

/// Resultado de `can_enroll`: nunca falha por regras de negócio.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    pub can_enroll: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<IneligibleReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicting_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_info: Option<CategoryAvailability>,
}

impl Eligibility {
    pub fn eligible(category: CategoryAvailability) -> Self {
        Self {
            can_enroll: true,
            reason: None,
            message: None,
            conflicting_category: None,
            category_info: Some(category),
        }
    }

    pub fn not_found() -> Self {
        Self::blocked(
            IneligibleReason::CategoryNotFound,
            "La categoría no existe o está inactiva".to_string(),
            None,
            None,
        )
    }

    pub fn full(category: CategoryAvailability) -> Self {
        let message = format!("No hay cupo disponible en la categoría {}", category.name);
        Self::blocked(IneligibleReason::CategoryFull, message, None, Some(category))
    }

    pub fn duplicate_kind(category: CategoryAvailability, conflicting: String) -> Self {
        let message = format!(
            "Ya tienes una inscripción activa en {} ({}). Debes darte de baja primero.",
            category.kind, conflicting
        );
        Self::blocked(
            IneligibleReason::DuplicateKindEnrollment,
            message,
            Some(conflicting),
            Some(category),
        )
    }

    fn blocked(
        reason: IneligibleReason,
        message: String,
        conflicting_category: Option<String>,
        category_info: Option<CategoryAvailability>,
    ) -> Self {
        Self {
            can_enroll: false,
            reason: Some(reason),
            message: Some(message),
            conflicting_category,
            category_info,
        }
    }
}

/// Resultado de uma inscrição bem-sucedida.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentOutcome {
    pub enrollment_id: i64,
    pub category_name: String,
}

/// Resultado de uma baixa; `already_withdrawn` indica um no-op.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnenrollOutcome {
    pub enrollment_id: i64,
    pub already_withdrawn: bool,
}

#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize)]
pub struct GeneralStats {
    pub det_categories: i64,
    pub af_categories: i64,
    pub active_enrollments: i64,
    pub users_with_det: i64,
    pub users_with_af: i64,
}

// Inscrição ativa vista pelo administrador
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminEnrollment {
    pub enrollment_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub category_id: i64,
    pub category_name: String,
    #[sqlx(try_from = "String")]
    pub kind: CategoryKind,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AdminOverview {
    pub stats: GeneralStats,
    pub enrollments: Vec<AdminEnrollment>,
}

// --- Payloads JSON ---

#[derive(Debug, Deserialize)]
pub struct EnrollPayload {
    #[serde(rename = "categoryId")]
    pub category_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UnenrollPayload {
    #[serde(rename = "inscriptionId")]
    pub inscription_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub kind: CategoryKind,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub capacity: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryUpdate {
    pub kind: Option<CategoryKind>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub capacity: Option<i64>,
    pub active: Option<bool>,
}
