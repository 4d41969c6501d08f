// src/models/grades.rs
use super::UnknownVariant;
use serde::Serialize;
use sqlx::FromRow;

/// Nota mínima para aprovar uma matéria.
pub const PASSING_SCORE: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationType {
    PrimerParcial,
    SegundoParcial,
    Ordinario,
    Proyecto,
    ExamenesSemanales,
    CalificacionFinal,
}

impl EvaluationType {
    /// Ordem fixa de apresentação das avaliações.
    pub const PRECEDENCE: [EvaluationType; 6] = [
        EvaluationType::PrimerParcial,
        EvaluationType::SegundoParcial,
        EvaluationType::Ordinario,
        EvaluationType::Proyecto,
        EvaluationType::ExamenesSemanales,
        EvaluationType::CalificacionFinal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationType::PrimerParcial => "primer_parcial",
            EvaluationType::SegundoParcial => "segundo_parcial",
            EvaluationType::Ordinario => "ordinario",
            EvaluationType::Proyecto => "proyecto",
            EvaluationType::ExamenesSemanales => "examenes_semanales",
            EvaluationType::CalificacionFinal => "calificacion_final",
        }
    }
}

impl TryFrom<String> for EvaluationType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        EvaluationType::PRECEDENCE
            .iter()
            .copied()
            .find(|t| t.as_str() == value)
            .ok_or(UnknownVariant { field: "tipo_evaluacion", value })
    }
}

// Uma linha de 'calificaciones' juntada com a matéria
#[derive(Debug, Clone, FromRow)]
pub struct GradeRow {
    pub subject_id: i64,
    pub code: String,
    pub subject_name: String,
    pub credits: i64,
    #[sqlx(try_from = "String")]
    pub evaluation_type: EvaluationType,
    pub score: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub evaluation_type: EvaluationType,
    pub score: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectGrades {
    pub subject_id: i64,
    pub code: String,
    pub name: String,
    pub credits: i64,
    pub evaluations: Vec<Evaluation>,
}

impl SubjectGrades {
    pub fn final_score(&self) -> Option<f64> {
        self.evaluations
            .iter()
            .find(|e| e.evaluation_type == EvaluationType::CalificacionFinal)
            .map(|e| e.score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcademicSummary {
    pub subject_count: i64,
    pub final_average: Option<f64>,
    pub passed_subjects: i64,
    pub total_credits: i64,
}
