// src/services/grades_service.rs
use crate::{
    error::AppResult,
    models::grades::{
        AcademicSummary, Evaluation, EvaluationType, GradeRow, SubjectGrades, PASSING_SCORE,
    },
};
use sqlx::SqlitePool;
use std::collections::BTreeMap;

async fn fetch_grade_rows(db_pool: &SqlitePool, user_id: i64) -> AppResult<Vec<GradeRow>> {
    let rows = sqlx::query_as::<_, GradeRow>(
        r#"
        SELECT
            m.id AS subject_id,
            m.codigo AS code,
            m.nombre AS subject_name,
            m.creditos AS credits,
            c.tipo_evaluacion AS evaluation_type,
            c.calificacion AS score,
            c.porcentaje AS weight
        FROM calificaciones c
        INNER JOIN materias m ON m.id = c.materia_id
        WHERE c.usuario_id = ?1
        ORDER BY m.codigo
        "#,
    )
    .bind(user_id)
    .fetch_all(db_pool)
    .await?;
    Ok(rows)
}

/// Agrupa as avaliações por matéria (ordenadas por código) e ordena cada
/// grupo pela precedência fixa dos tipos de avaliação.
pub fn group_by_subject(rows: Vec<GradeRow>) -> Vec<SubjectGrades> {
    let mut subjects: BTreeMap<(String, i64), SubjectGrades> = BTreeMap::new();

    for row in rows {
        let subject = subjects
            .entry((row.code.clone(), row.subject_id))
            .or_insert_with(|| SubjectGrades {
                subject_id: row.subject_id,
                code: row.code.clone(),
                name: row.subject_name.clone(),
                credits: row.credits,
                evaluations: Vec::new(),
            });
        subject.evaluations.push(Evaluation {
            evaluation_type: row.evaluation_type,
            score: row.score,
            weight: row.weight,
        });
    }

    subjects
        .into_values()
        .map(|mut subject| {
            // A ordem das variantes do enum é a precedência
            subject.evaluations.sort_by_key(|e| e.evaluation_type);
            subject
        })
        .collect()
}

pub fn summarize(subjects: &[SubjectGrades]) -> AcademicSummary {
    let finals: Vec<f64> = subjects.iter().filter_map(SubjectGrades::final_score).collect();

    let final_average = if finals.is_empty() {
        None
    } else {
        Some(finals.iter().sum::<f64>() / finals.len() as f64)
    };

    AcademicSummary {
        subject_count: subjects.len() as i64,
        final_average,
        passed_subjects: finals.iter().filter(|score| **score >= PASSING_SCORE).count() as i64,
        total_credits: subjects.iter().map(|s| s.credits).sum(),
    }
}

pub async fn get_user_grades(db_pool: &SqlitePool, user_id: i64) -> AppResult<Vec<SubjectGrades>> {
    let rows = fetch_grade_rows(db_pool, user_id).await?;
    tracing::debug!("{} avaliações encontradas para utilizador {}", rows.len(), user_id);
    Ok(group_by_subject(rows))
}

pub async fn get_academic_summary(db_pool: &SqlitePool, user_id: i64) -> AppResult<AcademicSummary> {
    let subjects = get_user_grades(db_pool, user_id).await?;
    Ok(summarize(&subjects))
}
