// src/services/det_af_service.rs
//! Regras de inscrição DET/AF: no máximo uma inscrição ativa por tipo e
//! nunca mais inscrições ativas do que o cupo da categoria.

use crate::{
    db,
    error::{AppError, AppResult},
    models::det_af::{
        AdminEnrollment, Category, CategoryAvailability, CategoryOccupancyRow, CategoryUpdate,
        Eligibility, EnrollmentOutcome, EnrollmentStatus, GeneralStats, InscriptionStatus,
        NewCategory, UnenrollOutcome, UserEnrollment,
    },
};
use chrono::Utc;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};

const OCCUPANCY_COLUMNS: &str = r#"
    id,
    tipo AS kind,
    nombre AS name,
    descripcion AS description,
    cupo_maximo AS capacity,
    inscritos_actuales AS enrolled_count,
    cupos_disponibles AS available_spots
"#;

const CATEGORY_COLUMNS: &str = r#"
    id,
    tipo AS kind,
    nombre AS name,
    descripcion AS description,
    cupo_maximo AS capacity,
    activo AS active
"#;

// Só insere se a categoria estiver ativa, tiver cupo e o utilizador não tiver
// outra inscrição ativa do mesmo tipo. O tipo vem sempre da categoria.
const INSERT_IF_ELIGIBLE: &str = r#"
    INSERT INTO inscripciones_det_af (usuario_id, categoria_id, tipo_categoria, estado, fecha_inscripcion)
    SELECT ?1, c.id, c.tipo, 'activa', ?3
    FROM categorias_det_af c
    WHERE c.id = ?2
      AND c.activo = 1
      AND (
          SELECT COUNT(*) FROM inscripciones_det_af i
          WHERE i.categoria_id = c.id AND i.estado = 'activa'
      ) < c.cupo_maximo
      AND NOT EXISTS (
          SELECT 1 FROM inscripciones_det_af i
          JOIN categorias_det_af ic ON ic.id = i.categoria_id
          WHERE i.usuario_id = ?1 AND i.estado = 'activa' AND ic.tipo = c.tipo
      )
"#;

/// Todas as categorias ativas com a ocupação atual.
pub async fn list_available_categories(
    db_pool: &SqlitePool,
) -> AppResult<Vec<CategoryAvailability>> {
    tracing::debug!("🔍 Obtendo categorias DET/AF disponíveis...");
    let rows = sqlx::query_as::<_, CategoryOccupancyRow>(&format!(
        "SELECT {} FROM v_categorias_disponibles ORDER BY tipo, nombre",
        OCCUPANCY_COLUMNS
    ))
    .fetch_all(db_pool)
    .await?;

    tracing::debug!("{} categorias encontradas", rows.len());
    Ok(rows.into_iter().map(CategoryAvailability::from).collect())
}

async fn fetch_availability<'e, E>(
    executor: E,
    category_id: i64,
) -> AppResult<Option<CategoryAvailability>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, CategoryOccupancyRow>(&format!(
        "SELECT {} FROM v_categorias_disponibles WHERE id = ?1",
        OCCUPANCY_COLUMNS
    ))
    .bind(category_id)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(CategoryAvailability::from))
}

async fn fetch_user_enrollments<'e, E>(executor: E, user_id: i64) -> AppResult<Vec<UserEnrollment>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let enrollments = sqlx::query_as::<_, UserEnrollment>(
        r#"
        SELECT
            inscripcion_id AS enrollment_id,
            tipo AS kind,
            categoria_id AS category_id,
            categoria_nombre AS category_name,
            descripcion AS description,
            fecha_inscripcion AS enrolled_at
        FROM v_inscripciones_usuario
        WHERE usuario_id = ?1
        ORDER BY tipo
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;
    Ok(enrollments)
}

/// Inscrições ativas do utilizador (no máximo uma DET e uma AF).
pub async fn get_user_enrollments(
    db_pool: &SqlitePool,
    user_id: i64,
) -> AppResult<Vec<UserEnrollment>> {
    let enrollments = fetch_user_enrollments(db_pool, user_id).await?;
    tracing::debug!(
        "{} inscrições ativas para utilizador {}",
        enrollments.len(),
        user_id
    );
    Ok(enrollments)
}

pub async fn get_user_status(db_pool: &SqlitePool, user_id: i64) -> AppResult<InscriptionStatus> {
    let enrollments = fetch_user_enrollments(db_pool, user_id).await?;
    Ok(InscriptionStatus::from_enrollments(&enrollments))
}

/// Ordem das verificações: existência, cupo, tipo duplicado.
pub fn evaluate_eligibility(
    category: Option<CategoryAvailability>,
    enrollments: &[UserEnrollment],
) -> Eligibility {
    let Some(category) = category else {
        return Eligibility::not_found();
    };

    if !category.has_availability {
        return Eligibility::full(category);
    }

    let status = InscriptionStatus::from_enrollments(enrollments);
    if let Some(conflicting) = status.category_for(category.kind) {
        let conflicting = conflicting.to_string();
        return Eligibility::duplicate_kind(category, conflicting);
    }

    Eligibility::eligible(category)
}

/// Verifica, sem alterar nada, se o utilizador se pode inscrever.
pub async fn can_enroll(
    db_pool: &SqlitePool,
    user_id: i64,
    category_id: i64,
) -> AppResult<Eligibility> {
    tracing::debug!(
        "🔍 Verificando elegibilidade do utilizador {} para categoria {}",
        user_id,
        category_id
    );
    let category = fetch_availability(db_pool, category_id).await?;
    let enrollments = fetch_user_enrollments(db_pool, user_id).await?;
    Ok(evaluate_eligibility(category, &enrollments))
}

/// Converte uma elegibilidade negativa no erro correspondente.
pub fn eligibility_error(eligibility: &Eligibility) -> Option<AppError> {
    use crate::models::det_af::IneligibleReason;

    let reason = eligibility.reason?;
    let category = eligibility.category_info.as_ref();
    Some(match reason {
        IneligibleReason::CategoryNotFound => AppError::CategoryNotFound,
        IneligibleReason::CategoryFull => {
            AppError::CategoryFull(category.map(|c| c.name.clone()).unwrap_or_default())
        }
        IneligibleReason::DuplicateKindEnrollment => AppError::DuplicateKindEnrollment {
            kind: category.map(|c| c.kind.to_string()).unwrap_or_default(),
            category: eligibility.conflicting_category.clone().unwrap_or_default(),
        },
    })
}

/// Inscreve o utilizador numa categoria.
///
/// O primeiro comando da transação é o INSERT condicional, por isso o SQLite
/// obtém o lock de escrita antes de contar as vagas: duas inscrições
/// simultâneas para a última vaga ficam serializadas e só uma insere.
pub async fn enroll(
    db_pool: &SqlitePool,
    user_id: i64,
    category_id: i64,
) -> AppResult<EnrollmentOutcome> {
    tracing::info!(
        "📝 Inscrevendo utilizador {} na categoria {}...",
        user_id,
        category_id
    );

    let mut tx = db_pool.begin().await?;

    let inserted = sqlx::query(INSERT_IF_ELIGIBLE)
        .bind(user_id)
        .bind(category_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await;

    let result = match inserted {
        Ok(result) => result,
        Err(e) if db::is_unique_violation(&e) => {
            // O índice único apanhou o que o NOT EXISTS deixou passar
            let err = diagnose_rejection(&mut *tx, user_id, category_id).await?;
            tx.rollback().await?;
            return Err(err);
        }
        Err(e) => return Err(e.into()),
    };

    if result.rows_affected() == 0 {
        let err = diagnose_rejection(&mut *tx, user_id, category_id).await?;
        tx.rollback().await?;
        tracing::warn!(
            "Inscrição recusada (utilizador {}, categoria {}): {}",
            user_id,
            category_id,
            err
        );
        return Err(err);
    }

    let enrollment_id = result.last_insert_rowid();
    let category_name: String =
        sqlx::query_scalar("SELECT nombre FROM categorias_det_af WHERE id = ?1")
            .bind(category_id)
            .fetch_one(&mut *tx)
            .await?;

    tx.commit().await?;
    tracing::info!(
        "✅ Inscrição {} criada: utilizador {} em '{}'",
        enrollment_id,
        user_id,
        category_name
    );

    Ok(EnrollmentOutcome {
        enrollment_id,
        category_name,
    })
}

// Corre dentro da transação que ainda detém o lock de escrita
async fn diagnose_rejection(
    conn: &mut SqliteConnection,
    user_id: i64,
    category_id: i64,
) -> AppResult<AppError> {
    let category = fetch_availability(&mut *conn, category_id).await?;
    let enrollments = fetch_user_enrollments(&mut *conn, user_id).await?;
    let eligibility = evaluate_eligibility(category, &enrollments);

    match eligibility_error(&eligibility) {
        Some(err) => Ok(err),
        None => {
            tracing::error!(
                "INSERT condicional não inseriu mas a categoria {} parece elegível",
                category_id
            );
            Ok(AppError::InternalServerError)
        }
    }
}

/// Dá baixa de uma inscrição do próprio utilizador. Repetir é um no-op.
pub async fn unenroll(
    db_pool: &SqlitePool,
    user_id: i64,
    enrollment_id: i64,
) -> AppResult<UnenrollOutcome> {
    tracing::info!(
        "📝 Baixa do utilizador {} da inscrição {}...",
        user_id,
        enrollment_id
    );

    let status: Option<String> = sqlx::query_scalar(
        "SELECT estado FROM inscripciones_det_af WHERE id = ?1 AND usuario_id = ?2",
    )
    .bind(enrollment_id)
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?;

    let Some(status) = status else {
        return Err(AppError::EnrollmentNotFound);
    };

    let status = EnrollmentStatus::try_from(status).map_err(|e| {
        tracing::error!("Estado inválido na inscrição {}: {}", enrollment_id, e);
        AppError::InternalServerError
    })?;

    if status == EnrollmentStatus::Withdrawn {
        tracing::info!("ℹ️ Inscrição {} já estava dada de baixa", enrollment_id);
        return Ok(UnenrollOutcome {
            enrollment_id,
            already_withdrawn: true,
        });
    }

    let result = sqlx::query(
        r#"
        UPDATE inscripciones_det_af
        SET estado = 'baja', fecha_baja = ?3
        WHERE id = ?1 AND usuario_id = ?2 AND estado = 'activa'
        "#,
    )
    .bind(enrollment_id)
    .bind(user_id)
    .bind(Utc::now())
    .execute(db_pool)
    .await?;

    // Zero linhas: outro pedido deu baixa entre a leitura e o UPDATE
    let already_withdrawn = result.rows_affected() == 0;
    if !already_withdrawn {
        tracing::info!("✅ Baixa concluída para inscrição {}", enrollment_id);
    }

    Ok(UnenrollOutcome {
        enrollment_id,
        already_withdrawn,
    })
}

pub async fn get_general_stats(db_pool: &SqlitePool) -> AppResult<GeneralStats> {
    let stats = sqlx::query_as::<_, GeneralStats>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM categorias_det_af WHERE tipo = 'DET' AND activo = 1) AS det_categories,
            (SELECT COUNT(*) FROM categorias_det_af WHERE tipo = 'AF' AND activo = 1) AS af_categories,
            (SELECT COUNT(*) FROM inscripciones_det_af WHERE estado = 'activa') AS active_enrollments,
            (SELECT COUNT(DISTINCT usuario_id) FROM inscripciones_det_af
                WHERE tipo_categoria = 'DET' AND estado = 'activa') AS users_with_det,
            (SELECT COUNT(DISTINCT usuario_id) FROM inscripciones_det_af
                WHERE tipo_categoria = 'AF' AND estado = 'activa') AS users_with_af
        "#,
    )
    .fetch_one(db_pool)
    .await?;

    tracing::debug!("📈 Estatísticas obtidas: {:?}", stats);
    Ok(stats)
}

/// Todas as inscrições ativas, para o painel de administração.
pub async fn list_active_enrollments(db_pool: &SqlitePool) -> AppResult<Vec<AdminEnrollment>> {
    let enrollments = sqlx::query_as::<_, AdminEnrollment>(
        r#"
        SELECT
            i.id AS enrollment_id,
            u.id AS user_id,
            u.nombre AS user_name,
            u.email AS user_email,
            c.id AS category_id,
            c.nombre AS category_name,
            c.tipo AS kind,
            i.fecha_inscripcion AS enrolled_at
        FROM inscripciones_det_af i
        JOIN usuarios u ON u.id = i.usuario_id
        JOIN categorias_det_af c ON c.id = i.categoria_id
        WHERE i.estado = 'activa'
        ORDER BY c.tipo, c.nombre, u.nombre
        "#,
    )
    .fetch_all(db_pool)
    .await?;
    Ok(enrollments)
}

async fn find_category<'e, E>(executor: E, category_id: i64) -> AppResult<Option<Category>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let category = sqlx::query_as::<_, Category>(&format!(
        "SELECT {} FROM categorias_det_af WHERE id = ?1",
        CATEGORY_COLUMNS
    ))
    .bind(category_id)
    .fetch_optional(executor)
    .await?;
    Ok(category)
}

fn validate_category_fields(name: &str, capacity: i64) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::ValidationError("name es requerido".into()));
    }
    if capacity < 0 {
        return Err(AppError::ValidationError(
            "capacity no puede ser negativo".into(),
        ));
    }
    Ok(())
}

pub async fn create_category(db_pool: &SqlitePool, input: &NewCategory) -> AppResult<Category> {
    validate_category_fields(&input.name, input.capacity)?;

    let result = sqlx::query(
        r#"
        INSERT INTO categorias_det_af (tipo, nombre, descripcion, cupo_maximo, activo)
        VALUES (?1, ?2, ?3, ?4, 1)
        "#,
    )
    .bind(input.kind.as_str())
    .bind(input.name.trim())
    .bind(input.description.trim())
    .bind(input.capacity)
    .execute(db_pool)
    .await?;

    let id = result.last_insert_rowid();
    tracing::info!("✅ Categoria {} '{}' criada ({})", id, input.name, input.kind);

    find_category(db_pool, id)
        .await?
        .ok_or(AppError::InternalServerError)
}

/// Atualiza uma categoria. Mudar o tipo re-deriva o tipo das inscrições
/// (trigger `tr_categoria_tipo_actualizado`).
pub async fn update_category(
    db_pool: &SqlitePool,
    category_id: i64,
    update: &CategoryUpdate,
) -> AppResult<Category> {
    let mut tx = db_pool.begin().await?;

    // Toma o lock de escrita antes de ler a ocupação
    let touched = sqlx::query("UPDATE categorias_det_af SET id = id WHERE id = ?1")
        .bind(category_id)
        .execute(&mut *tx)
        .await?;
    if touched.rows_affected() == 0 {
        return Err(AppError::CategoryNotFound);
    }

    let current = find_category(&mut *tx, category_id)
        .await?
        .ok_or(AppError::CategoryNotFound)?;

    let kind = update.kind.unwrap_or(current.kind);
    let name = update.name.clone().unwrap_or(current.name);
    let description = update.description.clone().unwrap_or(current.description);
    let capacity = update.capacity.unwrap_or(current.capacity);
    let active = update.active.unwrap_or(current.active);
    validate_category_fields(&name, capacity)?;

    let occupied: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM inscripciones_det_af WHERE categoria_id = ?1 AND estado = 'activa'",
    )
    .bind(category_id)
    .fetch_one(&mut *tx)
    .await?;

    if capacity < occupied {
        return Err(AppError::ValidationError(format!(
            "capacity no puede ser menor que las {} inscripciones activas",
            occupied
        )));
    }

    let updated = sqlx::query(
        r#"
        UPDATE categorias_det_af
        SET tipo = ?2, nombre = ?3, descripcion = ?4, cupo_maximo = ?5, activo = ?6
        WHERE id = ?1
        "#,
    )
    .bind(category_id)
    .bind(kind.as_str())
    .bind(name.trim())
    .bind(description.trim())
    .bind(capacity)
    .bind(active)
    .execute(&mut *tx)
    .await;

    match updated {
        Ok(_) => {}
        Err(e) if db::is_unique_violation(&e) => {
            return Err(AppError::ValidationError(
                "Cambiar el tipo dejaría a un usuario con dos inscripciones activas del mismo tipo"
                    .into(),
            ));
        }
        Err(e) => return Err(e.into()),
    }

    let category = find_category(&mut *tx, category_id)
        .await?
        .ok_or(AppError::InternalServerError)?;
    tx.commit().await?;

    tracing::info!("✅ Categoria {} atualizada", category_id);
    Ok(category)
}
