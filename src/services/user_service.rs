// src/services/user_service.rs
use crate::{
    config::JwtConfig,
    db,
    error::{AppError, AppResult},
    models::user::{LoginResponse, NewUser, RegisterPayload, Role, User, UserProfile},
    services::auth_service,
};
use sqlx::SqlitePool;

pub const MIN_PASSWORD_LEN: usize = 8;

const USER_COLUMNS: &str = r#"
    id,
    nombre AS name,
    email,
    password_hash,
    rol AS role,
    matricula AS enrollment_number,
    area_estudios AS study_area,
    semestre AS semester,
    activo AS active,
    created_at
"#;

/// Busca um utilizador (ativo ou não) pelo seu ID.
pub async fn find_user_by_id(db_pool: &SqlitePool, user_id: i64) -> AppResult<Option<User>> {
    tracing::debug!("Buscando utilizador por ID: {}", user_id);
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM usuarios WHERE id = ?1",
        USER_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(user)
}

/// Busca um utilizador ativo pelo email (comparação sem maiúsculas).
pub async fn find_active_user_by_email(
    db_pool: &SqlitePool,
    email: &str,
) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM usuarios WHERE email = ?1 COLLATE NOCASE AND activo = 1",
        USER_COLUMNS
    ))
    .bind(email.trim())
    .fetch_optional(db_pool)
    .await?;
    Ok(user)
}

/// Perfil público de um utilizador ativo.
pub async fn get_profile(db_pool: &SqlitePool, user_id: i64) -> AppResult<UserProfile> {
    match find_user_by_id(db_pool, user_id).await? {
        Some(user) if user.active => Ok(user.into()),
        _ => Err(AppError::UserNotFound),
    }
}

/// Autentica por email e senha e emite um token JWT.
pub async fn login(
    db_pool: &SqlitePool,
    jwt: &JwtConfig,
    email: &str,
    password: &str,
) -> AppResult<LoginResponse> {
    tracing::info!("Tentativa de login para: {}", email);

    let Some(user) = find_active_user_by_email(db_pool, email).await? else {
        tracing::warn!("Utilizador não encontrado ou inativo: {}", email);
        return Err(AppError::InvalidCredentials);
    };

    if !auth_service::verify_password(password, &user.password_hash).await? {
        tracing::warn!("Senha incorreta para: {}", email);
        return Err(AppError::InvalidCredentials);
    }

    let token = auth_service::generate_token(user.id, &user.email, user.role, jwt)?;
    tracing::info!("✅ Login bem-sucedido para: {} (id {})", user.email, user.id);

    Ok(LoginResponse {
        token,
        user: user.into(),
    })
}

/// Valida os campos obrigatórios do registo.
pub fn validate_registration(payload: RegisterPayload) -> AppResult<NewUser> {
    fn required(value: Option<String>, field: &str) -> AppResult<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::ValidationError(format!("{} es requerido", field)))
    }

    let name = required(payload.name, "name")?;
    let email = required(payload.email, "email")?;
    if !email.contains('@') {
        return Err(AppError::ValidationError("email no es válido".into()));
    }

    let password = payload
        .password
        .ok_or_else(|| AppError::ValidationError("password es requerido".into()))?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::ValidationError(format!(
            "La contraseña debe tener al menos {} caracteres",
            MIN_PASSWORD_LEN
        )));
    }

    let enrollment_number = required(payload.enrollment_number, "enrollment_number")?;
    let study_area = required(payload.study_area, "study_area")?;
    let semester = payload
        .semester
        .ok_or_else(|| AppError::ValidationError("semester es requerido".into()))?;
    if !(1..=12).contains(&semester) {
        return Err(AppError::ValidationError(
            "semester debe estar entre 1 y 12".into(),
        ));
    }

    Ok(NewUser {
        name,
        email,
        password,
        enrollment_number,
        study_area,
        semester,
    })
}

/// Cria um estudante novo. O rol é sempre `estudiante`.
pub async fn create_user(db_pool: &SqlitePool, new_user: &NewUser) -> AppResult<UserProfile> {
    tracing::info!("Tentando criar utilizador: {}", new_user.email);
    let password_hash = auth_service::hash_password(&new_user.password).await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO usuarios (nombre, email, password_hash, rol, matricula, area_estudios, semestre, activo)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)
        "#,
    )
    .bind(&new_user.name)
    .bind(&new_user.email)
    .bind(&password_hash)
    .bind(Role::Student.as_str())
    .bind(&new_user.enrollment_number)
    .bind(&new_user.study_area)
    .bind(new_user.semester)
    .execute(db_pool)
    .await;

    let result = match inserted {
        Ok(result) => result,
        Err(e) if db::is_unique_violation(&e) => {
            tracing::warn!("Falha ao criar user: email '{}' já existe.", new_user.email);
            return Err(AppError::ValidationError(
                "Ya existe un usuario con ese email".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let id = result.last_insert_rowid();
    tracing::info!("✅ Utilizador '{}' criado com id {}.", new_user.email, id);

    find_user_by_id(db_pool, id)
        .await?
        .map(UserProfile::from)
        .ok_or(AppError::InternalServerError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn payload() -> RegisterPayload {
        RegisterPayload {
            name: Some("Mauro Pérez".into()),
            email: Some("mauro@lasallep.mx".into()),
            password: Some("segura-2025".into()),
            enrollment_number: Some("240088".into()),
            study_area: Some("Arquitectura".into()),
            semester: Some(3),
        }
    }

    #[test]
    fn valid_registration_is_trimmed() {
        let mut p = payload();
        p.name = Some("  Mauro Pérez ".into());
        let user = validate_registration(p).unwrap();
        assert_eq!(user.name, "Mauro Pérez");
        assert_eq!(user.semester, 3);
    }

    #[test]
    fn missing_or_blank_fields_are_rejected() {
        let mut p = payload();
        p.email = Some("   ".into());
        assert_matches!(validate_registration(p), Err(AppError::ValidationError(msg)) if msg.contains("email"));

        let mut p = payload();
        p.study_area = None;
        assert_matches!(validate_registration(p), Err(AppError::ValidationError(_)));
    }

    #[test]
    fn short_password_and_bad_semester_are_rejected() {
        let mut p = payload();
        p.password = Some("1234".into());
        assert_matches!(validate_registration(p), Err(AppError::ValidationError(_)));

        let mut p = payload();
        p.semester = Some(0);
        assert_matches!(validate_registration(p), Err(AppError::ValidationError(_)));
    }
}
