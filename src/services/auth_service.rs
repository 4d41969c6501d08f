// src/services/auth_service.rs
use crate::{
    config::JwtConfig,
    error::{AppError, AppResult},
    models::user::{AuthUser, Role},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Verifica se a senha fornecida corresponde ao hash guardado.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verificando hash bcrypt...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (verify_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao verificar senha: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Gera um hash bcrypt para uma senha.
pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Gerando hash bcrypt...");
        bcrypt::hash(&password, bcrypt::DEFAULT_COST)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (hash_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao gerar hash: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Conteúdo do token de acesso (HS256).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// ID do utilizador na tabela `usuarios`.
    pub sub: i64,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

pub fn generate_token(
    user_id: i64,
    email: &str,
    role: Role,
    config: &JwtConfig,
) -> AppResult<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        role,
        iat: now,
        exp: now + config.expiry_hours * 3600,
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;
    Ok(token)
}

/// Valida assinatura e expiração, devolvendo o utilizador autenticado.
pub fn validate_token(token: &str, config: &JwtConfig) -> AppResult<AuthUser> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("Token rejeitado: {}", e);
        AppError::Unauthorized("Token inválido o expirado".into())
    })?;

    Ok(AuthUser {
        user_id: data.claims.sub,
        email: data.claims.email,
        role: data.claims.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn test_config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            expiry_hours: 24,
        }
    }

    #[test]
    fn token_round_trip_keeps_identity() {
        let config = test_config("segredo-de-teste-suficientemente-longo");
        let token = generate_token(42, "ana@lasalle.mx", Role::Admin, &config).unwrap();

        let user = validate_token(&token, &config).unwrap();
        assert_eq!(user.user_id, 42);
        assert_eq!(user.email, "ana@lasalle.mx");
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = generate_token(1, "a@b.mx", Role::Student, &test_config("alfa")).unwrap();
        let result = validate_token(&token, &test_config("bravo"));
        assert_matches!(result, Err(AppError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Bem para lá da margem de 60s do jsonwebtoken
        let config = test_config("segredo");
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            email: "a@b.mx".into(),
            role: Role::Student,
            iat: now - 7200,
            exp: now - 3600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert_matches!(validate_token(&token, &config), Err(AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn bcrypt_hash_verifies_only_the_right_password() {
        let hash = hash_password("correcta-123").await.unwrap();
        assert!(verify_password("correcta-123", &hash).await.unwrap());
        assert!(!verify_password("1234", &hash).await.unwrap());
    }
}
