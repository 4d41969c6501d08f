// src/config.rs
use crate::error::{AppError, AppResult};
use std::{env, str::FromStr};

/// Configuração do servidor, lida das variáveis de ambiente (e do `.env`).
///
/// | Variável             | Obrigatória | Default                  |
/// |----------------------|-------------|--------------------------|
/// | `DATABASE_URL`       | sim         |                          |
/// | `JWT_SECRET`         | sim         |                          |
/// | `HOST`               | não         | `0.0.0.0`                |
/// | `PORT`               | não         | `3000`                   |
/// | `DB_MAX_CONNECTIONS` | não         | `5`                      |
/// | `JWT_EXPIRY_HOURS`   | não         | `24`                     |
/// | `CORS_ORIGINS`       | não         | `http://localhost:8080`  |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DbConfig,
    pub jwt: JwtConfig,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: i64,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok(); // Carrega .env se existir

        let jwt_secret = env::var("JWT_SECRET")?;
        if jwt_secret.is_empty() {
            return Err(AppError::ConfigError("JWT_SECRET não pode ser vazio".into()));
        }
        if jwt_secret.len() < 32 {
            tracing::warn!("⚠️ JWT_SECRET é curta, considere usar uma chave mais longa e aleatória!");
        }

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_or("PORT", 3000)?,
            database: DbConfig {
                url: env::var("DATABASE_URL")?,
                max_connections: parse_or("DB_MAX_CONNECTIONS", 5)?,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                expiry_hours: parse_or("JWT_EXPIRY_HOURS", 24)?,
            },
            cors_origins: split_origins(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:8080".into()),
            ),
        })
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::ConfigError(format!("{} tem um valor inválido: '{}'", key, raw))),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(e.into()),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
