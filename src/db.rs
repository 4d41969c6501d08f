// src/db.rs
use crate::{config::DbConfig, error::AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Cria o pool de conexões e aplica as migrações de `./migrations`.
///
/// O pool é criado uma vez no arranque e passado aos serviços via `AppState`.
pub async fn create_db_pool(config: &DbConfig) -> AppResult<SqlitePool> {
    tracing::info!("Ligando à base de dados: {}", config.url);

    // Criar se não existir; escritores concorrentes esperam até 5s pelo lock
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> AppResult<()> {
    tracing::info!("Executando migrações da base de dados...");
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Migrações concluídas.");
    Ok(())
}

/// Devolve `true` se o erro for uma violação de índice UNIQUE.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
