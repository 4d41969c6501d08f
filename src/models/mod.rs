// src/models/mod.rs
pub mod det_af;
pub mod grades;
pub mod user;

use thiserror::Error;

/// Valor lido da base de dados que não corresponde a nenhuma variante conhecida.
#[derive(Debug, Error)]
#[error("valor desconhecido para {field}: '{value}'")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}
