// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro único: toda operação do motor devolve UMA mensagem legível.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Regras de entrada verificadas antes de abrir a transação
    #[error("{0}")]
    InvalidInput(String),

    // Regras de negócio verificadas dentro da transação (estado atual do documento)
    #[error("{0}")]
    BusinessRule(String),

    #[error("{0} não encontrado(a).")]
    NotFound(String),

    // Algum documento lido mudou antes do commit. Nada foi gravado, pode tentar de novo.
    #[error("Conflito de concorrência: os dados mudaram durante a operação. Tente novamente.")]
    Conflict,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de serialização de documento: {0}")]
    SerializationError(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }

    pub fn rule(message: impl Into<String>) -> Self {
        AppError::BusinessRule(message.into())
    }

    pub fn not_found(entity: impl Into<String>) -> Self {
        AppError::NotFound(entity.into())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::BusinessRule(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            e @ AppError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
            e @ AppError::Conflict => (StatusCode::CONFLICT, e.to_string()),

            // Todos os outros erros (DatabaseError, InternalServerError...) viram 500.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
