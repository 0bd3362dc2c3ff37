// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{common::error::AppError, db::Scope};

// Os nomes dos nossos cabeçalhos HTTP customizados
const TENANT_ID_HEADER: &str = "x-tenant-id";
const BRANCH_ID_HEADER: &str = "x-branch-id";

/// Extrator com o tenant e a filial da requisição.
#[derive(Debug, Clone, Copy)]
pub struct BranchContext(pub Scope);

fn header_uuid(parts: &Parts, name: &str) -> Result<Uuid, AppError> {
    let value = parts
        .headers
        .get(name)
        .ok_or_else(|| AppError::invalid(format!("O cabeçalho {name} é obrigatório.")))?;

    let value_str = value
        .to_str()
        .map_err(|_| AppError::invalid(format!("Cabeçalho {name} contém caracteres inválidos.")))?;

    Uuid::parse_str(value_str.trim())
        .map_err(|_| AppError::invalid(format!("Cabeçalho {name} inválido (não é um UUID).")))
}

impl<S> FromRequestParts<S> for BranchContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant_id = header_uuid(parts, TENANT_ID_HEADER)?;
        let branch_id = header_uuid(parts, BRANCH_ID_HEADER)?;
        Ok(BranchContext(Scope::new(tenant_id, branch_id)))
    }
}
