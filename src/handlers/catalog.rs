// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::BranchContext,
    models::{
        catalog::{Acquirer, Contract, CreateAcquirerPayload, CreateContractPayload},
        client::{Client, CreateClientPayload},
    },
};

// =============================================================================
//  CLIENTES
// =============================================================================

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Catalog",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Cliente cadastrado", body = Client),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Empresa"),
        ("x-branch-id" = Uuid, Header, description = "ID da Filial")
    )
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    BranchContext(scope): BranchContext,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state.catalog_service.create_client(scope, payload).await?;

    Ok((StatusCode::CREATED, Json(client)))
}

// GET /api/clients/{client_id}
#[utoipa::path(
    get,
    path = "/api/clients/{client_id}",
    tag = "Catalog",
    responses(
        (status = 200, description = "Cliente", body = Client),
        (status = 404, description = "Cliente não encontrado")
    ),
    params(
        ("client_id" = Uuid, Path, description = "ID do Cliente"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Empresa"),
        ("x-branch-id" = Uuid, Header, description = "ID da Filial")
    )
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    BranchContext(scope): BranchContext,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state.catalog_service.get_client(scope, client_id).await?;

    Ok((StatusCode::OK, Json(client)))
}

// =============================================================================
//  ADQUIRENTES
// =============================================================================

// POST /api/acquirers
#[utoipa::path(
    post,
    path = "/api/acquirers",
    tag = "Catalog",
    request_body = CreateAcquirerPayload,
    responses(
        (status = 201, description = "Adquirente cadastrada", body = Acquirer),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Empresa"),
        ("x-branch-id" = Uuid, Header, description = "ID da Filial")
    )
)]
pub async fn create_acquirer(
    State(app_state): State<AppState>,
    BranchContext(scope): BranchContext,
    Json(payload): Json<CreateAcquirerPayload>,
) -> Result<impl IntoResponse, AppError> {
    let acquirer = app_state.catalog_service.create_acquirer(scope, payload).await?;

    Ok((StatusCode::CREATED, Json(acquirer)))
}

// GET /api/acquirers
#[utoipa::path(
    get,
    path = "/api/acquirers",
    tag = "Catalog",
    responses(
        (status = 200, description = "Adquirentes da filial", body = Vec<Acquirer>)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Empresa"),
        ("x-branch-id" = Uuid, Header, description = "ID da Filial")
    )
)]
pub async fn list_acquirers(
    State(app_state): State<AppState>,
    BranchContext(scope): BranchContext,
) -> Result<impl IntoResponse, AppError> {
    let acquirers = app_state.catalog_service.list_acquirers(scope).await?;

    Ok((StatusCode::OK, Json(acquirers)))
}

// =============================================================================
//  CONTRATOS
// =============================================================================

// POST /api/contracts
#[utoipa::path(
    post,
    path = "/api/contracts",
    tag = "Catalog",
    request_body = CreateContractPayload,
    responses(
        (status = 201, description = "Contrato cadastrado", body = Contract),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Empresa"),
        ("x-branch-id" = Uuid, Header, description = "ID da Filial")
    )
)]
pub async fn create_contract(
    State(app_state): State<AppState>,
    BranchContext(scope): BranchContext,
    Json(payload): Json<CreateContractPayload>,
) -> Result<impl IntoResponse, AppError> {
    let contract = app_state.catalog_service.create_contract(scope, payload).await?;

    Ok((StatusCode::CREATED, Json(contract)))
}

// GET /api/contracts
#[utoipa::path(
    get,
    path = "/api/contracts",
    tag = "Catalog",
    responses(
        (status = 200, description = "Contratos da filial", body = Vec<Contract>)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Empresa"),
        ("x-branch-id" = Uuid, Header, description = "ID da Filial")
    )
)]
pub async fn list_contracts(
    State(app_state): State<AppState>,
    BranchContext(scope): BranchContext,
) -> Result<impl IntoResponse, AppError> {
    let contracts = app_state.catalog_service.list_contracts(scope).await?;

    Ok((StatusCode::OK, Json(contracts)))
}
