// src/handlers/sales.rs

use axum::{
    extract::{Path, Query, State},
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
        finance::Receivable,
        sales::{CreateSalePayload, CreateSaleResponse, Sale, SalesByClientQuery, SalesRangeQuery},
    },
};

// POST /api/sales
#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Sales",
    request_body = CreateSalePayload,
    responses(
        (status = 201, description = "Venda registrada", body = CreateSaleResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado"),
        (status = 409, description = "Conflito de concorrência"),
        (status = 422, description = "Regra de negócio violada")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Empresa"),
        ("x-branch-id" = Uuid, Header, description = "ID da Filial")
    )
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    BranchContext(scope): BranchContext,
    Json(payload): Json<CreateSalePayload>,
) -> Result<impl IntoResponse, AppError> {
    let sale_id = app_state.sale_service.create_sale(scope, payload).await?;

    Ok((StatusCode::CREATED, Json(CreateSaleResponse { sale_id })))
}

// GET /api/sales?clientId=
#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sales",
    responses(
        (status = 200, description = "Vendas do cliente, mais recentes primeiro", body = Vec<Sale>)
    ),
    params(
        SalesByClientQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da Empresa"),
        ("x-branch-id" = Uuid, Header, description = "ID da Filial")
    )
)]
pub async fn list_sales_by_client(
    State(app_state): State<AppState>,
    BranchContext(scope): BranchContext,
    Query(query): Query<SalesByClientQuery>,
) -> Result<impl IntoResponse, AppError> {
    let sales = app_state
        .sale_service
        .fetch_sales_by_client(scope, query.client_id)
        .await?;

    Ok((StatusCode::OK, Json(sales)))
}

// GET /api/sales/range?from=&to=
#[utoipa::path(
    get,
    path = "/api/sales/range",
    tag = "Sales",
    responses(
        (status = 200, description = "Vendas no período (datas inclusivas)", body = Vec<Sale>),
        (status = 400, description = "Período inválido")
    ),
    params(
        SalesRangeQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da Empresa"),
        ("x-branch-id" = Uuid, Header, description = "ID da Filial")
    )
)]
pub async fn list_sales_range(
    State(app_state): State<AppState>,
    BranchContext(scope): BranchContext,
    Query(query): Query<SalesRangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let sales = app_state
        .sale_service
        .fetch_sales_range(scope, query.from, query.to)
        .await?;

    Ok((StatusCode::OK, Json(sales)))
}

// GET /api/sales/{sale_id}/receivables
#[utoipa::path(
    get,
    path = "/api/sales/{sale_id}/receivables",
    tag = "Sales",
    responses(
        (status = 200, description = "Recebíveis da venda por vencimento", body = Vec<Receivable>),
        (status = 404, description = "Venda não encontrada")
    ),
    params(
        ("sale_id" = Uuid, Path, description = "ID da Venda"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Empresa"),
        ("x-branch-id" = Uuid, Header, description = "ID da Filial")
    )
)]
pub async fn list_sale_receivables(
    State(app_state): State<AppState>,
    BranchContext(scope): BranchContext,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let receivables = app_state
        .sale_service
        .list_receivables_by_sale(scope, sale_id)
        .await?;

    Ok((StatusCode::OK, Json(receivables)))
}
