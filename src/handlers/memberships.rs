// src/handlers/memberships.rs

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
    models::membership::{
        AdjustMembershipDaysPayload, CancelMembershipPayload, Membership, MembershipAdjustment,
        MembershipSuspension, SuspendMembershipPayload,
    },
};

// GET /api/clients/{client_id}/memberships
#[utoipa::path(
    get,
    path = "/api/clients/{client_id}/memberships",
    tag = "Memberships",
    responses(
        (status = 200, description = "Matrículas do cliente por data de início", body = Vec<Membership>)
    ),
    params(
        ("client_id" = Uuid, Path, description = "ID do Cliente"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Empresa"),
        ("x-branch-id" = Uuid, Header, description = "ID da Filial")
    )
)]
pub async fn list_memberships(
    State(app_state): State<AppState>,
    BranchContext(scope): BranchContext,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let memberships = app_state
        .membership_service
        .list_memberships(scope, client_id)
        .await?;

    Ok((StatusCode::OK, Json(memberships)))
}

// POST /api/clients/{client_id}/memberships/{membership_id}/suspend
#[utoipa::path(
    post,
    path = "/api/clients/{client_id}/memberships/{membership_id}/suspend",
    tag = "Memberships",
    request_body = SuspendMembershipPayload,
    responses(
        (status = 200, description = "Matrícula trancada", body = Membership),
        (status = 404, description = "Matrícula ou contrato não encontrado"),
        (status = 422, description = "Contrato não permite o trancamento pedido")
    ),
    params(
        ("client_id" = Uuid, Path, description = "ID do Cliente"),
        ("membership_id" = Uuid, Path, description = "ID da Matrícula"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Empresa"),
        ("x-branch-id" = Uuid, Header, description = "ID da Filial")
    )
)]
pub async fn suspend_membership(
    State(app_state): State<AppState>,
    BranchContext(scope): BranchContext,
    Path((client_id, membership_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SuspendMembershipPayload>,
) -> Result<impl IntoResponse, AppError> {
    let membership = app_state
        .membership_service
        .suspend(scope, client_id, membership_id, payload)
        .await?;

    Ok((StatusCode::OK, Json(membership)))
}

// POST /api/clients/{client_id}/memberships/{membership_id}/adjust-days
#[utoipa::path(
    post,
    path = "/api/clients/{client_id}/memberships/{membership_id}/adjust-days",
    tag = "Memberships",
    request_body = AdjustMembershipDaysPayload,
    responses(
        (status = 200, description = "Data de término ajustada", body = Membership),
        (status = 404, description = "Matrícula não encontrada"),
        (status = 422, description = "Matrícula encerrada ou ajuste inválido")
    ),
    params(
        ("client_id" = Uuid, Path, description = "ID do Cliente"),
        ("membership_id" = Uuid, Path, description = "ID da Matrícula"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Empresa"),
        ("x-branch-id" = Uuid, Header, description = "ID da Filial")
    )
)]
pub async fn adjust_membership_days(
    State(app_state): State<AppState>,
    BranchContext(scope): BranchContext,
    Path((client_id, membership_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<AdjustMembershipDaysPayload>,
) -> Result<impl IntoResponse, AppError> {
    let membership = app_state
        .membership_service
        .adjust_days(scope, client_id, membership_id, payload)
        .await?;

    Ok((StatusCode::OK, Json(membership)))
}

// POST /api/clients/{client_id}/memberships/{membership_id}/cancel
#[utoipa::path(
    post,
    path = "/api/clients/{client_id}/memberships/{membership_id}/cancel",
    tag = "Memberships",
    request_body = CancelMembershipPayload,
    responses(
        (status = 200, description = "Matrícula cancelada (sem estorno)", body = Membership),
        (status = 404, description = "Matrícula ou cliente não encontrado"),
        (status = 422, description = "Matrícula já cancelada ou expirada")
    ),
    params(
        ("client_id" = Uuid, Path, description = "ID do Cliente"),
        ("membership_id" = Uuid, Path, description = "ID da Matrícula"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Empresa"),
        ("x-branch-id" = Uuid, Header, description = "ID da Filial")
    )
)]
pub async fn cancel_membership(
    State(app_state): State<AppState>,
    BranchContext(scope): BranchContext,
    Path((client_id, membership_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CancelMembershipPayload>,
) -> Result<impl IntoResponse, AppError> {
    let membership = app_state
        .membership_service
        .cancel(scope, client_id, membership_id, payload)
        .await?;

    Ok((StatusCode::OK, Json(membership)))
}

// GET /api/clients/{client_id}/memberships/{membership_id}/suspensions
#[utoipa::path(
    get,
    path = "/api/clients/{client_id}/memberships/{membership_id}/suspensions",
    tag = "Memberships",
    responses(
        (status = 200, description = "Histórico de trancamentos", body = Vec<MembershipSuspension>),
        (status = 404, description = "Matrícula não encontrada")
    ),
    params(
        ("client_id" = Uuid, Path, description = "ID do Cliente"),
        ("membership_id" = Uuid, Path, description = "ID da Matrícula"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Empresa"),
        ("x-branch-id" = Uuid, Header, description = "ID da Filial")
    )
)]
pub async fn list_suspensions(
    State(app_state): State<AppState>,
    BranchContext(scope): BranchContext,
    Path((client_id, membership_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let suspensions = app_state
        .membership_service
        .list_suspensions(scope, client_id, membership_id)
        .await?;

    Ok((StatusCode::OK, Json(suspensions)))
}

// GET /api/clients/{client_id}/memberships/{membership_id}/adjustments
#[utoipa::path(
    get,
    path = "/api/clients/{client_id}/memberships/{membership_id}/adjustments",
    tag = "Memberships",
    responses(
        (status = 200, description = "Histórico de ajustes de dias", body = Vec<MembershipAdjustment>),
        (status = 404, description = "Matrícula não encontrada")
    ),
    params(
        ("client_id" = Uuid, Path, description = "ID do Cliente"),
        ("membership_id" = Uuid, Path, description = "ID da Matrícula"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Empresa"),
        ("x-branch-id" = Uuid, Header, description = "ID da Filial")
    )
)]
pub async fn list_adjustments(
    State(app_state): State<AppState>,
    BranchContext(scope): BranchContext,
    Path((client_id, membership_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let adjustments = app_state
        .membership_service
        .list_adjustments(scope, client_id, membership_id)
        .await?;

    Ok((StatusCode::OK, Json(adjustments)))
}
