// src/services/membership_service.rs

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Map, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        date_key::{add_days, days_inclusive, format_date_key},
        error::AppError,
    },
    db::{
        retry_on_conflict, CatalogRepository, ClientRepository, DocumentStore, MembershipRepository,
        ReceivableRepository, Scope, Tx,
    },
    models::{
        finance::ReceivableKind,
        membership::{
            AdjustMembershipDaysPayload, CancelMembershipPayload, Membership, MembershipAdjustment,
            MembershipStatus, MembershipSuspension, SuspendMembershipPayload,
        },
    },
};

/// Ações sobre uma matrícula existente: trancar, ajustar dias e cancelar.
/// Cada uma é uma transação curta e independente.
#[derive(Clone)]
pub struct MembershipService {
    store: Arc<dyn DocumentStore>,
    max_attempts: u32,
    clients: ClientRepository,
    memberships: MembershipRepository,
    receivables: ReceivableRepository,
    catalog: CatalogRepository,
}

impl MembershipService {
    pub fn new(store: Arc<dyn DocumentStore>, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts,
            clients: ClientRepository::new(),
            memberships: MembershipRepository::new(),
            receivables: ReceivableRepository::new(),
            catalog: CatalogRepository::new(),
        }
    }

    // Pendentes que vêm depois de `membership` na cadeia
    async fn load_pending_successors(&self, tx: &mut Tx, membership: &Membership) -> Result<Vec<Membership>, AppError> {
        let Some(next_id) = membership.next_membership_id else {
            return Ok(Vec::new());
        };
        let chain = self.memberships.load_chain(tx, membership.client_id, next_id).await?;
        Ok(chain
            .into_iter()
            .filter(|m| m.status == MembershipStatus::Pending)
            .collect())
    }

    // Empurra as pendentes em `days` dias para a fila continuar sem sobreposição
    fn shift_successors(&self, tx: &mut Tx, successors: &[Membership], days: i64) {
        for successor in successors {
            let mut patch = Map::new();
            patch.insert("startDate".into(), json!(format_date_key(add_days(successor.start_date, days))));
            if let Some(end) = successor.end_date {
                patch.insert("endDate".into(), json!(format_date_key(add_days(end, days))));
            }
            self.memberships.patch(tx, successor.client_id, successor.id, Value::Object(patch));
        }
    }

    // =========================================================================
    //  TRANCAMENTO
    // =========================================================================

    pub async fn suspend(
        &self,
        scope: Scope,
        client_id: Uuid,
        membership_id: Uuid,
        payload: SuspendMembershipPayload,
    ) -> Result<Membership, AppError> {
        payload.validate()?;
        let end = payload
            .end_date
            .ok_or_else(|| AppError::invalid("Informe a data final do trancamento."))?;
        let start = payload.start_date.unwrap_or_else(|| Utc::now().date_naive());
        if end < start {
            return Err(AppError::invalid("A data final do trancamento deve ser igual ou posterior à inicial."));
        }
        let days = days_inclusive(start, end);
        let reason = payload.reason.as_deref().map(str::trim).filter(|r| !r.is_empty());

        retry_on_conflict("suspend_membership", self.max_attempts, || async move {
            let mut tx = Tx::begin(self.store.as_ref(), scope).await?;

            // 1. Leituras: matrícula, contrato, fila
            let membership = self.memberships.get(&mut tx, client_id, membership_id).await?;
            let contract_id = membership
                .contract_id
                .ok_or_else(|| AppError::rule("Esta matrícula não tem contrato; o trancamento não é permitido."))?;
            let contract = self
                .catalog
                .find_contract(&mut tx, contract_id)
                .await?
                .ok_or_else(|| AppError::not_found("Contrato"))?;
            let successors = self.load_pending_successors(&mut tx, &membership).await?;

            // 2. Regras do contrato
            if !contract.allow_freeze {
                return Err(AppError::rule("O contrato não permite trancamento."));
            }
            if membership.status != MembershipStatus::Active {
                return Err(AppError::rule("Somente matrículas ativas podem ser trancadas."));
            }
            if let Some(max_times) = contract.max_suspension_times {
                if membership.suspension_count >= max_times {
                    return Err(AppError::rule(format!(
                        "Limite de trancamentos atingido ({max_times})."
                    )));
                }
            }
            if let Some(min) = contract.minimum_suspension_days {
                if days < min {
                    return Err(AppError::rule(format!("O trancamento mínimo é de {min} dia(s).")));
                }
            }
            if let Some(max) = contract.max_suspension_days {
                if days > max {
                    return Err(AppError::rule(format!("O trancamento máximo é de {max} dia(s).")));
                }
            }
            let current_end = membership
                .end_date
                .ok_or_else(|| AppError::rule("A matrícula não tem data de término válida."))?;

            // 3. Novo estado
            let new_end = add_days(current_end, days);
            let suspension = MembershipSuspension {
                id: Uuid::new_v4(),
                membership_id: membership.id,
                client_id: membership.client_id,
                start_date: start,
                end_date: end,
                days,
                reason: reason.map(String::from),
                created_at: None,
            };

            let mut updated = membership.clone();
            updated.status = MembershipStatus::Paused;
            updated.pause_until = Some(end);
            updated.end_date = Some(new_end);
            updated.suspension_count += 1;
            updated.suspension_days_used += days;

            // 4. Escritas
            self.memberships.create_suspension(&mut tx, &suspension)?;
            self.memberships.patch(
                &mut tx,
                membership.client_id,
                membership.id,
                json!({
                    "status": updated.status,
                    "pauseUntil": format_date_key(end),
                    "endDate": format_date_key(new_end),
                    "suspensionCount": updated.suspension_count,
                    "suspensionDaysUsed": updated.suspension_days_used,
                }),
            );
            self.shift_successors(&mut tx, &successors, days);
            tx.commit().await?;

            tracing::info!(
                %membership_id,
                %client_id,
                days,
                new_end = %new_end,
                shifted = successors.len(),
                "⏸️ Matrícula trancada"
            );
            Ok(updated)
        })
        .await
    }

    // =========================================================================
    //  AJUSTE DE DIAS
    // =========================================================================

    pub async fn adjust_days(
        &self,
        scope: Scope,
        client_id: Uuid,
        membership_id: Uuid,
        payload: AdjustMembershipDaysPayload,
    ) -> Result<Membership, AppError> {
        payload.validate()?;
        if payload.days == 0 {
            return Err(AppError::invalid("Informe uma quantidade de dias diferente de zero."));
        }
        let days = payload.days;
        let reason = payload.reason.as_deref().map(str::trim).filter(|r| !r.is_empty());

        retry_on_conflict("adjust_membership_days", self.max_attempts, || async move {
            let mut tx = Tx::begin(self.store.as_ref(), scope).await?;

            let membership = self.memberships.get(&mut tx, client_id, membership_id).await?;
            let successors = self.load_pending_successors(&mut tx, &membership).await?;

            if membership.status.is_closed() {
                return Err(AppError::rule("Matrículas canceladas ou expiradas não podem ser ajustadas."));
            }
            let current_end = membership
                .end_date
                .ok_or_else(|| AppError::rule("A matrícula não tem data de término válida."))?;
            let new_end = add_days(current_end, days);
            if new_end < membership.start_date {
                return Err(AppError::rule("O ajuste deixaria a matrícula terminando antes do início."));
            }

            let adjustment = MembershipAdjustment {
                id: Uuid::new_v4(),
                membership_id: membership.id,
                client_id: membership.client_id,
                previous_end_date: Some(current_end),
                next_end_date: new_end,
                days,
                reason: reason.map(String::from),
                created_at: None,
            };

            let mut updated = membership.clone();
            updated.end_date = Some(new_end);

            self.memberships.create_adjustment(&mut tx, &adjustment)?;
            self.memberships.patch(
                &mut tx,
                membership.client_id,
                membership.id,
                json!({ "endDate": format_date_key(new_end) }),
            );
            self.shift_successors(&mut tx, &successors, days);
            tx.commit().await?;

            tracing::info!(%membership_id, %client_id, days, new_end = %new_end, "📅 Dias da matrícula ajustados");
            Ok(updated)
        })
        .await
    }

    // =========================================================================
    //  CANCELAMENTO
    // =========================================================================

    /// Cancela a matrícula e os recebíveis pendentes da venda de origem. Sem estorno.
    pub async fn cancel(
        &self,
        scope: Scope,
        client_id: Uuid,
        membership_id: Uuid,
        payload: CancelMembershipPayload,
    ) -> Result<Membership, AppError> {
        payload.validate()?;
        let reason = payload.reason.as_deref().map(str::trim).filter(|r| !r.is_empty());

        retry_on_conflict("cancel_membership", self.max_attempts, || async move {
            let mut tx = Tx::begin(self.store.as_ref(), scope).await?;

            // 1. Leituras
            let membership = self.memberships.get(&mut tx, client_id, membership_id).await?;
            if membership.status.is_closed() {
                return Err(AppError::rule("Esta matrícula já está cancelada ou expirada."));
            }
            let client = self.clients.get(&mut tx, client_id).await?;
            let pending = match membership.sale_id {
                Some(sale_id) => self.receivables.list_pending_by_sale(&mut tx, sale_id).await?,
                None => Vec::new(),
            };

            // 2. Novo estado
            let now = Utc::now();
            let mut updated = membership.clone();
            updated.status = MembershipStatus::Canceled;
            updated.canceled_at = Some(now);
            updated.cancel_reason = reason.map(String::from);

            let canceled_debt: i64 = pending
                .iter()
                .filter(|r| r.kind == ReceivableKind::Manual)
                .map(|r| r.gross_cents)
                .sum();

            let mut client_patch = Map::new();
            if canceled_debt > 0 {
                client_patch.insert("debtCents".into(), json!((client.debt_cents - canceled_debt).max(0)));
            }
            if client.active_membership_id == Some(membership.id) {
                client_patch.insert("activeMembershipId".into(), Value::Null);
                client_patch.insert("activeSaleId".into(), Value::Null);
            }
            if client.scheduled_membership_id == Some(membership.id) {
                client_patch.insert("scheduledMembershipId".into(), Value::Null);
            }

            // 3. Escritas
            self.memberships.patch(
                &mut tx,
                membership.client_id,
                membership.id,
                json!({
                    "status": MembershipStatus::Canceled,
                    "canceledAt": now,
                    "cancelReason": updated.cancel_reason,
                }),
            );
            for receivable in &pending {
                self.receivables.mark_canceled(&mut tx, receivable.id, now);
            }
            if !client_patch.is_empty() {
                self.clients.patch(&mut tx, client.id, Value::Object(client_patch));
            }
            tx.commit().await?;

            tracing::info!(
                %membership_id,
                %client_id,
                canceled_receivables = pending.len(),
                "🛑 Matrícula cancelada (sem estorno)"
            );
            Ok(updated)
        })
        .await
    }

    // =========================================================================
    //  CONSULTAS
    // =========================================================================

    pub async fn list_memberships(&self, scope: Scope, client_id: Uuid) -> Result<Vec<Membership>, AppError> {
        let mut tx = Tx::begin(self.store.as_ref(), scope).await?;
        self.memberships.list_by_client(&mut tx, client_id).await
    }

    pub async fn list_suspensions(
        &self,
        scope: Scope,
        client_id: Uuid,
        membership_id: Uuid,
    ) -> Result<Vec<MembershipSuspension>, AppError> {
        let mut tx = Tx::begin(self.store.as_ref(), scope).await?;
        self.memberships.get(&mut tx, client_id, membership_id).await?;
        self.memberships.list_suspensions(&mut tx, client_id, membership_id).await
    }

    pub async fn list_adjustments(
        &self,
        scope: Scope,
        client_id: Uuid,
        membership_id: Uuid,
    ) -> Result<Vec<MembershipAdjustment>, AppError> {
        let mut tx = Tx::begin(self.store.as_ref(), scope).await?;
        self.memberships.get(&mut tx, client_id, membership_id).await?;
        self.memberships.list_adjustments(&mut tx, client_id, membership_id).await
    }
}
