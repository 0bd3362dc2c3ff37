// src/services/membership_lifecycle.rs

//! Posicionamento de uma nova matrícula na cadeia do cliente (puro, sem banco).
//!
//! A cadeia é uma lista ligada por `nextMembershipId` que começa na matrícula
//! apontada por `client.activeMembershipId`. Uma compra nova ou vira a atual ou
//! entra na fila, começando no dia seguinte ao fim da última da cadeia.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::{
        date_key::{add_days, add_months, add_weeks, add_years},
        error::AppError,
    },
    models::{
        client::Client,
        membership::{DurationUnit, Membership, MembershipStatus, PlanDuration},
        sales::MembershipItem,
    },
};

/// Último dia (inclusivo) de uma matrícula: `início + duração - 1 dia`.
pub fn compute_end_date(start: NaiveDate, duration: PlanDuration) -> NaiveDate {
    let count = i64::from(duration.count);
    let after = match duration.unit {
        DurationUnit::Day => add_days(start, count),
        DurationUnit::Week => add_weeks(start, count),
        DurationUnit::Month => add_months(start, count),
        DurationUnit::Year => add_years(start, count),
    };
    add_days(after, -1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Começa na data pedida e vira a matrícula ativa.
    Immediate { start: NaiveDate },
    /// Entra na fila depois de `after`.
    Queued { after: Uuid, start: NaiveDate },
}

/// Decide onde a nova matrícula entra. `chain` é a cadeia a partir da matrícula ativa
/// do cliente (vazia se não houver).
pub fn decide_placement(chain: &[Membership], requested_start: NaiveDate) -> Result<Placement, AppError> {
    let Some(current) = chain.first().filter(|m| m.status.is_current()) else {
        return Ok(Placement::Immediate { start: requested_start });
    };

    // Cauda: última matrícula ainda viva (atual ou pendente) seguindo os elos
    let tail = chain
        .iter()
        .skip(1)
        .filter(|m| m.status == MembershipStatus::Pending)
        .last()
        .unwrap_or(current);

    let end = tail.end_date.ok_or_else(|| {
        AppError::rule("A matrícula atual não tem data de término válida; não é possível agendar a nova.")
    })?;

    Ok(Placement::Queued {
        after: tail.id,
        start: add_days(end, 1),
    })
}

/// O que muda nos ponteiros do cliente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMembershipUpdate {
    /// `activeMembershipId` / `activeSaleId` passam a apontar para a nova.
    Activate,
    /// `scheduledMembershipId` passa a apontar para a nova.
    Schedule,
    /// Já existe uma agendada; o cliente não muda.
    AlreadyScheduled,
}

#[derive(Debug, Clone)]
pub struct MembershipPlan {
    pub membership: Membership,
    /// Matrícula que recebe `nextMembershipId` apontando para a nova.
    pub predecessor_id: Option<Uuid>,
    pub client_update: ClientMembershipUpdate,
}

/// Monta o documento da nova matrícula e as mudanças ao redor dela.
pub fn build_membership(
    client: &Client,
    chain: &[Membership],
    item: &MembershipItem,
    price_cents: i64,
    membership_id: Uuid,
    sale_id: Uuid,
) -> Result<MembershipPlan, AppError> {
    let placement = decide_placement(chain, item.start_date)?;

    let (start, status, predecessor_id, client_update) = match placement {
        Placement::Immediate { start } => (start, MembershipStatus::Active, None, ClientMembershipUpdate::Activate),
        Placement::Queued { after, start } => {
            let update = if client.scheduled_membership_id.is_some() {
                ClientMembershipUpdate::AlreadyScheduled
            } else {
                ClientMembershipUpdate::Schedule
            };
            (start, MembershipStatus::Pending, Some(after), update)
        }
    };

    let membership = Membership {
        id: membership_id,
        client_id: client.id,
        plan_id: item.plan_id.clone(),
        plan_name: item.plan_name.clone(),
        contract_id: item.contract_id,
        price_cents,
        start_date: start,
        duration: item.duration,
        end_date: Some(compute_end_date(start, item.duration)),
        status,
        suspension_count: 0,
        suspension_days_used: 0,
        pause_until: None,
        previous_membership_id: predecessor_id,
        next_membership_id: None,
        sale_id: Some(sale_id),
        cancel_reason: None,
        canceled_at: None,
        created_at: None,
        updated_at: None,
    };

    Ok(MembershipPlan {
        membership,
        predecessor_id,
        client_update,
    })
}
