// src/db/membership_repo.rs

use std::collections::HashSet;

use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::document_store::{DocKey, Query, Tx},
    models::membership::{Membership, MembershipAdjustment, MembershipSuspension},
};

// Limite de segurança ao seguir a cadeia (protege contra ciclos em dados corrompidos)
const MAX_CHAIN_LENGTH: usize = 64;

fn memberships_path(client_id: Uuid) -> String {
    format!("clients/{client_id}/memberships")
}

fn suspensions_path(client_id: Uuid, membership_id: Uuid) -> String {
    format!("clients/{client_id}/memberships/{membership_id}/suspensions")
}

fn adjustments_path(client_id: Uuid, membership_id: Uuid) -> String {
    format!("clients/{client_id}/memberships/{membership_id}/adjustments")
}

#[derive(Clone, Default)]
pub struct MembershipRepository;

impl MembershipRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  MATRÍCULAS
    // =========================================================================

    pub async fn find(
        &self,
        tx: &mut Tx,
        client_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        tx.get(&DocKey::new(memberships_path(client_id), id)).await
    }

    pub async fn get(&self, tx: &mut Tx, client_id: Uuid, id: Uuid) -> Result<Membership, AppError> {
        self.find(tx, client_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("Matrícula"))
    }

    /// Segue `nextMembershipId` a partir de `start_id` (incluso) até o fim da cadeia.
    /// Elos quebrados ou repetidos encerram a leitura.
    pub async fn load_chain(
        &self,
        tx: &mut Tx,
        client_id: Uuid,
        start_id: Uuid,
    ) -> Result<Vec<Membership>, AppError> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = Some(start_id);

        while let Some(id) = cursor {
            if !seen.insert(id) || chain.len() >= MAX_CHAIN_LENGTH {
                tracing::warn!(%client_id, %id, "⚠️ Cadeia de matrículas com ciclo ou longa demais");
                break;
            }
            let Some(membership) = self.find(tx, client_id, id).await? else {
                break;
            };
            cursor = membership.next_membership_id;
            chain.push(membership);
        }

        Ok(chain)
    }

    pub async fn list_by_client(&self, tx: &mut Tx, client_id: Uuid) -> Result<Vec<Membership>, AppError> {
        tx.query(&Query::collection(memberships_path(client_id)).order_by("startDate", false))
            .await
    }

    pub fn create(&self, tx: &mut Tx, membership: &Membership) -> Result<(), AppError> {
        tx.create(
            DocKey::new(memberships_path(membership.client_id), membership.id),
            membership,
        )
    }

    pub fn patch(&self, tx: &mut Tx, client_id: Uuid, id: Uuid, patch: Value) {
        tx.merge(DocKey::new(memberships_path(client_id), id), patch);
    }

    pub fn link_next(&self, tx: &mut Tx, client_id: Uuid, id: Uuid, next_id: Uuid) {
        self.patch(tx, client_id, id, json!({ "nextMembershipId": next_id }));
    }

    // =========================================================================
    //  HISTÓRICO (somente inserção)
    // =========================================================================

    pub fn create_suspension(&self, tx: &mut Tx, suspension: &MembershipSuspension) -> Result<(), AppError> {
        tx.create(
            DocKey::new(
                suspensions_path(suspension.client_id, suspension.membership_id),
                suspension.id,
            ),
            suspension,
        )
    }

    pub async fn list_suspensions(
        &self,
        tx: &mut Tx,
        client_id: Uuid,
        membership_id: Uuid,
    ) -> Result<Vec<MembershipSuspension>, AppError> {
        tx.query(&Query::collection(suspensions_path(client_id, membership_id)).order_by("startDate", false))
            .await
    }

    pub fn create_adjustment(&self, tx: &mut Tx, adjustment: &MembershipAdjustment) -> Result<(), AppError> {
        tx.create(
            DocKey::new(
                adjustments_path(adjustment.client_id, adjustment.membership_id),
                adjustment.id,
            ),
            adjustment,
        )
    }

    pub async fn list_adjustments(
        &self,
        tx: &mut Tx,
        client_id: Uuid,
        membership_id: Uuid,
    ) -> Result<Vec<MembershipAdjustment>, AppError> {
        tx.query(&Query::collection(adjustments_path(client_id, membership_id)).order_by("createdAt", false))
            .await
    }
}
