// src/db/receivable_repo.rs

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::document_store::{DocKey, Query, Tx},
    models::finance::{Receivable, ReceivableStatus},
};

const RECEIVABLES: &str = "receivables";

#[derive(Clone, Default)]
pub struct ReceivableRepository;

impl ReceivableRepository {
    pub fn new() -> Self {
        Self
    }

    pub fn create(&self, tx: &mut Tx, receivable: &Receivable) -> Result<(), AppError> {
        tx.create(DocKey::new(RECEIVABLES, receivable.id), receivable)
    }

    /// Recebíveis da venda, por vencimento e depois pelo número da parcela.
    pub async fn list_by_sale(&self, tx: &mut Tx, sale_id: Uuid) -> Result<Vec<Receivable>, AppError> {
        let mut receivables: Vec<Receivable> = tx
            .query(
                &Query::collection(RECEIVABLES)
                    .where_eq("saleId", json!(sale_id))
                    .order_by("dueDate", false),
            )
            .await?;
        // parcelas antecipadas vencem todas no mesmo dia
        receivables.sort_by_key(|r| (r.due_date, r.installment_number));
        Ok(receivables)
    }

    pub async fn list_pending_by_sale(&self, tx: &mut Tx, sale_id: Uuid) -> Result<Vec<Receivable>, AppError> {
        tx.query(
            &Query::collection(RECEIVABLES)
                .where_eq("saleId", json!(sale_id))
                .where_eq("status", json!(ReceivableStatus::Pending)),
        )
        .await
    }

    pub fn mark_canceled(&self, tx: &mut Tx, id: Uuid, at: DateTime<Utc>) {
        tx.merge(
            DocKey::new(RECEIVABLES, id),
            json!({ "status": ReceivableStatus::Canceled, "canceledAt": at }),
        );
    }
}
