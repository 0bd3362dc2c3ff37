// src/db/sales_repo.rs

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::{date_key::format_date_key, error::AppError},
    db::document_store::{DocKey, FilterOp, Query, Tx},
    models::sales::Sale,
};

const SALES: &str = "sales";

#[derive(Clone, Default)]
pub struct SalesRepository;

impl SalesRepository {
    pub fn new() -> Self {
        Self
    }

    pub fn create(&self, tx: &mut Tx, sale: &Sale) -> Result<(), AppError> {
        tx.create(DocKey::new(SALES, sale.id), sale)
    }

    pub async fn find(&self, tx: &mut Tx, id: Uuid) -> Result<Option<Sale>, AppError> {
        tx.get(&DocKey::new(SALES, id)).await
    }

    /// Vendas do cliente, mais recentes primeiro.
    pub async fn list_by_client(&self, tx: &mut Tx, client_id: Uuid) -> Result<Vec<Sale>, AppError> {
        tx.query(
            &Query::collection(SALES)
                .where_eq("clientId", json!(client_id))
                .order_by("saleDate", true),
        )
        .await
    }

    /// Vendas com `saleDate` em `[from, to]` (inclusivo), em ordem cronológica.
    pub async fn list_range(&self, tx: &mut Tx, from: NaiveDate, to: NaiveDate) -> Result<Vec<Sale>, AppError> {
        tx.query(
            &Query::collection(SALES)
                .filter("saleDate", FilterOp::Gte, json!(format_date_key(from)))
                .filter("saleDate", FilterOp::Lte, json!(format_date_key(to)))
                .order_by("saleDate", false),
        )
        .await
    }
}
