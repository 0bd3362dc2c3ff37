// src/db/catalog_repo.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::document_store::{DocKey, Query, Tx},
    models::catalog::{Acquirer, Contract},
};

const ACQUIRERS: &str = "acquirers";
const CONTRACTS: &str = "contracts";

/// Catálogos de apoio: adquirentes (tabelas de taxa) e contratos (regras de trancamento).
#[derive(Clone, Default)]
pub struct CatalogRepository;

impl CatalogRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  ADQUIRENTES
    // =========================================================================

    pub async fn list_acquirers(&self, tx: &mut Tx) -> Result<Vec<Acquirer>, AppError> {
        tx.query(&Query::collection(ACQUIRERS).order_by("name", false)).await
    }

    pub fn create_acquirer(&self, tx: &mut Tx, acquirer: &Acquirer) -> Result<(), AppError> {
        tx.create(DocKey::new(ACQUIRERS, acquirer.id), acquirer)
    }

    // =========================================================================
    //  CONTRATOS
    // =========================================================================

    pub async fn find_contract(&self, tx: &mut Tx, id: Uuid) -> Result<Option<Contract>, AppError> {
        tx.get(&DocKey::new(CONTRACTS, id)).await
    }

    pub async fn list_contracts(&self, tx: &mut Tx) -> Result<Vec<Contract>, AppError> {
        tx.query(&Query::collection(CONTRACTS).order_by("name", false)).await
    }

    pub fn create_contract(&self, tx: &mut Tx, contract: &Contract) -> Result<(), AppError> {
        tx.create(DocKey::new(CONTRACTS, contract.id), contract)
    }
}
