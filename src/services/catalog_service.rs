// src/services/catalog_service.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, ClientRepository, DocumentStore, Scope, Tx},
    models::{
        catalog::{Acquirer, Contract, CreateAcquirerPayload, CreateContractPayload},
        client::{Client, CreateClientPayload},
    },
};

/// Cadastros de apoio da filial: clientes, adquirentes e contratos.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
    clients: ClientRepository,
    catalog: CatalogRepository,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            clients: ClientRepository::new(),
            catalog: CatalogRepository::new(),
        }
    }

    pub async fn create_client(&self, scope: Scope, payload: CreateClientPayload) -> Result<Client, AppError> {
        payload.validate()?;

        let client = Client {
            id: Uuid::new_v4(),
            name: payload.name.trim().to_string(),
            photo_url: payload.photo_url.filter(|url| !url.trim().is_empty()),
            active_membership_id: None,
            scheduled_membership_id: None,
            active_sale_id: None,
            debt_cents: 0,
            access: BTreeMap::new(),
            created_at: None,
            updated_at: None,
        };

        let mut tx = Tx::begin(self.store.as_ref(), scope).await?;
        self.clients.create(&mut tx, &client)?;
        tx.commit().await?;

        tracing::info!(client_id = %client.id, "✅ Cliente cadastrado");
        Ok(client)
    }

    pub async fn get_client(&self, scope: Scope, client_id: Uuid) -> Result<Client, AppError> {
        let mut tx = Tx::begin(self.store.as_ref(), scope).await?;
        self.clients.get(&mut tx, client_id).await
    }

    pub async fn create_acquirer(&self, scope: Scope, payload: CreateAcquirerPayload) -> Result<Acquirer, AppError> {
        payload.validate()?;

        let mut fees = vec![
            payload.debit_fee_percent,
            payload.credit_one_shot_fee_percent,
            payload.anticipation_fee_percent,
        ];
        fees.extend(payload.installment_fees.iter().map(|row| row.fee_percent));
        if fees.iter().any(|fee| fee.is_sign_negative()) {
            return Err(AppError::invalid("Taxas não podem ser negativas."));
        }
        if fees.iter().any(|fee| *fee >= Decimal::ONE_HUNDRED) {
            return Err(AppError::invalid("Taxas devem ser menores que 100%."));
        }
        if payload.installment_fees.iter().any(|row| row.installment < 2) {
            return Err(AppError::invalid("Faixas de parcelamento começam em 2 parcelas."));
        }

        let acquirer = Acquirer {
            id: Uuid::new_v4(),
            name: payload.name.trim().to_string(),
            active: true,
            debit_fee_percent: payload.debit_fee_percent,
            credit_one_shot_fee_percent: payload.credit_one_shot_fee_percent,
            installment_fees: payload.installment_fees,
            anticipate_receivables: payload.anticipate_receivables,
            anticipation_fee_percent: payload.anticipation_fee_percent,
            created_at: None,
            updated_at: None,
        };

        let mut tx = Tx::begin(self.store.as_ref(), scope).await?;
        self.catalog.create_acquirer(&mut tx, &acquirer)?;
        tx.commit().await?;

        tracing::info!(acquirer_id = %acquirer.id, name = %acquirer.name, "✅ Adquirente cadastrada");
        Ok(acquirer)
    }

    pub async fn list_acquirers(&self, scope: Scope) -> Result<Vec<Acquirer>, AppError> {
        let mut tx = Tx::begin(self.store.as_ref(), scope).await?;
        self.catalog.list_acquirers(&mut tx).await
    }

    pub async fn create_contract(&self, scope: Scope, payload: CreateContractPayload) -> Result<Contract, AppError> {
        payload.validate()?;

        if let (Some(min), Some(max)) = (payload.minimum_suspension_days, payload.max_suspension_days) {
            if min > max {
                return Err(AppError::invalid("O mínimo de dias de trancamento não pode passar do máximo."));
            }
        }

        let contract = Contract {
            id: Uuid::new_v4(),
            name: payload.name.trim().to_string(),
            allow_freeze: payload.allow_freeze,
            max_suspension_times: payload.max_suspension_times,
            max_suspension_days: payload.max_suspension_days,
            minimum_suspension_days: payload.minimum_suspension_days,
            created_at: None,
            updated_at: None,
        };

        let mut tx = Tx::begin(self.store.as_ref(), scope).await?;
        self.catalog.create_contract(&mut tx, &contract)?;
        tx.commit().await?;

        tracing::info!(contract_id = %contract.id, name = %contract.name, "✅ Contrato cadastrado");
        Ok(contract)
    }

    pub async fn list_contracts(&self, scope: Scope) -> Result<Vec<Contract>, AppError> {
        let mut tx = Tx::begin(self.store.as_ref(), scope).await?;
        self.catalog.list_contracts(&mut tx).await
    }
}
