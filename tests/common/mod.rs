// tests/common/mod.rs

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use gym_backend::{
    config::AppState,
    db::{MembershipRepository, MemoryDocumentStore, Scope, Tx},
    models::{
        catalog::{Acquirer, Contract, CreateAcquirerPayload, CreateContractPayload, InstallmentFee},
        client::{Client, CreateClientPayload},
        membership::{DurationUnit, Membership, MembershipStatus, PlanDuration},
        sales::{
            CreateSalePayload, ItemKind, MembershipItem, PaymentMethod, PaymentPayload, SaleItemPayload,
        },
    },
};
use rust_decimal::Decimal;
use uuid::Uuid;

pub struct TestApp {
    pub store: MemoryDocumentStore,
    pub state: AppState,
    pub scope: Scope,
}

pub fn spawn_app() -> TestApp {
    let store = MemoryDocumentStore::new();
    let state = AppState::with_store(Arc::new(store.clone()), 5);
    TestApp {
        store,
        state,
        scope: Scope::new(Uuid::new_v4(), Uuid::new_v4()),
    }
}

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

impl TestApp {
    pub async fn client(&self, name: &str) -> Client {
        self.state
            .catalog_service
            .create_client(
                self.scope,
                CreateClientPayload {
                    name: name.to_string(),
                    photo_url: None,
                },
            )
            .await
            .unwrap()
    }

    pub async fn reload_client(&self, id: Uuid) -> Client {
        self.state.catalog_service.get_client(self.scope, id).await.unwrap()
    }

    pub async fn freeze_contract(&self, max_times: Option<u32>) -> Contract {
        self.state
            .catalog_service
            .create_contract(
                self.scope,
                CreateContractPayload {
                    name: "Anual com trancamento".into(),
                    allow_freeze: true,
                    max_suspension_times: max_times,
                    max_suspension_days: Some(30),
                    minimum_suspension_days: Some(7),
                },
            )
            .await
            .unwrap()
    }

    /// Stone: débito 1,49%, crédito à vista 2,99%, 3x genérico 4,29%, antecipação 1,5% por parcela.
    pub async fn stone(&self) -> Acquirer {
        self.acquirer_with_anticipation(false).await
    }

    pub async fn stone_anticipating(&self) -> Acquirer {
        self.acquirer_with_anticipation(true).await
    }

    async fn acquirer_with_anticipation(&self, anticipate_receivables: bool) -> Acquirer {
        self.state
            .catalog_service
            .create_acquirer(
                self.scope,
                CreateAcquirerPayload {
                    name: "Stone".into(),
                    debit_fee_percent: dec("1.49"),
                    credit_one_shot_fee_percent: dec("2.99"),
                    installment_fees: vec![InstallmentFee {
                        installment: 3,
                        brand: None,
                        active: true,
                        fee_percent: dec("4.29"),
                    }],
                    anticipate_receivables,
                    anticipation_fee_percent: dec("1.5"),
                },
            )
            .await
            .unwrap()
    }

    pub async fn memberships(&self, client_id: Uuid) -> Vec<Membership> {
        self.state
            .membership_service
            .list_memberships(self.scope, client_id)
            .await
            .unwrap()
    }

    pub async fn membership(&self, client_id: Uuid, id: Uuid) -> Membership {
        self.memberships(client_id)
            .await
            .into_iter()
            .find(|m| m.id == id)
            .unwrap()
    }

    /// Vende um plano mensal pago em dinheiro e devolve a matrícula criada.
    pub async fn sell_monthly_plan(&self, client_id: Uuid, start: &str, contract_id: Option<Uuid>) -> Membership {
        let payload = SaleBuilder::new(client_id)
            .membership(start, 1, contract_id, 10000)
            .cash(10000)
            .build();
        let sale_id = self.state.sale_service.create_sale(self.scope, payload).await.unwrap();

        self.memberships(client_id)
            .await
            .into_iter()
            .find(|m| m.sale_id == Some(sale_id))
            .unwrap()
    }

    /// Grava uma matrícula direto no armazenamento, sem passar por uma venda.
    pub async fn seed_membership(&self, membership: &Membership) {
        let mut tx = Tx::begin(&self.store, self.scope).await.unwrap();
        MembershipRepository::new().create(&mut tx, membership).unwrap();
        tx.commit().await.unwrap();
    }
}

pub fn bare_membership(client_id: Uuid, status: MembershipStatus, start: &str, end: &str) -> Membership {
    Membership {
        id: Uuid::new_v4(),
        client_id,
        plan_id: None,
        plan_name: "Mensal".into(),
        contract_id: None,
        price_cents: 10000,
        start_date: d(start),
        duration: PlanDuration {
            unit: DurationUnit::Month,
            count: 1,
        },
        end_date: Some(d(end)),
        status,
        suspension_count: 0,
        suspension_days_used: 0,
        pause_until: None,
        previous_membership_id: None,
        next_membership_id: None,
        sale_id: None,
        cancel_reason: None,
        canceled_at: None,
        created_at: None,
        updated_at: None,
    }
}

/// Monta um `CreateSalePayload` equilibrado a partir dos itens e pagamentos.
pub struct SaleBuilder {
    payload: CreateSalePayload,
}

impl SaleBuilder {
    pub fn new(client_id: Uuid) -> Self {
        Self {
            payload: CreateSalePayload {
                client_id: Some(client_id),
                consultant_id: Some(Uuid::new_v4()),
                items: Vec::new(),
                payments: Vec::new(),
                gross_total_cents: 0,
                discount_cents: 0,
                net_total_cents: 0,
                remaining_cents: 0,
                due_date: None,
                sale_date: Some(d("2024-01-15")),
                notes: None,
            },
        }
    }

    fn add_item(mut self, item: SaleItemPayload) -> Self {
        self.payload.gross_total_cents += item.total_cents;
        self.payload.net_total_cents += item.total_cents;
        self.payload.items.push(item);
        self
    }

    pub fn product(self, total_cents: i64) -> Self {
        self.add_item(SaleItemPayload {
            kind: ItemKind::Product,
            reference_id: None,
            description: "Óculos de natação".into(),
            quantity: 1,
            unit_price_cents: total_cents,
            total_cents,
            membership: None,
        })
    }

    pub fn membership(self, start: &str, months: u32, contract_id: Option<Uuid>, total_cents: i64) -> Self {
        self.add_item(SaleItemPayload {
            kind: ItemKind::Membership,
            reference_id: Some("plan-mensal".into()),
            description: "Natação Mensal".into(),
            quantity: 1,
            unit_price_cents: total_cents,
            total_cents,
            membership: Some(MembershipItem {
                plan_id: Some("plan-mensal".into()),
                plan_name: "Natação Mensal".into(),
                contract_id,
                start_date: d(start),
                duration: PlanDuration {
                    unit: DurationUnit::Month,
                    count: months,
                },
            }),
        })
    }

    pub fn cash(mut self, amount_cents: i64) -> Self {
        self.payload.payments.push(PaymentPayload {
            method: PaymentMethod::Cash,
            amount_cents,
            acquirer_id: None,
            acquirer_name: None,
            brand: None,
            installments: None,
            anticipate: None,
        });
        self
    }

    pub fn credit(mut self, amount_cents: i64, acquirer: &str, installments: u32, anticipate: Option<bool>) -> Self {
        self.payload.payments.push(PaymentPayload {
            method: PaymentMethod::Credit,
            amount_cents,
            acquirer_id: None,
            acquirer_name: Some(acquirer.to_string()),
            brand: Some("visa".into()),
            installments: Some(installments),
            anticipate,
        });
        self
    }

    pub fn remaining(mut self, remaining_cents: i64, due_date: Option<&str>) -> Self {
        self.payload.remaining_cents = remaining_cents;
        self.payload.due_date = due_date.map(d);
        self
    }

    pub fn build(self) -> CreateSalePayload {
        self.payload
    }
}
