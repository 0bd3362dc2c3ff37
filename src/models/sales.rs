// src/models/sales.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::client::ClientSnapshot;
use crate::models::membership::PlanDuration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Membership,
    Product,
    Service,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Pix,
    Transfer,
    Credit,
    Debit,
}

impl PaymentMethod {
    pub fn is_card(self) -> bool {
        matches!(self, PaymentMethod::Credit | PaymentMethod::Debit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Open,
    Paid,
}

/// Dados do plano quando o item é uma matrícula.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipItem {
    #[serde(default)]
    pub plan_id: Option<String>,

    #[schema(example = "Natação Mensal")]
    pub plan_name: String,

    #[serde(default)]
    pub contract_id: Option<Uuid>,

    #[schema(value_type = String, format = Date, example = "2024-01-15")]
    pub start_date: NaiveDate,

    pub duration: PlanDuration,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub kind: ItemKind,

    #[serde(default)]
    pub reference_id: Option<String>,

    pub description: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub total_cents: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership: Option<MembershipItem>,

    // Preenchido na criação da venda quando o item gerou uma matrícula
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_id: Option<Uuid>,
}

/// Pagamento embutido na venda, já com as taxas resolvidas.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub method: PaymentMethod,
    pub amount_cents: i64,

    #[serde(default)]
    pub acquirer_id: Option<Uuid>,

    #[serde(default)]
    pub acquirer_name: Option<String>,

    #[serde(default)]
    pub brand: Option<String>,

    #[serde(default = "one")]
    pub installments: u32,

    #[serde(default)]
    pub anticipated: bool,

    #[serde(default)]
    pub fee_cents: i64,

    #[serde(default)]
    pub anticipation_fee_cents: i64,
}

fn one() -> u32 {
    1
}

impl Payment {
    pub fn total_fee_cents(&self) -> i64 {
        self.fee_cents + self.anticipation_fee_cents
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub branch_id: Uuid,
    pub client_id: Uuid,
    pub client: ClientSnapshot,
    pub consultant_id: Uuid,

    pub items: Vec<SaleItem>,

    #[schema(example = 18990)]
    pub gross_total_cents: i64,
    #[serde(default)]
    pub discount_cents: i64,
    pub net_total_cents: i64,

    pub payments: Vec<Payment>,

    // Soma das taxas de cartão (processamento + antecipação)
    pub fees_cents: i64,
    // Pago menos taxas
    pub net_paid_total_cents: i64,
    pub remaining_cents: i64,

    #[serde(default)]
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,

    #[schema(value_type = String, format = Date, example = "2024-01-15")]
    pub sale_date: NaiveDate,

    pub status: SaleStatus,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemPayload {
    pub kind: ItemKind,

    pub reference_id: Option<String>,

    #[validate(length(min = 1, message = "Descrição do item é obrigatória."))]
    #[schema(example = "Natação Mensal")]
    pub description: String,

    #[serde(default = "one")]
    #[validate(range(min = 1, message = "A quantidade deve ser pelo menos 1."))]
    pub quantity: u32,

    #[validate(range(min = 0, message = "O preço unitário não pode ser negativo."))]
    pub unit_price_cents: i64,

    #[validate(range(min = 0, message = "O total do item não pode ser negativo."))]
    pub total_cents: i64,

    pub membership: Option<MembershipItem>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub method: PaymentMethod,

    #[validate(range(min = 1, message = "O valor do pagamento deve ser positivo."))]
    #[schema(example = 18990)]
    pub amount_cents: i64,

    pub acquirer_id: Option<Uuid>,

    #[schema(example = "Stone")]
    pub acquirer_name: Option<String>,

    #[schema(example = "visa")]
    pub brand: Option<String>,

    #[validate(range(min = 1, max = 24, message = "Parcelas devem estar entre 1 e 24."))]
    #[schema(example = 3)]
    pub installments: Option<u32>,

    // Sem valor: vale o padrão da adquirente
    pub anticipate: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    pub client_id: Option<Uuid>,
    pub consultant_id: Option<Uuid>,

    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<SaleItemPayload>,

    #[serde(default)]
    #[validate(nested)]
    pub payments: Vec<PaymentPayload>,

    #[validate(range(min = 0, message = "O total bruto não pode ser negativo."))]
    pub gross_total_cents: i64,

    #[serde(default)]
    #[validate(range(min = 0, message = "O desconto não pode ser negativo."))]
    pub discount_cents: i64,

    pub net_total_cents: i64,

    #[serde(default)]
    #[validate(range(min = 0, message = "O saldo restante não pode ser negativo."))]
    pub remaining_cents: i64,

    #[schema(value_type = Option<String>, format = Date, example = "2024-02-15")]
    pub due_date: Option<NaiveDate>,

    // Padrão: hoje (UTC)
    #[schema(value_type = Option<String>, format = Date, example = "2024-01-15")]
    pub sale_date: Option<NaiveDate>,

    #[validate(length(max = 1000, message = "Observações muito longas."))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SalesByClientQuery {
    pub client_id: Uuid,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SalesRangeQuery {
    #[param(value_type = String, format = Date, example = "2024-01-01")]
    pub from: NaiveDate,

    #[param(value_type = String, format = Date, example = "2024-01-31")]
    pub to: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleResponse {
    pub sale_id: Uuid,
}
