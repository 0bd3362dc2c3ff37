// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

fn default_true() -> bool {
    true
}

// --- Adquirentes (maquininhas) ---

/// Taxa de uma faixa de parcelamento. `brand` vazio vale para qualquer bandeira.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentFee {
    #[schema(example = 3)]
    pub installment: u32,

    #[serde(default)]
    #[schema(example = "visa")]
    pub brand: Option<String>,

    #[serde(default = "default_true")]
    pub active: bool,

    #[schema(example = 4.29)]
    pub fee_percent: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Acquirer {
    pub id: Uuid,

    #[schema(example = "Stone")]
    pub name: String,

    #[serde(default = "default_true")]
    pub active: bool,

    #[serde(default)]
    #[schema(example = 1.49)]
    pub debit_fee_percent: Decimal,

    #[serde(default)]
    #[schema(example = 2.99)]
    pub credit_one_shot_fee_percent: Decimal,

    #[serde(default)]
    pub installment_fees: Vec<InstallmentFee>,

    // Padrão da maquininha; o pagamento pode sobrescrever
    #[serde(default)]
    pub anticipate_receivables: bool,

    // Taxa de antecipação por parcela
    #[serde(default)]
    #[schema(example = 1.5)]
    pub anticipation_fee_percent: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAcquirerPayload {
    #[validate(length(min = 1, message = "O nome da adquirente é obrigatório."))]
    pub name: String,

    #[serde(default)]
    pub debit_fee_percent: Decimal,

    #[serde(default)]
    pub credit_one_shot_fee_percent: Decimal,

    #[serde(default)]
    pub installment_fees: Vec<InstallmentFee>,

    #[serde(default)]
    pub anticipate_receivables: bool,

    #[serde(default)]
    pub anticipation_fee_percent: Decimal,
}

// --- Contratos (regras de trancamento) ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: Uuid,

    #[schema(example = "Plano Anual com Trancamento")]
    pub name: String,

    #[serde(default)]
    pub allow_freeze: bool,

    // None = sem limite
    #[serde(default)]
    #[schema(example = 2)]
    pub max_suspension_times: Option<u32>,

    #[serde(default)]
    #[schema(example = 30)]
    pub max_suspension_days: Option<i64>,

    #[serde(default)]
    #[schema(example = 7)]
    pub minimum_suspension_days: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContractPayload {
    #[validate(length(min = 1, message = "O nome do contrato é obrigatório."))]
    pub name: String,

    #[serde(default)]
    pub allow_freeze: bool,

    pub max_suspension_times: Option<u32>,

    #[validate(range(min = 1, message = "O máximo de dias deve ser positivo."))]
    pub max_suspension_days: Option<i64>,

    #[validate(range(min = 1, message = "O mínimo de dias deve ser positivo."))]
    pub minimum_suspension_days: Option<i64>,
}
