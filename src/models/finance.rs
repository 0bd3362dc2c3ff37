// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::sales::PaymentMethod;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReceivableKind {
    CardInstallment, // Parcela de cartão
    Manual,          // Saldo em aberto (fiado)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReceivableStatus {
    Pending,  // Aberto
    Paid,     // Quitado
    Overdue,  // Vencido
    Canceled, // Cancelado
}

// --- Structs ---

/// Uma entrada de caixa futura esperada.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Receivable {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub client_id: Uuid,

    pub kind: ReceivableKind,

    // Só para parcelas de cartão
    #[serde(default)]
    #[schema(example = 1)]
    pub installment_number: Option<u32>,
    #[serde(default)]
    #[schema(example = 3)]
    pub total_installments: Option<u32>,

    // Valores
    #[schema(example = 6334)]
    pub gross_cents: i64,
    #[schema(example = 272)]
    pub fee_cents: i64,
    #[schema(example = 6062)]
    pub net_cents: i64,

    #[schema(value_type = String, format = Date, example = "2024-02-15")]
    pub due_date: NaiveDate,

    pub status: ReceivableStatus,

    #[serde(default)]
    pub anticipated: bool,

    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub acquirer_id: Option<Uuid>,
    #[serde(default)]
    pub acquirer_name: Option<String>,

    #[serde(default)]
    pub canceled_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
