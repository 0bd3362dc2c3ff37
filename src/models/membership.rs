// src/models/membership.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::date_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Day,
    Week,
    Month,
    Year,
}

/// Duração do plano, sempre contada incluindo o dia de início.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlanDuration {
    #[serde(rename = "type")]
    pub unit: DurationUnit,

    #[schema(example = 1)]
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    Pending,
    Paused,
    Expired,
    Canceled,
}

impl MembershipStatus {
    /// Ativa ou trancada: ocupa o "agora" do cliente.
    pub fn is_current(self) -> bool {
        matches!(self, MembershipStatus::Active | MembershipStatus::Paused)
    }

    pub fn is_closed(self) -> bool {
        matches!(self, MembershipStatus::Canceled | MembershipStatus::Expired)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    pub client_id: Uuid,

    #[serde(default)]
    pub plan_id: Option<String>,

    #[schema(example = "Natação Mensal")]
    pub plan_name: String,

    #[serde(default)]
    pub contract_id: Option<Uuid>,

    #[schema(example = 18990)]
    pub price_cents: i64,

    #[schema(value_type = String, format = Date, example = "2024-01-15")]
    pub start_date: NaiveDate,

    pub duration: PlanDuration,

    // Data de término inclusiva; valor corrompido no banco é lido como ausente
    #[serde(default, deserialize_with = "date_key::lenient")]
    #[schema(value_type = Option<String>, format = Date, example = "2024-02-14")]
    pub end_date: Option<NaiveDate>,

    pub status: MembershipStatus,

    #[serde(default)]
    pub suspension_count: u32,

    #[serde(default)]
    pub suspension_days_used: i64,

    #[serde(default, deserialize_with = "date_key::lenient")]
    #[schema(value_type = Option<String>, format = Date)]
    pub pause_until: Option<NaiveDate>,

    #[serde(default)]
    pub previous_membership_id: Option<Uuid>,

    #[serde(default)]
    pub next_membership_id: Option<Uuid>,

    #[serde(default)]
    pub sale_id: Option<Uuid>,

    #[serde(default)]
    pub cancel_reason: Option<String>,

    #[serde(default)]
    pub canceled_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Registro de trancamento. Gravado uma vez, nunca alterado.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipSuspension {
    pub id: Uuid,
    pub membership_id: Uuid,
    pub client_id: Uuid,

    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,

    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,

    #[schema(example = 10)]
    pub days: i64,

    #[serde(default)]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Registro de ajuste de dias. Gravado uma vez, nunca alterado.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipAdjustment {
    pub id: Uuid,
    pub membership_id: Uuid,
    pub client_id: Uuid,

    #[serde(default, deserialize_with = "date_key::lenient")]
    #[schema(value_type = Option<String>, format = Date)]
    pub previous_end_date: Option<NaiveDate>,

    #[schema(value_type = String, format = Date)]
    pub next_end_date: NaiveDate,

    // Positivo estende, negativo encurta
    #[schema(example = 5)]
    pub days: i64,

    #[serde(default)]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

// --- Payloads das ações ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuspendMembershipPayload {
    #[schema(value_type = Option<String>, format = Date, example = "2024-03-01")]
    pub start_date: Option<NaiveDate>,

    #[schema(value_type = Option<String>, format = Date, example = "2024-03-10")]
    pub end_date: Option<NaiveDate>,

    #[validate(length(max = 500, message = "Motivo muito longo."))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustMembershipDaysPayload {
    #[schema(example = 5)]
    pub days: i64,

    #[validate(length(max = 500, message = "Motivo muito longo."))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelMembershipPayload {
    #[validate(length(max = 500, message = "Motivo muito longo."))]
    pub reason: Option<String>,
}
