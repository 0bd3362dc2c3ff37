// src/models/client.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Cliente (aluno) da filial. Os ponteiros de matrícula ficam aqui; a cadeia de
/// matrículas em si vive na subcoleção `clients/{id}/memberships`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,

    #[schema(example = "Ana Souza")]
    pub name: String,

    #[serde(default)]
    pub photo_url: Option<String>,

    #[serde(default)]
    pub active_membership_id: Option<Uuid>,

    #[serde(default)]
    pub scheduled_membership_id: Option<Uuid>,

    #[serde(default)]
    pub active_sale_id: Option<Uuid>,

    // Saldo devedor acumulado (recebíveis manuais em aberto)
    #[serde(default)]
    #[schema(example = 15000)]
    pub debt_cents: i64,

    // id da filial -> acesso liberado
    #[serde(default)]
    pub access: BTreeMap<String, bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    #[validate(length(min = 1, message = "O nome do cliente é obrigatório."))]
    #[schema(example = "Ana Souza")]
    pub name: String,

    pub photo_url: Option<String>,
}

/// Cópia do cliente gravada dentro da venda, para a venda continuar legível
/// mesmo se o cadastro mudar depois.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSnapshot {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl From<&Client> for ClientSnapshot {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id,
            name: client.name.clone(),
            photo_url: client.photo_url.clone(),
        }
    }
}
