// src/db/document_store.rs

//! Contrato transacional do armazenamento de documentos.
//!
//! Uma transação segue sempre o mesmo roteiro: abre, lê tudo o que precisa, calcula o
//! novo estado em memória, enfileira as escritas e faz commit. As escritas só chegam
//! ao banco no commit; se algum documento lido mudou nesse meio tempo o commit falha
//! com [`AppError::Conflict`] e nada é gravado.

use std::future::Future;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::error::AppError;

/// Tenant + filial: todo documento vive debaixo desse par.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scope {
    pub tenant_id: Uuid,
    pub branch_id: Uuid,
}

impl Scope {
    pub fn new(tenant_id: Uuid, branch_id: Uuid) -> Self {
        Self { tenant_id, branch_id }
    }
}

/// Caminho de coleção (ex.: `clients/{id}/memberships`) + id do documento.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocKey {
    pub collection: String,
    pub id: String,
}

impl DocKey {
    pub fn new(collection: impl Into<String>, id: impl ToString) -> Self {
        Self {
            collection: collection.into(),
            id: id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
}

#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

/// Consulta simples sobre campos de primeiro nível de uma coleção.
#[derive(Debug, Clone)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub order_by: Option<String>,
    pub descending: bool,
    pub limit: Option<usize>,
}

impl Query {
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: None,
            descending: false,
            limit: None,
        }
    }

    pub fn filter(mut self, field: &str, op: FilterOp, value: Value) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op,
            value,
        });
        self
    }

    pub fn where_eq(self, field: &str, value: Value) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    pub fn order_by(mut self, field: &str, descending: bool) -> Self {
        self.order_by = Some(field.to_string());
        self.descending = descending;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Escrita enfileirada. `Create` falha se o documento já existir; `Merge` falha se ele
/// não existir e substitui apenas os campos de primeiro nível presentes no patch.
#[derive(Debug, Clone)]
pub enum Write {
    Create(Value),
    Merge(Value),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn begin(&self, scope: Scope) -> Result<Box<dyn DocumentTransaction>, AppError>;
}

#[async_trait]
pub trait DocumentTransaction: Send {
    async fn get(&mut self, key: &DocKey) -> Result<Option<Value>, AppError>;

    async fn query(&mut self, query: &Query) -> Result<Vec<Value>, AppError>;

    /// Aplica todas as escritas ou nenhuma.
    async fn commit(self: Box<Self>, writes: Vec<(DocKey, Write)>) -> Result<(), AppError>;
}

/// Carimbos de data definidos pelo armazenamento, nunca pelo chamador.
pub(crate) fn stamp(write: &mut Write, now: DateTime<Utc>) {
    match write {
        Write::Create(Value::Object(map)) => {
            map.insert("createdAt".into(), json!(now));
            map.insert("updatedAt".into(), json!(now));
        }
        Write::Merge(Value::Object(map)) => {
            map.insert("updatedAt".into(), json!(now));
        }
        _ => {}
    }
}

/// Transação tipada por cima de [`DocumentTransaction`].
///
/// Impõe a ordem "todas as leituras antes de qualquer escrita": ler depois de
/// enfileirar uma escrita é um erro de programação e vira erro interno.
pub struct Tx {
    inner: Box<dyn DocumentTransaction>,
    writes: Vec<(DocKey, Write)>,
}

impl Tx {
    pub async fn begin(store: &dyn DocumentStore, scope: Scope) -> Result<Self, AppError> {
        let inner = store.begin(scope).await?;
        Ok(Self {
            inner,
            writes: Vec::new(),
        })
    }

    fn ensure_reading(&self) -> Result<(), AppError> {
        if self.writes.is_empty() {
            Ok(())
        } else {
            Err(AppError::InternalServerError(anyhow::anyhow!(
                "leitura depois de escrita na mesma transação"
            )))
        }
    }

    pub async fn get<T: DeserializeOwned>(&mut self, key: &DocKey) -> Result<Option<T>, AppError> {
        self.ensure_reading()?;
        match self.inner.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn query<T: DeserializeOwned>(&mut self, query: &Query) -> Result<Vec<T>, AppError> {
        self.ensure_reading()?;
        let docs = self.inner.query(query).await?;
        docs.into_iter()
            .map(|value| serde_json::from_value(value).map_err(AppError::from))
            .collect()
    }

    pub fn create<T: Serialize>(&mut self, key: DocKey, doc: &T) -> Result<(), AppError> {
        let value = serde_json::to_value(doc)?;
        self.writes.push((key, Write::Create(value)));
        Ok(())
    }

    pub fn merge(&mut self, key: DocKey, patch: Value) {
        self.writes.push((key, Write::Merge(patch)));
    }

    /// Devolve quantas escritas foram aplicadas.
    pub async fn commit(self) -> Result<usize, AppError> {
        let count = self.writes.len();
        self.inner.commit(self.writes).await?;
        Ok(count)
    }
}

/// Reexecuta `attempt` enquanto ele falhar por conflito, até `max_attempts` vezes.
/// Cada tentativa abre uma transação nova e relê o estado.
pub async fn retry_on_conflict<T, F, Fut>(
    operation: &str,
    max_attempts: u32,
    mut attempt: F,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut tries = 0;
    loop {
        tries += 1;
        match attempt().await {
            Err(err) if err.is_conflict() && tries < max_attempts => {
                tracing::warn!(operation, tries, "⚠️ Conflito de concorrência, repetindo a transação");
            }
            other => return other,
        }
    }
}
