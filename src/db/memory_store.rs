// src/db/memory_store.rs

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::common::error::AppError;
use crate::db::document_store::{
    stamp, DocKey, DocumentStore, DocumentTransaction, FilterOp, Query, Scope, Write,
};

#[derive(Debug, Clone)]
struct Versioned {
    version: u64,
    data: Value,
}

type Documents = HashMap<(Scope, DocKey), Versioned>;

/// Armazenamento em memória com controle otimista: cada leitura guarda a versão vista
/// e o commit só acontece se nenhuma delas mudou.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    docs: Arc<RwLock<Documents>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn document_count(&self) -> usize {
        self.docs.read().await.len()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn begin(&self, scope: Scope) -> Result<Box<dyn DocumentTransaction>, AppError> {
        Ok(Box::new(MemoryTransaction {
            scope,
            docs: Arc::clone(&self.docs),
            reads: HashMap::new(),
        }))
    }
}

struct MemoryTransaction {
    scope: Scope,
    docs: Arc<RwLock<Documents>>,
    // versão vista em cada leitura (0 = documento inexistente)
    reads: HashMap<DocKey, u64>,
}

impl MemoryTransaction {
    fn record_read(&mut self, key: &DocKey, version: u64) -> Result<(), AppError> {
        match self.reads.get(key) {
            Some(seen) if *seen != version => Err(AppError::Conflict),
            Some(_) => Ok(()),
            None => {
                self.reads.insert(key.clone(), version);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl DocumentTransaction for MemoryTransaction {
    async fn get(&mut self, key: &DocKey) -> Result<Option<Value>, AppError> {
        let found = {
            let docs = self.docs.read().await;
            docs.get(&(self.scope, key.clone())).cloned()
        };

        let version = found.as_ref().map_or(0, |doc| doc.version);
        self.record_read(key, version)?;
        Ok(found.map(|doc| doc.data))
    }

    async fn query(&mut self, query: &Query) -> Result<Vec<Value>, AppError> {
        let mut matched: Vec<(DocKey, Versioned)> = {
            let docs = self.docs.read().await;
            docs.iter()
                .filter(|((scope, key), _)| *scope == self.scope && key.collection == query.collection)
                .filter(|(_, doc)| matches(query, &doc.data))
                .map(|((_, key), doc)| (key.clone(), doc.clone()))
                .collect()
        };

        if let Some(field) = &query.order_by {
            matched.sort_by(|(ka, a), (kb, b)| {
                let ord = compare_fields(a.data.get(field), b.data.get(field)).then_with(|| ka.id.cmp(&kb.id));
                if query.descending { ord.reverse() } else { ord }
            });
        } else {
            matched.sort_by(|(ka, _), (kb, _)| ka.id.cmp(&kb.id));
        }

        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        let mut out = Vec::with_capacity(matched.len());
        for (key, doc) in matched {
            self.record_read(&key, doc.version)?;
            out.push(doc.data);
        }
        Ok(out)
    }

    async fn commit(self: Box<Self>, writes: Vec<(DocKey, Write)>) -> Result<(), AppError> {
        let now = Utc::now();
        let mut docs = self.docs.write().await;

        // 1. Valida o conjunto de leitura
        for (key, seen) in &self.reads {
            let current = docs.get(&(self.scope, key.clone())).map_or(0, |doc| doc.version);
            if current != *seen {
                return Err(AppError::Conflict);
            }
        }

        // 2. Aplica as escritas numa área de rascunho; só publica se todas forem válidas
        let mut staged: HashMap<DocKey, Versioned> = HashMap::new();
        for (key, mut write) in writes {
            stamp(&mut write, now);
            let current = match staged.get(&key) {
                Some(entry) => Some(entry.clone()),
                None => docs.get(&(self.scope, key.clone())).cloned(),
            };

            let next = match (write, current) {
                (Write::Create(_), Some(_)) => return Err(AppError::Conflict),
                (Write::Create(data), None) => Versioned { version: 1, data },
                (Write::Merge(_), None) => return Err(AppError::Conflict),
                (Write::Merge(patch), Some(mut doc)) => {
                    merge_top_level(&mut doc.data, patch);
                    doc.version += 1;
                    doc
                }
            };
            staged.insert(key, next);
        }

        for (key, doc) in staged {
            docs.insert((self.scope, key), doc);
        }
        Ok(())
    }
}

fn merge_top_level(target: &mut Value, patch: Value) {
    if let (Value::Object(target), Value::Object(patch)) = (target, patch) {
        for (field, value) in patch {
            target.insert(field, value);
        }
    }
}

fn matches(query: &Query, doc: &Value) -> bool {
    query.filters.iter().all(|filter| {
        let field = doc.get(&filter.field);
        match filter.op {
            FilterOp::Eq => field == Some(&filter.value),
            FilterOp::Gte => compare_values(field, &filter.value).is_some_and(|o| o != Ordering::Less),
            FilterOp::Lte => compare_values(field, &filter.value).is_some_and(|o| o != Ordering::Greater),
        }
    })
}

// Só compara valores do mesmo tipo; tipos diferentes nunca satisfazem um filtro de faixa.
fn compare_values(field: Option<&Value>, other: &Value) -> Option<Ordering> {
    match (field?, other) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_values(Some(a), b).unwrap_or(Ordering::Equal),
    }
}
