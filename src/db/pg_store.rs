// src/db/pg_store.rs

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::common::error::AppError;
use crate::db::document_store::{
    stamp, DocKey, DocumentStore, DocumentTransaction, FilterOp, Query, Scope, Write,
};

// SQLSTATE de falha de serialização / deadlock: o Postgres abortou a transação
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// Documentos JSONB numa única tabela (`documents`), com transações SERIALIZABLE.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Converte erros do sqlx: conflitos viram `AppError::Conflict` (seguro repetir).
fn map_pg_error(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        let code = db_err.code();
        if matches!(code.as_deref(), Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED))
            || db_err.is_unique_violation()
        {
            return AppError::Conflict;
        }
    }
    AppError::DatabaseError(e)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn begin(&self, scope: Scope) -> Result<Box<dyn DocumentTransaction>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        Ok(Box::new(PgTransaction { tx, scope }))
    }
}

struct PgTransaction {
    tx: Transaction<'static, Postgres>,
    scope: Scope,
}

#[async_trait]
impl DocumentTransaction for PgTransaction {
    async fn get(&mut self, key: &DocKey) -> Result<Option<Value>, AppError> {
        sqlx::query_scalar::<_, Value>(
            r#"
            SELECT data FROM documents
            WHERE tenant_id = $1 AND branch_id = $2 AND collection = $3 AND doc_id = $4
            "#,
        )
        .bind(self.scope.tenant_id)
        .bind(self.scope.branch_id)
        .bind(&key.collection)
        .bind(&key.id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_pg_error)
    }

    async fn query(&mut self, query: &Query) -> Result<Vec<Value>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT data FROM documents WHERE tenant_id = ");
        qb.push_bind(self.scope.tenant_id)
            .push(" AND branch_id = ")
            .push_bind(self.scope.branch_id)
            .push(" AND collection = ")
            .push_bind(query.collection.clone());

        for filter in &query.filters {
            match (filter.op, &filter.value) {
                (FilterOp::Eq, value) => {
                    qb.push(" AND data -> ")
                        .push_bind(filter.field.clone())
                        .push(" = ")
                        .push_bind(value.clone());
                }
                (op, Value::String(text)) => {
                    // Chaves de data e timestamps ISO: comparação byte a byte
                    qb.push(" AND (data ->> ")
                        .push_bind(filter.field.clone())
                        .push(") COLLATE \"C\" ")
                        .push(range_operator(op))
                        .push(" ")
                        .push_bind(text.clone());
                }
                (op, Value::Number(number)) => {
                    let number = number.as_f64().ok_or_else(|| {
                        AppError::invalid(format!("Filtro numérico inválido em '{}'.", filter.field))
                    })?;
                    qb.push(" AND (data ->> ")
                        .push_bind(filter.field.clone())
                        .push(")::float8 ")
                        .push(range_operator(op))
                        .push(" ")
                        .push_bind(number);
                }
                _ => {
                    return Err(AppError::invalid(format!(
                        "Filtro de faixa não suportado em '{}'.",
                        filter.field
                    )));
                }
            }
        }

        if let Some(field) = &query.order_by {
            qb.push(" ORDER BY (data ->> ")
                .push_bind(field.clone())
                .push(") COLLATE \"C\"")
                .push(if query.descending { " DESC" } else { " ASC" })
                .push(", doc_id ASC");
        } else {
            qb.push(" ORDER BY doc_id ASC");
        }

        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        qb.build_query_scalar::<Value>()
            .fetch_all(&mut *self.tx)
            .await
            .map_err(map_pg_error)
    }

    async fn commit(self: Box<Self>, writes: Vec<(DocKey, Write)>) -> Result<(), AppError> {
        let PgTransaction { mut tx, scope } = *self;
        let now = Utc::now();

        for (key, mut write) in writes {
            stamp(&mut write, now);
            match write {
                Write::Create(data) => {
                    sqlx::query(
                        r#"
                        INSERT INTO documents (
                            tenant_id, branch_id, collection, doc_id, data, version, created_at, updated_at
                        )
                        VALUES ($1, $2, $3, $4, $5, 1, $6, $6)
                        "#,
                    )
                    .bind(scope.tenant_id)
                    .bind(scope.branch_id)
                    .bind(&key.collection)
                    .bind(&key.id)
                    .bind(data)
                    .bind(now)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_pg_error)?;
                }
                Write::Merge(patch) => {
                    let result = sqlx::query(
                        r#"
                        UPDATE documents
                        SET data = data || $5, version = version + 1, updated_at = $6
                        WHERE tenant_id = $1 AND branch_id = $2 AND collection = $3 AND doc_id = $4
                        "#,
                    )
                    .bind(scope.tenant_id)
                    .bind(scope.branch_id)
                    .bind(&key.collection)
                    .bind(&key.id)
                    .bind(patch)
                    .bind(now)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_pg_error)?;

                    // O documento sumiu depois da leitura
                    if result.rows_affected() == 0 {
                        return Err(AppError::Conflict);
                    }
                }
            }
        }

        tx.commit().await.map_err(map_pg_error)
    }
}

fn range_operator(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Eq => "=",
        FilterOp::Gte => ">=",
        FilterOp::Lte => "<=",
    }
}
