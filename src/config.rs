// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{DocumentStore, MemoryDocumentStore, PgDocumentStore},
    services::{CatalogService, MembershipService, SaleService},
};

/// Configuração lida das variáveis de ambiente (`.env` aceito via dotenvy).
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Sem DATABASE_URL a aplicação sobe com o armazenamento em memória
    pub database_url: Option<String>,
    pub server_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub transaction_max_attempts: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            server_addr: "0.0.0.0:3000".to_string(),
            db_max_connections: 5,
            db_acquire_timeout: Duration::from_secs(3),
            transaction_max_attempts: 5,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} inválida: '{raw}'")),
        _ => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            server_addr: env::var("SERVER_ADDR").unwrap_or(defaults.server_addr),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            db_acquire_timeout: Duration::from_secs(parse_var(
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.db_acquire_timeout.as_secs(),
            )?),
            transaction_max_attempts: parse_var("TRANSACTION_MAX_ATTEMPTS", defaults.transaction_max_attempts)?
                .max(1),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub sale_service: SaleService,
    pub membership_service: MembershipService,
    pub catalog_service: CatalogService,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn DocumentStore> = match &config.database_url {
            Some(database_url) => {
                // Conecta ao banco de dados, usando '?' para propagar erros
                let db_pool = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .acquire_timeout(config.db_acquire_timeout)
                    .connect(database_url)
                    .await
                    .context("Falha ao conectar no banco de dados")?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!()
                    .run(&db_pool)
                    .await
                    .context("Falha ao rodar as migrações do banco de dados")?;

                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
                Arc::new(PgDocumentStore::new(db_pool))
            }
            None => {
                tracing::warn!("⚠️ DATABASE_URL não definida: usando armazenamento em memória (dados se perdem ao reiniciar)");
                Arc::new(MemoryDocumentStore::new())
            }
        };

        Ok(Self::with_store(store, config.transaction_max_attempts))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_store(store: Arc<dyn DocumentStore>, transaction_max_attempts: u32) -> Self {
        Self {
            sale_service: SaleService::new(store.clone(), transaction_max_attempts),
            membership_service: MembershipService::new(store.clone(), transaction_max_attempts),
            catalog_service: CatalogService::new(store),
        }
    }
}
