// src/db/client_repo.rs

use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::document_store::{DocKey, Tx},
    models::client::Client,
};

const CLIENTS: &str = "clients";

#[derive(Clone, Default)]
pub struct ClientRepository;

impl ClientRepository {
    pub fn new() -> Self {
        Self
    }

    fn key(id: Uuid) -> DocKey {
        DocKey::new(CLIENTS, id)
    }

    pub async fn find(&self, tx: &mut Tx, id: Uuid) -> Result<Option<Client>, AppError> {
        tx.get(&Self::key(id)).await
    }

    /// Igual a `find`, mas cliente ausente é erro.
    pub async fn get(&self, tx: &mut Tx, id: Uuid) -> Result<Client, AppError> {
        self.find(tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))
    }

    pub fn create(&self, tx: &mut Tx, client: &Client) -> Result<(), AppError> {
        tx.create(Self::key(client.id), client)
    }

    pub fn patch(&self, tx: &mut Tx, id: Uuid, patch: Value) {
        tx.merge(Self::key(id), patch);
    }
}
