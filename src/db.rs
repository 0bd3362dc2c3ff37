// src/db.rs

pub mod document_store;
pub mod memory_store;
pub mod pg_store;

pub mod catalog_repo;
pub mod client_repo;
pub mod membership_repo;
pub mod receivable_repo;
pub mod sales_repo;

pub use document_store::{retry_on_conflict, DocKey, DocumentStore, Scope, Tx};
pub use memory_store::MemoryDocumentStore;
pub use pg_store::PgDocumentStore;

pub use catalog_repo::CatalogRepository;
pub use client_repo::ClientRepository;
pub use membership_repo::MembershipRepository;
pub use receivable_repo::ReceivableRepository;
pub use sales_repo::SalesRepository;
