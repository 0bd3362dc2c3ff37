// src/services.rs

pub mod catalog_service;
pub mod fee_service;
pub mod membership_lifecycle;
pub mod membership_service;
pub mod receivable_service;
pub mod sale_service;

pub use catalog_service::CatalogService;
pub use membership_service::MembershipService;
pub use sale_service::SaleService;
