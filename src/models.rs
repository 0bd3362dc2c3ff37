// src/models.rs

pub mod catalog;
pub mod client;
pub mod finance;
pub mod membership;
pub mod sales;
