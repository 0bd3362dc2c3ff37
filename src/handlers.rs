// src/handlers.rs

pub mod catalog;
pub mod memberships;
pub mod sales;
