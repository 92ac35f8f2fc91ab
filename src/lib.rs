//! Invoicing for support services: clients, support item rate schedules,
//! and invoices made of billable activities.

pub mod billing;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod models;
pub mod statement;
