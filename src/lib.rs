//! supplier-invoices: Supplier invoice workspace provisioning and payment notifications
//! with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
