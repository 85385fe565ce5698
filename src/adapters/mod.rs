//! Infrastructure adapters. Implement outbound ports.
//!
//! Local drive, run manifest, mail APIs, terminal UI. Map errors to DomainError.

pub mod mail;
pub mod persistence;
pub mod ui;
