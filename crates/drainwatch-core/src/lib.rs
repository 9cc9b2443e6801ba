//! Drainwatch Core - Domain models, error taxonomy, and configuration
//!
//! This crate contains the drainage/report domain types and the port definitions
//! for the external collaborators (file store, notifier) the workflow calls into.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use error::{DrainError, ErrorKind, Result};
