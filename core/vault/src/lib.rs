//! Document vault service for DocVault.
//!
//! This module provides:
//! - Root management with fail-closed behaviour before a root is set
//! - Typed operations over the storage layer
//! - An untyped JSON command boundary for front ends
//! - Configuration loading
//!
//! # Architecture
//! The vault sits between callers and the storage layer. It owns the
//! current root and hands a guard bound to that root to every storage
//! component it creates.

pub mod commands;
pub mod config;
pub mod service;

pub use commands::{dispatch, handle_json, CreateOutcome, Request, Response};
pub use config::VaultConfig;
pub use service::DocumentVault;
