//! Common utilities and types shared across DocVault modules.
//!
//! This module provides the error taxonomy and the metadata types that the
//! storage layer produces and the boundary layer hands to callers.

pub mod error;
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use types::{
    AttributeValue, DocumentAttributes, EntryMetadata, CREATED_AT_KEY, LAST_MODIFIED_KEY,
};
