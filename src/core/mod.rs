//! # Core Module
//!
//! Core domain types, configuration, and encryption for the document tracker.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Add crypto module for document numbers at rest
//! - 1.1.0: Add models module with Person / Document records
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod crypto;
pub mod models;

// Re-export commonly used items
pub use config::Config;
pub use crypto::DocumentCipher;
pub use models::{Document, DocumentType, Person, Role, WorkflowStatus};
