//! Shared types and configuration for Gestra.
//!
//! This crate provides common types used across all other crates:
//! - Currency and money rounding helpers
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
