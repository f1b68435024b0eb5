//! Shared utilities and common types for the document generator backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Common validation logic for request payloads
//! - Offset pagination clamping

pub mod pagination;
pub mod validation;
