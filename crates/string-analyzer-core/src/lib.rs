//! # String Analyzer Core
//!
//! Shared logic for String Analyzer: string property analysis, the record
//! model, the store abstraction, the filter engine, and the rule-based
//! natural-language query interpreter.
//!
//! This crate contains no tokio, sqlx, or filesystem I/O. Storage backends
//! plug in through the [`store::Store`] trait.

pub mod analyzer;
pub mod error;
pub mod filter;
pub mod models;
pub mod nl;
pub mod records;
pub mod store;

pub use error::{Error, Result};
