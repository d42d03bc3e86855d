//! # String Analyzer
//!
//! Stores strings keyed by their SHA-256 content hash together with a set
//! of computed properties, and filters them by structured criteria or by a
//! rule-based natural-language query.
//!
//! The analysis, filtering and interpretation logic lives in the
//! `string-analyzer-core` crate behind the [`Store`] trait. This crate adds
//! the SQLite backend, the HTTP API and the `sa` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌──────────────┐
//! │   CLI    │──▶│     core     │──▶│ dyn Store    │
//! │  (sa)    │   │ analyze/     │   │ SQLite or    │
//! ├──────────┤──▶│ filter/nl    │   │ in-memory    │
//! │   HTTP   │   └──────────────┘   └──────────────┘
//! └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |
//! | [`sqlite_store`] | SQLite [`Store`] implementation |
//! | [`server`] | HTTP API |
//! | [`add`] | `analyze`, `add` and `import` commands |
//! | [`get`] | `get` and `delete` commands |
//! | [`search`] | `list` and `query` commands |
//! | [`stats`] | `stats` command |
//!
//! [`Store`]: string_analyzer_core::store::Store

pub mod add;
pub mod config;
pub mod db;
pub mod get;
pub mod migrate;
pub mod search;
pub mod server;
pub mod sqlite_store;
pub mod stats;
