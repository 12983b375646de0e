//! # freight-core
//!
//! Container lifecycle tracking and financial ledger service for freight
//! forwarding operations.
//!
//! Carrier webhooks and manual entries feed a per-container event log
//! with time-window deduplication; a keyword table derives a 0-100
//! progress figure and terminal detection from free-text status labels,
//! and a fixed-stage timeline is computed on demand. The ledger side
//! keeps an append-only running balance per account, with expense
//! postings attributed to shipments, an aging report over outstanding
//! balances, and ETA-based delivery alerts.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP webhooks, REST)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── TrackingService / LedgerService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── ContainerStore / LedgerStore (domain/)
//!     ├── Timeline / Aging / Alerts (domain/, reports/)
//!     │
//!     └── PostgreSQL Persistence (write-behind)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod reports;
pub mod service;
