//! ProductHub Core - Shared domain library.
//!
//! This crate provides the types used by every ProductHub component:
//! - `dashboard` - Server-rendered catalog management front-end
//! - `cli` - Command-line client for the catalog API
//!
//! # Architecture
//!
//! The core crate contains only types and pure state machines - no I/O, no
//! timers, no HTTP clients. This keeps it lightweight and lets both the
//! dashboard and the CLI share the same validation and query rules.
//!
//! # Modules
//!
//! - [`types`] - Products, ids, prices, statuses and emails
//! - [`filter`] - Filter state and query-string building
//! - [`form`] - Product and credential forms with validation
//! - [`sort`] - Client-side column sorting for the product table
//! - [`menu`] - Per-row action menu state

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod filter;
pub mod form;
pub mod menu;
pub mod sort;
pub mod types;

pub use filter::{FilterKey, FilterState};
pub use form::{
    CredentialsForm, FormErrors, ModalSubmission, ProductForm, ProductModal, ValidCredentials,
};
pub use menu::{ActionMenu, OutsideClickGuard, OutsideClickListeners};
pub use sort::{SortColumn, SortDirection, SortState};
pub use types::*;
