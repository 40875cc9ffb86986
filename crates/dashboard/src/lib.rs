//! ProductHub Dashboard library.
//!
//! Server-rendered management front-end for the ProductHub catalog API:
//! sign-in and sign-up, and a live product table with debounced filters,
//! sorting, and create/edit/delete through a modal.
//!
//! Exposed as a library so the binary, the CLI and the integration tests
//! share one API client, session model and router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod filters;
pub mod live;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
