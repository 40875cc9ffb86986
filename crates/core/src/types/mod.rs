//! Core types for ProductHub.
//!
//! This module provides type-safe wrappers for the catalog's domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{Product, ProductInput};
pub use status::*;
