//! Core types for Copperleaf.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod product;
pub mod role;

pub use cart::CartLine;
pub use id::*;
pub use product::{ProductSnapshot, StockCeiling};
pub use role::RoleSet;
