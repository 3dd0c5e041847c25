//! Copperleaf Core - Shared types library.
//!
//! This crate provides the types common to all Copperleaf components:
//! - `storefront` - Headless storefront client library
//! - `cli` - Command-line shell driving the client
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, product snapshots, cart lines, and role sets
//! - [`stock`] - The quantity reconciliation function all cart mutations
//!   go through

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod stock;
pub mod types;

pub use stock::{LineOutcome, QuantityResolution, resolve_quantity};
pub use types::*;
