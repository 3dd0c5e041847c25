//! Copperleaf Storefront - headless storefront client library.
//!
//! The library owns the cart/session core of the storefront: a
//! stock-clamped shopping cart persisted through a key/value adapter, a
//! session resolver that derives identity and roles from a bearer token,
//! and a checkout coordinator that turns the cart into a payment request.
//! Everything above it (rendering, navigation, input handling) is a
//! consumer; nothing here calls back into a UI layer.
//!
//! # Architecture
//!
//! - [`persist`] - synchronous key/value persistence (file-backed or
//!   in-memory), written whole on every mutation
//! - [`api`] - `reqwest` client for the backend `/api`, bearer token
//!   attached once set
//! - [`cart`] - the cart store; every quantity change goes through
//!   `copperleaf_core::resolve_quantity`
//! - [`session`] - token/user/roles state machine with fenced asynchronous
//!   revalidation
//! - [`checkout`] - cart-to-payment coordinator
//! - [`catalog`] - cached product listing
//! - [`state`] - the [`state::Storefront`] facade wiring it all together
//!
//! # Example
//!
//! ```rust,ignore
//! use copperleaf_storefront::{config::ClientConfig, state::Storefront};
//!
//! let mut store = Storefront::new(ClientConfig::from_env()?)?;
//! let products = store.products().await?;
//! let outcome = store.add_to_cart(products[0].id).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod persist;
pub mod session;
pub mod state;

pub use error::{Result, StorefrontError};
