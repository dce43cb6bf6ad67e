//! Request and response types for the broker APIs.
//!
//! ## Organization
//!
//! - [`enums`] — Shared enumerations (option side, transaction type)
//! - [`auth`] — Token refresh request/response types
//! - [`option_chain`] — Option chain query, raw quotes, result rows
//! - [`margin`] — Upstox margin request/response types
//! - [`symbols`] — Symbol-master contract metadata
//!
//! All enums are re-exported at the module root via `pub use enums::*`.

pub mod auth;
pub mod enums;
pub mod margin;
pub mod option_chain;
pub mod symbols;

pub use enums::*;
