//! Fyers REST endpoint implementations.
//!
//! Each sub-module adds high-level `async` methods to
//! [`FyersClient`](crate::client::FyersClient) via `impl` blocks. All methods
//! handle JSON serialization, HTTP transport, and error mapping automatically.
//!
//! ## Modules
//!
//! | Module | Endpoints | Description |
//! |---|---|---|
//! | [`auth`] | 1 | Refresh-token exchange, valid-token accessor |
//! | [`option_chain`] | 1 | Option chain quotes |

pub mod auth;
pub mod option_chain;
