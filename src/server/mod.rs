//! JSON HTTP surface over [`OptionChainService`](crate::service::OptionChainService).

pub mod error;
pub mod handlers;
pub mod routes;

pub use routes::create_router;
