//! HTTP gateway: document upload and catalog endpoints plus chat forwarding.

mod error;
mod handlers;
mod router;
mod server;

pub use error::{ApiError, GatewayError};
pub use server::{GatewayComponents, GatewayServer};
