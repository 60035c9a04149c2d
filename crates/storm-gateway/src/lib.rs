//! storm-gateway: Outbound calls to the Storm platform API.
//!
//! One [`RemoteGateway`] serves every remote tool. The auth scheme, body shape
//! and timeout are chosen per call from the [`RemoteCallSpec`].

mod error;
mod gateway;
pub mod types;

pub use error::GatewayError;
pub use gateway::{decode_body, RemoteGateway};
pub use reqwest::Method;
pub use types::{
    AuthMode, FilePayload, GatewayConfig, RemoteCallSpec, DEFAULT_API_KEY_HEADER, DEFAULT_BASE_URL,
};
