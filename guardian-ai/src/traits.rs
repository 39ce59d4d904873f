use async_trait::async_trait;
use guardian_common::Error;

use crate::models::GatewayRequest;

/// A single-shot call to a generative model.
///
/// Exactly one attempt is made. Missing credentials come back as
/// `Error::Configuration`; everything that goes wrong on the wire comes back
/// as `Error::Transport`.
#[async_trait]
pub trait AiGateway: Send + Sync {
    async fn invoke(&self, request: &GatewayRequest) -> Result<String, Error>;
}
