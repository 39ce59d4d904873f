pub mod models;
pub mod normalizer;
pub mod prompts;
pub mod provider;
pub mod traits;

// Re-export public APIs
pub use models::{GatewayConfig, GatewayRequest, ImageAttachment};
pub use normalizer::ResponseNormalizer;
pub use provider::AnthropicGateway;
pub use traits::AiGateway;
