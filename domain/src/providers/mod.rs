//! Provider types shared across layers
//!
//! - [`config`]: provider-neutral connection settings (serde-free)
//! - [`result`]: the uniform result envelope and error classification

pub mod config;
pub mod result;

pub use config::{GeminiProviderConfig, OpenAiProviderConfig, ProviderConfig};
pub use result::{ProviderErrorKind, ProviderResult};
