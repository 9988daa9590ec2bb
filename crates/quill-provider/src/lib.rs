//! Quill Model Provider
//!
//! Chat-completion abstraction used by the assistant, with an HTTP
//! implementation for OpenRouter-compatible endpoints.
//!
//! # Core Concepts
//!
//! - [`ModelProvider`]: One async `complete` call per request
//! - [`ChatRequest`] / [`ChatResponse`]: OpenAI-style wire types
//! - [`HttpProvider`]: `reqwest` client with optional bearer key
//! - [`ProviderConfig`]: Endpoint, model, key variable and timeout
//!
//! # Example
//!
//! ```rust,ignore
//! use quill_provider::{ChatMessage, ChatRequest, HttpProvider, ModelProvider, ProviderConfig};
//!
//! let config = ProviderConfig::default();
//! let provider = HttpProvider::new(&config)?;
//! let request = ChatRequest::new(&config.model)
//!     .with_message(ChatMessage::user("Suggest a title"));
//! let text = provider.complete(request).await?.content()?.to_string();
//! ```

#![warn(unreachable_pub)]

// Core modules
mod config;
mod error;
mod http;
mod provider;
mod types;

// Re-exports
pub use config::{ProviderConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use error::ProviderError;
pub use http::HttpProvider;
pub use provider::ModelProvider;
pub use types::{ChatMessage, ChatRequest, ChatResponse, Choice, ResponseMessage, Role};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
