//! Chat completion providers for Smithers.
//!
//! All providers implement the `smithers_core::Provider` trait.
//! [`ChatClient`] wraps one with the model settings from configuration.

pub mod chat_client;
pub mod factory;
pub mod openai_compat;

pub use chat_client::ChatClient;
pub use factory::{build_chat_client, build_provider, default_base_url};
pub use openai_compat::OpenAiCompatProvider;
