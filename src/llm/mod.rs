pub mod client;
pub mod prompts;

pub use client::{Generate, GenerateError, GenerateRequest, GeminiClient, GeminiConfig, is_throttle_message};
