//! LLM provider implementations for skiff.
//!
//! Every provider implements the `skiff_core::Provider` trait. Only the
//! OpenAI-compatible wire format is spoken; point `api_url` at any server
//! that implements it.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
