//! linguist-providers — generative-language backends.
//!
//! Implements the core `ContentGenerator` trait for the Gemini API, plus a
//! configurable mock, so exercise generation and tutor replies can run
//! against a real backend or entirely offline.

pub mod config;
pub mod gemini;
pub mod mock;

pub use config::{create_backend, load_config, BackendConfig, LinguistConfig};
pub use gemini::GeminiBackend;
pub use linguist_core::error::GeneratorError;
pub use mock::MockGenerator;
