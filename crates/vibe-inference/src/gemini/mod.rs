//! Gemini inference backend.
//!
//! Speaks the `models/{model}:generateContent` REST protocol: multimodal
//! parts in, candidate parts out, with optional structured-output schema and
//! thinking budget.
//!
//! # Example
//!
//! ```rust,no_run
//! use vibe_core::{ContentPart, GenerationBackend, GenerationRequest};
//! use vibe_inference::gemini::{GeminiBackend, GeminiConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = GeminiBackend::new(GeminiConfig {
//!         api_key: std::env::var("GEMINI_API_KEY").ok(),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//!     let request = GenerationRequest::new(vec![ContentPart::text("Describe Shoreditch.")]);
//!     let response = backend.generate(&request).await.unwrap();
//!     println!("{}", response.text().unwrap_or_default());
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{GeminiBackend, GeminiConfig};
pub use error::{to_vibe_error, GeminiErrorCode};
pub use types::*;
