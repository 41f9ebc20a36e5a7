//! # vibe-inference
//!
//! Generative model access for vibe-os.
//!
//! This crate provides:
//! - Gemini `generateContent` backend over REST
//! - Inference configuration (TOML file or environment)
//! - Analysis instruction builder
//! - [`AnalysisClient`] with primary/secondary tier fallback
//! - Brand logo generation
//!
//! # Feature Flags
//!
//! - `mock`: expose [`mock::MockGenerationBackend`] to other crates' tests
//!
//! # Example
//!
//! ```rust,no_run
//! use vibe_core::{MediaIngest, SelectedFile};
//! use vibe_inference::{AnalysisClient, InferenceConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = InferenceConfig::from_env();
//!     let client = AnalysisClient::from_config(&config).unwrap();
//!     let media = MediaIngest::new()
//!         .select(SelectedFile::new("street.jpg", Some("image/jpeg"), std::fs::read("street.jpg").unwrap()))
//!         .unwrap();
//!     let report = client.analyze(&media, "English").await.unwrap();
//!     println!("{}", report.location_vibe);
//! }
//! ```

pub mod client;
pub mod config;
pub mod gemini;
pub mod logo;
pub mod prompt;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use client::{AnalysisClient, Tier};
pub use config::{ConfigError, ConfigResult, FallbackConfig, InferenceConfig};
pub use gemini::{GeminiBackend, GeminiConfig, GeminiErrorCode};
pub use logo::LogoGenerator;
