//! Brand logo generation.
//!
//! Non-critical: a report is already in hand when a logo is requested, so
//! every failure degrades to an empty string.

use std::sync::Arc;

use tracing::{info, warn};

use vibe_core::{ContentPart, GenerationBackend, GenerationRequest};

use crate::config::InferenceConfig;
use crate::gemini::GeminiBackend;
use crate::prompt;

/// Generates a logo image for a business concept.
pub struct LogoGenerator {
    backend: Arc<dyn GenerationBackend>,
}

impl LogoGenerator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Gemini image model from configuration.
    pub fn from_config(config: &InferenceConfig) -> vibe_core::Result<Self> {
        let backend = GeminiBackend::new(config.gemini_config(&config.image_model))?;
        Ok(Self::new(Arc::new(backend)))
    }

    /// `data:<mime>;base64,<data>` URL of the first image returned, or `""`.
    pub async fn generate(&self, subject: &str) -> String {
        let request =
            GenerationRequest::new(vec![ContentPart::text(prompt::logo_instruction(subject))]);

        match self.backend.generate(&request).await {
            Ok(response) => match response.first_inline() {
                Some((mime_type, data)) => {
                    info!(
                        subsystem = "inference",
                        component = "logo",
                        op = "generate_logo",
                        model = %self.backend.model_name(),
                        mime_type = %mime_type,
                        response_len = data.len(),
                        "Logo generated"
                    );
                    format!("data:{};base64,{}", mime_type, data)
                }
                None => {
                    warn!(
                        subsystem = "inference",
                        component = "logo",
                        model = %self.backend.model_name(),
                        "Logo response contained no image"
                    );
                    String::new()
                }
            },
            Err(e) => {
                warn!(
                    subsystem = "inference",
                    component = "logo",
                    model = %self.backend.model_name(),
                    error = %e,
                    "Logo generation failed"
                );
                String::new()
            }
        }
    }
}
