//! Analysis client with two-tier model fallback.
//!
//! The primary tier is high-capability but quota-limited. When it fails for
//! any reason (transport, quota, empty payload, or a response that fails the
//! report contract), exactly one sequential retry goes to the secondary tier
//! with the same media, instruction and schema but without a thinking budget.
//! If that also fails, the primary failure is what the caller sees.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use vibe_core::{
    ContentPart, Error, GenerationBackend, GenerationRequest, MediaReference, Report,
    ReportSchema, Result,
};

use crate::config::InferenceConfig;
use crate::gemini::GeminiBackend;
use crate::prompt;

/// Which tier served (or failed) a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Primary,
    Secondary,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Primary => "primary",
            Tier::Secondary => "secondary",
        }
    }
}

/// Turns media into a validated [`Report`].
pub struct AnalysisClient {
    primary: Arc<dyn GenerationBackend>,
    secondary: Option<Arc<dyn GenerationBackend>>,
    thinking_budget: u32,
    schema: &'static ReportSchema,
}

impl AnalysisClient {
    pub fn new(
        primary: Arc<dyn GenerationBackend>,
        secondary: Option<Arc<dyn GenerationBackend>>,
        thinking_budget: u32,
    ) -> Self {
        Self {
            primary,
            secondary,
            thinking_budget,
            schema: ReportSchema::canonical(),
        }
    }

    /// Build Gemini-backed tiers from configuration. Requires an API key.
    pub fn from_config(config: &InferenceConfig) -> Result<Self> {
        config
            .require_api_key()
            .map_err(|e| Error::Config(e.to_string()))?;

        let primary: Arc<dyn GenerationBackend> =
            Arc::new(GeminiBackend::new(config.gemini_config(&config.primary_model))?);
        let secondary: Option<Arc<dyn GenerationBackend>> = if config.fallback.enabled {
            Some(Arc::new(GeminiBackend::new(
                config.gemini_config(&config.fallback.model),
            )?))
        } else {
            None
        };

        Ok(Self::new(primary, secondary, config.thinking_budget))
    }

    pub fn primary_model(&self) -> &str {
        self.primary.model_name()
    }

    pub fn secondary_model(&self) -> Option<&str> {
        self.secondary.as_deref().map(|b| b.model_name())
    }

    /// Analyze media, returning a report in `language`.
    ///
    /// Fails with [`Error::Analysis`] carrying the primary tier's cause when
    /// every available tier fails.
    pub async fn analyze(&self, media: &MediaReference, language: &str) -> Result<Report> {
        let start = Instant::now();
        let instruction = prompt::analysis_instruction(language);
        let parts = vec![
            ContentPart::inline(media.mime_type(), media.base64()),
            ContentPart::text(instruction),
        ];
        let request = GenerationRequest::new(parts).with_json_schema(self.schema.to_wire());

        info!(
            subsystem = "inference",
            component = "analysis_client",
            op = "analyze",
            language = %language,
            media_bytes = media.size(),
            mime_type = %media.mime_type(),
            "Starting analysis"
        );

        let primary_request = request
            .clone()
            .with_thinking_budget(Some(self.thinking_budget));
        let primary_err = match self
            .attempt(self.primary.as_ref(), &primary_request, Tier::Primary)
            .await
        {
            Ok(report) => {
                self.log_success(Tier::Primary, self.primary.model_name(), start);
                return Ok(report);
            }
            Err(e) => e,
        };

        let Some(secondary) = self.secondary.as_deref() else {
            error!(
                subsystem = "inference",
                op = "analyze",
                model = %self.primary.model_name(),
                error = %primary_err,
                "Analysis failed and no fallback tier is configured"
            );
            return Err(Error::Analysis(primary_err.to_string()));
        };

        warn!(
            subsystem = "inference",
            op = "analyze",
            model = %self.primary.model_name(),
            fallback_model = %secondary.model_name(),
            error = %primary_err,
            "Primary tier failed, engaging secondary tier"
        );

        let secondary_request = request.with_thinking_budget(None);
        match self
            .attempt(secondary, &secondary_request, Tier::Secondary)
            .await
        {
            Ok(report) => {
                self.log_success(Tier::Secondary, secondary.model_name(), start);
                Ok(report)
            }
            Err(secondary_err) => {
                error!(
                    subsystem = "inference",
                    op = "analyze",
                    error = %primary_err,
                    secondary_error = %secondary_err,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Both analysis tiers failed"
                );
                Err(Error::Analysis(primary_err.to_string()))
            }
        }
    }

    async fn attempt(
        &self,
        backend: &dyn GenerationBackend,
        request: &GenerationRequest,
        tier: Tier,
    ) -> Result<Report> {
        let response = backend.generate(request).await?;
        let text = response
            .text()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                Error::Analysis(format!("No response from {}", backend.model_name()))
            })?;

        debug!(
            tier = tier.as_str(),
            model = %backend.model_name(),
            response_len = text.len(),
            "Validating response against report schema"
        );
        self.schema.parse_report(&text)
    }

    fn log_success(&self, tier: Tier, model: &str, start: Instant) {
        info!(
            subsystem = "inference",
            component = "analysis_client",
            op = "analyze",
            tier = tier.as_str(),
            model = %model,
            duration_ms = start.elapsed().as_millis() as u64,
            success = true,
            "Analysis complete"
        );
    }
}
