use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::GenerationBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable generation backend. Production: OllamaClient. Tests: scripted fakes.
    pub backend: Arc<dyn GenerationBackend>,
    pub config: Config,
}
