use std::sync::Arc;

use crate::config::Config;
use crate::portfolio::contract::ExtractionContract;
use crate::providers::Provider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one provider selected at startup. Stateless, shared by concurrent requests.
    pub provider: Arc<dyn Provider>,
    /// Rendered once at startup; identical for every request.
    pub contract: Arc<ExtractionContract>,
    pub config: Config,
}
