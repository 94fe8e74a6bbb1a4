use std::sync::Arc;

use crate::ai_client::CareerAnalyzer;
use crate::assessment::store::AssessmentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Assessment records and the credit ledger. Trait object so tests can
    /// drive the pipeline against an in-memory store.
    pub store: Arc<dyn AssessmentStore>,
    /// Analysis backend. Trait object for the same reason — handlers never
    /// name the concrete HTTP client.
    pub analyzer: Arc<dyn CareerAnalyzer>,
}
