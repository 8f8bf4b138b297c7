use std::sync::Arc;

use crate::company::CompanyProfile;
use crate::documents::ResumeTextExtractor;
use crate::scoring::CandidateScorer;
use crate::web::PageFetcher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub scorer: CandidateScorer,
    /// Fetches job description pages.
    pub fetcher: Arc<dyn PageFetcher>,
    pub documents: ResumeTextExtractor,
    /// Loaded once at startup; `None` means basic scoring for every request.
    pub company_profile: Option<Arc<CompanyProfile>>,
}
