//! Company Profile Builder: page collection + structured extraction.
//!
//! Every failure path yields `None`: callers fall back to basic scoring.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::company::profile::CompanyProfile;
use crate::llm_client::prompts::ANALYZE_COMPANY_PROFILE;
use crate::llm_client::structured::StructuredExtractor;
use crate::web::collector::{collect, PageBundle};
use crate::web::html::truncate_chars;
use crate::web::PageFetcher;

/// Cap on the combined page text sent to the model.
pub const MAX_COMBINED_CHARS: usize = 8000;

pub async fn build_company_profile(
    website: &str,
    fetcher: &dyn PageFetcher,
    extractor: &StructuredExtractor,
) -> Option<CompanyProfile> {
    let website = website.trim();
    if website.is_empty() {
        return None;
    }

    let pages = collect(fetcher, website).await;
    if pages.is_empty() {
        info!("No pages extracted from {website}; skipping company analysis");
        return None;
    }

    let combined = combine_pages(&pages);
    let args = HashMap::from([(
        "combined_content",
        truncate_chars(&combined, MAX_COMBINED_CHARS).to_string(),
    )]);

    let record = match extractor.extract(ANALYZE_COMPANY_PROFILE, &args).await {
        Ok(record) => record,
        Err(e) => {
            warn!("Error analyzing company profile: {e}");
            if let Some(raw) = e.raw_response() {
                warn!("Raw response was: {raw}");
            }
            return None;
        }
    };

    match serde_json::from_value(serde_json::Value::Object(record)) {
        Ok(profile) => Some(profile),
        Err(e) => {
            warn!("Company analysis does not match the profile shape: {e}");
            None
        }
    }
}

/// Joins pages into one document with a header per section.
pub fn combine_pages(pages: &PageBundle) -> String {
    pages
        .iter()
        .map(|(label, text)| format!("\n--- {} PAGE ---\n{text}\n", label.to_uppercase()))
        .collect()
}
