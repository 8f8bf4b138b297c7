//! Deployment step: builds the company profile from `COMPANY_WEBSITE` and
//! saves it where the server looks for it at startup.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use candidate_scorer::company::build_company_profile;
use candidate_scorer::config::Config;
use candidate_scorer::llm_client::prompts::PromptLibrary;
use candidate_scorer::llm_client::structured::StructuredExtractor;
use candidate_scorer::llm_client::GeminiClient;
use candidate_scorer::web::HttpFetcher;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let config = Config::from_env()?;
    candidate_scorer::init_tracing(&config.rust_log);

    let Some(website) = config.company_website.as_deref() else {
        info!("COMPANY_WEBSITE not set; skipping company analysis");
        return Ok(ExitCode::SUCCESS);
    };

    info!("Analyzing company website: {website}");

    let prompts = PromptLibrary::load(&config.prompts_path)?;
    let gemini = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())
        .context("Failed to build Gemini client")?;
    let extractor = StructuredExtractor::new(Arc::new(prompts), Arc::new(gemini));
    let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;

    let Some(profile) = build_company_profile(website, &fetcher, &extractor).await else {
        error!("Company analysis failed; no profile written");
        return Ok(ExitCode::FAILURE);
    };

    profile.save(&config.company_profile_path)?;
    info!("Company profile saved to {}", config.company_profile_path.display());

    let summary = profile.summary();
    info!("Industry: {}", summary.industry);
    info!("Stage: {}", summary.stage);
    info!("Culture: {}", summary.culture);
    info!("Mission: {}", summary.mission);

    Ok(ExitCode::SUCCESS)
}
