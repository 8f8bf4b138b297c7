use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use candidate_scorer::company::CompanyProfile;
use candidate_scorer::config::Config;
use candidate_scorer::documents::{DocumentAiClient, DocumentService, ResumeTextExtractor};
use candidate_scorer::google_auth::{
    MetadataServerToken, StaticToken, TokenProvider, METADATA_TOKEN_URL,
};
use candidate_scorer::llm_client::prompts::PromptLibrary;
use candidate_scorer::llm_client::structured::StructuredExtractor;
use candidate_scorer::llm_client::GeminiClient;
use candidate_scorer::routes::build_router;
use candidate_scorer::scoring::CandidateScorer;
use candidate_scorer::state::AppState;
use candidate_scorer::web::HttpFetcher;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    candidate_scorer::init_tracing(&config.rust_log);

    info!("Starting candidate scorer v{}", env!("CARGO_PKG_VERSION"));

    let prompts = PromptLibrary::load(&config.prompts_path)?;
    info!("Prompt templates loaded from {}", config.prompts_path.display());

    let gemini = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())
        .context("Failed to build Gemini client")?;
    info!("LLM client initialized (model: {})", gemini.model());

    let extractor = StructuredExtractor::new(Arc::new(prompts), Arc::new(gemini));

    let document_service: Option<Arc<dyn DocumentService>> = match config.document_ai.clone() {
        Some(doc_ai) => {
            let tokens: Arc<dyn TokenProvider> = match &doc_ai.access_token {
                Some(token) => {
                    warn!("Using GOOGLE_ACCESS_TOKEN; Document AI calls fail once it expires");
                    Arc::new(StaticToken::new(token.clone()))
                }
                None => Arc::new(
                    MetadataServerToken::new(METADATA_TOKEN_URL)
                        .context("Failed to build metadata token client")?,
                ),
            };
            let client = DocumentAiClient::new(doc_ai, tokens)
                .context("Failed to build Document AI client")?;
            Some(Arc::new(client))
        }
        None => None,
    };
    let documents = ResumeTextExtractor::new(document_service);
    if documents.has_document_service() {
        info!("Document AI enabled for PDF resumes");
    } else {
        warn!("Document AI not configured; PDFs use the local parser only");
    }

    let company_profile = CompanyProfile::load_or_none(&config.company_profile_path).map(Arc::new);

    let state = AppState {
        scorer: CandidateScorer::new(extractor),
        fetcher: Arc::new(HttpFetcher::new().context("Failed to build HTTP client")?),
        documents,
        company_profile,
    };

    info!("Serving UI from {}", config.static_dir.display());
    let app = build_router(state, &config.static_dir)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
