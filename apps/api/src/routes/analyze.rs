use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::company::CompanySummary;
use crate::errors::AppError;
use crate::scoring::{ResumeRecord, ScoreRecord};
use crate::state::AppState;
use crate::web::extract_text_from_url;
use crate::web::html::truncate_chars;

const JD_PREVIEW_CHARS: usize = 500;
const DEFAULT_RESUME_FILENAME: &str = "resume";

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub resume_analysis: ResumeRecord,
    pub scoring: ScoreRecord,
    pub jd_preview: String,
    /// True when the score was computed with company context.
    pub enhanced_analysis: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_summary: Option<CompanySummary>,
}

struct ResumeUpload {
    filename: String,
    content: Bytes,
}

struct AnalyzeForm {
    jd_url: String,
    resume: ResumeUpload,
}

impl AnalyzeForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, AppError> {
        let mut jd_url = None;
        let mut resume = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "jd_url" => jd_url = Some(field.text().await?),
                "resume_file" => {
                    let filename = field
                        .file_name()
                        .filter(|name| !name.trim().is_empty())
                        .unwrap_or(DEFAULT_RESUME_FILENAME)
                        .to_string();
                    let content = field.bytes().await?;
                    resume = Some(ResumeUpload { filename, content });
                }
                _ => {}
            }
        }

        let jd_url = jd_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AppError::Validation("Missing 'jd_url' field".to_string()))?;
        let resume = resume
            .ok_or_else(|| AppError::Validation("Missing 'resume_file' field".to_string()))?;

        Ok(Self { jd_url, resume })
    }
}

/// POST /analyze
/// Scores an uploaded resume against the job description at `jd_url`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let AnalyzeForm { jd_url, resume } = AnalyzeForm::read(&mut multipart).await?;

    let jd_text = extract_text_from_url(state.fetcher.as_ref(), &jd_url).await?;
    if jd_text.trim().is_empty() {
        return Err(AppError::Validation(format!(
            "Could not extract text from {jd_url}"
        )));
    }

    let resume_text = state
        .documents
        .extract(&resume.filename, resume.content)
        .await?;
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation(format!(
            "Could not extract text from {}",
            resume.filename
        )));
    }

    info!(
        "Analyzing {} ({} chars) against {jd_url} ({} chars)",
        resume.filename,
        resume_text.len(),
        jd_text.len()
    );

    let profile = state.company_profile.as_deref();
    let card = state.scorer.score(&resume_text, &jd_text, profile).await?;

    Ok(Json(AnalyzeResponse {
        success: true,
        resume_analysis: card.resume,
        scoring: card.score,
        jd_preview: preview(&jd_text),
        enhanced_analysis: profile.is_some(),
        company_summary: profile.map(|p| p.summary()),
    }))
}

fn preview(text: &str) -> String {
    let head = truncate_chars(text, JD_PREVIEW_CHARS);
    if head.len() < text.len() {
        format!("{head}...")
    } else {
        head.to_string()
    }
}
