//! Candidate Scorer: resume extraction followed by JD scoring.
//!
//! The two model calls are sequential and dependent: the score prompt embeds
//! the structured resume, so a failed resume extraction aborts scoring.
//! Company context switches both the prompt and the shape of the result.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::company::CompanyProfile;
use crate::llm_client::prompts::{
    ANALYZE_RESUME, SCORE_CANDIDATE, SCORE_CANDIDATE_WITH_COMPANY_CONTEXT,
};
use crate::llm_client::structured::{ExtractionError, Record, StructuredExtractor};
use crate::scoring::records::{ResumeRecord, ScoreRecord, ScoreShape};

/// Resume analysis plus the score computed from it.
#[derive(Debug, Clone, Serialize)]
pub struct Scorecard {
    pub resume: ResumeRecord,
    pub score: ScoreRecord,
}

#[derive(Clone)]
pub struct CandidateScorer {
    extractor: StructuredExtractor,
}

impl CandidateScorer {
    pub fn new(extractor: StructuredExtractor) -> Self {
        Self { extractor }
    }

    pub async fn analyze_resume(&self, resume_text: &str) -> Result<ResumeRecord, ExtractionError> {
        let args = HashMap::from([("resume_text", resume_text.to_string())]);
        let record = self.extractor.extract(ANALYZE_RESUME, &args).await?;
        typed(record, ResumeRecord::from_record)
    }

    /// Scores an already-structured resume against a job description.
    pub async fn score_resume(
        &self,
        resume: &ResumeRecord,
        jd_text: &str,
        company_profile: Option<&CompanyProfile>,
    ) -> Result<ScoreRecord, ExtractionError> {
        let mut args = HashMap::from([
            ("resume_data", to_prompt_json(resume)),
            ("jd_text", jd_text.to_string()),
        ]);

        let (prompt, shape) = match company_profile {
            Some(profile) => {
                args.insert("company_profile", to_prompt_json(profile));
                (SCORE_CANDIDATE_WITH_COMPANY_CONTEXT, ScoreShape::Extended)
            }
            None => (SCORE_CANDIDATE, ScoreShape::Reduced),
        };

        let record = self.extractor.extract(prompt, &args).await?;
        typed(record, |r| ScoreRecord::from_record(r, shape))
    }

    pub async fn score(
        &self,
        resume_text: &str,
        jd_text: &str,
        company_profile: Option<&CompanyProfile>,
    ) -> Result<Scorecard, ExtractionError> {
        let resume = self.analyze_resume(resume_text).await?;
        let score = self.score_resume(&resume, jd_text, company_profile).await?;

        info!(
            "Scored candidate '{}': {} (company context: {})",
            resume.name,
            score.recommendation.as_str(),
            company_profile.is_some()
        );

        Ok(Scorecard { resume, score })
    }
}

fn to_prompt_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Converts an untyped record, keeping the record text when it does not fit.
fn typed<T>(
    record: Record,
    convert: impl FnOnce(Record) -> Result<T, serde_json::Error>,
) -> Result<T, ExtractionError> {
    let raw = Value::Object(record.clone()).to_string();
    convert(record).map_err(|e| ExtractionError::Parse {
        reason: e.to_string(),
        raw,
    })
}
