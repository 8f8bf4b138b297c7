//! Typed views over the records the model returns for resumes and scores.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm_client::structured::Record;
use crate::lenient;

/// Structured resume, as extracted by the `analyze_resume` prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeRecord {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub email: String,
    #[serde(deserialize_with = "lenient::string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub experience_years: Option<f64>,
    #[serde(deserialize_with = "lenient::string")]
    pub experience_level: String,
    #[serde(deserialize_with = "lenient::string")]
    pub summary: String,
}

impl ResumeRecord {
    pub fn from_record(record: Record) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(record))
    }
}

/// Hiring recommendation, always one of three labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recommendation {
    #[serde(rename = "Strong Match")]
    Strong,
    #[serde(rename = "Moderate Match")]
    Moderate,
    #[serde(rename = "Weak Match")]
    Weak,
}

impl Recommendation {
    /// Reads a model label. Labels naming zero or several levels are rejected.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        let found: Vec<Self> = [
            ("strong", Self::Strong),
            ("moderate", Self::Moderate),
            ("weak", Self::Weak),
        ]
        .into_iter()
        .filter(|(word, _)| label.contains(word))
        .map(|(_, level)| level)
        .collect();

        match found.as_slice() {
            [level] => Some(*level),
            _ => None,
        }
    }

    /// Derives a recommendation from a 1–10 overall score.
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            Self::Strong
        } else if score >= 5.0 {
            Self::Moderate
        } else {
            Self::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "Strong Match",
            Self::Moderate => "Moderate Match",
            Self::Weak => "Weak Match",
        }
    }
}

/// Which scoring prompt produced a record, and so which fields it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreShape {
    /// No company context: core dimensions only.
    Reduced,
    /// Company context present: core dimensions plus company fit.
    Extended,
}

/// Candidate-vs-JD score.
///
/// `company_fit` is `Some` exactly when the record was produced with company
/// context; it serializes inline, so the two shapes differ in their key sets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub overall_score: Option<f64>,
    pub skills_match: Option<f64>,
    pub experience_match: Option<f64>,
    pub culture_fit: Option<f64>,
    pub recommendation: Recommendation,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    pub interview_focus: Vec<String>,
    pub rationale: String,
    #[serde(flatten)]
    pub company_fit: Option<CompanyFitAssessment>,
}

/// Dimensions only scored when company context is available.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyFitAssessment {
    #[serde(deserialize_with = "lenient::number")]
    pub industry_fit: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub geographic_fit: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub growth_stage_fit: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub values_alignment: Option<f64>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub company_fit_highlights: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub potential_challenges: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub onboarding_considerations: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CoreScore {
    #[serde(deserialize_with = "lenient::number")]
    overall_score: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    skills_match: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    experience_match: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    culture_fit: Option<f64>,
    #[serde(deserialize_with = "lenient::string")]
    recommendation: String,
    #[serde(deserialize_with = "lenient::string_list")]
    strengths: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    concerns: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    interview_focus: Vec<String>,
    #[serde(deserialize_with = "lenient::string")]
    rationale: String,
}

impl ScoreRecord {
    /// Builds the typed score for `shape`. Fields outside the shape are dropped.
    pub fn from_record(record: Record, shape: ScoreShape) -> Result<Self, serde_json::Error> {
        let value = Value::Object(record);
        let core: CoreScore = serde_json::from_value(value.clone())?;
        let company_fit = match shape {
            ScoreShape::Reduced => None,
            ScoreShape::Extended => Some(serde_json::from_value(value)?),
        };

        let recommendation = Recommendation::parse(&core.recommendation).unwrap_or_else(|| {
            core.overall_score
                .map(Recommendation::from_score)
                .unwrap_or(Recommendation::Weak)
        });

        Ok(ScoreRecord {
            overall_score: core.overall_score,
            skills_match: core.skills_match,
            experience_match: core.experience_match,
            culture_fit: core.culture_fit,
            recommendation,
            strengths: core.strengths,
            concerns: core.concerns,
            interview_focus: core.interview_focus,
            rationale: core.rationale,
            company_fit,
        })
    }

    pub fn shape(&self) -> ScoreShape {
        if self.company_fit.is_some() {
            ScoreShape::Extended
        } else {
            ScoreShape::Reduced
        }
    }
}
