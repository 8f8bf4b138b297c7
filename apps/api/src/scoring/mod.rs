// Candidate scoring: resume structuring and JD fit scoring.
// All model calls go through llm_client::structured; no direct API calls here.

pub mod records;
pub mod scorer;

pub use records::{CompanyFitAssessment, Recommendation, ResumeRecord, ScoreRecord, ScoreShape};
pub use scorer::{CandidateScorer, Scorecard};
