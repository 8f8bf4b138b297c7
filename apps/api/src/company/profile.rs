//! CompanyProfile: the structured company description used as scoring context.
//!
//! Every field defaults when missing so a partially filled model response or
//! a hand-edited file still loads.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::lenient;

/// Longest mission statement shown in request summaries.
const SUMMARY_MISSION_CHARS: usize = 200;
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    #[serde(deserialize_with = "lenient::section")]
    pub business_intelligence: BusinessIntelligence,
    #[serde(deserialize_with = "lenient::section")]
    pub company_focus: CompanyFocus,
    #[serde(deserialize_with = "lenient::section")]
    pub geographic_presence: GeographicPresence,
    #[serde(deserialize_with = "lenient::section")]
    pub company_culture: CompanyCulture,
    #[serde(deserialize_with = "lenient::section")]
    pub work_preferences: WorkPreferences,
    #[serde(deserialize_with = "lenient::section")]
    pub growth_stage: GrowthStage,
    #[serde(deserialize_with = "lenient::section")]
    pub technical_culture: TechnicalCulture,
    #[serde(deserialize_with = "lenient::section")]
    pub market_position: MarketPosition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessIntelligence {
    #[serde(deserialize_with = "lenient::string")]
    pub industry_sector: String,
    #[serde(deserialize_with = "lenient::string")]
    pub business_model: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub products_services: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub target_markets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyFocus {
    #[serde(deserialize_with = "lenient::string")]
    pub core_mission: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub strategic_priorities: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeographicPresence {
    #[serde(deserialize_with = "lenient::string")]
    pub headquarters: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub offices: Vec<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub market_focus: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyCulture {
    #[serde(deserialize_with = "lenient::string")]
    pub work_environment: String,
    #[serde(deserialize_with = "lenient::string")]
    pub leadership_style: String,
    #[serde(deserialize_with = "lenient::string")]
    pub team_dynamics: String,
    #[serde(deserialize_with = "lenient::string")]
    pub communication_style: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkPreferences {
    #[serde(deserialize_with = "lenient::string")]
    pub remote_policy: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub collaboration_tools: Vec<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub work_life_balance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthStage {
    #[serde(deserialize_with = "lenient::string")]
    pub stage: String,
    #[serde(deserialize_with = "lenient::string")]
    pub funding_status: String,
    #[serde(deserialize_with = "lenient::string")]
    pub expansion_plans: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalCulture {
    #[serde(deserialize_with = "lenient::string_list")]
    pub technologies_used: Vec<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub innovation_focus: String,
    #[serde(deserialize_with = "lenient::string")]
    pub technical_approach: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketPosition {
    #[serde(deserialize_with = "lenient::string_list")]
    pub competitors: Vec<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub market_share: String,
    #[serde(deserialize_with = "lenient::string")]
    pub reputation: String,
}

/// Short company description returned alongside each analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanySummary {
    pub industry: String,
    pub stage: String,
    pub culture: String,
    pub mission: String,
}

impl CompanyProfile {
    /// Reads a persisted profile. A missing file is `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read company profile {}", path.display()))?;
        let profile = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid company profile {}", path.display()))?;
        Ok(Some(profile))
    }

    /// Startup variant of `load`: any failure degrades to "no profile".
    pub fn load_or_none(path: &Path) -> Option<Self> {
        match Self::load(path) {
            Ok(Some(profile)) => {
                info!("Loaded company profile from {} for enhanced analysis", path.display());
                Some(profile)
            }
            Ok(None) => {
                info!("No company profile found at {} - using basic scoring", path.display());
                None
            }
            Err(e) => {
                warn!("Error loading company profile: {e:#} - using basic scoring");
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write company profile {}", path.display()))
    }

    pub fn summary(&self) -> CompanySummary {
        let mission = self.company_focus.core_mission.trim();
        let mission = if mission.chars().count() > SUMMARY_MISSION_CHARS {
            let clipped: String = mission.chars().take(SUMMARY_MISSION_CHARS).collect();
            format!("{clipped}...")
        } else {
            or_not_available(mission)
        };

        CompanySummary {
            industry: or_not_available(&self.business_intelligence.industry_sector),
            stage: or_not_available(&self.growth_stage.stage),
            culture: or_not_available(&self.company_culture.work_environment),
            mission,
        }
    }
}

fn or_not_available(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        value.to_string()
    }
}
