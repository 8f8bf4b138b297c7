//! Prompt Library: named prompt templates loaded once from `prompts.json`.
//!
//! File shape: `{ "<name>": { "prompt": "<template>" }, ... }`.
//! Placeholders are `{name}` tokens; `{{` and `}}` render as literal braces so
//! templates can carry JSON schemas.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use thiserror::Error;

pub const ANALYZE_RESUME: &str = "analyze_resume";
pub const ANALYZE_COMPANY_PROFILE: &str = "analyze_company_profile";
pub const SCORE_CANDIDATE: &str = "score_candidate";
pub const SCORE_CANDIDATE_WITH_COMPANY_CONTEXT: &str = "score_candidate_with_company_context";

/// Templates every deployment must define.
pub const REQUIRED_PROMPTS: [&str; 4] = [
    ANALYZE_RESUME,
    ANALYZE_COMPANY_PROFILE,
    SCORE_CANDIDATE,
    SCORE_CANDIDATE_WITH_COMPANY_CONTEXT,
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Unknown prompt template '{0}'")]
    UnknownPrompt(String),

    #[error("Prompt '{prompt}' references '{{{placeholder}}}' but no value was supplied")]
    MissingArgument { prompt: String, placeholder: String },

    #[error("Prompt '{prompt}' is malformed at byte {position}: {reason}")]
    Malformed {
        prompt: String,
        position: usize,
        reason: &'static str,
    },
}

#[derive(Debug, Deserialize)]
struct PromptEntry {
    prompt: String,
}

/// Immutable table of prompt templates, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct PromptLibrary {
    templates: HashMap<String, String>,
}

impl PromptLibrary {
    /// Loads the prompt file and checks that every required template is present.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt file {}", path.display()))?;
        let library = Self::from_json(&raw)
            .with_context(|| format!("Invalid prompt file {}", path.display()))?;

        let missing: Vec<&str> = REQUIRED_PROMPTS
            .iter()
            .copied()
            .filter(|name| !library.contains(name))
            .collect();
        if !missing.is_empty() {
            bail!("Prompt file is missing templates: {}", missing.join(", "));
        }

        Ok(library)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: HashMap<String, PromptEntry> = serde_json::from_str(raw)?;
        Ok(Self {
            templates: entries
                .into_iter()
                .map(|(name, entry)| (name, entry.prompt))
                .collect(),
        })
    }

    pub fn from_templates<I, K, V>(templates: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            templates: templates
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Renders template `name`, substituting every `{placeholder}` from `args`.
    pub fn render(&self, name: &str, args: &HashMap<&str, String>) -> Result<String, TemplateError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| TemplateError::UnknownPrompt(name.to_string()))?;
        substitute(name, template, args)
    }
}

fn substitute(
    prompt: &str,
    template: &str,
    args: &HashMap<&str, String>,
) -> Result<String, TemplateError> {
    let malformed = |position, reason| TemplateError::Malformed {
        prompt: prompt.to_string(),
        position,
        reason,
    };

    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let start = pos + 1;
                let end = loop {
                    match chars.next() {
                        Some((i, '}')) => break i,
                        Some((_, '{')) | None => {
                            return Err(malformed(pos, "unclosed placeholder"))
                        }
                        Some(_) => {}
                    }
                };
                let key = template[start..end].trim();
                if key.is_empty() {
                    return Err(malformed(pos, "empty placeholder"));
                }
                let value = args.get(key).ok_or_else(|| TemplateError::MissingArgument {
                    prompt: prompt.to_string(),
                    placeholder: key.to_string(),
                })?;
                out.push_str(value);
            }
            '}' => return Err(malformed(pos, "unmatched '}'")),
            _ => out.push(c),
        }
    }

    Ok(out)
}
