//! Gherkin tag handling
//!
//! A scenario is keyed into the fixture workbook by its `@CT-<digits>` tag.
//! Any other tag (except the reserved `@all` and `@Home`) is kept as a
//! secondary classification.

use crate::error::{Result, ScribeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used in evidence when a scenario carries no `@CT-` tag.
pub const UNDEFINED_TAG: &str = "CT-UNDEFINED";

const RESERVED_TAGS: [&str; 2] = ["all", "Home"];

/// Tag that clears the token and user registries before a scenario runs.
pub const RESET_STATE_TAG: &str = "LimparEstadoAntes";

/// A validated `CT-<digits>` scenario tag, stored without the leading `@`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScenarioTag(String);

impl ScenarioTag {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim().trim_start_matches('@');
        let digits = trimmed
            .strip_prefix("CT-")
            .ok_or_else(|| ScribeError::InvalidTag {
                tag: raw.to_string(),
            })?;

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ScribeError::InvalidTag {
                tag: raw.to_string(),
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Full tag, e.g. `CT-1001`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric part, e.g. `1001`.
    pub fn number(&self) -> &str {
        &self.0[3..]
    }
}

impl fmt::Display for ScenarioTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tags of one scenario, split into the fixture key and the classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioTags {
    pub scenario: Option<ScenarioTag>,
    pub classification: Option<String>,
    pub all: Vec<String>,
}

impl ScenarioTags {
    /// Accepts tags with or without the leading `@`.
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Self::default();

        for tag in tags {
            let name = tag.as_ref().trim().trim_start_matches('@');
            if name.is_empty() {
                continue;
            }
            parsed.all.push(name.to_string());

            if name.starts_with("CT-") {
                if parsed.scenario.is_none() {
                    parsed.scenario = ScenarioTag::parse(name).ok();
                }
            } else if parsed.classification.is_none() && !RESERVED_TAGS.contains(&name) {
                parsed.classification = Some(name.to_string());
            }
        }

        parsed
    }

    pub fn has(&self, name: &str) -> bool {
        self.all.iter().any(|t| t == name)
    }

    /// Label for evidence documents and file names.
    pub fn label(&self) -> String {
        self.scenario
            .as_ref()
            .map(|t| t.as_str().to_string())
            .unwrap_or_else(|| UNDEFINED_TAG.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenario_tag() {
        let tag = ScenarioTag::parse("@CT-1001").unwrap();
        assert_eq!(tag.as_str(), "CT-1001");
        assert_eq!(tag.number(), "1001");

        assert!(ScenarioTag::parse("CT-").is_err());
        assert!(ScenarioTag::parse("CT-12a").is_err());
        assert!(ScenarioTag::parse("@smoke").is_err());
    }

    #[test]
    fn test_classification_skips_reserved_tags() {
        let tags = ScenarioTags::from_tags(["@all", "@Home", "@CT-7", "@Login", "@api"]);
        assert_eq!(tags.scenario.unwrap().as_str(), "CT-7");
        assert_eq!(tags.classification.as_deref(), Some("Login"));
    }

    #[test]
    fn test_label_without_scenario_tag() {
        let tags = ScenarioTags::from_tags(["smoke"]);
        assert!(tags.scenario.is_none());
        assert_eq!(tags.label(), UNDEFINED_TAG);
        assert!(tags.has("smoke"));
    }
}
