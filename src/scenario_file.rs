//! Import and export of saved analyses.
//!
//! The envelope is owned by this layer, not the engine: sections are
//! optional on import and fall back to defaults, and the engine validates
//! the embedded settings itself before simulating.

use std::fs;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::{BuyProfile, GlobalSettings, RentSettings};

pub const FORMAT_TAG: &str = "rent-vs-buy-analysis-v2";

#[derive(Debug, Error)]
pub enum ScenarioFileError {
    #[error("failed to access scenario file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scenario has no profile with id {0:?}")]
    UnknownProfile(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioEnvelope {
    #[serde(rename = "_format", default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_settings: Option<GlobalSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent_settings: Option<RentSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Vec<BuyProfile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
}

/// Envelope contents with defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub global: GlobalSettings,
    pub rent: RentSettings,
    pub profiles: Vec<BuyProfile>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            global: GlobalSettings::default(),
            rent: RentSettings::default(),
            profiles: vec![BuyProfile::default()],
        }
    }
}

impl Scenario {
    /// The profile with `id`, or the first profile when `id` is `None`.
    pub fn profile(&self, id: Option<&str>) -> Result<&BuyProfile, ScenarioFileError> {
        match id {
            Some(id) => self
                .profiles
                .iter()
                .find(|p| p.id == id)
                .ok_or_else(|| ScenarioFileError::UnknownProfile(id.to_string())),
            None => self
                .profiles
                .first()
                .ok_or_else(|| ScenarioFileError::UnknownProfile(String::new())),
        }
    }

    pub fn to_envelope(&self) -> ScenarioEnvelope {
        ScenarioEnvelope {
            format: Some(FORMAT_TAG.to_string()),
            global_settings: Some(self.global.clone()),
            rent_settings: Some(self.rent.clone()),
            profiles: Some(self.profiles.clone()),
            exported_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

impl From<ScenarioEnvelope> for Scenario {
    fn from(envelope: ScenarioEnvelope) -> Self {
        let defaults = Scenario::default();
        Self {
            global: envelope.global_settings.unwrap_or(defaults.global),
            rent: envelope.rent_settings.unwrap_or(defaults.rent),
            profiles: envelope.profiles.unwrap_or(defaults.profiles),
        }
    }
}

pub fn parse_scenario(json: &str) -> Result<Scenario, ScenarioFileError> {
    let envelope: ScenarioEnvelope = serde_json::from_str(json)?;
    match envelope.format.as_deref() {
        Some(FORMAT_TAG) | None => {}
        Some(other) => warn!(format = other, "unrecognised scenario format tag; importing anyway"),
    }
    Ok(envelope.into())
}

pub fn load_scenario(path: &Path) -> Result<Scenario, ScenarioFileError> {
    let raw = fs::read_to_string(path)?;
    let scenario = parse_scenario(&raw)?;
    info!(
        path = %path.display(),
        profiles = scenario.profiles.len(),
        "loaded scenario"
    );
    Ok(scenario)
}

/// Loads `path` when given, otherwise the built-in defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<Scenario, ScenarioFileError> {
    path.map_or_else(|| Ok(Scenario::default()), load_scenario)
}

pub fn save_scenario(path: &Path, scenario: &Scenario) -> Result<(), ScenarioFileError> {
    let json = serde_json::to_string_pretty(&scenario.to_envelope())?;
    fs::write(path, json)?;
    info!(path = %path.display(), "exported scenario");
    Ok(())
}
