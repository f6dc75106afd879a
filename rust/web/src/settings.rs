use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for the optional external dealer advisor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdvisorSettings {
    /// API key for the advisory service. `None` disables remote advice
    /// entirely; the deterministic house rule is used instead.
    pub api_key: Option<String>,
    /// Model name sent to the advisory service
    pub model: String,
    /// Hard upper bound on one advisory call
    pub timeout_ms: u64,
    /// Mandatory-hit floor: dealer scores below this always hit without
    /// consulting the advisor. `None` lets the advisor decide at any score.
    pub hit_floor: Option<u32>,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-pro".to_string(),
            timeout_ms: 3_000,
            hit_floor: Some(17),
        }
    }
}

/// Application settings, loaded from the environment at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppSettings {
    /// Bankroll a fresh session starts with
    pub starting_bankroll: i64,
    /// Bet used when an action request omits one
    pub default_bet: u32,
    /// Session inactivity timeout in minutes
    pub session_ttl_minutes: u64,
    pub advisor: AdvisorSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            starting_bankroll: 1_000,
            default_bet: 10,
            session_ttl_minutes: 30,
            advisor: AdvisorSettings::default(),
        }
    }
}

impl AppSettings {
    /// Load settings from process environment variables. Unset variables keep
    /// their defaults; `GEMINI_API_KEY` enables the remote advisor.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`AppSettings::from_env`] against an arbitrary lookup, so
    /// tests do not have to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(raw) = lookup("TWENTYONE_STARTING_BANKROLL") {
            settings.starting_bankroll = parse(&raw, "TWENTYONE_STARTING_BANKROLL")?;
        }
        if let Some(raw) = lookup("TWENTYONE_DEFAULT_BET") {
            settings.default_bet = parse(&raw, "TWENTYONE_DEFAULT_BET")?;
        }
        if let Some(raw) = lookup("TWENTYONE_SESSION_TTL_MINUTES") {
            settings.session_ttl_minutes = parse(&raw, "TWENTYONE_SESSION_TTL_MINUTES")?;
        }
        settings.advisor.api_key = lookup("GEMINI_API_KEY").filter(|key| !key.is_empty());
        if let Some(model) = lookup("TWENTYONE_ADVISOR_MODEL") {
            settings.advisor.model = model;
        }
        if let Some(raw) = lookup("TWENTYONE_ADVISOR_TIMEOUT_MS") {
            settings.advisor.timeout_ms = parse(&raw, "TWENTYONE_ADVISOR_TIMEOUT_MS")?;
        }
        if let Some(raw) = lookup("TWENTYONE_ADVISOR_FLOOR") {
            settings.advisor.hit_floor = match raw.as_str() {
                "off" | "none" => None,
                _ => Some(parse(&raw, "TWENTYONE_ADVISOR_FLOOR")?),
            };
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.starting_bankroll <= 0 {
            return Err(SettingsError::InvalidValue(
                "starting_bankroll must be positive".to_string(),
            ));
        }
        if self.default_bet == 0 {
            return Err(SettingsError::InvalidValue(
                "default_bet must be greater than 0".to_string(),
            ));
        }
        if self.session_ttl_minutes == 0 {
            return Err(SettingsError::InvalidValue(
                "session_ttl_minutes must be greater than 0".to_string(),
            ));
        }
        if self.advisor.timeout_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "advisor.timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.advisor.model.is_empty() {
            return Err(SettingsError::InvalidValue(
                "advisor.model cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(raw: &str, name: &str) -> Result<T, SettingsError> {
    raw.parse()
        .map_err(|_| SettingsError::InvalidValue(format!("{name} could not parse `{raw}`")))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid setting: {0}")]
    InvalidValue(String),
}
