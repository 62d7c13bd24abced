use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Daily-game configuration (lokebot.toml + LOKEBOT_* env overrides).
///
/// The judgement window runs from `period_start` to `period_end` in the
/// configured timezone: statuses reset when it opens, verdicts fall when it
/// closes, and chatting inside it clears a user's flag for the day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineConfig {
    /// Hour (local wall clock) at which the judgement window opens.
    #[serde(default = "default_period_start")]
    pub period_start: u32,
    /// Hour (local wall clock) at which the window closes and verdicts fall.
    #[serde(default = "default_period_end")]
    pub period_end: u32,
    /// IANA timezone the window hours are expressed in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Optional cron override for the verdict job; when unset the job runs
    /// daily at `period_end`.
    #[serde(default)]
    pub judgement_cron: Option<String>,
    /// Schedule of the weekend kickoff announcement.
    #[serde(default = "default_weekend_cron")]
    pub weekend_cron: String,
}

impl Default for RoutineConfig {
    fn default() -> Self {
        Self {
            period_start: default_period_start(),
            period_end: default_period_end(),
            timezone: default_timezone(),
            judgement_cron: None,
            weekend_cron: default_weekend_cron(),
        }
    }
}

impl RoutineConfig {
    /// Load from a TOML file, with `LOKEBOT_*` environment overrides on top.
    pub fn load(path: &str) -> Result<Self> {
        let config = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("LOKEBOT_"))
            .extract()?;
        Ok(config)
    }
}

fn default_period_start() -> u32 {
    6
}

fn default_period_end() -> u32 {
    12
}

fn default_timezone() -> String {
    "Europe/Oslo".to_string()
}

fn default_weekend_cron() -> String {
    // Fridays at 16:00 local.
    "0 0 16 * * 5".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_standard_deployment() {
        let config = RoutineConfig::default();
        assert_eq!(config.period_start, 6);
        assert_eq!(config.period_end, 12);
        assert_eq!(config.timezone, "Europe/Oslo");
        assert!(config.judgement_cron.is_none());
        assert_eq!(config.weekend_cron, "0 0 16 * * 5");
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: RoutineConfig = Figment::new()
            .merge(Toml::string("period_start = 7\ntimezone = \"Europe/Berlin\""))
            .extract()
            .unwrap();
        assert_eq!(config.period_start, 7);
        assert_eq!(config.period_end, 12);
        assert_eq!(config.timezone, "Europe/Berlin");
    }

    #[test]
    fn judgement_cron_override_parses() {
        let config: RoutineConfig = Figment::new()
            .merge(Toml::string("judgement_cron = \"0 30 11 * * 1-5\""))
            .extract()
            .unwrap();
        assert_eq!(config.judgement_cron.as_deref(), Some("0 30 11 * * 1-5"));
    }
}
