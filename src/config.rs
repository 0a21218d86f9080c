use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::db::session_store::DEFAULT_SESSION_TTL_SECS;
use crate::services::assistant_service::DEFAULT_OPENAI_BASE_URL;
use crate::services::itinerary_service::DEFAULT_MAX_PLACES;
use crate::services::places_service::{DEFAULT_PAGE_DELAY, DEFAULT_PLACES_ENDPOINT};
use crate::services::polling::PollPolicy;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub itinerary_assistant_id: String,
    pub reflection_assistant_id: String,
    pub helper_assistant_id: String,
    pub places_api_key: String,
    pub places_endpoint: String,
    pub places_page_delay: Duration,
    pub max_places: usize,
    /// OpenWeatherMap key, handed to the browser for client-side forecasts.
    pub owm_key: String,
    pub assistant_poll: PollPolicy,
    pub session_ttl: chrono::Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let poll_interval = Duration::from_millis(parse_or(
            &optional,
            "ASSISTANT_POLL_INTERVAL_MS",
            PollPolicy::default().initial_interval.as_millis() as u64,
        )?);
        let assistant_poll = PollPolicy {
            initial_interval: poll_interval,
            multiplier: parse_or(&optional, "ASSISTANT_POLL_BACKOFF", 1.0)?,
            max_interval: Duration::from_millis(parse_or(
                &optional,
                "ASSISTANT_POLL_MAX_INTERVAL_MS",
                poll_interval.as_millis() as u64,
            )?),
            timeout: Duration::from_secs(parse_or(
                &optional,
                "ASSISTANT_TIMEOUT_SECS",
                PollPolicy::default().timeout.as_secs(),
            )?),
        };

        Ok(Self {
            host: optional("HOST").unwrap_or_else(|| HOST.to_string()),
            port: parse_or(&optional, "PORT", PORT)?,
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_base_url: optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            itinerary_assistant_id: required("OPENAI_ASSISTANT_ID")?,
            reflection_assistant_id: required("REFLECTION_ASSISTANT_ID")?,
            helper_assistant_id: required("HELPER_ASSISTANT_ID")?,
            places_api_key: required("PLACES_API_KEY")?,
            places_endpoint: optional("PLACES_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_PLACES_ENDPOINT.to_string()),
            places_page_delay: Duration::from_millis(parse_or(
                &optional,
                "PLACES_PAGE_DELAY_MS",
                DEFAULT_PAGE_DELAY.as_millis() as u64,
            )?),
            max_places: parse_or(&optional, "MAX_PLACES", DEFAULT_MAX_PLACES)?,
            owm_key: optional("OWM_KEY").unwrap_or_default(),
            assistant_poll,
            session_ttl: session_ttl(&optional)?,
        })
    }
}

fn session_ttl<F>(optional: &F) -> Result<chrono::Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    const NAME: &str = "SESSION_TTL_SECS";
    let secs: i64 = parse_or(optional, NAME, DEFAULT_SESSION_TTL_SECS)?;
    if secs < 0 {
        return Err(ConfigError::Invalid {
            name: NAME,
            value: secs.to_string(),
        });
    }
    chrono::Duration::try_seconds(secs).ok_or(ConfigError::Invalid {
        name: NAME,
        value: secs.to_string(),
    })
}

fn parse_or<T, F>(optional: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match optional(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        let mut vars: HashMap<String, String> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_ASSISTANT_ID", "asst_plan"),
            ("REFLECTION_ASSISTANT_ID", "asst_reflect"),
            ("HELPER_ASSISTANT_ID", "asst_help"),
            ("PLACES_API_KEY", "places-key"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in pairs {
            vars.insert(k.to_string(), v.to_string());
        }
        vars
    }

    fn load(vars: &HashMap<String, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&vars(&[])).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_places, 20);
        assert_eq!(config.places_page_delay, Duration::from_secs(2));
        assert_eq!(config.assistant_poll, PollPolicy::default());
        assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
        assert_eq!(config.session_ttl, chrono::Duration::days(14));
        assert!(config.owm_key.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = load(&vars(&[
            ("PORT", "9000"),
            ("MAX_PLACES", "5"),
            ("ASSISTANT_POLL_INTERVAL_MS", "250"),
            ("ASSISTANT_POLL_BACKOFF", "2.0"),
            ("ASSISTANT_TIMEOUT_SECS", "10"),
            ("OWM_KEY", "owm-123"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.max_places, 5);
        assert_eq!(config.assistant_poll.initial_interval, Duration::from_millis(250));
        assert_eq!(config.assistant_poll.max_interval, Duration::from_millis(250));
        assert_eq!(config.assistant_poll.multiplier, 2.0);
        assert_eq!(config.assistant_poll.timeout, Duration::from_secs(10));
        assert_eq!(config.owm_key, "owm-123");
    }

    #[test]
    fn test_missing_required_key() {
        let mut vars = vars(&[]);
        vars.remove("PLACES_API_KEY");
        assert_eq!(load(&vars).unwrap_err(), ConfigError::Missing("PLACES_API_KEY"));

        vars.insert("PLACES_API_KEY".to_string(), "   ".to_string());
        assert_eq!(load(&vars).unwrap_err(), ConfigError::Missing("PLACES_API_KEY"));
    }

    #[test]
    fn test_session_ttl_out_of_range() {
        let huge = i64::MAX.to_string();
        assert_eq!(
            load(&vars(&[("SESSION_TTL_SECS", huge.as_str())])).unwrap_err(),
            ConfigError::Invalid {
                name: "SESSION_TTL_SECS",
                value: huge.clone()
            }
        );
        assert!(matches!(
            load(&vars(&[("SESSION_TTL_SECS", "-60")])).unwrap_err(),
            ConfigError::Invalid { name: "SESSION_TTL_SECS", .. }
        ));
    }

    #[test]
    fn test_huge_assistant_timeout_loads() {
        let huge = u64::MAX.to_string();
        let config = load(&vars(&[("ASSISTANT_TIMEOUT_SECS", huge.as_str())])).unwrap();
        assert_eq!(config.assistant_poll.timeout, Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_invalid_number() {
        let err = load(&vars(&[("PORT", "eighty")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "PORT",
                value: "eighty".to_string()
            }
        );
    }
}
