use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub(crate) const DEFAULT_PLACES_BASE_URL: &str = "https://places.googleapis.com";
pub(crate) const DEFAULT_MAPS_BASE_URL: &str = "https://maps.googleapis.com";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can feed a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let places_api_key = require("GOOGLE_PLACES_API_KEY")?;
    let env = parse_environment(&or_default("VENUESCOUT_ENV", "development"));
    let log_level = or_default("VENUESCOUT_LOG_LEVEL", "info");
    let places_base_url = or_default("VENUESCOUT_PLACES_BASE_URL", DEFAULT_PLACES_BASE_URL);
    let maps_base_url = or_default("VENUESCOUT_MAPS_BASE_URL", DEFAULT_MAPS_BASE_URL);
    let user_agent = or_default("VENUESCOUT_USER_AGENT", "venuescout/0.1 (venue-discovery)");
    let language_code = primary_language(&or_default("VENUESCOUT_LANGUAGE", "en"));

    let search_radius_m = parse_u32("VENUESCOUT_SEARCH_RADIUS_M", "5000")?;
    let max_concurrency = parse_usize("VENUESCOUT_MAX_CONCURRENCY", "4")?;
    if max_concurrency == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "VENUESCOUT_MAX_CONCURRENCY".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let min_interval_ms = parse_u64("VENUESCOUT_MIN_INTERVAL_MS", "120")?;
    let request_timeout_ms = parse_u64("VENUESCOUT_TIMEOUT_MS", "12000")?;
    let max_attempts = parse_u32("VENUESCOUT_MAX_ATTEMPTS", "3")?.max(1);
    let backoff_base_ms = parse_u64("VENUESCOUT_BACKOFF_BASE_MS", "400")?;
    let page_size = parse_usize("VENUESCOUT_PAGE_SIZE", "20")?.max(1);
    let freshness_secs = parse_u64("VENUESCOUT_FRESHNESS_SECS", "30")?;

    Ok(AppConfig {
        env,
        log_level,
        places_api_key,
        places_base_url,
        maps_base_url,
        user_agent,
        language_code,
        search_radius_m,
        max_concurrency,
        min_interval_ms,
        request_timeout_ms,
        max_attempts,
        backoff_base_ms,
        page_size,
        freshness_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

/// Reduce a locale tag such as `"pt-BR"` to its language subtag.
fn primary_language(locale: &str) -> String {
    let lang = locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    if lang.is_empty() {
        "en".to_string()
    } else {
        lang
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    /// Returns a map with all required env vars populated.
    fn full_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("GOOGLE_PLACES_API_KEY", "test-key");
        m
    }

    #[test]
    fn parse_environment_production() {
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("staging"), Environment::Development);
    }

    #[test]
    fn build_app_config_fails_without_api_key() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(
                result,
                Err(ConfigError::MissingEnvVar(ref v)) if v == "GOOGLE_PLACES_API_KEY"
            ),
            "expected MissingEnvVar(GOOGLE_PLACES_API_KEY), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_blank_api_key() {
        let mut map = full_env();
        map.insert("GOOGLE_PLACES_API_KEY", "   ");
        let result = build_app_config(lookup_from_map(&map));
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
    }

    #[test]
    fn build_app_config_applies_defaults() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.places_base_url, DEFAULT_PLACES_BASE_URL);
        assert_eq!(cfg.maps_base_url, DEFAULT_MAPS_BASE_URL);
        assert_eq!(cfg.language_code, "en");
        assert_eq!(cfg.search_radius_m, 5000);
        assert_eq!(cfg.max_concurrency, 4);
        assert_eq!(cfg.min_interval_ms, 120);
        assert_eq!(cfg.request_timeout_ms, 12_000);
        assert_eq!(cfg.max_attempts, 3);
        assert_eq!(cfg.backoff_base_ms, 400);
        assert_eq!(cfg.page_size, 20);
        assert_eq!(cfg.freshness_secs, 30);
    }

    #[test]
    fn build_app_config_reads_overrides() {
        let mut map = full_env();
        map.insert("VENUESCOUT_MAX_CONCURRENCY", "2");
        map.insert("VENUESCOUT_MIN_INTERVAL_MS", "0");
        map.insert("VENUESCOUT_LANGUAGE", "pt-BR");
        map.insert("VENUESCOUT_ENV", "production");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.max_concurrency, 2);
        assert_eq!(cfg.min_interval_ms, 0);
        assert_eq!(cfg.language_code, "pt");
        assert_eq!(cfg.env, Environment::Production);
        assert!(cfg.env.is_production());
    }

    #[test]
    fn build_app_config_rejects_zero_concurrency() {
        let mut map = full_env();
        map.insert("VENUESCOUT_MAX_CONCURRENCY", "0");
        let result = build_app_config(lookup_from_map(&map));
        let expected = "VENUESCOUT_MAX_CONCURRENCY";
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == expected),
            "expected InvalidEnvVar(VENUESCOUT_MAX_CONCURRENCY), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_non_numeric_timeout() {
        let mut map = full_env();
        map.insert("VENUESCOUT_TIMEOUT_MS", "soon");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(
                result,
                Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VENUESCOUT_TIMEOUT_MS"
            ),
            "expected InvalidEnvVar(VENUESCOUT_TIMEOUT_MS), got: {result:?}"
        );
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("test-key"));
        assert!(rendered.contains("[redacted]"));
    }

    #[test]
    fn primary_language_handles_underscores_and_blanks() {
        assert_eq!(primary_language("en_GB"), "en");
        assert_eq!(primary_language(""), "en");
        assert_eq!(primary_language("DE"), "de");
    }
}
