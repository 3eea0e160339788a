use crate::app_config::{AppConfig, Environment, ExtractionMode};
use crate::ConfigError;

/// Desktop Chrome user agent sent with every marketplace request.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// local configuration backed by `./revlens.db`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>().map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = or_default("DATABASE_URL", "sqlite://revlens.db");
    let env = parse_environment(&or_default("REVLENS_ENV", "development"))?;
    let log_level = or_default("REVLENS_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("REVLENS_DB_MAX_CONNECTIONS", "5")?;
    if db_max_connections == 0 {
        return Err(invalid(
            "REVLENS_DB_MAX_CONNECTIONS",
            "must be at least 1".to_string(),
        ));
    }
    let db_acquire_timeout_secs = parse_u64("REVLENS_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let marketplace_base_url = or_default("REVLENS_MARKETPLACE_BASE_URL", "https://www.amazon.in")
        .trim_end_matches('/')
        .to_string();
    if !marketplace_base_url.starts_with("http://") && !marketplace_base_url.starts_with("https://")
    {
        return Err(invalid(
            "REVLENS_MARKETPLACE_BASE_URL",
            format!("\"{marketplace_base_url}\" is not an http(s) URL"),
        ));
    }

    let scraper_request_timeout_secs = parse_u64("REVLENS_SCRAPER_REQUEST_TIMEOUT_SECS", "15")?;
    let scraper_user_agent = or_default("REVLENS_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_initial_delay_ms = parse_u64("REVLENS_SCRAPER_INITIAL_DELAY_MS", "1000")?;
    let scraper_page_delay_min_ms = parse_u64("REVLENS_SCRAPER_PAGE_DELAY_MIN_MS", "2000")?;
    let scraper_page_delay_max_ms = parse_u64("REVLENS_SCRAPER_PAGE_DELAY_MAX_MS", "5000")?;
    if scraper_page_delay_min_ms > scraper_page_delay_max_ms {
        return Err(invalid(
            "REVLENS_SCRAPER_PAGE_DELAY_MIN_MS",
            format!(
                "{scraper_page_delay_min_ms} exceeds the maximum {scraper_page_delay_max_ms}"
            ),
        ));
    }
    let scraper_max_retries = parse_u32("REVLENS_SCRAPER_MAX_RETRIES", "1")?;
    let scraper_retry_backoff_base_secs =
        parse_u64("REVLENS_SCRAPER_RETRY_BACKOFF_BASE_SECS", "1")?;
    let scraper_max_pages = parse_usize("REVLENS_SCRAPER_MAX_PAGES", "50")?;
    let scrape_limit = parse_usize("REVLENS_SCRAPE_LIMIT", "10")?;

    let extraction_mode = or_default("REVLENS_EXTRACTION_MODE", "lenient")
        .parse::<ExtractionMode>()
        .map_err(|reason| invalid("REVLENS_EXTRACTION_MODE", reason))?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_acquire_timeout_secs,
        marketplace_base_url,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_initial_delay_ms,
        scraper_page_delay_min_ms,
        scraper_page_delay_max_ms,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        scraper_max_pages,
        scrape_limit,
        extraction_mode,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REVLENS_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
