use secrecy::SecretString;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

/// Gemini REST endpoint used unless `GENAI_API_BASE` overrides it.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Models tried in order; the first one the provider reports as available wins.
pub const DEFAULT_MODEL_CANDIDATES: &[&str] =
    &["gemini-1.5-flash", "gemini-1.5-pro", "gemini-pro-vision"];

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default upload cap (10 MiB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Immutable process configuration, built once at startup and shared through
/// [`crate::startup::AppState`].
#[derive(Debug)]
pub struct SummaryConfig {
    pub common: core_config::Config,
    pub google: GoogleConfig,
    pub auth: AuthConfig,
    pub models: ModelConfig,
    pub limits: LimitsConfig,
    pub cors: CorsConfig,
}

#[derive(Debug)]
pub struct GoogleConfig {
    pub api_key: SecretString,
    pub api_base: String,
}

#[derive(Debug)]
pub struct AuthConfig {
    /// Shared bearer secret expected on upload requests.
    pub secret_token: SecretString,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub candidates: Vec<String>,
    /// Upper bound for a single provider call.
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// `["*"]` allows any origin.
    pub allowed_origins: Vec<String>,
}

impl SummaryConfig {
    /// Configuration with the two required secrets and defaults everywhere else.
    pub fn with_secrets(api_key: impl Into<String>, secret_token: impl Into<String>) -> Self {
        Self {
            common: core_config::Config::default(),
            google: GoogleConfig {
                api_key: SecretString::new(api_key.into()),
                api_base: DEFAULT_API_BASE.to_string(),
            },
            auth: AuthConfig {
                secret_token: SecretString::new(secret_token.into()),
            },
            models: ModelConfig {
                candidates: DEFAULT_MODEL_CANDIDATES
                    .iter()
                    .map(|m| m.to_string())
                    .collect(),
                request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            },
            limits: LimitsConfig {
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            cors: CorsConfig {
                allowed_origins: vec!["*".to_string()],
            },
        }
    }

    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let api_key = require_non_empty("GOOGLE_API_KEY", get_env("GOOGLE_API_KEY", None, is_prod)?)?;
        let secret_token =
            require_non_empty("SECRET_TOKEN", get_env("SECRET_TOKEN", None, is_prod)?)?;

        let mut config = Self::with_secrets(api_key, secret_token);
        config.common = common_config;

        config.google.api_base = get_env("GENAI_API_BASE", Some(DEFAULT_API_BASE), is_prod)?
            .trim_end_matches('/')
            .to_string();

        let candidates = parse_list(&get_env(
            "GENAI_MODEL_CANDIDATES",
            Some(&DEFAULT_MODEL_CANDIDATES.join(",")),
            is_prod,
        )?);
        if candidates.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GENAI_MODEL_CANDIDATES must name at least one model"
            )));
        }
        config.models.candidates = candidates;

        config.models.request_timeout = Duration::from_secs(parse_number(
            "GENAI_TIMEOUT_SECS",
            &get_env(
                "GENAI_TIMEOUT_SECS",
                Some(&DEFAULT_TIMEOUT_SECS.to_string()),
                is_prod,
            )?,
        )?);

        config.limits.max_upload_bytes = parse_number(
            "MAX_UPLOAD_BYTES",
            &get_env(
                "MAX_UPLOAD_BYTES",
                Some(&DEFAULT_MAX_UPLOAD_BYTES.to_string()),
                is_prod,
            )?,
        )?;

        let origins = parse_list(&get_env("CORS_ALLOWED_ORIGINS", Some("*"), is_prod)?);
        if !origins.is_empty() {
            config.cors.allowed_origins = origins;
        }

        Ok(config)
    }
}

/// Split a comma-separated setting, dropping blanks.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, AppError> {
    raw.trim().parse().map_err(|_| {
        AppError::ConfigError(anyhow::anyhow!("{} must be a number, got '{}'", key, raw))
    })
}

fn require_non_empty(key: &str, value: String) -> Result<String, AppError> {
    if value.trim().is_empty() {
        Err(AppError::ConfigError(anyhow::anyhow!(
            "{} is set but empty",
            key
        )))
    } else {
        Ok(value)
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn with_secrets_uses_defaults() {
        let config = SummaryConfig::with_secrets("key", "token");
        assert_eq!(config.common.port, 5000);
        assert_eq!(config.google.api_key.expose_secret(), "key");
        assert_eq!(config.auth.secret_token.expose_secret(), "token");
        assert_eq!(config.models.candidates[0], "gemini-1.5-flash");
        assert_eq!(config.models.request_timeout, Duration::from_secs(60));
        assert_eq!(config.cors.allowed_origins, vec!["*"]);
    }

    #[test]
    fn parse_list_trims_and_drops_blanks() {
        assert_eq!(
            parse_list(" gemini-1.5-flash, ,gemini-pro-vision ,"),
            vec!["gemini-1.5-flash", "gemini-pro-vision"]
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn parse_number_rejects_garbage() {
        assert_eq!(parse_number::<u64>("X", " 30 ").unwrap(), 30);
        assert!(parse_number::<u64>("X", "thirty").is_err());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = SummaryConfig::with_secrets("super-secret-key", "super-secret-token");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret-key"));
        assert!(!rendered.contains("super-secret-token"));
    }

    #[test]
    fn missing_required_value_is_config_error() {
        let err = get_env("SUMMARY_SERVICE_TEST_UNSET_VARIABLE", None, false).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(require_non_empty("K", "  ".to_string()).is_err());
    }
}
