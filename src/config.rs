/// Application-level constants
pub const APP_NAME: &str = "HealthMate";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Hosted Gemini REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Multimodal model used for report analysis.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Network timeout for one analysis round trip (2 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variables consulted by `AnalysisConfig::from_env()`.
pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_API_KEY_FALLBACK: &str = "GEMINI_API_KEY";
pub const ENV_API_BASE: &str = "HEALTHMATE_API_BASE";
pub const ENV_MODEL: &str = "HEALTHMATE_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "HEALTHMATE_TIMEOUT_SECS";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "healthmate_lib=info"
}

/// Settings for the report analysis client.
///
/// A missing credential is reported by `analyze`, not at startup; vitals
/// tracking works without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AnalysisConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();
        config.api_key = get(ENV_API_KEY).or_else(|| get(ENV_API_KEY_FALLBACK));
        if let Some(base) = get(ENV_API_BASE) {
            config.base_url = base;
        }
        if let Some(model) = get(ENV_MODEL) {
            config.model = model;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout_secs = secs,
                _ => tracing::warn!(
                    value = %raw,
                    default = DEFAULT_TIMEOUT_SECS,
                    "Ignoring invalid HEALTHMATE_TIMEOUT_SECS"
                ),
            }
        }
        config
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Zero is ignored; the current timeout is kept.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        if timeout_secs == 0 {
            tracing::warn!(kept = self.timeout_secs, "Ignoring zero analysis timeout");
        } else {
            self.timeout_secs = timeout_secs;
        }
        self
    }

    /// The credential, if one is configured and non-blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}
