use std::path::PathBuf;

use crate::error::FetchError;
use crate::query::DEFAULT_BASE_URL;

const ENV_API_KEY: &str = "TMDB_API_KEY";
const ENV_BASE_URL: &str = "TMDB_BASE_URL";

/// Credentials for the TMDB API.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub base_url: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.masked_key())
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Where a credential field's value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Hard-coded default value.
    Default,
    /// Not set anywhere.
    Missing,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// Provenance of each credential field.
#[derive(Debug)]
pub struct CredentialSources {
    pub api_key: CredentialSource,
    pub base_url: CredentialSource,
}

/// TOML config file format.
#[derive(Debug, Default, serde::Deserialize)]
struct ConfigFile {
    tmdb: Option<TmdbConfig>,
}

#[derive(Debug, Default, Clone, serde::Deserialize)]
struct TmdbConfig {
    api_key: Option<String>,
    base_url: Option<String>,
}

impl Credentials {
    /// Load credentials from environment variables or the config file.
    ///
    /// Priority: env vars > config file > default base URL.
    /// The API key is required.
    pub fn load() -> Result<Self, FetchError> {
        Self::load_with_key(None)
    }

    /// Like [`load`](Self::load), but an explicit key (e.g. from a CLI
    /// flag) wins over every other source.
    pub fn load_with_key(api_key: Option<String>) -> Result<Self, FetchError> {
        Self::resolve(
            load_config_file(),
            override_key(api_key, |var| std::env::var(var).ok()),
        )
    }

    fn resolve(
        config: Option<TmdbConfig>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, FetchError> {
        let api_key = env(ENV_API_KEY)
            .or_else(|| config.as_ref().and_then(|c| c.api_key.clone()))
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                FetchError::config(format!(
                    "Missing api_key. Set {ENV_API_KEY} env var or add it to the config file"
                ))
            })?;

        let base_url = env(ENV_BASE_URL)
            .or_else(|| config.as_ref().and_then(|c| c.base_url.clone()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self { api_key, base_url })
    }

    /// API key with all but the last four characters hidden. Short keys
    /// are hidden entirely.
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        let keep = if chars.len() > 8 { 4 } else { 0 };
        let tail: String = chars[chars.len() - keep..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - keep), tail)
    }
}

fn override_key(
    api_key: Option<String>,
    env: impl Fn(&str) -> Option<String>,
) -> impl Fn(&str) -> Option<String> {
    move |var| match api_key {
        Some(ref key) if var == ENV_API_KEY => Some(key.clone()),
        _ => env(var),
    }
}

/// Return the path to the credentials config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("marquee").join("credentials.toml"))
}

/// Determine where each credential field is coming from.
pub fn credential_sources() -> CredentialSources {
    sources_for(load_config_file().as_ref(), |var| std::env::var(var).is_ok())
}

fn sources_for(config: Option<&TmdbConfig>, env_set: impl Fn(&str) -> bool) -> CredentialSources {
    let api_key = if env_set(ENV_API_KEY) {
        CredentialSource::EnvVar(ENV_API_KEY)
    } else if config.and_then(|c| c.api_key.as_ref()).is_some() {
        CredentialSource::ConfigFile
    } else {
        CredentialSource::Missing
    };

    let base_url = if env_set(ENV_BASE_URL) {
        CredentialSource::EnvVar(ENV_BASE_URL)
    } else if config.and_then(|c| c.base_url.as_ref()).is_some() {
        CredentialSource::ConfigFile
    } else {
        CredentialSource::Default
    };

    CredentialSources { api_key, base_url }
}

fn load_config_file() -> Option<TmdbConfig> {
    let path = config_path()?;
    let content = std::fs::read_to_string(&path).ok()?;
    parse_config(&content)
}

fn parse_config(content: &str) -> Option<TmdbConfig> {
    let config: ConfigFile = toml::from_str(content).ok()?;
    config.tmdb
}
