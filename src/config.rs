//! Process configuration.
//!
//! Settings come from an optional `triage.toml` (every field has a default).
//! The completion API key is a secret: it is read from the `GROQ_API_KEY`
//! environment variable, falling back to `secrets.toml`. A missing key is
//! fatal at startup.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Application-level constants
pub const APP_NAME: &str = "Triage Desk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the secret holding the completion API key.
pub const API_KEY_NAME: &str = "GROQ_API_KEY";

/// Default settings file, relative to the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "triage.toml";

/// Default secrets file, relative to the working directory.
pub const DEFAULT_SECRETS_FILE: &str = "secrets.toml";

const DEFAULT_BIND: &str = "127.0.0.1:8501";
const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama3-8b-8192";
/// Matches the stock OpenAI client's request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 600;
/// Idle sessions are dropped after 30 minutes.
const DEFAULT_SESSION_IDLE_SECS: u64 = 1800;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "triagedesk_lib=info,triagedesk=info,tower_http=warn"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API key not found: set GROQ_API_KEY in the environment or in {0}")]
    MissingApiKey(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("Invalid bind address '{0}'")]
    BindAddress(String),
}

// ═══════════════════════════════════════════════════════════
// Settings file
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SettingsFile {
    server: ServerSection,
    completion: CompletionSection,
    data: DataSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ServerSection {
    bind: String,
    session_idle_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            session_idle_secs: DEFAULT_SESSION_IDLE_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct CompletionSection {
    base_url: String,
    model: String,
    timeout_secs: u64,
}

impl Default for CompletionSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct DataSection {
    patients: PathBuf,
    doctors: PathBuf,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            patients: PathBuf::from("patients.csv"),
            doctors: PathBuf::from("doctors.csv"),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Resolved configuration
// ═══════════════════════════════════════════════════════════

/// Connection settings for the completion service.
#[derive(Clone)]
pub struct CompletionSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for CompletionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionSettings")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Fully resolved process configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub session_idle_secs: u64,
    pub completion: CompletionSettings,
    pub patients_path: PathBuf,
    pub doctors_path: PathBuf,
}

impl AppConfig {
    /// Load from the default files in the working directory.
    pub fn load() -> Result<Self, ConfigError> {
        let api_key = std::env::var(API_KEY_NAME).ok();
        Self::load_from(
            Path::new(DEFAULT_SETTINGS_FILE),
            Path::new(DEFAULT_SECRETS_FILE),
            api_key,
        )
    }

    /// Load from explicit paths. `env_api_key` takes precedence over the
    /// secrets file when it is non-blank.
    pub fn load_from(
        settings_path: &Path,
        secrets_path: &Path,
        env_api_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let settings: SettingsFile = read_optional_toml(settings_path)?.unwrap_or_default();

        let api_key = match env_api_key.map(|k| k.trim().to_string()) {
            Some(key) if !key.is_empty() => key,
            _ => read_secret(secrets_path)?
                .ok_or_else(|| ConfigError::MissingApiKey(secrets_path.display().to_string()))?,
        };

        let bind = settings
            .server
            .bind
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::BindAddress(settings.server.bind.clone()))?;

        Ok(Self {
            bind,
            session_idle_secs: settings.server.session_idle_secs,
            completion: CompletionSettings {
                base_url: settings.completion.base_url.trim_end_matches('/').to_string(),
                model: settings.completion.model,
                api_key,
                timeout_secs: settings.completion.timeout_secs,
            },
            patients_path: settings.data.patients,
            doctors_path: settings.data.doctors,
        })
    }
}

fn read_optional_toml<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<Option<T>, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    };
    toml::from_str(&text)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
}

/// Read the API key from a flat secrets file (`GROQ_API_KEY = "..."`).
fn read_secret(path: &Path) -> Result<Option<String>, ConfigError> {
    let table: Option<toml::Table> = read_optional_toml(path)?;
    Ok(table
        .and_then(|t| t.get(API_KEY_NAME).and_then(|v| v.as_str()).map(str::trim).map(String::from))
        .filter(|k| !k.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn defaults_apply_without_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let secrets = write(&dir, "secrets.toml", "GROQ_API_KEY = \"gsk-test\"\n");

        let config =
            AppConfig::load_from(&dir.path().join("missing.toml"), &secrets, None).unwrap();

        assert_eq!(config.completion.api_key, "gsk-test");
        assert_eq!(config.completion.model, "llama3-8b-8192");
        assert_eq!(config.completion.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.completion.timeout_secs, 600);
        assert_eq!(config.bind.port(), 8501);
        assert_eq!(config.patients_path, PathBuf::from("patients.csv"));
    }

    #[test]
    fn settings_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = write(
            &dir,
            "triage.toml",
            r#"
[server]
bind = "0.0.0.0:9000"

[completion]
base_url = "http://localhost:8080/v1/"
model = "llama-3.1-8b-instant"

[data]
doctors = "data/doctors.csv"
"#,
        );
        let secrets = write(&dir, "secrets.toml", "GROQ_API_KEY = \"k\"\n");

        let config = AppConfig::load_from(&settings, &secrets, None).unwrap();

        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.completion.base_url, "http://localhost:8080/v1");
        assert_eq!(config.completion.model, "llama-3.1-8b-instant");
        assert_eq!(config.doctors_path, PathBuf::from("data/doctors.csv"));
        assert_eq!(config.patients_path, PathBuf::from("patients.csv"));
    }

    #[test]
    fn environment_key_wins_over_secrets_file() {
        let dir = tempfile::tempdir().unwrap();
        let secrets = write(&dir, "secrets.toml", "GROQ_API_KEY = \"from-file\"\n");

        let config = AppConfig::load_from(
            &dir.path().join("none.toml"),
            &secrets,
            Some("from-env".into()),
        )
        .unwrap();

        assert_eq!(config.completion.api_key, "from-env");
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load_from(
            &dir.path().join("none.toml"),
            &dir.path().join("secrets.toml"),
            Some("   ".into()),
        );
        assert!(matches!(result, Err(ConfigError::MissingApiKey(_))));
    }

    #[test]
    fn blank_key_in_secrets_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let secrets = write(&dir, "secrets.toml", "GROQ_API_KEY = \"\"\n");
        let result = AppConfig::load_from(&dir.path().join("none.toml"), &secrets, None);
        assert!(matches!(result, Err(ConfigError::MissingApiKey(_))));
    }

    #[test]
    fn invalid_bind_address_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let settings = write(&dir, "triage.toml", "[server]\nbind = \"not-an-address\"\n");
        let secrets = write(&dir, "secrets.toml", "GROQ_API_KEY = \"k\"\n");
        let result = AppConfig::load_from(&settings, &secrets, None);
        assert!(matches!(result, Err(ConfigError::BindAddress(_))));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let settings = CompletionSettings {
            base_url: "http://x".into(),
            model: "m".into(),
            api_key: "super-secret".into(),
            timeout_secs: 1,
        };
        let printed = format!("{settings:?}");
        assert!(!printed.contains("super-secret"));
    }

    #[test]
    fn app_name_is_triage_desk() {
        assert_eq!(APP_NAME, "Triage Desk");
    }
}
