use serde::Deserialize;
use thiserror::Error;

pub(crate) const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub(crate) const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";
pub(crate) const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("window.ENV is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("window.ENV could not be read")]
    Unavailable,
}

/// How view states map onto the browser location.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(try_from = "String")]
pub(crate) enum RoutingMode {
    #[default]
    Hash,
    Path,
}

impl TryFrom<String> for RoutingMode {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.trim().parse()
    }
}

/// Runtime configuration, injected by the host page as `window.ENV`.
///
/// Keys accept both `snake_case` and the camelCase names used by Firebase
/// web config snippets, so a pasted `firebaseConfig` object works as-is.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    #[serde(alias = "apiKey", alias = "API_KEY")]
    pub api_key: String,
    #[serde(alias = "projectId", alias = "PROJECT_ID")]
    pub project_id: String,
    #[serde(alias = "ROUTING")]
    pub routing: RoutingMode,
    #[serde(alias = "googleClientId", alias = "GOOGLE_CLIENT_ID")]
    pub google_client_id: Option<String>,
    #[serde(alias = "identityUrl")]
    pub identity_url: String,
    #[serde(alias = "tokenUrl")]
    pub token_url: String,
    #[serde(alias = "firestoreUrl")]
    pub firestore_url: String,
    #[serde(alias = "logLevel", alias = "LOG_LEVEL")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            project_id: String::new(),
            routing: RoutingMode::default(),
            google_client_id: None,
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            firestore_url: DEFAULT_FIRESTORE_URL.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: AppConfig = serde_json::from_str(json)?;
        config.normalize();
        Ok(config)
    }

    /// Read `window.ENV`. A missing object yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let Some(win) = web_sys::window() else {
            return Ok(Self::default());
        };
        let env = js_sys::Reflect::get(&win, &wasm_bindgen::JsValue::from_str("ENV"))
            .map_err(|_| ConfigError::Unavailable)?;
        if env.is_undefined() || env.is_null() {
            return Ok(Self::default());
        }
        let json = js_sys::JSON::stringify(&env)
            .map_err(|_| ConfigError::Unavailable)?
            .as_string()
            .ok_or(ConfigError::Unavailable)?;
        Self::from_json(&json)
    }

    fn normalize(&mut self) {
        for url in [
            &mut self.identity_url,
            &mut self.token_url,
            &mut self.firestore_url,
        ] {
            let trimmed = url.trim().trim_end_matches('/');
            *url = trimmed.to_string();
        }
        self.google_client_id = self
            .google_client_id
            .take()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        if self.log_level.trim().is_empty() {
            self.log_level = DEFAULT_LOG_LEVEL.to_string();
        }
    }
}
