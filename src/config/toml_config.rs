use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_required_field,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSection,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    pub firebase: Option<FirebaseConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSection {
    pub name: String,
    #[serde(default)]
    pub environment: Environment,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub mode: BackendMode,
}

/// Which implementations of the ports are wired up at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    #[default]
    Remote,
    InMemory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub service_account_path: String,
    pub database_url: String,
    pub messaging_endpoint: Option<String>,
    pub request_timeout_seconds: Option<u64>,
    pub sync_leave_balances: Option<bool>,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${GOOGLE_APPLICATION_CREDENTIALS})；未設定的保留原字串
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn is_production(&self) -> bool {
        self.app.environment == Environment::Production
    }

    pub fn backend_mode(&self) -> BackendMode {
        self.backend.mode
    }

    pub fn sync_leave_balances(&self) -> bool {
        self.firebase
            .as_ref()
            .and_then(|f| f.sync_leave_balances)
            .unwrap_or(false)
    }

    pub fn request_timeout_seconds(&self) -> u64 {
        self.firebase
            .as_ref()
            .and_then(|f| f.request_timeout_seconds)
            .unwrap_or(30)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("app.name", &self.app.name)?;
        validate_path("database.path", &self.database.path)?;

        if self.backend.mode == BackendMode::Remote {
            let firebase = validate_required_field("firebase", &self.firebase)?;
            validate_path("firebase.service_account_path", &firebase.service_account_path)?;
            validate_url("firebase.database_url", &firebase.database_url)?;
            if let Some(endpoint) = &firebase.messaging_endpoint {
                validate_url("firebase.messaging_endpoint", endpoint)?;
            }
            if let Some(timeout) = firebase.request_timeout_seconds {
                validate_positive_number("firebase.request_timeout_seconds", timeout, 1)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::TimetableError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const REMOTE: &str = r#"
[app]
name = "timetable-admin"
environment = "production"

[database]
path = "./timetable.sqlite"

[backend]
mode = "remote"

[firebase]
service_account_path = "./service-account.json"
database_url = "https://campus.firebaseio.com"
sync_leave_balances = true
"#;

    #[test]
    fn test_parse_remote_config() {
        let config = AppConfig::from_toml_str(REMOTE).unwrap();

        assert_eq!(config.app.name, "timetable-admin");
        assert!(config.is_production());
        assert_eq!(config.backend_mode(), BackendMode::Remote);
        assert!(config.sync_leave_balances());
        assert_eq!(config.request_timeout_seconds(), 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_minimal_config() {
        let config = AppConfig::from_toml_str(
            r#"
[app]
name = "t"

[database]
path = "db.sqlite"

[backend]
mode = "in_memory"
"#,
        )
        .unwrap();

        assert!(!config.is_production());
        assert_eq!(config.backend_mode(), BackendMode::InMemory);
        assert!(!config.sync_leave_balances());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_remote_mode_requires_firebase_section() {
        let config = AppConfig::from_toml_str(
            r#"
[app]
name = "t"

[database]
path = "db.sqlite"
"#,
        )
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(TimetableError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_invalid_database_url() {
        let config = AppConfig::from_toml_str(&REMOTE.replace(
            "https://campus.firebaseio.com",
            "campus.firebaseio.com",
        ))
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TIMETABLE_TEST_KEY_PATH", "/secrets/key.json");

        let config = AppConfig::from_toml_str(
            &REMOTE.replace("./service-account.json", "${TIMETABLE_TEST_KEY_PATH}"),
        )
        .unwrap();
        assert_eq!(
            config.firebase.unwrap().service_account_path,
            "/secrets/key.json"
        );

        std::env::remove_var("TIMETABLE_TEST_KEY_PATH");
    }

    #[test]
    fn test_unknown_mode_is_parse_error() {
        let err = AppConfig::from_toml_str(&REMOTE.replace("\"remote\"", "\"mock\"")).unwrap_err();
        assert!(matches!(err, TimetableError::TomlError(_)));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(REMOTE.as_bytes()).unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.database.path, "./timetable.sqlite");
    }
}
