use core::fmt;
use std::{collections::BTreeMap, path::Path};

use expensify_api_client::Credentials;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{Error, Result},
    template::ExpenseTemplate,
};

/// The blexp configuration file.
///
/// JSON is the historical format (`~/.blexp.json`), TOML is accepted for
/// files with a `.toml` extension. Keys can be written `user_id` or `UserID`.
#[derive(Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(alias = "UserID")]
    pub user_id: String,
    #[serde(alias = "UserSecret")]
    pub user_secret: String,
    #[serde(alias = "UserEmail")]
    pub user_email: String,
    /// Name of the template submitted when none is given.
    ///
    /// Written `default` (or `Default`), `primary` (or `Primary`) is accepted
    /// too. Only one of these keys may appear in a file.
    #[serde(
        rename = "default",
        alias = "Default",
        alias = "primary",
        alias = "Primary",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub primary: Option<String>,
    #[serde(alias = "Templates", default)]
    pub templates: BTreeMap<String, ExpenseTemplate>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("user_id", &self.user_id)
            .field("user_secret", &"<redacted>")
            .field("user_email", &self.user_email)
            .field("primary", &self.primary)
            .field("templates", &self.templates)
            .finish()
    }
}

fn parse_error(e: impl fmt::Display) -> Error {
    let message = e.to_string();
    if message.contains("duplicate field `default`") {
        return Error::ConfigParse(format!(
            "{message} (`default` and `primary` name the same setting, keep only one)"
        ));
    }
    Error::ConfigParse(message)
}

impl Config {
    /// Read and validate the configuration file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Reading configuration from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s).map_err(parse_error)?;
        config.validated()
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(parse_error)?;
        config.validated()
    }

    fn validated(mut self) -> Result<Self> {
        // An empty primary is the same as no primary
        if self.primary.as_deref().is_some_and(str::is_empty) {
            self.primary = None;
        }
        self.validate()?;
        Ok(self)
    }

    /// Ensure there is at least one template and that the primary, if any, exists
    pub fn validate(&self) -> Result<()> {
        if self.templates.is_empty() {
            return Err(Error::NoTemplates);
        }
        match &self.primary {
            Some(primary) if !self.templates.contains_key(primary) => {
                Err(Error::PrimaryTemplateNotFound(primary.clone()))
            }
            _ => Ok(()),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.user_id, &self.user_secret)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const TOML_CONFIG: &str = r#"
	UserID = "WzSR7CgIa"
	UserSecret = "PYlLneWtPBaoIKtObILX1Y5jwQUMaTyh5ARf9klPe"
	UserEmail = "me@example.com"
	Default = "Broadband"

	[Templates]
	[Templates.Whatever]
	Merchant = "Somebody"
	Amount = 1122
	Currency = "USD"
	Category = "Entertainment"

	[Templates.Broadband]
	Merchant = "Xfinity"
	Amount = 2500
	Currency = "EUR"
	Category = "Employee Reimbursement""#;

    const JSON_CONFIG: &str = r#"{
        "user_id": "WzSR7CgIa",
        "user_secret": "PYlLneWtPBaoIKtObILX1Y5jwQUMaTyh5ARf9klPe",
        "user_email": "me@example.com",
        "default": "Broadband",
        "templates": {
            "Whatever": {"merchant": "Somebody", "amount": 1122, "currency": "USD", "category": "Entertainment"},
            "Broadband": {"merchant": "Xfinity", "amount": 2500, "currency": "EUR",
                          "category": "Employee Reimbursement", "tag": "Home"}
        }
    }"#;

    fn check_config(config: &Config) {
        assert_eq!(config.user_email, "me@example.com");
        assert_eq!(config.templates.len(), 2);
        assert_eq!(
            config.templates["Broadband"].category,
            "Employee Reimbursement"
        );
        assert_eq!(config.templates["Broadband"].amount, 2500);
        assert_eq!(config.primary.as_deref(), Some("Broadband"));
        assert_eq!(
            config.credentials(),
            Credentials::new("WzSR7CgIa", "PYlLneWtPBaoIKtObILX1Y5jwQUMaTyh5ARf9klPe")
        );
    }

    #[test]
    fn read_toml() {
        check_config(&Config::from_toml_str(TOML_CONFIG).unwrap());
    }

    #[test]
    fn read_json() {
        let config = Config::from_json_str(JSON_CONFIG).unwrap();
        check_config(&config);
        assert_eq!(config.templates["Broadband"].tag.as_deref(), Some("Home"));
    }

    #[test]
    fn no_templates() {
        let toml = r#"
            UserID = "WzSR7CgIa"
            UserSecret = "PYlLneWtPBaoIKtObILX1Y5jwQUMaTyh5ARf9klPe"
            UserEmail = "me@example.com"
            Default = "Broadband""#;
        assert!(matches!(
            Config::from_toml_str(toml),
            Err(Error::NoTemplates)
        ));
        let json = r#"{"user_id": "a", "user_secret": "b", "user_email": "c", "templates": {}}"#;
        assert!(matches!(
            Config::from_json_str(json),
            Err(Error::NoTemplates)
        ));
    }

    #[test]
    fn dangling_primary() {
        let json = JSON_CONFIG.replace(r#""default": "Broadband""#, r#""default": "Phone""#);
        match Config::from_json_str(&json) {
            Err(e @ Error::PrimaryTemplateNotFound(_)) => {
                assert_eq!(e.to_string(), "primary template {Phone} not found")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn optional_primary() {
        let json = JSON_CONFIG.replace(r#""default": "Broadband","#, "");
        assert_eq!(Config::from_json_str(&json).unwrap().primary, None);
        let json = JSON_CONFIG.replace(r#""default": "Broadband""#, r#""default": """#);
        assert_eq!(Config::from_json_str(&json).unwrap().primary, None);
    }

    #[test]
    fn malformed() {
        assert!(matches!(
            Config::from_json_str("{"),
            Err(Error::ConfigParse(_))
        ));
        assert!(matches!(
            Config::from_toml_str("UserID = "),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn default_and_primary_together() {
        // Either key alone is fine
        let json = JSON_CONFIG.replace(r#""default": "#, r#""primary": "#);
        assert_eq!(
            Config::from_json_str(&json).unwrap().primary.as_deref(),
            Some("Broadband")
        );

        let json = JSON_CONFIG.replace(
            r#""default": "Broadband","#,
            r#""default": "Broadband", "primary": "Broadband","#,
        );
        match Config::from_json_str(&json) {
            Err(Error::ConfigParse(message)) => assert!(message.contains("keep only one")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("blexp.json");
        std::fs::File::create(&json_path)
            .unwrap()
            .write_all(JSON_CONFIG.as_bytes())
            .unwrap();
        check_config(&Config::load(&json_path).unwrap());

        let toml_path = dir.path().join("blexp.toml");
        std::fs::File::create(&toml_path)
            .unwrap()
            .write_all(TOML_CONFIG.as_bytes())
            .unwrap();
        check_config(&Config::load(&toml_path).unwrap());

        assert!(matches!(
            Config::load(dir.path().join("missing.json")),
            Err(Error::ConfigRead { .. })
        ));
    }

    #[test]
    fn secret_is_not_debug_printed() {
        let config = Config::from_json_str(JSON_CONFIG).unwrap();
        assert!(!format!("{config:?}").contains("PYlLneWtPBaoIKtObILX1Y5jwQUMaTyh5ARf9klPe"));
    }
}
