//! Harness configuration.
//!
//! Settings come either from the environment (after loading a `.env` file
//! if one exists) or from a YAML file:
//!
//! ```yaml
//! project_id: 1
//! testrail:
//!   url: https://example.testrail.io/
//!   user: bot@example.com
//!   password: api-key
//! omdb:
//!   api_key: abc123
//! ```

use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use testrail_core::ClientConfig;

use crate::error::{HarnessError, Result};

pub const DEFAULT_OMDB_URL: &str = "http://www.omdbapi.com/";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub testrail: ClientConfig,
    /// Project in which test runs are created.
    pub project_id: u64,
    #[serde(default)]
    pub omdb: OmdbSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OmdbSettings {
    #[serde(default = "default_omdb_url")]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for OmdbSettings {
    fn default() -> Self {
        Self {
            url: default_omdb_url(),
            api_key: String::new(),
        }
    }
}

fn default_omdb_url() -> String {
    DEFAULT_OMDB_URL.to_string()
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from `lookup`, which maps variable names to values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| HarnessError::Config(format!("{key} is not set")))
        };

        let mut testrail = ClientConfig::new(
            required("TESTRAIL_URL")?,
            required("TESTRAIL_USER")?,
            required("TESTRAIL_PASSWORD")?,
        );
        testrail.timeout_secs = lookup("TESTRAIL_TIMEOUT_SECS")
            .map(|raw| parse("TESTRAIL_TIMEOUT_SECS", &raw))
            .transpose()?;
        testrail.forward_error_message = lookup("TESTRAIL_FORWARD_ERRORS")
            .map(|raw| parse_flag("TESTRAIL_FORWARD_ERRORS", &raw))
            .transpose()?
            .unwrap_or(false);

        let project_id = parse("TESTRAIL_PROJECT_ID", &required("TESTRAIL_PROJECT_ID")?)?;
        let omdb = OmdbSettings {
            url: lookup("OMDB_URL").unwrap_or_else(default_omdb_url),
            api_key: lookup("OMDB_API_KEY").unwrap_or_default(),
        };

        Ok(Self {
            testrail,
            project_id,
            omdb,
        })
    }

    pub fn from_yaml_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path)?;
        Ok(serde_yaml::from_reader(f)?)
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| HarnessError::Config(format!("{key} has invalid value `{raw}`")))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(HarnessError::Config(format!("{key} has invalid value `{raw}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("TESTRAIL_URL", "https://tr.example.com"),
        ("TESTRAIL_USER", "bot"),
        ("TESTRAIL_PASSWORD", "key"),
        ("TESTRAIL_PROJECT_ID", "3"),
    ];

    #[test]
    fn required_values_only() {
        let settings = Settings::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(settings.testrail, ClientConfig::new("https://tr.example.com", "bot", "key"));
        assert_eq!(settings.project_id, 3);
        assert_eq!(settings.omdb, OmdbSettings::default());
    }

    #[test]
    fn optional_values_are_parsed() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("TESTRAIL_TIMEOUT_SECS", "15"),
            ("TESTRAIL_FORWARD_ERRORS", "yes"),
            ("OMDB_URL", "http://localhost:3001/"),
            ("OMDB_API_KEY", "abc"),
        ]);
        let settings = Settings::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(settings.testrail.timeout_secs, Some(15));
        assert!(settings.testrail.forward_error_message);
        assert_eq!(settings.omdb.url, "http://localhost:3001/");
        assert_eq!(settings.omdb.api_key, "abc");
    }

    #[test]
    fn missing_value_is_reported() {
        let err = Settings::from_lookup(lookup(&REQUIRED[..3])).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: TESTRAIL_PROJECT_ID is not set");
    }

    #[test]
    fn bad_project_id_is_reported() {
        let mut vars = REQUIRED.to_vec();
        vars[3] = ("TESTRAIL_PROJECT_ID", "seven");
        let err = Settings::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, HarnessError::Config(_)));
    }

    #[test]
    fn loads_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "project_id: 1\ntestrail:\n  url: https://tr.example.com/\n  user: bot\n  password: key\n  forward_error_message: true\nomdb:\n  api_key: abc\n"
        )
        .unwrap();

        let settings = Settings::from_yaml_path(file.path()).unwrap();
        assert_eq!(settings.project_id, 1);
        assert!(settings.testrail.forward_error_message);
        assert_eq!(settings.omdb.url, DEFAULT_OMDB_URL);
        assert_eq!(settings.omdb.api_key, "abc");
    }

    #[test]
    fn missing_yaml_file_is_io_error() {
        let err = Settings::from_yaml_path("/no/such/settings.yaml").unwrap_err();
        assert!(matches!(err, HarnessError::Io(_)));
    }
}
