//! Configuration of the media session mirror.
//!
//! The embedded `mediasession.yaml` provides every default. An optional
//! external YAML file is merged on top of it, then environment variables
//! prefixed with `PMOMEDIASESSION__` override single keys
//! (`PMOMEDIASESSION__LOGGING__MIN_LEVEL=debug`).

use std::{env, fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::info;

use crate::errors::MediaSessionError;

const DEFAULT_CONFIG: &str = include_str!("mediasession.yaml");
const ENV_PREFIX: &str = "PMOMEDIASESSION__";

const DEFAULT_LOG_MIN_LEVEL: &str = "info";
const DEFAULT_LOG_ACTIVE_SESSIONS: bool = false;
const DEFAULT_LOG_SNAPSHOTS: bool = true;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MirrorConfig {
    pub logging: LoggingConfig,
    pub sessions: SessionsConfig,
    pub presentation: PresentationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    pub min_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionsConfig {
    /// Dump every reported session on each list change.
    pub log_active_sessions: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PresentationConfig {
    pub log_snapshots: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                min_level: DEFAULT_LOG_MIN_LEVEL.to_string(),
            },
            sessions: SessionsConfig {
                log_active_sessions: DEFAULT_LOG_ACTIVE_SESSIONS,
            },
            presentation: PresentationConfig {
                log_snapshots: DEFAULT_LOG_SNAPSHOTS,
            },
        }
    }
}

impl MirrorConfig {
    /// Loads the configuration.
    ///
    /// A missing file is not an error: the embedded defaults are used.
    /// Environment overrides are applied in both cases.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let external = match path {
            Some(path) if path.exists() => {
                let data = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                info!(config_file = %path.display(), "Loaded config file");
                if data.trim().is_empty() {
                    None
                } else {
                    Some(
                        serde_yaml::from_str::<Value>(&data)
                            .with_context(|| format!("Failed to parse {}", path.display()))?,
                    )
                }
            }
            Some(path) => {
                info!(config_file = %path.display(), "Config file not found, using defaults");
                None
            }
            None => None,
        };

        let overrides = env::vars().filter(|(key, _)| key.starts_with(ENV_PREFIX));
        Self::build(external, overrides)
    }

    /// Parses a YAML document merged over the defaults, without environment
    /// overrides.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Self::build(None, std::iter::empty());
        }
        let external: Value = serde_yaml::from_str(yaml).context("Failed to parse config YAML")?;
        Self::build(Some(external), std::iter::empty())
    }

    fn build<I>(external: Option<Value>, overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut value: Value =
            serde_yaml::from_str(DEFAULT_CONFIG).context("Embedded default config is invalid")?;

        if let Some(external) = external {
            match external {
                Value::Mapping(_) => merge_yaml(&mut value, &lower_keys_value(external)),
                Value::Null => {}
                _ => {
                    return Err(MediaSessionError::Config(
                        "top level of the config must be a mapping".to_string(),
                    )
                    .into());
                }
            }
        }

        for (key, raw) in overrides {
            let Some(stripped) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let path: Vec<String> = stripped.split("__").map(|s| s.to_lowercase()).collect();
            set_value(&mut value, &path, convert_env_value(&raw));
        }

        serde_yaml::from_value(value).context("Invalid configuration")
    }
}

fn set_value(data: &mut Value, path: &[String], value: Value) {
    if path.is_empty() {
        *data = value;
        return;
    }
    if let Value::Mapping(map) = data {
        let key = Value::String(path[0].clone());
        if path.len() == 1 {
            map.insert(key, value);
        } else {
            let entry = map.entry(key).or_insert(Value::Mapping(Mapping::new()));
            set_value(entry, &path[1..], value);
        }
    }
}

fn convert_env_value(value: &str) -> Value {
    serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let k = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(k, lower_keys_value(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        // scalars and sequences are replaced
        (d, e) => *d = e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_defaults_match_default_impl() {
        let cfg = MirrorConfig::build(None, std::iter::empty()).unwrap();
        assert_eq!(cfg, MirrorConfig::default());
    }

    #[test]
    fn test_partial_file_merges_over_defaults() {
        let cfg = MirrorConfig::from_yaml_str(
            r#"
Sessions:
  Log_Active_Sessions: true
"#,
        )
        .unwrap();

        assert!(cfg.sessions.log_active_sessions);
        assert_eq!(cfg.logging.min_level, "info");
        assert!(cfg.presentation.log_snapshots);
    }

    #[test]
    fn test_empty_document_is_defaults() {
        let cfg = MirrorConfig::from_yaml_str("").unwrap();
        assert_eq!(cfg, MirrorConfig::default());
    }

    #[test]
    fn test_non_mapping_document_is_rejected() {
        assert!(MirrorConfig::from_yaml_str("- a\n- b\n").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let overrides = vec![
            (
                "PMOMEDIASESSION__LOGGING__MIN_LEVEL".to_string(),
                "debug".to_string(),
            ),
            (
                "PMOMEDIASESSION__PRESENTATION__LOG_SNAPSHOTS".to_string(),
                "false".to_string(),
            ),
        ];
        let cfg = MirrorConfig::build(None, overrides).unwrap();

        assert_eq!(cfg.logging.min_level, "debug");
        assert!(!cfg.presentation.log_snapshots);
        assert!(!cfg.sessions.log_active_sessions);
    }

    #[test]
    fn test_bad_type_is_rejected() {
        let overrides = vec![(
            "PMOMEDIASESSION__SESSIONS__LOG_ACTIVE_SESSIONS".to_string(),
            "not-a-bool".to_string(),
        )];
        assert!(MirrorConfig::build(None, overrides).is_err());
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "logging:\n  min_level: trace")?;

        let cfg = MirrorConfig::load(Some(file.path()))?;
        assert_eq!(cfg.logging.min_level, "trace");
        Ok(())
    }

    #[test]
    fn test_load_missing_file_uses_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let cfg = MirrorConfig::load(Some(&dir.path().join("missing.yaml")))?;
        assert_eq!(cfg.sessions, MirrorConfig::default().sessions);
        Ok(())
    }
}
