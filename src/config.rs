//! Host-facing configuration.
//!
//! Size limits, the CSP directive set and the sandbox flags are constants, not
//! configuration. What can be configured is logging and whether the renderer
//! re-validates content before loading it.
//!
//! Precedence: environment > config file > defaults.

use crate::logging::{LogFormat, LogOutput, LoggingConfig};
use crate::sandbox::RendererSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_VERIFY_BEFORE_RENDER: &str = "WEBSTATIC_VERIFY_BEFORE_RENDER";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    pub logging: LoggingSettings,
    pub renderer: RendererSettings,
}

/// File-level logging overrides; unset fields keep the environment defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    pub format: Option<LogFormat>,
    pub output: Option<LogOutput>,
    pub log_dir: Option<PathBuf>,
    pub environment: Option<String>,
}

impl GuardConfig {
    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load a YAML or JSON file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = load_config_file(path)?;
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(value) = env::var(ENV_VERIFY_BEFORE_RENDER) {
            match parse_bool(&value) {
                Some(flag) => self.renderer.verify_before_render = flag,
                None => tracing::warn!(
                    variable = ENV_VERIFY_BEFORE_RENDER,
                    value = %value,
                    "ignoring unrecognized boolean"
                ),
            }
        }
    }

    /// Resolve the logging configuration: file settings layered over
    /// defaults, then `LOG_*` environment variables on top.
    pub fn logging_config(&self) -> LoggingConfig {
        let mut config = match self.logging.environment.clone() {
            Some(environment) => LoggingConfig::for_environment(environment),
            None => LoggingConfig::from_env(),
        };
        if let Some(format) = self.logging.format {
            config.format = format;
        }
        if let Some(output) = self.logging.output {
            config.output = output;
        }
        if let Some(log_dir) = self.logging.log_dir.clone() {
            config.log_dir = log_dir;
        }
        config.apply_env();
        config
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn load_config_file(path: &Path) -> Result<GuardConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    #[serial]
    fn test_load_yaml() {
        let file = write_config(
            ".yaml",
            "renderer:\n  verify_before_render: true\nlogging:\n  format: json\n  output: stdout\n",
        );
        let config = GuardConfig::load(file.path()).unwrap();
        assert!(config.renderer.verify_before_render);
        assert_eq!(config.logging.format, Some(LogFormat::Json));

        let logging = config.logging_config();
        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(logging.output, LogOutput::Stdout);
    }

    #[test]
    #[serial]
    fn test_load_json_with_defaults() {
        let file = write_config(".json", "{}");
        let config = GuardConfig::load(file.path()).unwrap();
        assert_eq!(config, GuardConfig::default());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let file = write_config(".yml", "csp: none\n");
        let err = GuardConfig::load(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse YAML config"));
    }

    #[test]
    fn test_missing_and_unsupported_files() {
        assert!(GuardConfig::load(Path::new("/nonexistent/guard.yaml")).is_err());
        let file = write_config(".toml", "x = 1");
        let err = GuardConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config extension"));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let file = write_config(".yaml", "renderer:\n  verify_before_render: false\n");
        unsafe {
            env::set_var(ENV_VERIFY_BEFORE_RENDER, "yes");
        }
        let config = GuardConfig::load(file.path());
        unsafe {
            env::remove_var(ENV_VERIFY_BEFORE_RENDER);
        }
        assert!(config.unwrap().renderer.verify_before_render);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool(" TRUE "), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
