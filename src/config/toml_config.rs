use crate::config::TesterConfig;
use crate::domain::model::ServiceCheckSpec;
use crate::utils::error::{Result, StackTestError};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// On-disk layout of the optional configuration file. Every table may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub orchestrator: Option<OrchestratorSection>,
    pub target: Option<TargetSection>,
    pub timing: Option<TimingSection>,
    pub checks: Option<Vec<ServiceCheckSpec>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorSection {
    pub docker_host: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetSection {
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingSection {
    pub readiness_timeout_seconds: Option<u64>,
    pub poll_interval_seconds: Option<u64>,
    pub grace_period_seconds: Option<u64>,
    pub request_timeout_seconds: Option<u64>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StackTestError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| StackTestError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unset variables stay verbatim.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Layers the file over the built-in defaults.
    pub fn into_tester_config(self) -> TesterConfig {
        let mut config = TesterConfig::default();

        if let Some(orchestrator) = self.orchestrator {
            config.docker_host = orchestrator.docker_host;
        }

        if let Some(base_url) = self.target.and_then(|target| target.base_url) {
            config.base_url = base_url;
        }

        if let Some(timing) = self.timing {
            if let Some(secs) = timing.readiness_timeout_seconds {
                config.readiness_timeout = Duration::from_secs(secs);
            }
            if let Some(secs) = timing.poll_interval_seconds {
                config.poll_interval = Duration::from_secs(secs);
            }
            if let Some(secs) = timing.grace_period_seconds {
                config.grace_period = Duration::from_secs(secs);
            }
            if let Some(secs) = timing.request_timeout_seconds {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        if let Some(checks) = self.checks {
            config.checks = checks;
        }

        config
    }

    /// Loads, layers and validates in one step.
    pub fn load_tester_config<P: AsRef<Path>>(path: P) -> Result<TesterConfig> {
        let config = Self::from_file(path)?.into_tester_config();
        config.validate()?;
        Ok(config)
    }
}
