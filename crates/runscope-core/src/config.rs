//! Trigger step configuration.

use crate::request::{DEFAULT_TIMEOUT_SECS, TriggerRequest};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of a trigger build step, as written by the user.
///
/// The endpoint may still contain environment placeholders; they are
/// expanded when the step runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerStepConfig {
    /// Trigger URL of the remote test run.
    pub trigger_end_point: String,
    /// Access token used to authenticate trigger and result requests.
    #[serde(default)]
    pub access_token: String,
    /// Seconds to wait for a result. Negative values fall back to 60.
    #[serde(default = "default_timeout")]
    pub timeout: i64,
    /// Base URL of the results API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Seconds between result polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Print `***` instead of the token in the build log.
    #[serde(default = "default_mask_access_token")]
    pub mask_access_token: bool,
}

fn default_timeout() -> i64 {
    DEFAULT_TIMEOUT_SECS as i64
}

fn default_api_url() -> String {
    "https://api.runscope.com".to_string()
}

fn default_poll_interval() -> u64 {
    1
}

fn default_mask_access_token() -> bool {
    true
}

impl TriggerStepConfig {
    pub fn new(trigger_end_point: impl Into<String>, access_token: impl Into<String>, timeout: i64) -> Self {
        let mut config = Self {
            trigger_end_point: trigger_end_point.into(),
            access_token: access_token.into(),
            ..Self::default()
        };
        config.set_timeout(timeout);
        config
    }

    /// Update the timeout, normalizing negative values.
    pub fn set_timeout(&mut self, timeout: i64) {
        self.timeout = if timeout < 0 { default_timeout() } else { timeout };
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(contents)?;
        let timeout = config.timeout;
        config.set_timeout(timeout);
        config.validate()?;
        Ok(config)
    }

    /// Check the fields that cannot be normalized.
    pub fn validate(&self) -> Result<()> {
        if self.trigger_end_point.trim().is_empty() {
            return Err(Error::Config("trigger_end_point is required".to_string()));
        }
        if self.api_url.trim().is_empty() {
            return Err(Error::Config("api_url must not be empty".to_string()));
        }
        if self.poll_interval_secs == 0 {
            return Err(Error::Config(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the request for an already expanded endpoint.
    pub fn to_request(&self, expanded_endpoint: impl Into<String>) -> TriggerRequest {
        TriggerRequest::new(expanded_endpoint, self.access_token.clone(), self.timeout)
            .with_masked_token(self.mask_access_token)
    }
}

impl Default for TriggerStepConfig {
    fn default() -> Self {
        Self {
            trigger_end_point: String::new(),
            access_token: String::new(),
            timeout: default_timeout(),
            api_url: default_api_url(),
            poll_interval_secs: default_poll_interval(),
            mask_access_token: default_mask_access_token(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_yaml_defaults() {
        let config = TriggerStepConfig::from_yaml(
            "trigger_end_point: https://api.runscope.com/radar/abc/trigger\n",
        )
        .unwrap();

        assert_eq!(config.timeout, 60);
        assert_eq!(config.api_url, "https://api.runscope.com");
        assert_eq!(config.poll_interval_secs, 1);
        assert!(config.mask_access_token);
        assert_eq!(config.access_token, "");
    }

    #[test]
    fn test_yaml_negative_timeout_normalized() {
        let yaml = r#"
trigger_end_point: https://api.runscope.com/radar/abc/trigger
access_token: tok
timeout: -10
"#;
        let config = TriggerStepConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.timeout, 60);
        assert_eq!(config.to_request("https://x/trigger").timeout_seconds(), 60);
    }

    #[test]
    fn test_zero_timeout_kept() {
        let config = TriggerStepConfig::new("https://x/trigger", "tok", 0);
        assert_eq!(config.timeout, 0);
    }

    #[test]
    fn test_set_timeout_normalizes() {
        let mut config = TriggerStepConfig::new("https://x/trigger", "tok", 30);
        config.set_timeout(-1);
        assert_eq!(config.timeout, 60);
    }

    #[test]
    fn test_missing_endpoint_rejected() {
        let err = TriggerStepConfig::from_yaml("trigger_end_point: \"  \"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = TriggerStepConfig::from_yaml("timeout: 5\n").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let yaml = "trigger_end_point: https://x/trigger\npoll_interval_secs: 0\n";
        let err = TriggerStepConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let mut config = TriggerStepConfig::new("https://x/trigger", "tok", 60);
        config.poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "trigger_end_point: https://api.runscope.com/radar/${{BUCKET}}/trigger\naccess_token: tok\ntimeout: 5\nmask_access_token: false"
        )
        .unwrap();

        let config = TriggerStepConfig::from_file(file.path()).unwrap();
        assert_eq!(
            config.trigger_end_point,
            "https://api.runscope.com/radar/${BUCKET}/trigger"
        );
        assert_eq!(config.timeout, 5);

        let req = config.to_request("https://api.runscope.com/radar/b/trigger");
        assert_eq!(req.display_token(), "tok");
    }
}
