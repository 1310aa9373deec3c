//! Resolution of the trigger configuration from file and flags.

use crate::commands::TriggerArgs;
use runscope_core::TriggerStepConfig;
use std::path::Path;

/// Configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "runscope.yaml";

/// Build the step configuration. Flags override values from the file.
pub fn resolve(args: &TriggerArgs) -> Result<TriggerStepConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => TriggerStepConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            TriggerStepConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => TriggerStepConfig::default(),
    };

    if let Some(endpoint) = &args.endpoint {
        config.trigger_end_point = endpoint.clone();
    }
    if let Some(token) = &args.token {
        config.access_token = token.clone();
    }
    if let Some(timeout) = args.timeout {
        config.set_timeout(timeout);
    }
    if let Some(api_url) = &args.api_url {
        config.api_url = api_url.clone();
    }
    if let Some(interval) = args.poll_interval {
        config.poll_interval_secs = interval;
    }
    if args.show_token {
        config.mask_access_token = false;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_flags_override_file() {
        let file = config_file(
            "trigger_end_point: https://api.runscope.com/radar/abc/trigger\naccess_token: from-file\ntimeout: 30\n",
        );
        let args = TriggerArgs {
            config: Some(file.path().to_path_buf()),
            token: Some("from-flag".to_string()),
            timeout: Some(-10),
            show_token: true,
            ..Default::default()
        };

        let config = resolve(&args).unwrap();
        assert_eq!(config.trigger_end_point, "https://api.runscope.com/radar/abc/trigger");
        assert_eq!(config.access_token, "from-flag");
        assert_eq!(config.timeout, 60);
        assert!(!config.mask_access_token);
    }

    #[test]
    fn test_endpoint_flag_and_zero_timeout() {
        let file = config_file("trigger_end_point: https://x/trigger\n");
        let args = TriggerArgs {
            config: Some(file.path().to_path_buf()),
            endpoint: Some("https://y/trigger".to_string()),
            timeout: Some(0),
            ..Default::default()
        };
        let config = resolve(&args).unwrap();
        assert_eq!(config.trigger_end_point, "https://y/trigger");
        assert_eq!(config.timeout, 0);
    }

    #[test]
    fn test_zero_poll_interval_flag_rejected() {
        let args = TriggerArgs {
            endpoint: Some("https://x/trigger".to_string()),
            poll_interval: Some(0),
            ..Default::default()
        };
        let err = resolve(&args).unwrap_err();
        assert!(err.to_string().contains("poll_interval_secs"));
    }

    #[test]
    fn test_invalid_file() {
        let file = config_file("trigger_end_point: [not, a, string]\n");
        let args = TriggerArgs {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert!(resolve(&args).is_err());
    }
}
