//! CLI command definitions.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter trigger configuration
    Init {
        /// Path of the configuration file to create
        #[arg(default_value = "runscope.yaml")]
        path: PathBuf,
    },

    /// Validate a trigger configuration file
    Validate {
        /// Path to the configuration file
        #[arg(default_value = "runscope.yaml")]
        path: PathBuf,
    },

    /// Trigger a test run and wait for its result
    Trigger(TriggerArgs),
}

#[derive(Args, Debug, Default)]
pub struct TriggerArgs {
    /// Configuration file; `runscope.yaml` is used when present
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Trigger URL; may contain $VAR or ${VAR} placeholders
    #[arg(long, env = "RUNSCOPE_TRIGGER_URL")]
    pub endpoint: Option<String>,

    /// Access token
    #[arg(long, env = "RUNSCOPE_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Seconds to wait for a result; negative values mean the default of 60
    #[arg(long, allow_negative_numbers = true)]
    pub timeout: Option<i64>,

    /// Base URL of the results API
    #[arg(long)]
    pub api_url: Option<String>,

    /// Seconds between result polls
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Print the access token in the build log instead of masking it
    #[arg(long)]
    pub show_token: bool,

    /// Build variable used for endpoint expansion (KEY=VALUE)
    #[arg(short = 'e', long = "var", value_parser = parse_key_val)]
    pub vars: Vec<(String, String)>,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))
}
