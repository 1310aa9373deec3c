//! Command handlers.

use crate::commands::TriggerArgs;
use crate::config;
use console::style;
use runscope_core::{BuildResult, BuildResultHolder, TriggerStepConfig};
use runscope_trigger::{BuildStatus, BuildStep, RunscopeStep, StepContext, WriterLog};
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;

/// Write a starter configuration file.
pub fn init(path: &Path) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if path.exists() {
        println!("{} {} already exists", style("!").yellow(), path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let template = r#"# Runscope trigger step
trigger_end_point: https://api.runscope.com/radar/${RUNSCOPE_TRIGGER_ID}/trigger
# Prefer RUNSCOPE_ACCESS_TOKEN in the environment over storing the token here.
access_token: ""
timeout: 60
poll_interval_secs: 1
mask_access_token: true
"#;

    std::fs::write(path, template)?;
    println!("{} Created {}", style("✓").green(), path.display());
    Ok(ExitCode::SUCCESS)
}

/// Validate a configuration file and print the effective values.
pub fn validate(path: &Path) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = TriggerStepConfig::from_file(path)?;

    println!("{} {} is valid", style("✓").green(), path.display());
    print!("{}", render_config(&config));

    Ok(ExitCode::SUCCESS)
}

/// Effective configuration, one indented `key: value` line per field.
fn render_config(config: &TriggerStepConfig) -> String {
    let token = if config.access_token.is_empty() {
        "(not set)"
    } else {
        "***"
    };

    format!(
        "  trigger_end_point: {}\n  access_token: {}\n  timeout: {}\n  api_url: {}\n  poll_interval_secs: {}\n  mask_access_token: {}\n",
        config.trigger_end_point,
        token,
        config.timeout,
        config.api_url,
        config.poll_interval_secs,
        config.mask_access_token,
    )
}

/// Run the trigger step and map the build result onto the exit code.
pub async fn trigger(args: TriggerArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let result = run_trigger(args).await?;

    if result.is_success() {
        println!("{} Build result: {}", style("✓").green(), result);
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{} Build result: {}", style("✗").red(), result);
        Ok(ExitCode::FAILURE)
    }
}

async fn run_trigger(args: TriggerArgs) -> Result<BuildResult, Box<dyn std::error::Error>> {
    let config = config::resolve(&args)?;
    debug!(
        endpoint = %config.trigger_end_point,
        timeout = config.timeout,
        api_url = %config.api_url,
        "Resolved trigger configuration"
    );

    let mut ctx = StepContext::new("runscope");
    ctx.variables.extend(args.vars);

    let step = RunscopeStep::new(config);
    let log = WriterLog::stdout();
    let build = BuildStatus::new();

    let outcome = step.perform(&ctx, &log, &build).await?;
    Ok(build.result().unwrap_or_else(|| outcome.build_result()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn remote_with_result(result: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/radar/bkt/trigger"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "data": {
                    "runs": [{ "bucket_key": "bkt", "test_id": "t1", "test_run_id": "r1" }]
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/buckets/bkt/tests/t1/results/r1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "result": result }
            })))
            .mount(&server)
            .await;
        server
    }

    fn trigger_args(server: &MockServer) -> TriggerArgs {
        TriggerArgs {
            endpoint: Some(format!("{}/radar/bkt/trigger", server.uri())),
            api_url: Some(server.uri()),
            token: Some("tok".to_string()),
            timeout: Some(30),
            ..Default::default()
        }
    }

    #[test]
    fn test_init_writes_valid_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runscope.yaml");

        init(&path).unwrap();
        let config = TriggerStepConfig::from_file(&path).unwrap();
        assert!(config.trigger_end_point.contains("${RUNSCOPE_TRIGGER_ID}"));
        assert_eq!(config.timeout, 60);

        // Existing files are left alone.
        std::fs::write(&path, "trigger_end_point: https://x/trigger\n").unwrap();
        init(&path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "trigger_end_point: https://x/trigger\n"
        );
    }

    #[test]
    fn test_validate_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate(&dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn test_validate_masks_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runscope.yaml");
        std::fs::write(
            &path,
            "trigger_end_point: https://x/trigger\naccess_token: s3cret-token\n",
        )
        .unwrap();

        assert!(validate(&path).is_ok());

        let rendered = render_config(&TriggerStepConfig::from_file(&path).unwrap());
        assert!(rendered.contains("  access_token: ***\n"));
        assert!(!rendered.contains("s3cret-token"));
        assert!(rendered.contains("  mask_access_token: true\n"));
        assert!(rendered.contains("  poll_interval_secs: 1\n"));
    }

    #[test]
    fn test_render_config_without_token() {
        let mut config = TriggerStepConfig::new("https://x/trigger", "", 10);
        config.mask_access_token = false;

        let rendered = render_config(&config);
        assert!(rendered.contains("  access_token: (not set)\n"));
        assert!(rendered.contains("  mask_access_token: false\n"));
    }

    #[tokio::test]
    async fn test_trigger_pass_exits_success() {
        let server = remote_with_result("pass").await;

        let code = trigger(trigger_args(&server)).await.unwrap();
        assert_eq!(format!("{:?}", code), format!("{:?}", ExitCode::SUCCESS));
    }

    #[tokio::test]
    async fn test_trigger_fail_exits_failure() {
        let server = remote_with_result("fail").await;

        assert_eq!(
            run_trigger(trigger_args(&server)).await.unwrap(),
            BuildResult::Failure
        );
        let code = trigger(trigger_args(&server)).await.unwrap();
        assert_eq!(format!("{:?}", code), format!("{:?}", ExitCode::FAILURE));
    }

    #[tokio::test]
    async fn test_trigger_without_endpoint_is_an_error() {
        let args = TriggerArgs {
            token: Some("tok".to_string()),
            ..Default::default()
        };
        assert!(trigger(args).await.is_err());
    }
}
