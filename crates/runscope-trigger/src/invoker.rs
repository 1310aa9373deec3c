//! HTTP trigger invoker for the Runscope API.

use async_trait::async_trait;
use runscope_core::{Error, Result, TriggerInvoker};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Results reported while a test run has not finished yet.
const PENDING_RESULTS: &[&str] = &["init", "queued", "working"];

/// Configuration for [`HttpTriggerInvoker`].
#[derive(Debug, Clone)]
pub struct InvokerConfig {
    /// Base URL of the results API.
    pub api_url: String,
    /// Delay between result polls of an unfinished run.
    pub poll_interval: Duration,
    /// Timeout applied to each individual HTTP request.
    pub request_timeout: Duration,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.runscope.com".to_string(),
            poll_interval: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct TriggerData {
    #[serde(default)]
    runs: Vec<TriggeredRun>,
}

/// A test run started by a trigger request.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggeredRun {
    pub bucket_key: String,
    pub test_id: String,
    pub test_run_id: String,
    #[serde(default)]
    pub test_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunResult {
    #[serde(default)]
    result: Option<String>,
}

/// Triggers test runs and polls their results over HTTP.
pub struct HttpTriggerInvoker {
    config: InvokerConfig,
    client: reqwest::Client,
}

impl HttpTriggerInvoker {
    pub fn new(config: InvokerConfig) -> Self {
        let timeout = config.request_timeout;
        Self {
            config,
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Start the test runs behind a trigger URL.
    pub async fn trigger(&self, endpoint: &str, access_token: &str) -> Result<Vec<TriggeredRun>> {
        let url = Url::parse(endpoint)
            .map_err(|e| Error::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;

        info!(endpoint = %url, "Triggering test run");
        let envelope: Envelope<TriggerData> = self.get_json(url.as_str(), access_token).await?;

        if envelope.data.runs.is_empty() {
            return Err(Error::MalformedResponse(
                "trigger response contains no test runs".to_string(),
            ));
        }
        Ok(envelope.data.runs)
    }

    /// Poll a run until it reports a final result, returned lower-cased.
    pub async fn await_result(&self, run: &TriggeredRun, access_token: &str) -> Result<String> {
        let url = self.result_url(run);

        loop {
            let envelope: Envelope<RunResult> = self.get_json(&url, access_token).await?;
            match envelope.data.result.map(|r| r.to_lowercase()) {
                Some(result) if !PENDING_RESULTS.contains(&result.as_str()) => {
                    info!(
                        test_run_id = %run.test_run_id,
                        test = run.test_name.as_deref().unwrap_or(&run.test_id),
                        result = %result,
                        "Test run finished"
                    );
                    return Ok(result);
                }
                pending => {
                    debug!(test_run_id = %run.test_run_id, result = ?pending, "Test run still in progress");
                    tokio::time::sleep(self.config.poll_interval).await;
                }
            }
        }
    }

    fn result_url(&self, run: &TriggeredRun) -> String {
        format!(
            "{}/buckets/{}/tests/{}/results/{}",
            self.config.api_url.trim_end_matches('/'),
            run.bucket_key,
            run.test_id,
            run.test_run_id
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, access_token: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UnexpectedStatus { status, body });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read response body: {}", e)))?;

        serde_json::from_str(&body).map_err(|e| Error::MalformedResponse(format!("{}: {}", url, e)))
    }
}

impl Default for HttpTriggerInvoker {
    fn default() -> Self {
        Self::new(InvokerConfig::default())
    }
}

#[async_trait]
impl TriggerInvoker for HttpTriggerInvoker {
    async fn invoke(&self, endpoint: &str, access_token: &str) -> Result<String> {
        let runs = self.trigger(endpoint, access_token).await?;
        debug!(runs = runs.len(), "Trigger started test runs");

        for run in &runs {
            let result = self.await_result(run, access_token).await?;
            if result != runscope_core::outcome::TEST_RESULTS_PASS {
                return Ok(result);
            }
        }
        Ok(runscope_core::outcome::TEST_RESULTS_PASS.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_url() {
        let invoker = HttpTriggerInvoker::new(InvokerConfig {
            api_url: "https://api.runscope.com/".to_string(),
            ..Default::default()
        });
        let run = TriggeredRun {
            bucket_key: "bkt".to_string(),
            test_id: "tst".to_string(),
            test_run_id: "run".to_string(),
            test_name: None,
        };
        assert_eq!(
            invoker.result_url(&run),
            "https://api.runscope.com/buckets/bkt/tests/tst/results/run"
        );
    }

    #[test]
    fn test_trigger_response_parsing() {
        let body = r#"{
            "data": {
                "runs": [{
                    "bucket_key": "bkt",
                    "test_id": "tst",
                    "test_run_id": "run",
                    "test_name": "Smoke",
                    "status": "init"
                }],
                "runs_started": 1
            },
            "meta": {"status": "success"}
        }"#;
        let envelope: Envelope<TriggerData> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.data.runs.len(), 1);
        assert_eq!(envelope.data.runs[0].test_name.as_deref(), Some("Smoke"));
    }

    #[tokio::test]
    async fn test_relative_endpoint_rejected() {
        let invoker = HttpTriggerInvoker::default();
        let err = invoker.invoke("/radar/abc/trigger", "tok").await.unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint(_)));
    }
}
