//! JSON-over-HTTP fetcher backed by `reqwest`.

use async_trait::async_trait;
use skiff_config::HttpConfig;
use skiff_core::error::SkillError;
use skiff_core::fetch::HttpFetcher;
use std::time::Duration;
use tracing::debug;

pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, SkillError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SkillError::ExternalCallFailure(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, SkillError> {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SkillError::ExternalCallFailure(format!("GET {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SkillError::ExternalCallFailure(format!("GET {url} returned {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| SkillError::ExternalCallFailure(format!("Invalid JSON from {url}: {e}")))
    }
}
