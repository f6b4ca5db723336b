//! HTTP fetch port: plain JSON GET.

use async_trait::async_trait;

use crate::error::SkillError;

#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// GET `url` and decode the body as JSON.
    ///
    /// Network failures, non-2xx statuses and undecodable bodies all surface
    /// as [`SkillError::ExternalCallFailure`].
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, SkillError>;
}
