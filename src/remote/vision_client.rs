use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::errors::ServiceError;
use crate::models::ImagePayload;
use crate::services::AnalysisBackend;

/// Hard deadline for the analysis call; the collaborator itself enforces
/// none.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    image: &'a str,
}

/// Body shape the service uses for non-2xx outcomes.
#[derive(Debug, Deserialize)]
struct RemoteFailure {
    error: String,
}

/// HTTP client for the external vision-analysis service.
#[derive(Debug)]
pub struct VisionClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl VisionClient {
    pub fn new(endpoint: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            endpoint,
            api_key,
        }
    }

    /// Reads `ANALYZER_URL` (required) and `ANALYZER_API_KEY` (optional).
    pub fn from_env() -> Result<Self, ServiceError> {
        let endpoint =
            env::var("ANALYZER_URL").map_err(|_| ServiceError::MissingConfig("ANALYZER_URL"))?;
        let api_key = env::var("ANALYZER_API_KEY").ok();
        Ok(Self::new(endpoint, api_key))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisBackend for VisionClient {
    async fn analyze(&self, image: &ImagePayload) -> Result<String, ServiceError> {
        info!("submitting chart image to {}", self.endpoint);

        let mut request = self.client.post(&self.endpoint).json(&AnalyzeRequest {
            image: &image.data_uri,
        });
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = match response.json::<RemoteFailure>().await {
                Ok(failure) => failure.error,
                Err(_) => "analysis service returned no error detail".to_string(),
            };
            error!("analysis service failed ({status}): {message}");
            return Err(ServiceError::Remote { status, message });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_requires_endpoint() {
        // Process-global env mutation, no other test in this binary reads it.
        unsafe {
            env::remove_var("ANALYZER_URL");
        }
        let err = VisionClient::from_env().unwrap_err();
        assert!(matches!(err, ServiceError::MissingConfig("ANALYZER_URL")));
    }

    #[test]
    fn request_body_uses_image_key() {
        let body = serde_json::to_value(AnalyzeRequest {
            image: "data:image/jpeg;base64,abcd",
        })
        .unwrap();
        assert_eq!(body["image"], "data:image/jpeg;base64,abcd");
    }
}
