use std::time::Duration;

use anyhow::Result;
use reqwest::{header, Client};
use tracing::debug;

use super::types::*;
use crate::config::Config;

/// Client for the companion recommendation and hand-tracking service
pub struct TripClient {
    client: Client,
    base_url: String,
}

impl TripClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url(),
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "GET");

        let response = self.client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API request failed: {} - {}", status, body);
        }

        let result = response.json::<T>().await?;
        Ok(result)
    }

    async fn post<T: serde::de::DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "POST");

        let response = self.client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API request failed: {} - {}", status, body);
        }

        let result = response.json::<T>().await?;
        Ok(result)
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.get("/api/health").await
    }

    /// Current swipe gesture, if the tracker saw one
    pub async fn finger_track(&self) -> Result<Option<Swipe>> {
        let track: FingerTrack = self.get("/api/finger-track").await?;
        Ok(track.swipe())
    }

    pub async fn hand_position(&self) -> Result<HandPosition> {
        self.get("/api/view-adjust").await
    }

    pub async fn tracker_status(&self) -> Result<TrackerStatus> {
        self.get("/api/status").await
    }

    pub async fn recommendations(&self, request: &RecommendationRequest) -> Result<Vec<Recommendation>> {
        let response: RecommendationResponse = self.post("/api/recommendations", request).await?;
        Ok(response.recommendations)
    }

    /// Record a like/dislike for an item
    pub async fn submit_swipe(&self, action: &SwipeAction) -> Result<()> {
        let response: SwipeResponse = self.post("/api/swipe", action).await?;
        if !response.success {
            anyhow::bail!("Swipe for {} was not recorded", action.item_id);
        }
        Ok(())
    }

    pub async fn confidence_check(&self, request: &ConfidenceCheckRequest) -> Result<ConfidenceReport> {
        self.post("/api/confidence-check", request).await
    }

    /// Items to build a schedule from once the confidence check passes
    pub async fn high_confidence_items(&self, request: &ConfidenceCheckRequest) -> Result<Vec<Recommendation>> {
        let response: HighConfidenceResponse = self.post("/api/high-confidence-items", request).await?;
        Ok(response.items)
    }
}

/// Connection-class failures mean the service is down rather than misbehaving
pub fn is_offline_error(err: &anyhow::Error) -> bool {
    if let Some(e) = err.downcast_ref::<reqwest::Error>() {
        if e.is_connect() || e.is_timeout() {
            return true;
        }
    }
    let err_str = err.to_string().to_lowercase();
    err_str.contains("connection")
        || err_str.contains("network")
        || err_str.contains("error sending request")
        || err_str.contains("timeout")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_offline_errors() {
        assert!(is_offline_error(&anyhow::anyhow!("error sending request for url")));
        assert!(is_offline_error(&anyhow::anyhow!("Connection refused")));
        assert!(!is_offline_error(&anyhow::anyhow!("API request failed: 500 - boom")));
    }
}
