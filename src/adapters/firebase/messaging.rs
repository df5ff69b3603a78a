use crate::adapters::firebase::auth::ServiceAccountAuth;
use crate::domain::model::PushNotification;
use crate::domain::ports::PushGateway;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

pub const DEFAULT_MESSAGING_ENDPOINT: &str = "https://fcm.googleapis.com";

/// FCM HTTP v1 sender. One request per device token, no retries.
pub struct FcmGateway {
    auth: Arc<ServiceAccountAuth>,
    client: Client,
    send_url: String,
}

impl FcmGateway {
    pub fn new(auth: Arc<ServiceAccountAuth>, client: Client, endpoint: &str) -> Self {
        let send_url = format!(
            "{}/v1/projects/{}/messages:send",
            endpoint.trim_end_matches('/'),
            auth.project_id()
        );
        Self {
            auth,
            client,
            send_url,
        }
    }

    /// The message envelope the mobile client expects.
    pub fn envelope(device_token: &str, notification: &PushNotification) -> Value {
        json!({
            "message": {
                "token": device_token,
                "notification": {
                    "title": notification.title,
                    "body": notification.body,
                },
                "data": notification.data,
            }
        })
    }

    async fn try_send(
        &self,
        device_token: &str,
        notification: &PushNotification,
    ) -> Result<StatusCode> {
        let bearer = self.auth.access_token().await?;
        let response = self
            .client
            .post(&self.send_url)
            .bearer_auth(bearer)
            .json(&Self::envelope(device_token, notification))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("FCM rejected message ({}): {}", status, body);
        }
        Ok(status)
    }
}

#[async_trait]
impl PushGateway for FcmGateway {
    async fn send(&self, device_token: &str, notification: &PushNotification) -> bool {
        match self.try_send(device_token, notification).await {
            Ok(status) => status == StatusCode::OK,
            Err(e) => {
                tracing::warn!("Push delivery failed: {}", e);
                false
            }
        }
    }
}
