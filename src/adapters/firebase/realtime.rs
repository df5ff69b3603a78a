use crate::adapters::firebase::auth::ServiceAccountAuth;
use crate::domain::model::LeaveBalance;
use crate::domain::ports::RealtimeDirectory;
use crate::utils::error::Result;
use crate::utils::keys::firebase_key_from_email;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;

const TOKENS_NODE: &str = "device_tokens";
const BALANCES_NODE: &str = "leave_balances";

/// Realtime database over its REST interface (`{url}/{path}.json`).
pub struct RealtimeDbDirectory {
    auth: Arc<ServiceAccountAuth>,
    client: Client,
    database_url: String,
}

impl RealtimeDbDirectory {
    pub fn new(auth: Arc<ServiceAccountAuth>, client: Client, database_url: &str) -> Self {
        Self {
            auth,
            client,
            database_url: database_url.trim_end_matches('/').to_string(),
        }
    }

    fn node_url(&self, node: &str, email: &str) -> String {
        format!(
            "{}/{}/{}.json",
            self.database_url,
            node,
            firebase_key_from_email(email)
        )
    }
}

/// Accepts the shapes the mobile app has written over time: a single token,
/// a list, or a map of `{token: true}` / `{id: token}`.
pub fn tokens_from_value(value: Value) -> Vec<String> {
    match value {
        Value::String(token) if !token.is_empty() => vec![token],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(token) if !token.is_empty() => Some(token),
                _ => None,
            })
            .collect(),
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(key, item)| match item {
                Value::String(token) if !token.is_empty() => Some(token),
                Value::Bool(true) => Some(key),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[async_trait]
impl RealtimeDirectory for RealtimeDbDirectory {
    async fn device_tokens(&self, email: &str) -> Result<Vec<String>> {
        let bearer = self.auth.access_token().await?;
        let url = self.node_url(TOKENS_NODE, email);
        tracing::debug!("Looking up device tokens at {}", url);

        let value: Value = self
            .client
            .get(&url)
            .bearer_auth(bearer)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(tokens_from_value(value))
    }

    async fn publish_leave_balance(&self, email: &str, balance: &LeaveBalance) -> Result<()> {
        let bearer = self.auth.access_token().await?;
        self.client
            .put(self.node_url(BALANCES_NODE, email))
            .bearer_auth(bearer)
            .json(balance)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
