//! In-memory implementations of the ports, used by the `in_memory` backend
//! mode and by tests.

use crate::domain::model::{ImportRecord, LeaveBalance, PushNotification, RecordType};
use crate::domain::ports::{PushGateway, RealtimeDirectory, RecordStore};
use crate::utils::error::Result;
use crate::utils::keys::firebase_key_from_email;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<ImportRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<ImportRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, records: &[ImportRecord]) -> Result<usize> {
        let mut stored = self.records.lock().await;
        for record in records {
            // 與 SQLite 一致：請假主檔以 employee_id 覆寫
            if let ImportRecord::FacultyLeaveMaster(leave) = record {
                stored.retain(|existing| match existing {
                    ImportRecord::FacultyLeaveMaster(e) => e.employee_id != leave.employee_id,
                    _ => true,
                });
            }
            stored.push(record.clone());
        }
        Ok(records.len())
    }

    async fn count(&self, record_type: RecordType) -> Result<usize> {
        let stored = self.records.lock().await;
        Ok(stored
            .iter()
            .filter(|r| r.record_type() == record_type)
            .count())
    }
}

/// Records every message instead of delivering it. Tokens registered with
/// [`MemoryPushGateway::reject_token`] report a failed delivery.
#[derive(Default)]
pub struct MemoryPushGateway {
    sent: Mutex<Vec<(String, PushNotification)>>,
    rejected: Mutex<HashSet<String>>,
}

impl MemoryPushGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn reject_token(&self, token: &str) {
        self.rejected.lock().await.insert(token.to_string());
    }

    pub async fn sent(&self) -> Vec<(String, PushNotification)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl PushGateway for MemoryPushGateway {
    async fn send(&self, device_token: &str, notification: &PushNotification) -> bool {
        if self.rejected.lock().await.contains(device_token) {
            tracing::debug!("In-memory gateway rejecting token {}", device_token);
            return false;
        }
        self.sent
            .lock()
            .await
            .push((device_token.to_string(), notification.clone()));
        true
    }
}

/// Realtime directory held in maps keyed the same way as the remote one.
#[derive(Default)]
pub struct MemoryDirectory {
    tokens: Mutex<HashMap<String, Vec<String>>>,
    balances: Mutex<HashMap<String, LeaveBalance>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_token(&self, email: &str, token: &str) {
        self.tokens
            .lock()
            .await
            .entry(firebase_key_from_email(email))
            .or_default()
            .push(token.to_string());
    }

    pub async fn balance(&self, email: &str) -> Option<LeaveBalance> {
        self.balances
            .lock()
            .await
            .get(&firebase_key_from_email(email))
            .cloned()
    }
}

#[async_trait]
impl RealtimeDirectory for MemoryDirectory {
    async fn device_tokens(&self, email: &str) -> Result<Vec<String>> {
        Ok(self
            .tokens
            .lock()
            .await
            .get(&firebase_key_from_email(email))
            .cloned()
            .unwrap_or_default())
    }

    async fn publish_leave_balance(&self, email: &str, balance: &LeaveBalance) -> Result<()> {
        self.balances
            .lock()
            .await
            .insert(firebase_key_from_email(email), balance.clone());
        Ok(())
    }
}
