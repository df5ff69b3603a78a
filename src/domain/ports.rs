use crate::domain::model::{
    CanonicalRecord, ImportRecord, ImportReport, LeaveBalance, LoadSummary, PushNotification,
    RecordType,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<CanonicalRecord>>;
    async fn transform(&self, data: Vec<CanonicalRecord>) -> Result<ImportReport>;
    async fn load(&self, report: &ImportReport) -> Result<LoadSummary>;
}

/// Relational persistence for validated import rows.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts every record in a single transaction; returns the number of rows written.
    async fn insert(&self, records: &[ImportRecord]) -> Result<usize>;
    async fn count(&self, record_type: RecordType) -> Result<usize>;
}

/// Push-messaging gateway. Delivery failures are reported as `false`, never as errors.
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn send(&self, device_token: &str, notification: &PushNotification) -> bool;
}

/// External realtime database keyed by faculty email.
#[async_trait]
pub trait RealtimeDirectory: Send + Sync {
    async fn device_tokens(&self, email: &str) -> Result<Vec<String>>;
    async fn publish_leave_balance(&self, email: &str, balance: &LeaveBalance) -> Result<()>;
}
