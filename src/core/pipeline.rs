use crate::core::rows::RowParser;
use crate::core::validator::build_report;
use crate::domain::model::{
    CanonicalRecord, ImportRecord, ImportReport, LeaveBalance, LoadSummary, RecordType,
};
use crate::domain::ports::{Pipeline, RealtimeDirectory, RecordStore, Storage};
use crate::utils::error::Result;
use std::sync::Arc;

/// Reads one uploaded file, validates it as `record_type`, and writes the
/// valid records to the record store.
pub struct ImportPipeline<S: Storage> {
    storage: S,
    upload_path: String,
    record_type: RecordType,
    store: Arc<dyn RecordStore>,
    balance_sync: Option<Arc<dyn RealtimeDirectory>>,
}

impl<S: Storage> ImportPipeline<S> {
    pub fn new(
        storage: S,
        upload_path: impl Into<String>,
        record_type: RecordType,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            storage,
            upload_path: upload_path.into(),
            record_type,
            store,
            balance_sync: None,
        }
    }

    /// Publish leave balances to the realtime directory after a leave-master load.
    pub fn with_balance_sync(mut self, directory: Option<Arc<dyn RealtimeDirectory>>) -> Self {
        self.balance_sync = directory;
        self
    }

    async fn publish_balances(
        &self,
        directory: &Arc<dyn RealtimeDirectory>,
        records: &[ImportRecord],
        summary: &mut LoadSummary,
    ) {
        for record in records {
            let ImportRecord::FacultyLeaveMaster(leave) = record else {
                continue;
            };
            let balance = LeaveBalance::from(leave);
            match directory
                .publish_leave_balance(record.faculty_email(), &balance)
                .await
            {
                Ok(()) => summary.balances_published += 1,
                Err(e) => {
                    tracing::warn!(
                        "Failed to publish leave balance for {}: {}",
                        leave.employee_id,
                        e
                    );
                    summary.balances_failed += 1;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for ImportPipeline<S> {
    async fn extract(&self) -> Result<Vec<CanonicalRecord>> {
        let content = self.storage.read_file(&self.upload_path).await?;
        tracing::debug!("Read {} bytes from {}", content.len(), self.upload_path);

        let parser = RowParser::from_bytes(&content)?;
        let missing: Vec<&str> = self
            .record_type
            .required_fields()
            .iter()
            .copied()
            .filter(|field| !parser.headers().iter().any(|h| h == field))
            .collect();
        if !missing.is_empty() {
            tracing::warn!(
                "Header row has no column for: {} (every row will report them missing)",
                missing.join(", ")
            );
        }

        parser.collect()
    }

    async fn transform(&self, data: Vec<CanonicalRecord>) -> Result<ImportReport> {
        let report = build_report(data, self.record_type);
        tracing::debug!(
            "Validated {} rows: {} valid, {} errors",
            report.rows_read,
            report.records.len(),
            report.errors.len()
        );
        Ok(report)
    }

    async fn load(&self, report: &ImportReport) -> Result<LoadSummary> {
        let mut summary = LoadSummary {
            inserted: self.store.insert(&report.records).await?,
            ..LoadSummary::default()
        };

        if self.record_type == RecordType::FacultyLeaveMaster {
            if let Some(directory) = &self.balance_sync {
                self.publish_balances(directory, &report.records, &mut summary)
                    .await;
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryDirectory, MemoryRecordStore};
    use crate::utils::error::TimetableError;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn with_file(path: &str, content: &str) -> Self {
            let storage = Self::default();
            storage
                .files
                .lock()
                .await
                .insert(path.to_string(), content.as_bytes().to_vec());
            storage
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                TimetableError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    const LEAVE_CSV: &str = "Emp ID;Name;Dept;Email;Total Leaves;CL;EL;ML\n\
E1;Asha Rao;CSE;Asha@College.edu;20;8;8;4\n\
E2;Ravi K;ECE;ravi@college.edu;18;6;6;6\n";

    #[tokio::test]
    async fn test_extract_normalizes_headers() {
        let storage = MockStorage::with_file("leave.csv", LEAVE_CSV).await;
        let pipeline = ImportPipeline::new(
            storage,
            "leave.csv",
            RecordType::FacultyLeaveMaster,
            Arc::new(MemoryRecordStore::new()),
        );

        let rows = pipeline.extract().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("employee_id"), Some("E1"));
        assert_eq!(rows[0].get("department"), Some("CSE"));
        assert_eq!(rows[1].get("ml"), Some("6"));
    }

    #[tokio::test]
    async fn test_extract_missing_upload() {
        let pipeline = ImportPipeline::new(
            MockStorage::default(),
            "missing.csv",
            RecordType::Lecture,
            Arc::new(MemoryRecordStore::new()),
        );
        assert!(matches!(
            pipeline.extract().await,
            Err(TimetableError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn test_load_publishes_leave_balances() {
        let storage = MockStorage::with_file("leave.csv", LEAVE_CSV).await;
        let store = Arc::new(MemoryRecordStore::new());
        let directory = Arc::new(MemoryDirectory::new());
        let pipeline = ImportPipeline::new(
            storage,
            "leave.csv",
            RecordType::FacultyLeaveMaster,
            store.clone(),
        )
        .with_balance_sync(Some(directory.clone() as Arc<dyn RealtimeDirectory>));

        let rows = pipeline.extract().await.unwrap();
        let report = pipeline.transform(rows).await.unwrap();
        assert!(report.is_valid());

        let summary = pipeline.load(&report).await.unwrap();
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.balances_published, 2);
        assert_eq!(summary.balances_failed, 0);

        let balance = directory.balance("asha@college.edu").await.unwrap();
        assert_eq!(balance.cl, 8.0);
        assert_eq!(store.count(RecordType::FacultyLeaveMaster).await.unwrap(), 2);
    }
}
