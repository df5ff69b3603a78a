use crate::domain::model::{ImportReport, LoadSummary};
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub report: ImportReport,
    /// `None` when nothing was written: validation errors or a dry run.
    pub load: Option<LoadSummary>,
}

impl ImportOutcome {
    pub fn is_success(&self) -> bool {
        self.report.is_valid()
    }
}

pub struct ImportEngine<P: Pipeline> {
    pipeline: P,
    dry_run: bool,
}

impl<P: Pipeline> ImportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Extract → transform → load. Any validation error skips the load, so an
    /// upload is stored completely or not at all.
    pub async fn run(&self) -> Result<ImportOutcome> {
        tracing::info!("Starting import...");

        let rows = self.pipeline.extract().await?;
        tracing::info!("Parsed {} data rows", rows.len());

        let report = self.pipeline.transform(rows).await?;

        if !report.is_valid() {
            tracing::warn!(
                "❌ {} validation errors in {} rows; nothing was imported",
                report.errors.len(),
                report.rows_read
            );
            return Ok(ImportOutcome { report, load: None });
        }

        if self.dry_run {
            tracing::info!(
                "🔍 Dry run: {} {} records are valid, skipping load",
                report.records.len(),
                report.record_type
            );
            return Ok(ImportOutcome { report, load: None });
        }

        let summary = self.pipeline.load(&report).await?;
        tracing::info!(
            "✅ Imported {} {} records",
            summary.inserted,
            report.record_type
        );

        Ok(ImportOutcome {
            report,
            load: Some(summary),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CanonicalRecord, RecordType, ValidationError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubPipeline {
        errors: Vec<ValidationError>,
        loads: AtomicUsize,
    }

    impl StubPipeline {
        fn new(errors: Vec<ValidationError>) -> Self {
            Self {
                errors,
                loads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for StubPipeline {
        async fn extract(&self) -> Result<Vec<CanonicalRecord>> {
            Ok(vec![CanonicalRecord::new(0, Default::default())])
        }

        async fn transform(&self, data: Vec<CanonicalRecord>) -> Result<ImportReport> {
            Ok(ImportReport {
                record_type: RecordType::Invigilation,
                rows_read: data.len(),
                records: Vec::new(),
                errors: self.errors.clone(),
            })
        }

        async fn load(&self, _report: &ImportReport) -> Result<LoadSummary> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(LoadSummary {
                inserted: 1,
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn test_valid_report_is_loaded() {
        let engine = ImportEngine::new(StubPipeline::new(Vec::new()));
        let outcome = engine.run().await.unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.load.unwrap().inserted, 1);
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_skip_load() {
        let errors = vec![ValidationError::missing_field(2, "room")];
        let engine = ImportEngine::new(StubPipeline::new(errors));
        let outcome = engine.run().await.unwrap();

        assert!(!outcome.is_success());
        assert!(outcome.load.is_none());
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dry_run_skips_load() {
        let engine = ImportEngine::new(StubPipeline::new(Vec::new())).with_dry_run(true);
        let outcome = engine.run().await.unwrap();

        assert!(outcome.is_success());
        assert!(outcome.load.is_none());
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 0);
    }
}
