use crate::adapters::parse_records;
use crate::core::transform::transform_batch;
use crate::core::{ConfigProvider, Pipeline, RawBatch, Storage, TransformResult};
use crate::domain::model::{RawSet, RecordSet};
use crate::utils::error::{EtlError, Result};

/// Reads the fetch step's JSON files, runs the transformation, writes one output document.
pub struct FilePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> FilePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    async fn read_set(&self, set: RecordSet, path: &str) -> Result<RawSet> {
        let data = match self.storage.read_file(path).await {
            Ok(data) => data,
            Err(EtlError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("{} input not found at {}, treating it as empty", set, path);
                return Ok(RawSet::default());
            }
            Err(e) => return Err(e),
        };

        let parsed = parse_records(set, self.config.input_format(), &data)?;
        tracing::info!("Read {} {} records from {}", parsed.records.len(), set, path);
        if parsed.non_contributions > 0 {
            tracing::info!(
                "Skipped {} {} disbursements that are not contributions",
                parsed.non_contributions,
                set
            );
        }
        if !parsed.unreadable.is_empty() {
            tracing::warn!("{} unreadable {} entries in {}", parsed.unreadable.len(), set, path);
        }
        Ok(parsed)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for FilePipeline<S, C> {
    async fn extract(&self) -> Result<RawBatch> {
        let individual = self
            .read_set(RecordSet::Individual, &self.config.individual_path())
            .await?;
        let pac = self.read_set(RecordSet::Pac, &self.config.pac_path()).await?;
        Ok(RawBatch { individual, pac })
    }

    async fn transform(&self, batch: RawBatch) -> Result<TransformResult> {
        let options = self.config.transform_options();
        tracing::debug!("Transform options: {:?}", options);

        // CPU-bound over the full batch; nothing is aggregated until every record is normalized.
        let result = tokio::task::spawn_blocking(move || transform_batch(&batch, &options))
        .await
        .map_err(|e| EtlError::ProcessingError {
            message: format!("transform task failed: {}", e),
        })?;

        Ok(result)
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = self.config.output_path();
        let json = serde_json::to_vec_pretty(&result.output)?;

        tracing::debug!("Writing {} bytes to {}", json.len(), output_path);
        self.storage.write_file(&output_path, &json).await?;

        Ok(output_path)
    }
}
