use crate::core::transform::TransformOptions;
use crate::domain::model::{RawBatch, TransformResult};
use crate::adapters::InputFormat;
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

pub trait ConfigProvider: Send + Sync {
    fn individual_path(&self) -> String;
    fn pac_path(&self) -> String;
    fn input_format(&self) -> InputFormat;
    fn output_path(&self) -> String;
    fn transform_options(&self) -> TransformOptions;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<RawBatch>;
    async fn transform(&self, batch: RawBatch) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
