pub mod cluster;
pub mod dedup;
pub mod etl;
pub mod normalizer;
pub mod pipeline;
pub mod refund;
pub mod summary;
pub mod transform;

pub use crate::domain::model::{RawBatch, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
pub use transform::{read_output, run_transform, transform_batch, TransformOptions};
