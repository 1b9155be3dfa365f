pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::TomlConfig;

pub use core::{etl::EtlEngine, pipeline::FilePipeline};
pub use core::{read_output, run_transform, TransformOptions};
pub use domain::model::{
    ClusterEvent, MonthSummary, NormalizedTransaction, PipelineOutput, RawTransaction,
    SummaryGroup, TransformReport,
};
pub use utils::error::{EtlError, Result};
