use crate::adapters::InputFormat;
use crate::config::{
    join_path, DEFAULT_INDIVIDUAL_FILE, DEFAULT_OUTPUT_FILE, DEFAULT_PAC_FILE, MAX_WINDOW_DAYS,
};
use crate::core::cluster::{ClusterConfig, OwnPac};
use crate::core::refund::RefundMode;
use crate::core::{ConfigProvider, TransformOptions};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_file_name, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, validate_resolved, Validate,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

static ENV_VAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub clustering: Option<ClusteringConfig>,
    pub refunds: Option<RefundsConfig>,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input_dir: String,
    pub individual_file: Option<String>,
    pub pac_file: Option<String>,
    pub format: Option<InputFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    pub window_days: Option<u32>,
    pub min_donors: Option<usize>,
    /// Employer keyword -> the committee id of that employer's own PAC.
    pub own_pacs: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundsConfig {
    pub pac_mode: Option<RefundMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_dir: String,
    pub filename: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left verbatim.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn individual_file(&self) -> &str {
        self.source
            .individual_file
            .as_deref()
            .unwrap_or(DEFAULT_INDIVIDUAL_FILE)
    }

    pub fn pac_file(&self) -> &str {
        self.source.pac_file.as_deref().unwrap_or(DEFAULT_PAC_FILE)
    }

    pub fn output_file(&self) -> &str {
        self.load.filename.as_deref().unwrap_or(DEFAULT_OUTPUT_FILE)
    }

    pub fn cluster_config(&self) -> ClusterConfig {
        let defaults = ClusterConfig::default();
        let Some(section) = &self.clustering else {
            return defaults;
        };

        ClusterConfig {
            window_days: section.window_days.unwrap_or(defaults.window_days),
            min_donors: section.min_donors.unwrap_or(defaults.min_donors),
            own_pacs: section
                .own_pacs
                .iter()
                .flatten()
                .map(|(keyword, id)| OwnPac {
                    employer_keyword: keyword.clone(),
                    committee_id: id.clone(),
                })
                .collect(),
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        validate_path("source.input_dir", &self.source.input_dir)?;
        validate_file_name("source.individual_file", self.individual_file())?;
        validate_file_name("source.pac_file", self.pac_file())?;
        validate_path("load.output_dir", &self.load.output_dir)?;
        validate_file_name("load.filename", self.output_file())?;
        for (field, value) in [
            ("source.input_dir", self.source.input_dir.as_str()),
            ("source.individual_file", self.individual_file()),
            ("source.pac_file", self.pac_file()),
            ("load.output_dir", self.load.output_dir.as_str()),
            ("load.filename", self.output_file()),
        ] {
            validate_resolved(field, value)?;
        }

        let clustering = self.cluster_config();
        validate_range("clustering.window_days", clustering.window_days, 0, MAX_WINDOW_DAYS)?;
        validate_positive_number("clustering.min_donors", clustering.min_donors, 1)?;
        for pac in &clustering.own_pacs {
            validate_non_empty_string("clustering.own_pacs", &pac.employer_keyword)?;
            validate_non_empty_string("clustering.own_pacs", &pac.committee_id)?;
            validate_resolved("clustering.own_pacs", &pac.committee_id)?;
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn individual_path(&self) -> String {
        join_path(&self.source.input_dir, self.individual_file())
    }

    fn pac_path(&self) -> String {
        join_path(&self.source.input_dir, self.pac_file())
    }

    fn input_format(&self) -> InputFormat {
        self.source.format.unwrap_or_default()
    }

    fn output_path(&self) -> String {
        join_path(&self.load.output_dir, self.output_file())
    }

    fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            clustering: self.cluster_config(),
            pac_refunds: self
                .refunds
                .as_ref()
                .and_then(|r| r.pac_mode)
                .unwrap_or_default(),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
