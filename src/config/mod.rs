pub mod cli;
pub mod toml_config;

pub const DEFAULT_INPUT_DIR: &str = "./static/data";
pub const DEFAULT_INDIVIDUAL_FILE: &str = "contributions.json";
pub const DEFAULT_PAC_FILE: &str = "pac_contributions.json";
pub const DEFAULT_OUTPUT_FILE: &str = "formatted_contributions.json";

/// Upper bound for `window_days` from any configuration source.
pub const MAX_WINDOW_DAYS: u32 = 366;

pub(crate) fn join_path(dir: &str, file: &str) -> String {
    std::path::Path::new(dir).join(file).to_string_lossy().into_owned()
}

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use super::*;
    use crate::adapters::InputFormat;
    use crate::core::cluster::{ClusterConfig, OwnPac};
    use crate::core::refund::RefundMode;
    use crate::core::{ConfigProvider, TransformOptions};
    use crate::utils::error::Result;
    use crate::utils::validation::{
        validate_file_name, validate_path, validate_positive_number, validate_range, Validate,
    };
    use clap::Parser;

    fn parse_own_pac(value: &str) -> std::result::Result<OwnPac, String> {
        match value.split_once('=') {
            Some((keyword, id)) if !keyword.trim().is_empty() && !id.trim().is_empty() => Ok(OwnPac {
                employer_keyword: keyword.trim().to_string(),
                committee_id: id.trim().to_string(),
            }),
            _ => Err(format!("expected EMPLOYER=COMMITTEE_ID, got '{}'", value)),
        }
    }

    #[derive(Debug, Clone, Parser)]
    #[command(name = "contrib-etl")]
    #[command(about = "Cleans FEC contribution records and detects executive donation clusters")]
    pub struct CliConfig {
        /// TOML configuration file; when given, it replaces the pipeline flags below
        #[arg(short, long)]
        pub config: Option<String>,

        #[arg(long, default_value = DEFAULT_INPUT_DIR)]
        pub input_dir: String,

        #[arg(long, default_value = DEFAULT_INDIVIDUAL_FILE)]
        pub individual_file: String,

        #[arg(long, default_value = DEFAULT_PAC_FILE)]
        pub pac_file: String,

        #[arg(long, value_enum, default_value_t = InputFormat::Fec)]
        pub format: InputFormat,

        #[arg(long, default_value = DEFAULT_INPUT_DIR)]
        pub output_dir: String,

        #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
        pub output_file: String,

        /// Days between consecutive contributions that still chain into one cluster
        #[arg(long, default_value = "30")]
        pub window_days: u32,

        /// Minimum distinct donors for a cluster to be emitted
        #[arg(long, default_value = "2")]
        pub min_donors: usize,

        /// Employer's own PAC, excluded from clustering (repeatable)
        #[arg(long = "own-pac", value_name = "EMPLOYER=COMMITTEE_ID", value_parser = parse_own_pac)]
        pub own_pacs: Vec<OwnPac>,

        #[arg(long, value_enum, default_value_t = RefundMode::Track)]
        pub pac_refunds: RefundMode,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub log_json: bool,

        #[arg(long, help = "Run extract and transform without writing output")]
        pub dry_run: bool,
    }

    impl ConfigProvider for CliConfig {
        fn individual_path(&self) -> String {
            join_path(&self.input_dir, &self.individual_file)
        }

        fn pac_path(&self) -> String {
            join_path(&self.input_dir, &self.pac_file)
        }

        fn input_format(&self) -> InputFormat {
            self.format
        }

        fn output_path(&self) -> String {
            join_path(&self.output_dir, &self.output_file)
        }

        fn transform_options(&self) -> TransformOptions {
            TransformOptions {
                clustering: ClusterConfig {
                    window_days: self.window_days,
                    min_donors: self.min_donors,
                    own_pacs: self.own_pacs.clone(),
                },
                pac_refunds: self.pac_refunds,
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_path("input_dir", &self.input_dir)?;
            validate_file_name("individual_file", &self.individual_file)?;
            validate_file_name("pac_file", &self.pac_file)?;
            validate_path("output_dir", &self.output_dir)?;
            validate_file_name("output_file", &self.output_file)?;
            validate_range("window_days", self.window_days, 0, MAX_WINDOW_DAYS)?;
            validate_positive_number("min_donors", self.min_donors, 1)?;
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = CliConfig::parse_from(["contrib-etl"]);
            assert!(config.validate().is_ok());
            assert_eq!(config.format, InputFormat::Fec);
            assert_eq!(config.pac_refunds, RefundMode::Track);
            assert!(config.individual_path().ends_with("contributions.json"));
            assert_eq!(config.transform_options().clustering, ClusterConfig::default());
        }

        #[test]
        fn test_own_pac_flags() {
            let config = CliConfig::parse_from([
                "contrib-etl",
                "--own-pac",
                "Google=C00428623",
                "--own-pac",
                "Microsoft = C00227546",
                "--min-donors",
                "3",
            ]);
            let options = config.transform_options();
            assert_eq!(options.clustering.min_donors, 3);
            assert_eq!(options.clustering.own_pacs.len(), 2);
            assert_eq!(options.clustering.own_pacs[1].employer_keyword, "Microsoft");
            assert_eq!(options.clustering.own_pacs[1].committee_id, "C00227546");

            assert!(CliConfig::try_parse_from(["contrib-etl", "--own-pac", "Google"]).is_err());
        }

        #[test]
        fn test_validation_rejects_bad_values() {
            let zero = CliConfig::parse_from(["contrib-etl", "--min-donors", "0"]);
            assert!(zero.validate().is_err());

            let wide = CliConfig::parse_from(["contrib-etl", "--window-days", "1000"]);
            assert!(wide.validate().is_err());

            let escape = CliConfig::parse_from(["contrib-etl", "--output-file", "../out.json"]);
            assert!(escape.validate().is_err());
        }
    }
}
