mod env_overrides;
pub mod log;
pub mod selection;

use config::{Config, File, FileFormat, FileSourceFile};
use envconfig::Envconfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{
    env_overrides::{EnvVarOverrides, EnvVarOverridesError},
    log::LoggingConfig,
    selection::SelectionConfig,
};

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ProjectionPlannerConfig {
    /// The logger configuration.
    ///
    /// By default only warnings and errors are printed, as a tree.
    #[serde(default)]
    pub log: LoggingConfig,

    /// How operations are turned into requested-field trees, and how those are compiled.
    #[serde(default)]
    pub selection: SelectionConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum PlannerConfigError {
    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(#[from] config::ConfigError),
    #[error("Failed to apply configuration overrides: {0}")]
    EnvVarOverridesError(#[from] EnvVarOverridesError),
    #[error("Failed to load the environment variables: {0}")]
    EnvVarLoadError(#[from] envconfig::Error),
    #[error("selection.max_depth must be at least 1")]
    InvalidMaxDepth,
}

static DEFAULT_FILE_NAMES: &[&str] = &[
    "planner.config.yaml",
    "planner.config.yml",
    "planner.config.json",
];

/// Loads the configuration from `override_config_path`, or from the first
/// `planner.config.*` file of the working directory, then applies the
/// environment overrides.
pub fn load_config(
    override_config_path: Option<String>,
) -> Result<ProjectionPlannerConfig, PlannerConfigError> {
    let env_overrides = EnvVarOverrides::init_from_env()?;
    let mut config = Config::builder();

    if let Some(path_str) = override_config_path {
        let as_file: File<FileSourceFile, _> = PathBuf::from(path_str).into();
        config = config.add_source(as_file.required(true));
    } else {
        for name in DEFAULT_FILE_NAMES {
            config = config.add_source(File::with_name(name).required(false));
        }
    }

    config = env_overrides.apply_overrides(config)?;

    let loaded = config
        .build()?
        .try_deserialize::<ProjectionPlannerConfig>()?;

    validate(loaded)
}

pub fn parse_yaml_config(config_raw: String) -> Result<ProjectionPlannerConfig, PlannerConfigError> {
    let parsed = Config::builder()
        .add_source(File::from_str(&config_raw, FileFormat::Yaml))
        .build()?
        .try_deserialize::<ProjectionPlannerConfig>()?;

    validate(parsed)
}

fn validate(config: ProjectionPlannerConfig) -> Result<ProjectionPlannerConfig, PlannerConfigError> {
    if config.selection.max_depth == 0 {
        return Err(PlannerConfigError::InvalidMaxDepth);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use config::{Config, File, FileFormat};

    use super::*;
    use crate::log::{LogFormat, LogLevel};

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse_yaml_config("{}".to_string()).unwrap();

        assert_eq!(config.log.level, LogLevel::Warn);
        assert_eq!(config.log.format, LogFormat::PrettyTree);
        assert_eq!(config.log.env_filter_str(), "warn");
        assert_eq!(config.selection, SelectionConfig::default());
        assert_eq!(config.selection.max_depth, 5);
        assert_eq!(config.selection.embedded_separator, ".");
        assert_eq!(config.selection.pagination_item_fields, ["data", "edges"]);
    }

    #[test]
    fn reads_yaml_sections() {
        let config = parse_yaml_config(
            r#"
log:
  level: debug
  format: json
  filter: projection_planner=trace
selection:
  max_depth: 3
  embedded_separator: "__"
  pagination_item_fields: [nodes]
"#
            .to_string(),
        )
        .unwrap();

        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.env_filter_str(), "projection_planner=trace");
        assert_eq!(config.selection.max_depth, 3);
        assert_eq!(config.selection.embedded_separator, "__");
        assert_eq!(config.selection.pagination_item_fields, ["nodes"]);
    }

    #[test]
    fn rejects_unknown_fields_and_zero_depth() {
        assert!(matches!(
            parse_yaml_config("selection:\n  depth: 3\n".to_string()),
            Err(PlannerConfigError::ConfigLoadError(_))
        ));
        assert!(matches!(
            parse_yaml_config("selection:\n  max_depth: 0\n".to_string()),
            Err(PlannerConfigError::InvalidMaxDepth)
        ));
    }

    #[test]
    fn environment_overrides_win_over_files() {
        let overrides = EnvVarOverrides {
            log_level: Some(LogLevel::Trace),
            log_format: Some(LogFormat::PrettyCompact),
            log_filter: None,
            max_depth: Some(8),
        };
        let builder = Config::builder().add_source(File::from_str(
            "log:\n  level: error\nselection:\n  max_depth: 2\n",
            FileFormat::Yaml,
        ));

        let config = overrides
            .apply_overrides(builder)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<ProjectionPlannerConfig>()
            .unwrap();

        assert_eq!(config.log.level, LogLevel::Trace);
        assert_eq!(config.log.format, LogFormat::PrettyCompact);
        assert_eq!(config.selection.max_depth, 8);
    }

    #[test]
    fn zero_depth_override_is_rejected() {
        let overrides = EnvVarOverrides {
            log_level: None,
            log_format: None,
            log_filter: None,
            max_depth: Some(0),
        };

        assert!(matches!(
            overrides.apply_overrides(Config::builder()),
            Err(EnvVarOverridesError::InvalidMaxDepth)
        ));
    }

    #[test]
    fn json_schema_documents_planner_sections() {
        let schema = serde_json::to_string(&schemars::schema_for!(ProjectionPlannerConfig)).unwrap();

        assert!(schema.contains("max_depth"));
        assert!(schema.contains("pagination_item_fields"));
        assert!(schema.contains("pretty-tree"));
        assert!(schema.contains("LOG_FILTER"));
    }
}
