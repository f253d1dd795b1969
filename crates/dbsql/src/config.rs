//! Task definitions as they appear in YAML task files.
//!
//! ```yaml
//! operator: copy_into
//! databricks_conn_id: warehouse
//! http_path: /sql/1.0/warehouses/abc
//! table_name: events
//! file_location: s3://bucket/events/
//! file_format: JSON
//! pattern: "2024-.*\\.json"
//! force_copy: true
//! ```

use crate::copy_into::{CopyIntoRequest, OptionMap};
use crate::hook::{ConnectionConfig, DEFAULT_CONN_ID, Parameters, Sql};
use crate::output::CsvParams;
use crate::sql_task::SqlRequest;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Fields of a `sql` task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqlTaskConfig {
    #[serde(default = "default_conn_id")]
    pub databricks_conn_id: String,
    #[serde(default)]
    pub http_path: Option<String>,
    #[serde(default)]
    pub sql_endpoint_name: Option<String>,
    #[serde(default)]
    pub session_configuration: Option<BTreeMap<String, String>>,
    pub sql: Sql,
    #[serde(default)]
    pub parameters: Option<Parameters>,
    #[serde(default)]
    pub do_xcom_push: bool,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default = "default_output_format")]
    pub output_format: String,
    #[serde(default)]
    pub csv_params: Option<CsvParams>,
}

fn default_output_format() -> String {
    "csv".to_string()
}

fn default_conn_id() -> String {
    DEFAULT_CONN_ID.to_string()
}

macro_rules! connection_settings {
    ($config:ty) => {
        impl $config {
            /// Connection settings named by this task
            #[must_use]
            pub fn connection(&self) -> ConnectionConfig {
                ConnectionConfig {
                    databricks_conn_id: self.databricks_conn_id.clone(),
                    http_path: self.http_path.clone(),
                    sql_endpoint_name: self.sql_endpoint_name.clone(),
                    session_configuration: self.session_configuration.clone(),
                }
            }
        }
    };
}

/// Fields of a `copy_into` task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CopyIntoTaskConfig {
    #[serde(default = "default_conn_id")]
    pub databricks_conn_id: String,
    #[serde(default)]
    pub http_path: Option<String>,
    #[serde(default)]
    pub sql_endpoint_name: Option<String>,
    #[serde(default)]
    pub session_configuration: Option<BTreeMap<String, String>>,
    pub table_name: String,
    pub file_location: String,
    pub file_format: String,
    #[serde(default)]
    pub files: Option<Vec<String>>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub expression_list: Option<String>,
    #[serde(default)]
    pub format_options: Option<OptionMap>,
    #[serde(default)]
    pub force_copy: Option<bool>,
    #[serde(default)]
    pub copy_options: Option<OptionMap>,
}

connection_settings!(SqlTaskConfig);
connection_settings!(CopyIntoTaskConfig);

/// A task file, tagged by its `operator` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operator", rename_all = "snake_case")]
pub enum TaskConfig {
    Sql(SqlTaskConfig),
    CopyInto(CopyIntoTaskConfig),
}

impl TaskConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    #[must_use]
    pub fn connection(&self) -> ConnectionConfig {
        match self {
            TaskConfig::Sql(c) => c.connection(),
            TaskConfig::CopyInto(c) => c.connection(),
        }
    }
}

/// Read and parse a YAML task file
pub fn load_task_config<P: AsRef<Path>>(path: P) -> Result<TaskConfig> {
    let text = std::fs::read_to_string(&path)?;
    TaskConfig::from_yaml(&text)
}

/// A task ready to execute
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operator", rename_all = "snake_case")]
pub enum TaskRequest {
    Sql(SqlRequest),
    CopyInto(CopyIntoRequest),
}

impl TaskRequest {
    /// Statements the task submits, in order
    #[must_use]
    pub fn statements(&self) -> Vec<String> {
        match self {
            TaskRequest::Sql(r) => r.sql().statements().into_iter().map(str::to_string).collect(),
            TaskRequest::CopyInto(r) => vec![r.render_statement()],
        }
    }
}

impl TryFrom<SqlTaskConfig> for SqlRequest {
    type Error = Error;

    fn try_from(config: SqlTaskConfig) -> Result<Self> {
        let connection = config.connection();
        SqlRequest::builder(config.sql)
            .connection(connection)
            .parameters(config.parameters)
            .output_path(config.output_path)
            .output_format(config.output_format)
            .csv_params(config.csv_params)
            .publish_result(config.do_xcom_push)
            .build()
    }
}

impl TryFrom<CopyIntoTaskConfig> for CopyIntoRequest {
    type Error = Error;

    fn try_from(config: CopyIntoTaskConfig) -> Result<Self> {
        let connection = config.connection();
        let mut builder =
            CopyIntoRequest::builder(config.table_name, config.file_location, &config.file_format)
                .connection(connection)
                .format_options(config.format_options.unwrap_or_default())
                .copy_options(config.copy_options.unwrap_or_default())
                .force_copy(config.force_copy);
        if let Some(files) = config.files {
            builder = builder.files(files);
        }
        if let Some(pattern) = config.pattern {
            builder = builder.pattern(pattern);
        }
        if let Some(expressions) = config.expression_list {
            builder = builder.expression_list(expressions);
        }
        builder.build()
    }
}

impl TryFrom<TaskConfig> for TaskRequest {
    type Error = Error;

    fn try_from(config: TaskConfig) -> Result<Self> {
        Ok(match config {
            TaskConfig::Sql(c) => TaskRequest::Sql(c.try_into()?),
            TaskConfig::CopyInto(c) => TaskRequest::CopyInto(c.try_into()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;

    #[test]
    fn test_copy_into_task() -> Result<()> {
        let config = TaskConfig::from_yaml(
            r#"
operator: copy_into
http_path: /sql/1.0/warehouses/abc
table_name: events
file_location: s3://bucket/events/
file_format: JSON
pattern: "2024-.*"
format_options:
  multiLine: "true"
force_copy: true
"#,
        )?;
        assert_eq!(config.connection().databricks_conn_id, crate::DEFAULT_CONN_ID);

        let request = TaskRequest::try_from(config)?;
        assert_eq!(
            request.statements(),
            vec![
                "COPY INTO events\n\
                 FROM 's3://bucket/events/'\n\
                 FILEFORMAT = JSON\n\
                 PATTERN = '2024-.*'\n\
                 FORMAT_OPTIONS ('multiLine' = 'true')\n\
                 COPY_OPTIONS ('force' = 'true')"
                    .to_string()
            ]
        );
        Ok(())
    }

    #[test]
    fn test_copy_into_options_follow_file_order() -> Result<()> {
        let config = TaskConfig::from_yaml(
            r#"
operator: copy_into
table_name: events
file_location: /mnt/events
file_format: CSV
format_options:
  inferSchema: true
  header: "true"
copy_options:
  mergeSchema: "true"
  force: "true"
force_copy: false
"#,
        )?;
        let statements = TaskRequest::try_from(config)?.statements();
        assert!(statements[0].ends_with(
            "FORMAT_OPTIONS ('inferSchema' = 'true', 'header' = 'true')\n\
             COPY_OPTIONS ('mergeSchema' = 'true', 'force' = 'false')"
        ));
        Ok(())
    }

    #[test]
    fn test_sql_task() -> Result<()> {
        let config = TaskConfig::from_yaml(
            r#"
operator: sql
databricks_conn_id: analytics
sql_endpoint_name: reporting
session_configuration:
  spark.sql.ansi.enabled: "true"
sql:
  - SELECT * FROM a WHERE id = %(id)s
  - SELECT 2
parameters:
  id: 5
do_xcom_push: true
output_path: /tmp/out.csv
csv_params:
  header: false
"#,
        )?;
        let TaskRequest::Sql(request) = TaskRequest::try_from(config)? else {
            panic!("expected a sql task");
        };
        assert_eq!(request.connection().databricks_conn_id, "analytics");
        assert_eq!(request.connection().sql_endpoint_name.as_deref(), Some("reporting"));
        assert!(request.publish_result());
        assert_eq!(request.sql().statements().len(), 2);
        let output = request.output().expect("output directive");
        assert_eq!(output.format, OutputFormat::Csv);
        assert!(!output.csv.header);
        Ok(())
    }

    #[test]
    fn test_validation_errors_surface() -> Result<()> {
        let config = TaskConfig::from_yaml(
            "operator: copy_into\ntable_name: t\nfile_location: loc\nfile_format: CSV\nfiles: [a]\npattern: b\n",
        )?;
        let err = TaskRequest::try_from(config).expect_err("files and pattern");
        assert!(err.is_config());

        let config = TaskConfig::from_yaml(
            "operator: sql\nsql: SELECT 1\noutput_path: out.xml\noutput_format: xml\n",
        )?;
        assert!(TaskRequest::try_from(config).expect_err("xml").is_config());
        Ok(())
    }

    #[test]
    fn test_unknown_fields_and_operators_rejected() {
        assert!(TaskConfig::from_yaml("operator: sql\nsql: SELECT 1\nretries: 3\n").is_err());
        assert!(TaskConfig::from_yaml("operator: spark_submit\n").is_err());
    }

    #[test]
    fn test_load_task_config() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("task.yaml");
        std::fs::write(&path, "operator: sql\nsql: SELECT 1\n")?;
        let config = load_task_config(&path)?;
        assert!(matches!(config, TaskConfig::Sql(ref c) if c.output_format == "csv"));

        let missing = load_task_config(dir.path().join("missing.yaml")).expect_err("missing");
        assert!(matches!(missing, Error::Io(_)));
        Ok(())
    }
}
