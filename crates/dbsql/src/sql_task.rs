//! Generic statement execution with optional result persistence.

use crate::hook::{ConnectionConfig, Connector, ExecutionHook, Parameters, Row, Sql};
use crate::output::{CsvParams, OutputDirective, write_output};
use crate::Result;
use diagnostics::*;
use serde::Serialize;
use std::path::PathBuf;

/// A validated SQL task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlRequest {
    connection: ConnectionConfig,
    sql: Sql,
    parameters: Option<Parameters>,
    output: Option<OutputDirective>,
    publish_result: bool,
}

impl SqlRequest {
    pub fn builder<S: Into<Sql>>(sql: S) -> SqlRequestBuilder {
        SqlRequestBuilder::new(sql)
    }

    #[must_use]
    pub fn connection(&self) -> &ConnectionConfig {
        &self.connection
    }

    #[must_use]
    pub fn sql(&self) -> &Sql {
        &self.sql
    }

    #[must_use]
    pub fn parameters(&self) -> Option<&Parameters> {
        self.parameters.as_ref()
    }

    #[must_use]
    pub fn output(&self) -> Option<&OutputDirective> {
        self.output.as_ref()
    }

    /// Whether rows are handed back to the caller after execution
    #[must_use]
    pub fn publish_result(&self) -> bool {
        self.publish_result
    }
}

/// Collects SQL task arguments; [`SqlRequestBuilder::build`] validates them
#[derive(Debug, Clone)]
pub struct SqlRequestBuilder {
    connection: ConnectionConfig,
    sql: Sql,
    parameters: Option<Parameters>,
    output_path: Option<PathBuf>,
    output_format: String,
    csv_params: Option<CsvParams>,
    publish_result: bool,
}

impl SqlRequestBuilder {
    pub fn new<S: Into<Sql>>(sql: S) -> Self {
        Self {
            connection: ConnectionConfig::default(),
            sql: sql.into(),
            parameters: None,
            output_path: None,
            output_format: "csv".to_string(),
            csv_params: None,
            publish_result: false,
        }
    }

    pub fn connection(mut self, connection: ConnectionConfig) -> Self {
        self.connection = connection;
        self
    }

    pub fn parameters(mut self, parameters: Option<Parameters>) -> Self {
        self.parameters = parameters;
        self
    }

    /// An empty path means no output file
    pub fn output_path<P: Into<PathBuf>>(mut self, path: Option<P>) -> Self {
        self.output_path = path
            .map(Into::into)
            .filter(|p: &PathBuf| !p.as_os_str().is_empty());
        self
    }

    pub fn output_format<S: Into<String>>(mut self, format: S) -> Self {
        self.output_format = format.into();
        self
    }

    pub fn csv_params(mut self, params: Option<CsvParams>) -> Self {
        self.csv_params = params;
        self
    }

    pub fn publish_result(mut self, publish: bool) -> Self {
        self.publish_result = publish;
        self
    }

    /// The output format is only checked when an output path is set
    pub fn build(self) -> Result<SqlRequest> {
        let output = match self.output_path {
            Some(path) => Some(OutputDirective::new(path, &self.output_format, self.csv_params)?),
            None => None,
        };
        Ok(SqlRequest {
            connection: self.connection,
            sql: self.sql,
            parameters: self.parameters,
            output,
            publish_result: self.publish_result,
        })
    }
}

/// Run the request's statements on `hook`, persist the result if asked to,
/// and return the rows when the request publishes its result
pub async fn execute_sql<H: ExecutionHook + ?Sized>(
    request: &SqlRequest,
    hook: &H,
) -> Result<Option<Vec<Row>>> {
    let sql = request.sql.to_string();
    info!("Executing: {sql}", sql: &sql);

    let result = hook.run(&request.sql, request.parameters.as_ref()).await?;
    let columns = result.schema.len();
    let rows = result.rows.len();
    debug!("Statement returned {rows} rows with {columns} columns", rows: rows, columns: columns);

    if let Some(output) = &request.output {
        write_output(output, &result)?;
    }

    Ok(request.publish_result.then_some(result.rows))
}

/// Connect with the request's connection settings, then [`execute_sql`]
pub async fn run_sql<C: Connector + ?Sized>(
    request: &SqlRequest,
    connector: &C,
) -> Result<Option<Vec<Row>>> {
    let hook = connector.connect(&request.connection).await?;
    execute_sql(request, &hook).await
}
