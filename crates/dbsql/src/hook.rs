//! The seam between task logic and the SQL endpoint client.
//!
//! Nothing in this crate opens a connection. Hosts supply a [`Connector`]
//! that turns a [`ConnectionConfig`] into an [`ExecutionHook`]; the task
//! functions only ever call [`ExecutionHook::run`].

use crate::Result;
use crate::value::SqlValue;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Connection id used when a task does not name one
pub const DEFAULT_CONN_ID: &str = "databricks_default";

/// One statement or an ordered batch of statements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sql {
    Single(String),
    Many(Vec<String>),
}

impl Sql {
    /// Statements in submission order
    #[must_use]
    pub fn statements(&self) -> Vec<&str> {
        match self {
            Sql::Single(s) => vec![s.as_str()],
            Sql::Many(list) => list.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for Sql {
    fn from(s: &str) -> Self {
        Sql::Single(s.to_string())
    }
}

impl From<String> for Sql {
    fn from(s: String) -> Self {
        Sql::Single(s)
    }
}

impl From<Vec<String>> for Sql {
    fn from(list: Vec<String>) -> Self {
        Sql::Many(list)
    }
}

impl From<Vec<&str>> for Sql {
    fn from(list: Vec<&str>) -> Self {
        Sql::Many(list.into_iter().map(str::to_string).collect())
    }
}

impl fmt::Display for Sql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sql::Single(s) => write!(f, "{s}"),
            Sql::Many(list) => write!(f, "[{}]", list.join("; ")),
        }
    }
}

/// Bind parameters passed through to the hook untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Parameters {
    Positional(Vec<SqlValue>),
    Named(BTreeMap<String, SqlValue>),
}

/// Result column: name plus the type name reported by the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub type_name: String,
}

impl Column {
    pub fn new<N: Into<String>, T: Into<String>>(name: N, type_name: T) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// One result record, keyed by column name in column order
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Schema and rows returned by a hook run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub schema: Vec<Column>,
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn new(schema: Vec<Column>, rows: Vec<Row>) -> Self {
        Self { schema, rows }
    }

    /// Column names in schema order
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.schema.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Settings a [`Connector`] needs to reach a SQL endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_conn_id")]
    pub databricks_conn_id: String,
    #[serde(default)]
    pub http_path: Option<String>,
    #[serde(default)]
    pub sql_endpoint_name: Option<String>,
    #[serde(default)]
    pub session_configuration: Option<BTreeMap<String, String>>,
}

fn default_conn_id() -> String {
    DEFAULT_CONN_ID.to_string()
}

impl ConnectionConfig {
    pub fn new<S: Into<String>>(databricks_conn_id: S) -> Self {
        Self {
            databricks_conn_id: databricks_conn_id.into(),
            http_path: None,
            sql_endpoint_name: None,
            session_configuration: None,
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CONN_ID)
    }
}

/// Runs statements against an open SQL endpoint
#[async_trait]
pub trait ExecutionHook: Send + Sync {
    /// Run one or more statements and return the schema and rows of the result.
    ///
    /// Implementations report their failures as [`crate::Error::Execution`].
    async fn run(&self, sql: &Sql, parameters: Option<&Parameters>) -> Result<QueryResult>;
}

#[async_trait]
impl<H: ExecutionHook + ?Sized> ExecutionHook for Box<H> {
    async fn run(&self, sql: &Sql, parameters: Option<&Parameters>) -> Result<QueryResult> {
        (**self).run(sql, parameters).await
    }
}

#[async_trait]
impl<H: ExecutionHook + ?Sized> ExecutionHook for std::sync::Arc<H> {
    async fn run(&self, sql: &Sql, parameters: Option<&Parameters>) -> Result<QueryResult> {
        (**self).run(sql, parameters).await
    }
}

/// Builds an [`ExecutionHook`] for a connection
#[async_trait]
pub trait Connector: Send + Sync {
    type Hook: ExecutionHook;

    async fn connect(&self, config: &ConnectionConfig) -> Result<Self::Hook>;
}
