//! dbsql - SQL tasks for Databricks SQL endpoints
//!
//! Two tasks are provided, each as an immutable request value plus a
//! function that runs it against an injected [`ExecutionHook`]:
//!
//! - [`SqlRequest`] / [`execute_sql`]: run one or more statements and
//!   optionally write the result set to a CSV, JSON or JSON lines file.
//! - [`CopyIntoRequest`] / [`execute_copy_into`]: render and run a
//!   `COPY INTO` bulk load.
//!
//! Connecting, authenticating and running statements are the hook's job.
//! [`run_sql`] and [`run_copy_into`] first ask a [`Connector`] for a hook
//! using the request's [`ConnectionConfig`].

pub mod config;
pub mod copy_into;
pub mod error;
pub mod escape;
pub mod hook;
pub mod json;
pub mod output;
pub mod sql_task;
pub mod testing;
pub mod value;

pub use config::{
    CopyIntoTaskConfig, SqlTaskConfig, TaskConfig, TaskRequest, load_task_config,
};
pub use copy_into::{
    CopyIntoRequest, CopyIntoRequestBuilder, FileFormat, FileSelection, OptionMap,
    execute_copy_into, run_copy_into,
};
pub use error::{Error, Result};
pub use escape::{ParamEscaper, ValueEscaper};
pub use hook::{
    Column, ConnectionConfig, Connector, DEFAULT_CONN_ID, ExecutionHook, Parameters,
    QueryResult, Row, Sql,
};
pub use output::{CsvParams, Dialect, ExtrasAction, OutputDirective, OutputFormat, Quoting};
pub use sql_task::{SqlRequest, SqlRequestBuilder, execute_sql, run_sql};
pub use value::SqlValue;
