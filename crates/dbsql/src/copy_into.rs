//! `COPY INTO` bulk loads.
//!
//! A [`CopyIntoRequest`] is validated once by its builder and renders to a
//! single statement:
//!
//! ```text
//! COPY INTO <table>
//! FROM <location>
//! FILEFORMAT = <format>
//! [PATTERN = <pattern> | FILES = <files>]
//! [FORMAT_OPTIONS (<k> = <v>, ...)]
//! [COPY_OPTIONS (<k> = <v>, ...)]
//! ```
//!
//! Location, pattern, files and option keys/values go through the
//! [`ValueEscaper`]. The table name, file format token and expression list
//! are spliced in verbatim, so they must come from trusted task definitions.

use crate::escape::{ParamEscaper, ValueEscaper};
use crate::hook::{ConnectionConfig, Connector, ExecutionHook, Sql};
use crate::value::SqlValue;
use crate::{Error, Result};
use diagnostics::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// `FORMAT_OPTIONS` / `COPY_OPTIONS` entries, rendered in insertion order
pub type OptionMap = serde_json::Map<String, JsonValue>;

/// File formats accepted by `COPY INTO`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FileFormat {
    Csv,
    Json,
    Avro,
    Orc,
    Parquet,
    Text,
    BinaryFile,
}

impl FileFormat {
    pub const ALL: [FileFormat; 7] = [
        FileFormat::Csv,
        FileFormat::Json,
        FileFormat::Avro,
        FileFormat::Orc,
        FileFormat::Parquet,
        FileFormat::Text,
        FileFormat::BinaryFile,
    ];

    /// Keyword used in the `FILEFORMAT =` clause
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Csv => "CSV",
            FileFormat::Json => "JSON",
            FileFormat::Avro => "AVRO",
            FileFormat::Orc => "ORC",
            FileFormat::Parquet => "PARQUET",
            FileFormat::Text => "TEXT",
            FileFormat::BinaryFile => "BINARYFILE",
        }
    }
}

impl FromStr for FileFormat {
    type Err = Error;

    /// Matches the upper-case keyword exactly
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| Error::config(format!("file_format '{s}' isn't supported")))
    }
}

impl TryFrom<String> for FileFormat {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<FileFormat> for String {
    fn from(f: FileFormat) -> Self {
        f.as_str().to_string()
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which source files to load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileSelection {
    /// Every file under the location
    All,
    /// Explicit file names
    Files(Vec<String>),
    /// Regular expression over file names
    Pattern(String),
}

/// A validated `COPY INTO` load
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CopyIntoRequest {
    connection: ConnectionConfig,
    table_name: String,
    file_location: String,
    file_format: FileFormat,
    selection: FileSelection,
    expression_list: Option<String>,
    format_options: OptionMap,
    copy_options: OptionMap,
}

impl CopyIntoRequest {
    pub fn builder<T, L>(table_name: T, file_location: L, file_format: &str) -> CopyIntoRequestBuilder
    where
        T: Into<String>,
        L: Into<String>,
    {
        CopyIntoRequestBuilder::new(table_name, file_location, file_format)
    }

    #[must_use]
    pub fn connection(&self) -> &ConnectionConfig {
        &self.connection
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    #[must_use]
    pub fn file_location(&self) -> &str {
        &self.file_location
    }

    #[must_use]
    pub fn file_format(&self) -> FileFormat {
        self.file_format
    }

    #[must_use]
    pub fn selection(&self) -> &FileSelection {
        &self.selection
    }

    #[must_use]
    pub fn expression_list(&self) -> Option<&str> {
        self.expression_list.as_deref()
    }

    #[must_use]
    pub fn format_options(&self) -> &OptionMap {
        &self.format_options
    }

    /// Copy options, including the `force` entry derived from `force_copy`
    #[must_use]
    pub fn copy_options(&self) -> &OptionMap {
        &self.copy_options
    }

    /// Render with the default [`ParamEscaper`]
    #[must_use]
    pub fn render_statement(&self) -> String {
        self.render_with(&ParamEscaper::new())
    }

    /// Render the statement, escaping literals with `escaper`
    pub fn render_with<E: ValueEscaper + ?Sized>(&self, escaper: &E) -> String {
        let escape = |s: &str| escaper.escape_item(&SqlValue::from(s));

        let mut location = escape(&self.file_location);
        if let Some(expressions) = &self.expression_list {
            location = format!("(SELECT {expressions} FROM {location})");
        }

        let files_or_pattern = match &self.selection {
            FileSelection::All => String::new(),
            FileSelection::Pattern(pattern) => format!("PATTERN = {}\n", escape(pattern)),
            FileSelection::Files(files) => {
                let list = SqlValue::from(files.clone());
                format!("FILES = {}\n", escaper.escape_item(&list))
            }
        };
        let format_options = render_options("FORMAT_OPTIONS", &self.format_options, escaper);
        let copy_options = render_options("COPY_OPTIONS", &self.copy_options, escaper);

        let sql = format!(
            "COPY INTO {table}\nFROM {location}\nFILEFORMAT = {format}\n{files_or_pattern}{format_options}{copy_options}",
            table = self.table_name,
            format = self.file_format,
        );
        sql.trim().to_string()
    }
}

impl fmt::Display for CopyIntoRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render_statement())
    }
}

fn render_options<E: ValueEscaper + ?Sized>(
    name: &str,
    options: &OptionMap,
    escaper: &E,
) -> String {
    if options.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = options
        .iter()
        .map(|(k, v)| {
            format!(
                "{} = {}",
                escaper.escape_item(&SqlValue::from(k.as_str())),
                escaper.escape_item(&SqlValue::from(v.as_str().unwrap_or_default()))
            )
        })
        .collect();
    format!("{name} ({})\n", pairs.join(", "))
}

/// Collects `COPY INTO` arguments; [`CopyIntoRequestBuilder::build`] validates them
#[derive(Debug, Clone)]
pub struct CopyIntoRequestBuilder {
    connection: ConnectionConfig,
    table_name: String,
    file_location: String,
    file_format: String,
    files: Option<Vec<String>>,
    pattern: Option<String>,
    expression_list: Option<String>,
    format_options: OptionMap,
    force_copy: Option<bool>,
    copy_options: OptionMap,
}

impl CopyIntoRequestBuilder {
    pub fn new<T, L>(table_name: T, file_location: L, file_format: &str) -> Self
    where
        T: Into<String>,
        L: Into<String>,
    {
        Self {
            connection: ConnectionConfig::default(),
            table_name: table_name.into(),
            file_location: file_location.into(),
            file_format: file_format.to_string(),
            files: None,
            pattern: None,
            expression_list: None,
            format_options: OptionMap::new(),
            force_copy: None,
            copy_options: OptionMap::new(),
        }
    }

    pub fn connection(mut self, connection: ConnectionConfig) -> Self {
        self.connection = connection;
        self
    }

    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    pub fn pattern<S: Into<String>>(mut self, pattern: S) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn expression_list<S: Into<String>>(mut self, expressions: S) -> Self {
        self.expression_list = Some(expressions.into());
        self
    }

    pub fn format_option<K: Into<String>, V: Into<JsonValue>>(mut self, key: K, value: V) -> Self {
        let _ = self.format_options.insert(key.into(), value.into());
        self
    }

    pub fn format_options(mut self, options: OptionMap) -> Self {
        self.format_options = options;
        self
    }

    pub fn copy_option<K: Into<String>, V: Into<JsonValue>>(mut self, key: K, value: V) -> Self {
        let _ = self.copy_options.insert(key.into(), value.into());
        self
    }

    pub fn copy_options(mut self, options: OptionMap) -> Self {
        self.copy_options = options;
        self
    }

    /// `Some(_)` overrides any `force` entry in the copy options
    pub fn force_copy(mut self, force: Option<bool>) -> Self {
        self.force_copy = force;
        self
    }

    pub fn build(self) -> Result<CopyIntoRequest> {
        let selection = match (self.files, self.pattern) {
            (Some(_), Some(_)) => {
                return Err(Error::config("Only one of 'pattern' or 'files' should be specified"));
            }
            (Some(files), None) => FileSelection::Files(files),
            (None, Some(pattern)) => FileSelection::Pattern(pattern),
            (None, None) => FileSelection::All,
        };
        if self.table_name.is_empty() {
            return Err(Error::config("table_name shouldn't be empty"));
        }
        if self.file_location.is_empty() {
            return Err(Error::config("file_location shouldn't be empty"));
        }
        let file_format: FileFormat = self.file_format.parse()?;

        let format_options = option_texts("format_options", self.format_options)?;
        let mut copy_options = option_texts("copy_options", self.copy_options)?;
        // An existing `force` entry keeps its place
        if let Some(force) = self.force_copy {
            let _ = copy_options.insert("force".to_string(), JsonValue::String(force.to_string()));
        }

        Ok(CopyIntoRequest {
            connection: self.connection,
            table_name: self.table_name,
            file_location: self.file_location,
            file_format,
            selection,
            expression_list: self.expression_list,
            format_options,
            copy_options,
        })
    }
}

/// Option values are rendered as string literals; scalars are accepted and
/// converted, lists and maps are rejected
fn option_texts(kind: &str, options: OptionMap) -> Result<OptionMap> {
    options
        .into_iter()
        .map(|(key, value)| match value {
            JsonValue::String(_) => Ok((key, value)),
            JsonValue::Bool(_) | JsonValue::Number(_) => {
                let text = value.to_string();
                Ok((key, JsonValue::String(text)))
            }
            _ => Err(Error::config(format!(
                "{kind} value for '{key}' must be a string, number or boolean"
            ))),
        })
        .collect()
}

/// Render the load and run it on `hook`; the result set is discarded
pub async fn execute_copy_into<H: ExecutionHook + ?Sized>(
    request: &CopyIntoRequest,
    hook: &H,
) -> Result<()> {
    let statement = request.render_statement();
    info!("Executing: {statement}", statement: &statement);
    let _ = hook.run(&Sql::Single(statement), None).await?;
    Ok(())
}

/// Connect with the request's connection settings, then [`execute_copy_into`]
pub async fn run_copy_into<C: Connector + ?Sized>(
    request: &CopyIntoRequest,
    connector: &C,
) -> Result<()> {
    let hook = connector.connect(&request.connection).await?;
    execute_copy_into(request, &hook).await
}
