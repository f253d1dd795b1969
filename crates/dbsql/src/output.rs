//! Persisting query results to a local file as CSV, JSON or JSON lines.

use crate::hook::{QueryResult, Row};
use crate::json::{to_json_string, write_json};
use crate::{Error, Result};
use diagnostics::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File layout for persisted results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Json,
    Jsonl,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "" => Err(Error::config("Output format should be specified!")),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "jsonl" => Ok(OutputFormat::Jsonl),
            _ => Err(Error::config(format!("Unsupported output format: '{s}'"))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
        };
        write!(f, "{name}")
    }
}

/// When to quote CSV fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quoting {
    /// Only fields containing delimiters, quotes or line breaks
    #[default]
    Minimal,
    All,
    /// Every value that is not a JSON number or boolean, judged by type
    /// rather than text, so the string `"123"` is quoted
    NonNumeric,
    None,
}

/// What to do with row keys that are not schema columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtrasAction {
    #[default]
    Raise,
    Ignore,
}

/// Named option presets a task file can start from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dialect {
    /// `,` delimited, `\r\n` terminated, minimal quoting
    #[default]
    #[serde(rename = "excel")]
    Excel,
    /// Like `excel` with a tab delimiter
    #[serde(rename = "excel-tab")]
    ExcelTab,
    /// `,` delimited, `\n` terminated, every field quoted
    #[serde(rename = "unix")]
    Unix,
}

impl Dialect {
    #[must_use]
    pub fn params(self) -> CsvParams {
        let excel = CsvParams {
            header: true,
            delimiter: ',',
            quotechar: '"',
            escapechar: None,
            doublequote: true,
            lineterminator: "\r\n".to_string(),
            quoting: Quoting::Minimal,
            restval: String::new(),
            extrasaction: ExtrasAction::Raise,
        };
        match self {
            Dialect::Excel => excel,
            Dialect::ExcelTab => CsvParams {
                delimiter: '\t',
                ..excel
            },
            Dialect::Unix => CsvParams {
                lineterminator: "\n".to_string(),
                quoting: Quoting::All,
                ..excel
            },
        }
    }
}

/// CSV writer options
///
/// Field names follow the keys task files use under `csv_params`. A task file
/// may name a `dialect` (`excel`, `excel-tab` or `unix`); its values fill in
/// every option the file leaves out. Without one the `excel` preset applies.
/// Any other key is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CsvParamsFile")]
pub struct CsvParams {
    /// Write a header line with the column names (default: true)
    pub header: bool,

    /// Field delimiter (default: ',')
    pub delimiter: char,

    /// Quote character (default: '"')
    pub quotechar: char,

    /// Escape character, used when `doublequote` is off
    pub escapechar: Option<char>,

    /// Escape quotes by doubling them (default: true)
    pub doublequote: bool,

    /// Record terminator, `"\r\n"` (default) or any single ASCII character
    pub lineterminator: String,

    pub quoting: Quoting,

    /// Text written for columns a row does not carry
    pub restval: String,

    pub extrasaction: ExtrasAction,
}

/// `csv_params` as written in a task file, before the dialect is applied
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CsvParamsFile {
    #[serde(default)]
    dialect: Dialect,
    header: Option<bool>,
    delimiter: Option<char>,
    quotechar: Option<char>,
    escapechar: Option<char>,
    doublequote: Option<bool>,
    lineterminator: Option<String>,
    quoting: Option<Quoting>,
    restval: Option<String>,
    extrasaction: Option<ExtrasAction>,
}

impl From<CsvParamsFile> for CsvParams {
    fn from(file: CsvParamsFile) -> Self {
        let base = file.dialect.params();
        Self {
            header: file.header.unwrap_or(base.header),
            delimiter: file.delimiter.unwrap_or(base.delimiter),
            quotechar: file.quotechar.unwrap_or(base.quotechar),
            escapechar: file.escapechar.or(base.escapechar),
            doublequote: file.doublequote.unwrap_or(base.doublequote),
            lineterminator: file.lineterminator.unwrap_or(base.lineterminator),
            quoting: file.quoting.unwrap_or(base.quoting),
            restval: file.restval.unwrap_or(base.restval),
            extrasaction: file.extrasaction.unwrap_or(base.extrasaction),
        }
    }
}

impl Default for CsvParams {
    fn default() -> Self {
        Dialect::default().params()
    }
}

fn ascii_byte(option: &str, ch: char) -> Result<u8> {
    if ch.is_ascii() {
        Ok(ch as u8)
    } else {
        Err(Error::config(format!(
            "CSV option '{option}' must be a single ASCII character, got '{ch}'"
        )))
    }
}

impl CsvParams {
    /// Build the `csv` writer configuration, rejecting options it cannot express
    pub fn writer_builder(&self) -> Result<csv::WriterBuilder> {
        let terminator = match self.lineterminator.as_str() {
            "\r\n" => csv::Terminator::CRLF,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => csv::Terminator::Any(ascii_byte("lineterminator", ch)?),
                    _ => {
                        return Err(Error::config(format!(
                            "CSV option 'lineterminator' must be \"\\r\\n\" or a single character, got {other:?}"
                        )));
                    }
                }
            }
        };

        // Non-numeric cells are quoted by `field_text`, which knows their type
        let quote_style = match self.quoting {
            Quoting::Minimal => csv::QuoteStyle::Necessary,
            Quoting::All => csv::QuoteStyle::Always,
            Quoting::NonNumeric | Quoting::None => csv::QuoteStyle::Never,
        };

        let mut builder = csv::WriterBuilder::new();
        builder
            .has_headers(false)
            .delimiter(ascii_byte("delimiter", self.delimiter)?)
            .quote(ascii_byte("quotechar", self.quotechar)?)
            .double_quote(self.doublequote)
            .quote_style(quote_style)
            .terminator(terminator);
        if let Some(escape) = self.escapechar {
            let _ = builder.escape(ascii_byte("escapechar", escape)?);
        }
        Ok(builder)
    }

    fn quoted(&self, text: &str) -> String {
        let quote = self.quotechar;
        let mut out = String::with_capacity(text.len() + 2);
        out.push(quote);
        for ch in text.chars() {
            if ch == quote {
                out.push(if self.doublequote {
                    quote
                } else {
                    self.escapechar.unwrap_or('\\')
                });
            }
            out.push(ch);
        }
        out.push(quote);
        out
    }

    fn field_text(&self, cell: Cell) -> String {
        if self.quoting == Quoting::NonNumeric && !cell.numeric {
            self.quoted(&cell.text)
        } else {
            cell.text
        }
    }
}

/// Where and how to persist a result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDirective {
    pub path: PathBuf,
    pub format: OutputFormat,
    #[serde(default)]
    pub csv: CsvParams,
}

impl OutputDirective {
    /// Validate a directive; `format` is matched case-insensitively
    pub fn new<P: AsRef<Path>>(path: P, format: &str, csv: Option<CsvParams>) -> Result<Self> {
        let format = format.parse()?;
        let csv = csv.unwrap_or_default();
        if format == OutputFormat::Csv {
            let _ = csv.writer_builder()?;
        }
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            format,
            csv,
        })
    }
}

struct Cell {
    text: String,
    numeric: bool,
}

impl Cell {
    fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            numeric: false,
        }
    }
}

// Booleans are `True`/`False` and count as numbers when quoting.
// Nested values use the `", "` JSON layout.
fn json_cell(value: &JsonValue) -> Result<Cell> {
    let (text, numeric) = match value {
        JsonValue::Null => (String::new(), false),
        JsonValue::String(s) => (s.clone(), false),
        JsonValue::Bool(true) => ("True".to_string(), true),
        JsonValue::Bool(false) => ("False".to_string(), true),
        JsonValue::Number(n) => (n.to_string(), true),
        JsonValue::Array(_) | JsonValue::Object(_) => (to_json_string(value)?, false),
    };
    Ok(Cell { text, numeric })
}

fn csv_record(row: &Row, field_names: &[&str], params: &CsvParams) -> Result<Vec<String>> {
    if params.extrasaction == ExtrasAction::Raise {
        let extras: Vec<String> = row
            .keys()
            .filter(|key| !field_names.contains(&key.as_str()))
            .cloned()
            .collect();
        if !extras.is_empty() {
            return Err(Error::ExtraFields(extras));
        }
    }
    field_names
        .iter()
        .map(|name| {
            let cell = match row.get(*name) {
                Some(value) => json_cell(value)?,
                None => Cell::text(&params.restval),
            };
            Ok(params.field_text(cell))
        })
        .collect()
}

/// Write `result` as CSV using the schema's column names as fields
///
/// A result without columns (DDL, DML) writes one bare terminator per line.
pub fn write_csv<W: Write>(mut writer: W, result: &QueryResult, params: &CsvParams) -> Result<()> {
    let field_names = result.field_names();
    let builder = params.writer_builder()?;

    if field_names.is_empty() {
        // `csv` writes an empty record as `""`
        let terminator = params.lineterminator.as_bytes();
        if params.header {
            writer.write_all(terminator)?;
        }
        for row in &result.rows {
            let _ = csv_record(row, &field_names, params)?;
            writer.write_all(terminator)?;
        }
        writer.flush()?;
        return Ok(());
    }

    let mut csv_writer = builder.from_writer(writer);
    if params.header {
        let header: Vec<String> = field_names
            .iter()
            .map(|name| params.field_text(Cell::text(name)))
            .collect();
        csv_writer.write_record(&header)?;
    }
    for row in &result.rows {
        csv_writer.write_record(csv_record(row, &field_names, params)?)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write all rows as one JSON array of objects
pub fn write_json_array<W: Write>(writer: W, rows: &[Row]) -> Result<()> {
    write_json(writer, rows)?;
    Ok(())
}

/// Write one JSON object per row, newline terminated
pub fn write_json_lines<W: Write>(mut writer: W, rows: &[Row]) -> Result<()> {
    for row in rows {
        write_json(&mut writer, row)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Replace the directive's file with `result` in the directive's format
pub fn write_output(directive: &OutputDirective, result: &QueryResult) -> Result<()> {
    let path = directive.path.display().to_string();
    let format = directive.format.to_string();
    let count = result.rows.len();
    debug!("Writing {count} rows to {path} as {format}", count: count, path: &path, format: &format);

    let mut writer = BufWriter::new(File::create(&directive.path)?);
    match directive.format {
        OutputFormat::Csv => write_csv(&mut writer, result, &directive.csv)?,
        OutputFormat::Json => write_json_array(&mut writer, &result.rows)?,
        OutputFormat::Jsonl => write_json_lines(&mut writer, &result.rows)?,
    }
    writer.flush()?;

    info!("Wrote {count} rows to {path}", count: count, path: &path);
    Ok(())
}
