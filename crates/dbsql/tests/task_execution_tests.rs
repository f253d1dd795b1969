use dbsql::testing::{RecordingHook, StaticConnector};
use dbsql::{
    Column, ConnectionConfig, CopyIntoRequest, Error, Parameters, QueryResult, Result, Row, Sql,
    SqlRequest, SqlValue, TaskConfig, TaskRequest, execute_copy_into, execute_sql, run_copy_into,
    run_sql,
};
use serde_json::json;
use tempfile::tempdir;

fn row(value: serde_json::Value) -> Row {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn two_column_result() -> QueryResult {
    QueryResult::new(
        vec![Column::new("a", "int"), Column::new("b", "int")],
        vec![row(json!({"a": 1, "b": 2}))],
    )
}

/// Statement and parameters reach the hook unchanged; rows are not published by default
#[tokio::test]
async fn test_sql_passes_statement_and_parameters() -> Result<()> {
    let hook = RecordingHook::returning(two_column_result());
    let parameters = Parameters::Positional(vec![SqlValue::Int(5)]);
    let request = SqlRequest::builder("SELECT * FROM t WHERE id = ?")
        .parameters(Some(parameters.clone()))
        .build()?;

    let published = execute_sql(&request, &hook).await?;
    assert!(published.is_none());

    let calls = hook.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].sql, Sql::from("SELECT * FROM t WHERE id = ?"));
    assert_eq!(calls[0].parameters, Some(parameters));
    Ok(())
}

#[tokio::test]
async fn test_sql_publishes_rows() -> Result<()> {
    let hook = RecordingHook::returning(two_column_result());
    let request = SqlRequest::builder(vec!["SELECT 1", "SELECT a, b FROM t"])
        .publish_result(true)
        .build()?;

    let rows = execute_sql(&request, &hook).await?.expect("published rows");
    assert_eq!(rows, two_column_result().rows);
    assert_eq!(hook.calls()[0].sql.statements(), vec!["SELECT 1", "SELECT a, b FROM t"]);
    Ok(())
}

#[tokio::test]
async fn test_sql_writes_each_output_format() -> Result<()> {
    let dir = tempdir()?;
    let cases = [
        ("csv", "out.csv", "a,b\r\n1,2\r\n"),
        ("json", "out.json", "[{\"a\": 1, \"b\": 2}]"),
        ("jsonl", "out.jsonl", "{\"a\": 1, \"b\": 2}\n"),
    ];
    for (format, name, expected) in cases {
        let path = dir.path().join(name);
        let request = SqlRequest::builder("SELECT a, b FROM t")
            .output_path(Some(&path))
            .output_format(format)
            .build()?;
        execute_sql(&request, &RecordingHook::returning(two_column_result())).await?;
        assert_eq!(std::fs::read_to_string(&path)?, expected, "{format}");
    }
    Ok(())
}

#[tokio::test]
async fn test_sql_csv_without_header() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("no_header.csv");
    let config = TaskConfig::from_yaml(&format!(
        "operator: sql\nsql: SELECT a, b FROM t\noutput_path: {}\ncsv_params:\n  header: false\n",
        path.display()
    ))?;
    let TaskRequest::Sql(request) = TaskRequest::try_from(config)? else {
        panic!("expected a sql task");
    };
    execute_sql(&request, &RecordingHook::returning(two_column_result())).await?;
    assert_eq!(std::fs::read_to_string(&path)?, "1,2\r\n");
    Ok(())
}

/// DDL returns no columns; the CSV file holds only the header line terminator
#[tokio::test]
async fn test_sql_csv_for_statement_without_columns() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("ddl.csv");
    let request = SqlRequest::builder("CREATE TABLE t (a INT)")
        .output_path(Some(&path))
        .build()?;
    execute_sql(&request, &RecordingHook::new()).await?;
    assert_eq!(std::fs::read_to_string(&path)?, "\r\n");
    Ok(())
}

/// A bad output format is rejected before any statement reaches the hook
#[tokio::test]
async fn test_unsupported_output_format_runs_nothing() {
    let err = SqlRequest::builder("SELECT 1")
        .output_path(Some("result.xml"))
        .output_format("xml")
        .build()
        .expect_err("xml is not an output format");
    assert!(err.is_config());
    assert_eq!(err.to_string(), "Configuration error: Unsupported output format: 'xml'");
}

#[tokio::test]
async fn test_hook_failures_propagate() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("never.csv");
    let hook = RecordingHook::failing("[PARSE_SYNTAX_ERROR] Syntax error at or near 'SELEC'");
    let request = SqlRequest::builder("SELEC 1")
        .output_path(Some(&path))
        .build()?;

    let err = execute_sql(&request, &hook).await.expect_err("hook failure");
    assert!(matches!(err, Error::Execution(_)));
    assert!(err.to_string().contains("PARSE_SYNTAX_ERROR"));
    assert!(!path.exists());
    Ok(())
}

#[tokio::test]
async fn test_output_io_failure_propagates() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("missing_dir").join("out.csv");
    let request = SqlRequest::builder("SELECT 1").output_path(Some(&path)).build()?;

    let err = execute_sql(&request, &RecordingHook::returning(two_column_result()))
        .await
        .expect_err("parent directory does not exist");
    assert!(matches!(err, Error::Io(_)));
    Ok(())
}

#[tokio::test]
async fn test_copy_into_runs_rendered_statement_without_parameters() -> Result<()> {
    let hook = RecordingHook::new();
    let request = CopyIntoRequest::builder("main.sales", "/mnt/landing/sales", "PARQUET")
        .files(["part-0.parquet", "part-1.parquet"])
        .copy_option("mergeSchema", "true")
        .build()?;

    execute_copy_into(&request, &hook).await?;

    let calls = hook.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].parameters, None);
    assert_eq!(
        calls[0].sql,
        Sql::Single(
            "COPY INTO main.sales\n\
             FROM '/mnt/landing/sales'\n\
             FILEFORMAT = PARQUET\n\
             FILES = ('part-0.parquet','part-1.parquet')\n\
             COPY_OPTIONS ('mergeSchema' = 'true')"
                .to_string()
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_run_uses_request_connection() -> Result<()> {
    let connector = StaticConnector::new(RecordingHook::returning(two_column_result()));
    let mut connection = ConnectionConfig::new("reporting");
    connection.http_path = Some("/sql/1.0/warehouses/1234".to_string());

    let request = SqlRequest::builder("SELECT 1")
        .connection(connection.clone())
        .publish_result(true)
        .build()?;
    let rows = run_sql(&request, &connector).await?;
    assert_eq!(rows.map(|r| r.len()), Some(1));

    let load = CopyIntoRequest::builder("t", "loc", "CSV").build()?;
    run_copy_into(&load, &connector).await?;

    let configs = connector.configs();
    assert_eq!(configs, vec![connection, ConnectionConfig::default()]);
    assert_eq!(connector.hook().calls().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_connect_failure_propagates() -> Result<()> {
    let connector = StaticConnector::refusing("invalid access token");
    let request = CopyIntoRequest::builder("t", "loc", "CSV").build()?;

    let err = run_copy_into(&request, &connector).await.expect_err("refused");
    assert_eq!(err.to_string(), "Execution error: invalid access token");
    assert!(connector.hook().calls().is_empty());
    Ok(())
}
