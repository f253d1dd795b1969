use anyhow::Result;
use std::io::Write;
use std::path::Path;

use super::load_request;

/// Print the validated request as pretty JSON
pub fn show_config_command<W: Write>(out: &mut W, path: &Path) -> Result<()> {
    let request = load_request(path)?;
    let text = serde_json::to_string_pretty(&request)?;
    writeln!(out, "{text}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{output_text, task_file};
    use tempfile::tempdir;

    #[test]
    fn test_show_config_sql_task() -> Result<()> {
        let dir = tempdir()?;
        let path = task_file(
            dir.path(),
            "q.yaml",
            "operator: sql\nhttp_path: /sql/1.0/endpoints/1\nsql: SELECT 1\noutput_path: out.jsonl\noutput_format: JSONL\n",
        );

        let mut buf = Vec::new();
        show_config_command(&mut buf, &path)?;
        let value: serde_json::Value = serde_json::from_str(&output_text(buf))?;
        assert_eq!(value["operator"], "sql");
        assert_eq!(value["connection"]["databricks_conn_id"], "databricks_default");
        assert_eq!(value["connection"]["http_path"], "/sql/1.0/endpoints/1");
        assert_eq!(value["output"]["format"], "jsonl");
        assert_eq!(value["publish_result"], false);
        Ok(())
    }

    #[test]
    fn test_show_config_copy_into_folds_force() -> Result<()> {
        let dir = tempdir()?;
        let path = task_file(
            dir.path(),
            "load.yaml",
            "operator: copy_into\ntable_name: t\nfile_location: /x\nfile_format: TEXT\nforce_copy: true\n",
        );

        let mut buf = Vec::new();
        show_config_command(&mut buf, &path)?;
        let value: serde_json::Value = serde_json::from_str(&output_text(buf))?;
        assert_eq!(value["operator"], "copy_into");
        assert_eq!(value["file_format"], "TEXT");
        assert_eq!(value["copy_options"]["force"], "true");
        assert_eq!(value["selection"], "all");
        Ok(())
    }
}
