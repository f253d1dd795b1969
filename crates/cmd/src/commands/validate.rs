use anyhow::{Result, anyhow};
use diagnostics::*;
use dbsql::TaskRequest;
use std::io::Write;
use std::path::PathBuf;

use super::load_request;

fn operator_name(request: &TaskRequest) -> &'static str {
    match request {
        TaskRequest::Sql(_) => "sql",
        TaskRequest::CopyInto(_) => "copy_into",
    }
}

/// Check every task file, reporting one line per file
pub fn validate_command<W: Write>(out: &mut W, paths: &[PathBuf]) -> Result<()> {
    let mut failed = 0;
    for path in paths {
        match load_request(path) {
            Ok(request) => {
                writeln!(out, "ok     {} ({})", path.display(), operator_name(&request))?;
            }
            Err(e) => {
                failed += 1;
                let message = e.to_string();
                warn!("Task file failed validation: {message}", message: &message);
                writeln!(out, "error  {message}")?;
            }
        }
    }

    if failed > 0 {
        return Err(anyhow!("{} of {} task files failed validation", failed, paths.len()));
    }
    Ok(())
}
