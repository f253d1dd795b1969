use anyhow::Result;
use std::io::Write;
use std::path::Path;

use super::load_request;

/// Print the statements a task would submit, each terminated by `;`
pub fn render_command<W: Write>(out: &mut W, path: &Path) -> Result<()> {
    let request = load_request(path)?;
    for statement in request.statements() {
        writeln!(out, "{statement};")?;
    }
    Ok(())
}
