pub mod render;
pub mod show_config;
pub mod validate;

pub use render::render_command;
pub use show_config::show_config_command;
pub use validate::validate_command;

use crate::error_utils::TaskContext;
use anyhow::Result;
use dbsql::{TaskRequest, load_task_config};
use std::path::Path;

/// Load a task file and validate it into a request
pub fn load_request(path: &Path) -> Result<TaskRequest> {
    let config = load_task_config(path).task_context("load", path)?;
    TaskRequest::try_from(config).task_context("validate", path)
}
