pub mod commands;
pub mod error_utils;
