//! In-memory hook and connector for exercising tasks without a SQL endpoint
//!
//! [`RecordingHook`] answers every run with a canned [`QueryResult`] and
//! remembers what it was asked to run. [`StaticConnector`] hands out clones
//! of one hook and remembers the connection settings it was given.

use crate::hook::{ConnectionConfig, Connector, ExecutionHook, Parameters, QueryResult, Sql};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

/// One call received by a [`RecordingHook`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub sql: Sql,
    pub parameters: Option<Parameters>,
}

/// Hook returning a fixed result; clones share one call log
#[derive(Debug, Clone, Default)]
pub struct RecordingHook {
    result: QueryResult,
    failure: Option<String>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl RecordingHook {
    /// Hook returning an empty result
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returning(result: QueryResult) -> Self {
        Self {
            result,
            ..Self::default()
        }
    }

    /// Hook whose every run fails with `message`
    pub fn failing<S: Into<String>>(message: S) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Calls received so far, oldest first
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ExecutionHook for RecordingHook {
    async fn run(&self, sql: &Sql, parameters: Option<&Parameters>) -> Result<QueryResult> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                sql: sql.clone(),
                parameters: parameters.cloned(),
            });
        match &self.failure {
            Some(message) => Err(Error::execution(message.clone())),
            None => Ok(self.result.clone()),
        }
    }
}

/// Connector that always yields the same [`RecordingHook`]
#[derive(Debug, Clone, Default)]
pub struct StaticConnector {
    hook: RecordingHook,
    refusal: Option<String>,
    configs: Arc<Mutex<Vec<ConnectionConfig>>>,
}

impl StaticConnector {
    pub fn new(hook: RecordingHook) -> Self {
        Self {
            hook,
            ..Self::default()
        }
    }

    /// Connector whose every connect attempt fails with `message`
    pub fn refusing<S: Into<String>>(message: S) -> Self {
        Self {
            refusal: Some(message.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn hook(&self) -> &RecordingHook {
        &self.hook
    }

    /// Connection settings passed to `connect`, oldest first
    #[must_use]
    pub fn configs(&self) -> Vec<ConnectionConfig> {
        self.configs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Connector for StaticConnector {
    type Hook = RecordingHook;

    async fn connect(&self, config: &ConnectionConfig) -> Result<RecordingHook> {
        self.configs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(config.clone());
        match &self.refusal {
            Some(message) => Err(Error::execution(message.clone())),
            None => Ok(self.hook.clone()),
        }
    }
}
