use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

use crate::config::ExecutorConfig;
use crate::error::OmniFocusError;
use crate::executor::{parse_envelope, OsascriptRunner, ScriptRunner};
use crate::lookup::{self, Candidate, EntityKind};
use crate::model::HostInfo;
use crate::sanitize::SafeText;
use crate::script;

/// Handle to OmniFocus through a [`ScriptRunner`]. Holds no per-call state.
#[derive(Clone)]
pub struct OmniFocus {
    runner: Arc<dyn ScriptRunner>,
}

impl OmniFocus {
    pub fn new(runner: Arc<dyn ScriptRunner>) -> Self {
        Self { runner }
    }

    pub fn from_config(cfg: &ExecutorConfig) -> Self {
        Self::new(Arc::new(OsascriptRunner::from_config(cfg)))
    }

    /// Run a complete script and unpack its envelope.
    pub async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T, OmniFocusError> {
        debug!(bytes = script.len(), "dispatching script");
        let raw = self.runner.run(&script).await?;
        parse_envelope(&raw)
    }

    pub async fn candidates(
        &self,
        kind: EntityKind,
        query: &SafeText,
        include_completed: bool,
    ) -> Result<Vec<Candidate>, OmniFocusError> {
        self.eval(script::candidates(kind, query, include_completed))
            .await
    }

    /// Resolve a name to exactly one object, or fail with not-found/ambiguous.
    pub async fn resolve_name(
        &self,
        kind: EntityKind,
        name: &str,
        include_completed: bool,
    ) -> Result<Candidate, OmniFocusError> {
        let query = SafeText::short(name)?;
        let found = self.candidates(kind, &query, include_completed).await?;
        lookup::resolve(kind, name, found)
    }

    /// Turn an `id` or `name` pair into a sanitized id. The id wins when both are given.
    pub async fn target_id(
        &self,
        kind: EntityKind,
        id: Option<&str>,
        name: Option<&str>,
        include_completed: bool,
    ) -> Result<SafeText, OmniFocusError> {
        if let Some(id) = present(id) {
            return Ok(SafeText::short(id)?);
        }
        match present(name) {
            Some(name) => {
                let found = self.resolve_name(kind, name, include_completed).await?;
                debug!(kind = kind.label(), id = %found.id, "resolved name");
                Ok(SafeText::short(&found.id)?)
            }
            None => Err(OmniFocusError::InvalidParams(
                "Either id or name must be provided".to_string(),
            )),
        }
    }

    /// Like [`target_id`](Self::target_id) but both parts are optional.
    pub async fn optional_id(
        &self,
        kind: EntityKind,
        id: Option<&str>,
        name: Option<&str>,
    ) -> Result<Option<SafeText>, OmniFocusError> {
        if present(id).is_none() && present(name).is_none() {
            return Ok(None);
        }
        self.target_id(kind, id, name, true).await.map(Some)
    }

    /// Version and document counts; fails the same way any call would when
    /// OmniFocus is unreachable.
    pub async fn probe(&self) -> Result<HostInfo, OmniFocusError> {
        self.eval(script::probe()).await
    }
}

/// Blank identifiers count as absent.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
