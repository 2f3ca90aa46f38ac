//! JSON result reported on stdout.

use crate::operations::{Invocation, Operation};

use serde::Serialize;
use serde_json::{json, Map, Value as JsonValue};
use std::process::ExitCode;
use swquery_spacewalk::{ProjectionResult, QueryKind, SpacewalkError, SpacewalkResult};

/// Outcome of one invocation, shaped like a host-framework module result.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleResult {
    #[serde(flatten)]
    params: Map<String, JsonValue>,
    changed: bool,
    #[serde(skip_serializing_if = "is_false")]
    failed: bool,
    msg: String,
    #[serde(flatten)]
    listing: Map<String, JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl ModuleResult {
    pub fn success(inv: &Invocation, kind: QueryKind, result: ProjectionResult) -> Self {
        let op = inv.operation();
        let count = result.count();
        let mut listing = Map::new();
        listing.insert(op.result_key().into(), json!(result.into_items()));
        Self {
            params: inv.params(),
            changed: true,
            failed: false,
            msg: Operation::success_msg(kind).into(),
            listing,
            count: Some(count),
        }
    }

    pub fn failure(inv: &Invocation, err: &SpacewalkError) -> Self {
        let op = inv.operation();
        let msg = if err.is_auth() {
            format!("Cannot connect to {} server: {}", op.server_flavor(), err.message)
        } else {
            err.message.clone()
        };
        Self {
            params: inv.params(),
            changed: false,
            failed: true,
            msg,
            listing: Map::new(),
            count: None,
        }
    }

    /// Options could not be resolved, so there is nothing to echo.
    pub fn invalid_arguments(err: &SpacewalkError) -> Self {
        Self {
            params: Map::new(),
            changed: false,
            failed: true,
            msg: err.message.clone(),
            listing: Map::new(),
            count: None,
        }
    }

    pub fn from_outcome(inv: &Invocation, kind: QueryKind, outcome: SpacewalkResult<ProjectionResult>) -> Self {
        match outcome {
            Ok(result) => {
                log::info!("{}: {}", inv.operation().name(), Operation::success_msg(kind));
                Self::success(inv, kind, result)
            }
            Err(e) => {
                log::error!("{} failed: {e}", inv.operation().name());
                Self::failure(inv, &e)
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_failed() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_else(|e| json!({ "failed": true, "msg": e.to_string() }))
    }
}
