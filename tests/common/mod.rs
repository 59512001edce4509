//! Shared helpers for integration tests.

#![allow(dead_code)]

use edu_db_mcp::db::Gateway;
use edu_db_mcp::error::DbResult;
use edu_db_mcp::models::{QueryPlan, Row};
use edu_db_mcp::tools::{Dispatcher, JsonObject};
use rmcp::model::CallToolResult;
use serde_json::Value as JsonValue;
use std::sync::{Arc, Mutex};

type Responder = Box<dyn Fn(&QueryPlan) -> DbResult<Vec<Row>> + Send + Sync>;

/// In-memory gateway that records every plan and answers from a closure.
pub struct RecordingGateway {
    plans: Mutex<Vec<QueryPlan>>,
    responder: Responder,
}

impl RecordingGateway {
    pub fn new(responder: impl Fn(&QueryPlan) -> DbResult<Vec<Row>> + Send + Sync + 'static) -> Self {
        Self {
            plans: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// Gateway that returns no rows for every statement.
    pub fn empty() -> Self {
        Self::new(|_| Ok(Vec::new()))
    }

    /// Gateway that returns the same rows for every statement.
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self::new(move |_| Ok(rows.clone()))
    }

    pub fn plans(&self) -> Vec<QueryPlan> {
        self.plans.lock().unwrap().clone()
    }

    pub fn last_plan(&self) -> QueryPlan {
        self.plans().pop().expect("no statement was executed")
    }
}

impl Gateway for RecordingGateway {
    async fn fetch_all(&self, plan: &QueryPlan) -> DbResult<Vec<Row>> {
        self.plans.lock().unwrap().push(plan.clone());
        (self.responder)(plan)
    }
}

pub fn dispatcher(gateway: RecordingGateway) -> (Dispatcher<RecordingGateway>, Arc<RecordingGateway>) {
    let gateway = Arc::new(gateway);
    (Dispatcher::new(gateway.clone()), gateway)
}

pub fn row(value: JsonValue) -> Row {
    value.as_object().cloned().expect("row must be a JSON object")
}

pub fn args(value: JsonValue) -> JsonObject {
    value.as_object().cloned().expect("arguments must be a JSON object")
}

/// Text of the single content block in an envelope.
pub fn text(result: &CallToolResult) -> String {
    result.content[0]
        .as_text()
        .expect("content must be text")
        .text
        .clone()
}

pub fn is_error(result: &CallToolResult) -> bool {
    result.is_error == Some(true)
}
