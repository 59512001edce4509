//! Tool dispatcher.
//!
//! Maps a tool name and its arguments to query plans, runs them through the
//! [`Gateway`] and wraps the outcome in a response envelope. Tool-level
//! failures never escape as protocol errors.

use crate::db::Gateway;
use crate::error::{ToolError, ToolResult};
use crate::models::{QueryPlan, Row};
use crate::tools::args::{Args, JsonObject};
use crate::tools::catalog::{self, catalog, find_tool};
use crate::tools::format::{ToolOutput, error_result, int_or_zero};
use crate::tools::plans::{self, RequestPlans, StatisticsPlans};
use crate::tools::sql_validator::SelectGate;
use rmcp::model::{CallToolResult, Tool};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

pub struct Dispatcher<G> {
    gateway: Arc<G>,
    gate: SelectGate,
}

impl<G: Gateway> Dispatcher<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            gate: SelectGate::default(),
        }
    }

    /// Set how freeform queries are checked before execution.
    pub fn with_select_gate(mut self, gate: SelectGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Catalog as advertised by `tools/list`.
    pub fn list_tools(&self) -> Vec<Tool> {
        catalog().iter().map(|tool| tool.to_tool()).collect()
    }

    /// Run one tool call and render its envelope.
    pub async fn call_tool(&self, name: &str, arguments: &JsonObject) -> CallToolResult {
        let start = Instant::now();
        match self.dispatch(name, arguments).await {
            Ok(output) => {
                debug!(
                    tool = name,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Tool call completed"
                );
                output.into_result()
            }
            Err(err) => {
                if err.is_execution() {
                    error!(
                        tool = name,
                        sql_state = err.sql_state(),
                        error = %err,
                        "Tool call failed"
                    );
                } else {
                    warn!(tool = name, error = %err, "Tool call rejected");
                }
                error_result(&err)
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: &JsonObject) -> ToolResult<ToolOutput> {
        let tool = find_tool(name).ok_or_else(|| ToolError::unknown_tool(name))?;
        let args = Args::new(tool, arguments);

        match tool.name {
            catalog::CONTAR_CLIENTES => self.count_clients().await,
            catalog::LISTAR_USUARIOS => self.rows(plans::list_users(&args)).await,
            catalog::BUSCAR_USUARIO => self.first(plans::find_user(&args)?).await,
            catalog::LISTAR_EMPRESAS => self.rows(plans::list_enterprises(&args)).await,
            catalog::BUSCAR_EMPRESA => self.first(plans::find_enterprise(&args)?).await,
            catalog::LISTAR_ESCOLAS => self.rows(plans::list_schools(&args)).await,
            catalog::BUSCAR_ESCOLA_PROXIMA => self.rows(plans::nearest_schools(&args)).await,
            catalog::LISTAR_CURSOS => self.rows(plans::list_courses(&args)).await,
            catalog::LISTAR_SOLICITACOES => self.rows(plans::list_requests(&args)).await,
            catalog::BUSCAR_SOLICITACAO => self.find_request(plans::find_request(&args)?).await,
            catalog::BUSCAR_COTA => self.first(plans::find_quota(&args)?).await,
            catalog::LISTAR_LOGS => self.rows(plans::list_logs(&args)).await,
            catalog::CONTAR_POR_GRUPO => self.rows(plans::count_by_group(&args)?).await,
            catalog::ESTATISTICAS_SOLICITACOES => {
                self.statistics(plans::request_statistics(&args)).await
            }
            catalog::EXECUTAR_QUERY_CUSTOMIZADA => {
                self.rows(plans::custom_query(&args, self.gate)?).await
            }
            _ => Err(ToolError::unknown_tool(name)),
        }
    }

    async fn fetch(&self, plan: &QueryPlan) -> ToolResult<Vec<Row>> {
        Ok(self.gateway.fetch_all(plan).await?)
    }

    async fn rows(&self, plan: QueryPlan) -> ToolResult<ToolOutput> {
        Ok(ToolOutput::Rows(self.fetch(&plan).await?))
    }

    async fn first(&self, plan: QueryPlan) -> ToolResult<ToolOutput> {
        Ok(ToolOutput::first_row(self.fetch(&plan).await?))
    }

    async fn count_clients(&self) -> ToolResult<ToolOutput> {
        let rows = self.fetch(&plans::count_clients()).await?;
        let total = int_or_zero(rows.first(), "count");
        Ok(ToolOutput::Text(format!("Total de clientes: {}", total)))
    }

    /// Primary row first; the course rows are only fetched when it exists.
    async fn find_request(&self, plans: RequestPlans) -> ToolResult<ToolOutput> {
        let Some(mut request) = self.fetch(&plans.request).await?.into_iter().next() else {
            return Ok(ToolOutput::NotFound);
        };
        let courses = self.fetch(&plans.courses).await?;
        request.insert(
            "courses".to_string(),
            JsonValue::Array(courses.into_iter().map(JsonValue::Object).collect()),
        );
        Ok(ToolOutput::Object(request))
    }

    async fn statistics(&self, plans: StatisticsPlans) -> ToolResult<ToolOutput> {
        let (by_status, total, slots) = tokio::try_join!(
            self.gateway.fetch_all(&plans.by_status),
            self.gateway.fetch_all(&plans.total),
            self.gateway.fetch_all(&plans.slots),
        )?;

        let mut summary = Row::new();
        summary.insert(
            "por_status".to_string(),
            JsonValue::Array(by_status.into_iter().map(JsonValue::Object).collect()),
        );
        summary.insert(
            "total_solicitacoes".to_string(),
            int_or_zero(total.first(), "total_solicitacoes").into(),
        );
        summary.insert(
            "total_vagas".to_string(),
            int_or_zero(slots.first(), "total_vagas").into(),
        );
        Ok(ToolOutput::Object(summary))
    }
}
