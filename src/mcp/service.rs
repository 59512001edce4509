//! MCP service implementation using rmcp.
//!
//! The catalog is data rather than a set of annotated methods, so the
//! `ServerHandler` methods for `tools/list` and `tools/call` are written by
//! hand and delegate to the [`Dispatcher`].

use crate::db::Gateway;
use crate::tools::{Dispatcher, JsonObject};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
};
use std::sync::Arc;
use tracing::info;

const INSTRUCTIONS: &str = "Ferramentas de consulta à base de dados da plataforma educacional.\n\
\n\
## Ferramentas\n\
- Listagens (`listar_*`): filtros opcionais e `limit` (padrão 50; 100 para `listar_logs`)\n\
- Buscas (`buscar_*`): informe um dos identificadores; sem resultado retorna `not found`\n\
- `buscar_escola_proxima`: até 20 escolas dentro de `raio_km` (padrão 50) da coordenada\n\
- `contar_por_grupo`: `campo` deve ser role, status ou state\n\
- `estatisticas_solicitacoes`: contagem por status, total e soma de vagas no período\n\
- `executar_query_customizada`: apenas consultas iniciadas por SELECT\n\
\n\
## Datas\n\
Use o formato ISO 8601 (ex.: 2024-01-31 ou 2024-01-31T12:00:00Z).";

pub struct CatalogService<G> {
    dispatcher: Arc<Dispatcher<G>>,
}

impl<G> Clone for CatalogService<G> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

impl<G: Gateway> CatalogService<G> {
    pub fn new(dispatcher: Arc<Dispatcher<G>>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher<G>> {
        &self.dispatcher
    }
}

impl<G: Gateway> ServerHandler for CatalogService<G> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_owned(),
                title: Some("Education DB MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.dispatcher.list_tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        info!(tool = %request.name, "Tool call");
        let arguments = request.arguments.unwrap_or_else(JsonObject::new);
        Ok(self.dispatcher.call_tool(&request.name, &arguments).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbResult;
    use crate::models::{QueryPlan, Row};

    struct EmptyGateway;

    impl Gateway for EmptyGateway {
        async fn fetch_all(&self, _plan: &QueryPlan) -> DbResult<Vec<Row>> {
            Ok(Vec::new())
        }
    }

    fn create_test_service() -> CatalogService<EmptyGateway> {
        CatalogService::new(Arc::new(Dispatcher::new(Arc::new(EmptyGateway))))
    }

    #[test]
    fn test_server_info() {
        let service = create_test_service();
        let info = service.get_info();
        assert_eq!(info.server_info.name, "edu-db-mcp");
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.unwrap().contains("executar_query_customizada"));
    }

    #[test]
    fn test_clone_shares_dispatcher() {
        let service = create_test_service();
        let cloned = service.clone();
        assert!(Arc::ptr_eq(service.dispatcher(), cloned.dispatcher()));
    }

    #[test]
    fn test_dispatcher_lists_catalog() {
        let service = create_test_service();
        let tools = service.dispatcher().list_tools();
        assert_eq!(tools.len(), crate::tools::catalog().len());
        assert_eq!(tools[0].name, "contar_clientes");
    }
}
