//! Query plans for each catalog tool.
//!
//! Every function here is pure: it turns call arguments into one or more
//! [`QueryPlan`]s, or rejects the call, without touching the database.

use crate::error::{ToolError, ToolResult};
use crate::models::{QueryParam, QueryPlan};
use crate::tools::args::Args;
use crate::tools::builder::{FilterOp, Limit, QueryBuilder, comparison};
use crate::tools::catalog::{
    DEFAULT_LIST_LIMIT, DEFAULT_LOG_LIMIT, DEFAULT_RADIUS_KM, GROUPABLE_COLUMNS,
    NEAREST_SCHOOLS_CAP,
};
use crate::tools::sql_validator::SelectGate;

const USER_COLUMNS: &str = "SELECT id, name, email, role, status, city, state, created_at FROM users";
const ENTERPRISE_COLUMNS: &str =
    "SELECT id, cnpj, company_name, trade_name, city, state, created_at FROM enterprises";
const SCHOOL_COLUMNS: &str =
    "SELECT id, name, inep_code, municipality, state, network, latitude, longitude FROM schools";
const COURSE_COLUMNS: &str = "SELECT id, name, modality, area, workload_hours FROM courses";
const REQUEST_COLUMNS: &str =
    "SELECT id, enterprise_id, cnpj, status, slots, notes, created_at, updated_at FROM requests";
const QUOTA_COLUMNS: &str =
    "SELECT id, enterprise_id, cnpj, year, total_slots, used_slots FROM quotas";
const LOG_COLUMNS: &str = "SELECT id, user_id, action, level, message, created_at FROM audit_logs";

/// Great-circle distance by the spherical law of cosines, `$1` = latitude,
/// `$2` = longitude. The `acos` argument is clamped to `[-1, 1]`.
const NEAREST_SCHOOLS_BASE: &str = "SELECT * FROM (\
SELECT id, name, inep_code, municipality, state, network, latitude, longitude, \
6371 * acos(LEAST(1.0, GREATEST(-1.0, \
cos(radians($1)) * cos(radians(latitude)) * cos(radians(longitude) - radians($2)) \
+ sin(radians($1)) * sin(radians(latitude))))) AS distancia_km \
FROM schools WHERE latitude IS NOT NULL AND longitude IS NOT NULL\
) AS nearby WHERE 1=1";

fn where_all(columns: &str) -> String {
    format!("{} WHERE 1=1", columns)
}

/// Single-row lookup by the first present alternative, in declaration order.
fn lookup(
    columns: &str,
    args: &Args<'_>,
    alternatives: &[(&'static str, &'static str)],
) -> ToolResult<QueryPlan> {
    for (arg, column) in alternatives {
        if let Some(value) = args.param(arg) {
            let clause = comparison(column, FilterOp::Eq, 1, &value);
            return Ok(QueryPlan::new(
                format!("{} WHERE {}", columns, clause),
                vec![value],
            ));
        }
    }
    let names: Vec<&'static str> = alternatives.iter().map(|(arg, _)| *arg).collect();
    Err(ToolError::missing_identifier(&names))
}

/// `contar_clientes`
pub fn count_clients() -> QueryPlan {
    QueryPlan::raw("SELECT COUNT(*) AS count FROM users")
}

/// `listar_usuarios`
pub fn list_users(args: &Args<'_>) -> QueryPlan {
    let mut q = QueryBuilder::new(where_all(USER_COLUMNS));
    q.eq("role", args.param("role"))
        .eq("status", args.param("status"))
        .contains("city", args.text("cidade"))
        .tail("ORDER BY id")
        .limit(Limit::Bound(args.limit(DEFAULT_LIST_LIMIT)));
    q.build()
}

/// `buscar_usuario`
pub fn find_user(args: &Args<'_>) -> ToolResult<QueryPlan> {
    lookup(USER_COLUMNS, args, &[("id", "id"), ("email", "email")])
}

/// `listar_empresas`
pub fn list_enterprises(args: &Args<'_>) -> QueryPlan {
    let mut q = QueryBuilder::new(where_all(ENTERPRISE_COLUMNS));
    q.contains("company_name", args.text("nome"))
        .contains("city", args.text("cidade"))
        .eq("state", args.param("estado"))
        .tail("ORDER BY company_name")
        .limit(Limit::Bound(args.limit(DEFAULT_LIST_LIMIT)));
    q.build()
}

/// `buscar_empresa`
pub fn find_enterprise(args: &Args<'_>) -> ToolResult<QueryPlan> {
    lookup(ENTERPRISE_COLUMNS, args, &[("cnpj", "cnpj"), ("id", "id")])
}

/// `listar_escolas`
pub fn list_schools(args: &Args<'_>) -> QueryPlan {
    let mut q = QueryBuilder::new(where_all(SCHOOL_COLUMNS));
    q.eq("state", args.param("estado"))
        .contains("municipality", args.text("municipio"))
        .contains("name", args.text("nome"))
        .eq("network", args.param("rede"))
        .tail("ORDER BY name")
        .limit(Limit::Bound(args.limit(DEFAULT_LIST_LIMIT)));
    q.build()
}

/// `buscar_escola_proxima`
///
/// Missing coordinates fall back to `0`.
pub fn nearest_schools(args: &Args<'_>) -> QueryPlan {
    let latitude = args.number("latitude").unwrap_or(0.0);
    let longitude = args.number("longitude").unwrap_or(0.0);
    let radius = args.number("raio_km").unwrap_or(DEFAULT_RADIUS_KM);

    let mut q = QueryBuilder::with_base_params(
        NEAREST_SCHOOLS_BASE,
        vec![QueryParam::Float(latitude), QueryParam::Float(longitude)],
    );
    q.filter("distancia_km", FilterOp::Lte, radius)
        .tail("ORDER BY distancia_km ASC")
        .limit(Limit::Fixed(NEAREST_SCHOOLS_CAP));
    q.build()
}

/// `listar_cursos`
pub fn list_courses(args: &Args<'_>) -> QueryPlan {
    let mut q = QueryBuilder::new(where_all(COURSE_COLUMNS));
    q.contains("name", args.text("nome"))
        .eq("modality", args.param("modalidade"))
        .eq("area", args.param("area"))
        .tail("ORDER BY name")
        .limit(Limit::Bound(args.limit(DEFAULT_LIST_LIMIT)));
    q.build()
}

/// `listar_solicitacoes`
pub fn list_requests(args: &Args<'_>) -> QueryPlan {
    let mut q = QueryBuilder::new(where_all(REQUEST_COLUMNS));
    q.eq("status", args.param("status"))
        .eq("cnpj", args.param("cnpj"))
        .since("created_at", args.text("data_inicio"))
        .until("created_at", args.text("data_fim"))
        .tail("ORDER BY created_at DESC")
        .limit(Limit::Bound(args.limit(DEFAULT_LIST_LIMIT)));
    q.build()
}

/// Statements behind `buscar_solicitacao`, keyed by the same id.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPlans {
    pub request: QueryPlan,
    pub courses: QueryPlan,
}

/// `buscar_solicitacao`
pub fn find_request(args: &Args<'_>) -> ToolResult<RequestPlans> {
    let request = lookup(REQUEST_COLUMNS, args, &[("id", "id")])?;
    let courses = QueryPlan::new(
        "SELECT rc.id, rc.course_id, c.name AS course_name, rc.slots \
         FROM request_courses rc JOIN courses c ON c.id = rc.course_id \
         WHERE rc.request_id = $1 ORDER BY rc.id",
        request.params.clone(),
    );
    Ok(RequestPlans { request, courses })
}

/// `buscar_cota`
pub fn find_quota(args: &Args<'_>) -> ToolResult<QueryPlan> {
    lookup(
        QUOTA_COLUMNS,
        args,
        &[("cnpj", "cnpj"), ("empresa_id", "enterprise_id")],
    )
}

/// `listar_logs`
pub fn list_logs(args: &Args<'_>) -> QueryPlan {
    let mut q = QueryBuilder::new(where_all(LOG_COLUMNS));
    q.eq("user_id", args.param("usuario_id"))
        .eq("action", args.param("acao"))
        .eq("level", args.param("nivel"))
        .since("created_at", args.text("data_inicio"))
        .tail("ORDER BY created_at DESC")
        .limit(Limit::Bound(args.limit(DEFAULT_LOG_LIMIT)));
    q.build()
}

/// Column `contar_por_grupo` may interpolate into `GROUP BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupColumn {
    Role,
    Status,
    State,
}

impl GroupColumn {
    /// Resolve a caller-supplied name against the allow-list.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "role" => Some(Self::Role),
            "status" => Some(Self::Status),
            "state" => Some(Self::State),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Role => "role",
            Self::Status => "status",
            Self::State => "state",
        }
    }
}

/// `contar_por_grupo`
pub fn count_by_group(args: &Args<'_>) -> ToolResult<QueryPlan> {
    let value = args.text("campo").unwrap_or_default();
    let group = GroupColumn::parse(&value)
        .ok_or_else(|| ToolError::invalid_grouping(value, GROUPABLE_COLUMNS))?;
    let column = group.column();
    Ok(QueryPlan::raw(format!(
        "SELECT {column} AS grupo, COUNT(*) AS total FROM users \
         GROUP BY {column} ORDER BY total DESC, grupo"
    )))
}

/// Statements behind `estatisticas_solicitacoes`, sharing one period filter.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsPlans {
    pub by_status: QueryPlan,
    pub total: QueryPlan,
    pub slots: QueryPlan,
}

fn request_period(base: &str, args: &Args<'_>) -> QueryBuilder {
    let mut q = QueryBuilder::new(base);
    q.since("created_at", args.text("data_inicio"))
        .until("created_at", args.text("data_fim"));
    q
}

/// `estatisticas_solicitacoes`
pub fn request_statistics(args: &Args<'_>) -> StatisticsPlans {
    let mut by_status = request_period(
        "SELECT status, COUNT(*) AS total FROM requests WHERE 1=1",
        args,
    );
    by_status.tail("GROUP BY status ORDER BY status");

    let total = request_period(
        "SELECT COUNT(*) AS total_solicitacoes FROM requests WHERE 1=1",
        args,
    );
    let slots = request_period(
        "SELECT SUM(slots)::bigint AS total_vagas FROM requests WHERE 1=1",
        args,
    );

    StatisticsPlans {
        by_status: by_status.build(),
        total: total.build(),
        slots: slots.build(),
    }
}

/// `executar_query_customizada`
pub fn custom_query(args: &Args<'_>, gate: SelectGate) -> ToolResult<QueryPlan> {
    let sql = args.text("query").unwrap_or_default();
    gate.check(&sql)?;
    Ok(QueryPlan::raw(sql))
}
