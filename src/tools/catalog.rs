//! Static tool catalog.
//!
//! Declaration order is the order advertised by `tools/list`.

use crate::models::{ParamDefault, ParamSpec, ToolDefinition};

pub const CONTAR_CLIENTES: &str = "contar_clientes";
pub const LISTAR_USUARIOS: &str = "listar_usuarios";
pub const BUSCAR_USUARIO: &str = "buscar_usuario";
pub const LISTAR_EMPRESAS: &str = "listar_empresas";
pub const BUSCAR_EMPRESA: &str = "buscar_empresa";
pub const LISTAR_ESCOLAS: &str = "listar_escolas";
pub const BUSCAR_ESCOLA_PROXIMA: &str = "buscar_escola_proxima";
pub const LISTAR_CURSOS: &str = "listar_cursos";
pub const LISTAR_SOLICITACOES: &str = "listar_solicitacoes";
pub const BUSCAR_SOLICITACAO: &str = "buscar_solicitacao";
pub const BUSCAR_COTA: &str = "buscar_cota";
pub const LISTAR_LOGS: &str = "listar_logs";
pub const CONTAR_POR_GRUPO: &str = "contar_por_grupo";
pub const ESTATISTICAS_SOLICITACOES: &str = "estatisticas_solicitacoes";
pub const EXECUTAR_QUERY_CUSTOMIZADA: &str = "executar_query_customizada";

/// Default row cap for list tools.
pub const DEFAULT_LIST_LIMIT: i64 = 50;
/// Default row cap for `listar_logs`.
pub const DEFAULT_LOG_LIMIT: i64 = 100;
/// Default search radius for `buscar_escola_proxima`, in kilometres.
pub const DEFAULT_RADIUS_KM: f64 = 50.0;
/// Row cap for `buscar_escola_proxima`. Not caller-adjustable.
pub const NEAREST_SCHOOLS_CAP: u32 = 20;

/// Columns `contar_por_grupo` may group by.
pub const GROUPABLE_COLUMNS: &[&str] = &["role", "status", "state"];

const SCHOOL_NETWORKS: &[&str] = &["municipal", "estadual", "federal", "privada"];
const COURSE_MODALITIES: &[&str] = &["presencial", "ead", "hibrido"];
const LOG_LEVELS: &[&str] = &["info", "warning", "error"];

static CATALOG: &[ToolDefinition] = &[
    ToolDefinition {
        name: CONTAR_CLIENTES,
        description: "Retorna o total de clientes (usuários) cadastrados.",
        params: &[],
    },
    ToolDefinition {
        name: LISTAR_USUARIOS,
        description: "Lista usuários com filtros opcionais por papel, status e cidade.",
        params: &[
            ParamSpec::text("role", "Papel do usuário (ex.: admin, empresa, escola)"),
            ParamSpec::text("status", "Status do usuário (ex.: ativo, inativo)"),
            ParamSpec::text("cidade", "Parte do nome da cidade"),
            ParamSpec::number("limit", "Número máximo de registros")
                .with_default(ParamDefault::Int(DEFAULT_LIST_LIMIT)),
        ],
    },
    ToolDefinition {
        name: BUSCAR_USUARIO,
        description: "Busca um usuário por id ou e-mail.",
        params: &[
            ParamSpec::number("id", "Identificador do usuário"),
            ParamSpec::text("email", "E-mail do usuário"),
        ],
    },
    ToolDefinition {
        name: LISTAR_EMPRESAS,
        description: "Lista empresas com filtros opcionais por nome, cidade e estado.",
        params: &[
            ParamSpec::text("nome", "Parte da razão social"),
            ParamSpec::text("cidade", "Parte do nome da cidade"),
            ParamSpec::text("estado", "UF (ex.: SP)"),
            ParamSpec::number("limit", "Número máximo de registros")
                .with_default(ParamDefault::Int(DEFAULT_LIST_LIMIT)),
        ],
    },
    ToolDefinition {
        name: BUSCAR_EMPRESA,
        description: "Busca uma empresa por CNPJ ou id.",
        params: &[
            ParamSpec::text("cnpj", "CNPJ da empresa"),
            ParamSpec::number("id", "Identificador da empresa"),
        ],
    },
    ToolDefinition {
        name: LISTAR_ESCOLAS,
        description: "Lista escolas com filtros opcionais por estado, município, nome e rede.",
        params: &[
            ParamSpec::text("estado", "UF (ex.: SP)"),
            ParamSpec::text("municipio", "Parte do nome do município"),
            ParamSpec::text("nome", "Parte do nome da escola"),
            ParamSpec::text("rede", "Rede de ensino").one_of(SCHOOL_NETWORKS),
            ParamSpec::number("limit", "Número máximo de registros")
                .with_default(ParamDefault::Int(DEFAULT_LIST_LIMIT)),
        ],
    },
    ToolDefinition {
        name: BUSCAR_ESCOLA_PROXIMA,
        description: "Busca as escolas mais próximas de uma coordenada, ordenadas por distância (máximo 20).",
        params: &[
            ParamSpec::number("latitude", "Latitude em graus decimais").required(),
            ParamSpec::number("longitude", "Longitude em graus decimais").required(),
            ParamSpec::number("raio_km", "Raio de busca em quilômetros")
                .with_default(ParamDefault::Float(DEFAULT_RADIUS_KM)),
        ],
    },
    ToolDefinition {
        name: LISTAR_CURSOS,
        description: "Lista cursos com filtros opcionais por nome, modalidade e área.",
        params: &[
            ParamSpec::text("nome", "Parte do nome do curso"),
            ParamSpec::text("modalidade", "Modalidade de oferta").one_of(COURSE_MODALITIES),
            ParamSpec::text("area", "Área tecnológica"),
            ParamSpec::number("limit", "Número máximo de registros")
                .with_default(ParamDefault::Int(DEFAULT_LIST_LIMIT)),
        ],
    },
    ToolDefinition {
        name: LISTAR_SOLICITACOES,
        description: "Lista solicitações de vagas com filtros por status, CNPJ e período.",
        params: &[
            ParamSpec::text("status", "Status da solicitação"),
            ParamSpec::text("cnpj", "CNPJ da empresa solicitante"),
            ParamSpec::text("data_inicio", "Data inicial (ISO 8601)"),
            ParamSpec::text("data_fim", "Data final (ISO 8601)"),
            ParamSpec::number("limit", "Número máximo de registros")
                .with_default(ParamDefault::Int(DEFAULT_LIST_LIMIT)),
        ],
    },
    ToolDefinition {
        name: BUSCAR_SOLICITACAO,
        description: "Busca uma solicitação por id, incluindo os cursos solicitados.",
        params: &[ParamSpec::number("id", "Identificador da solicitação").required()],
    },
    ToolDefinition {
        name: BUSCAR_COTA,
        description: "Busca a cota de vagas de uma empresa por CNPJ ou id da empresa.",
        params: &[
            ParamSpec::text("cnpj", "CNPJ da empresa"),
            ParamSpec::number("empresa_id", "Identificador da empresa"),
        ],
    },
    ToolDefinition {
        name: LISTAR_LOGS,
        description: "Lista registros de auditoria, mais recentes primeiro.",
        params: &[
            ParamSpec::number("usuario_id", "Identificador do usuário"),
            ParamSpec::text("acao", "Ação registrada"),
            ParamSpec::text("nivel", "Nível do registro").one_of(LOG_LEVELS),
            ParamSpec::text("data_inicio", "Data inicial (ISO 8601)"),
            ParamSpec::number("limit", "Número máximo de registros")
                .with_default(ParamDefault::Int(DEFAULT_LOG_LIMIT)),
        ],
    },
    ToolDefinition {
        name: CONTAR_POR_GRUPO,
        description: "Conta usuários agrupados por papel, status ou estado.",
        params: &[ParamSpec::text("campo", "Coluna de agrupamento")
            .required()
            .one_of(GROUPABLE_COLUMNS)],
    },
    ToolDefinition {
        name: ESTATISTICAS_SOLICITACOES,
        description: "Estatísticas de solicitações: contagem por status, total e soma de vagas.",
        params: &[
            ParamSpec::text("data_inicio", "Data inicial (ISO 8601)"),
            ParamSpec::text("data_fim", "Data final (ISO 8601)"),
        ],
    },
    ToolDefinition {
        name: EXECUTAR_QUERY_CUSTOMIZADA,
        description: "Executa uma consulta SELECT arbitrária. Apenas consultas iniciadas por SELECT são aceitas.",
        params: &[ParamSpec::text("query", "Consulta SQL (somente SELECT)").required()],
    },
];

/// Every tool, in declaration order.
pub fn catalog() -> &'static [ToolDefinition] {
    CATALOG
}

/// Exact, case-sensitive lookup by name.
pub fn find_tool(name: &str) -> Option<&'static ToolDefinition> {
    CATALOG.iter().find(|tool| tool.name == name)
}
