//! Integration tests for the advertised tool catalog.

use edu_db_mcp::tools::{catalog, find_tool};
use serde_json::json;

fn schema(tool: &str) -> serde_json::Map<String, serde_json::Value> {
    find_tool(tool).unwrap().input_schema()
}

#[test]
fn test_every_tool_has_object_schema_and_description() {
    for tool in catalog::catalog() {
        let schema = tool.input_schema();
        assert_eq!(schema["type"], "object", "{}", tool.name);
        assert!(schema["properties"].is_object(), "{}", tool.name);
        assert!(!tool.description.is_empty(), "{}", tool.name);
    }
}

#[test]
fn test_enum_parameters() {
    assert_eq!(
        schema(catalog::LISTAR_ESCOLAS)["properties"]["rede"]["enum"],
        json!(["municipal", "estadual", "federal", "privada"])
    );
    assert_eq!(
        schema(catalog::LISTAR_CURSOS)["properties"]["modalidade"]["enum"],
        json!(["presencial", "ead", "hibrido"])
    );
    assert_eq!(
        schema(catalog::LISTAR_LOGS)["properties"]["nivel"]["enum"],
        json!(["info", "warning", "error"])
    );
    assert_eq!(
        schema(catalog::CONTAR_POR_GRUPO)["properties"]["campo"]["enum"],
        json!(["role", "status", "state"])
    );
}

#[test]
fn test_required_parameters() {
    assert_eq!(
        schema(catalog::BUSCAR_ESCOLA_PROXIMA)["required"],
        json!(["latitude", "longitude"])
    );
    assert_eq!(
        schema(catalog::EXECUTAR_QUERY_CUSTOMIZADA)["required"],
        json!(["query"])
    );
    assert!(schema(catalog::BUSCAR_USUARIO).get("required").is_none());
}

#[test]
fn test_defaults() {
    assert_eq!(
        schema(catalog::BUSCAR_ESCOLA_PROXIMA)["properties"]["raio_km"]["default"],
        json!(50.0)
    );
    assert_eq!(
        schema(catalog::LISTAR_SOLICITACOES)["properties"]["limit"]["default"],
        json!(50)
    );
}

#[test]
fn test_number_parameters_are_typed() {
    let users = schema(catalog::BUSCAR_USUARIO);
    assert_eq!(users["properties"]["id"]["type"], "number");
    assert_eq!(users["properties"]["email"]["type"], "string");
}

#[test]
fn test_properties_follow_declaration_order() {
    for tool in catalog::catalog() {
        let schema = tool.input_schema();
        let advertised: Vec<&str> = schema["properties"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        let declared: Vec<&str> = tool.params.iter().map(|p| p.name).collect();
        assert_eq!(advertised, declared, "{}", tool.name);
    }
}
