//! The executable request-script dialect (`api.http`).
//!
//! One request per operation in the JetBrains HTTP-client format: the
//! default request line uses the first server's URL with variable defaults
//! substituted, query parameters with declared defaults rendered in declared
//! order, and a response-handler block asserting every heuristic finding.

use serde_json::Value;

use crate::heuristics::{analyze_operation, FindingMeaning, HeuristicConfig};
use crate::model::{HttpMethod, Model, Operation, ParamLocation, Schema, SchemaType};

use super::utils::scalar_text;

pub(crate) const FILE_NAME: &str = "api.http";

/// Sample bodies stop recursing here; deeper structure degrades to null.
const SAMPLE_DEPTH_LIMIT: usize = 4;

pub(crate) fn generate(model: &Model, heuristics: &HeuristicConfig) -> String {
    let base = model.base_url();
    let mut out = String::new();
    out.push_str(&format!(
        "# {} {}\n# Generated request script.\n",
        model.info.title, model.info.version
    ));
    for (path, item) in &model.paths {
        for (method, op) in &item.operations {
            emit_request(&mut out, model, &base, path, *method, op, heuristics);
        }
    }
    out
}

fn emit_request(
    out: &mut String,
    model: &Model,
    base: &str,
    path: &str,
    method: HttpMethod,
    op: &Operation,
    heuristics: &HeuristicConfig,
) {
    out.push_str(&format!("\n### {}\n", op.operation_id));
    if !op.summary.is_empty() {
        out.push_str(&format!("# {}\n", op.summary));
    }

    let mut url = format!("{base}{path}");
    for param in &op.parameters {
        if param.location == ParamLocation::Path {
            if let Some(default) = &param.default {
                // No default leaves the {placeholder} literal.
                url = url.replace(&format!("{{{}}}", param.name), &scalar_text(default));
            }
        }
    }
    let query_defaults: Vec<String> = op
        .parameters
        .iter()
        .filter(|p| p.location == ParamLocation::Query)
        .filter_map(|p| {
            p.default
                .as_ref()
                .map(|default| format!("{}={}", p.name, scalar_text(default)))
        })
        .collect();
    if !query_defaults.is_empty() {
        url.push('?');
        url.push_str(&query_defaults.join("&"));
    }

    out.push_str(&format!("{} {url}\n", method.as_str()));
    out.push_str("Accept: application/json\n");
    if let Some(body) = &op.request_body {
        out.push_str("Content-Type: application/json\n\n");
        out.push_str(&sample_body(model, body));
        out.push('\n');
    }

    let findings = analyze_operation(model, op, heuristics);
    if !findings.is_empty() {
        out.push_str("\n> {%\n");
        for finding in &findings {
            match finding.meaning {
                FindingMeaning::AuthToken => out.push_str(&format!(
                    "client.assert(typeof response.{} !== \"undefined\", \"No token returned\");\n",
                    finding.path
                )),
            }
        }
        out.push_str("%}\n");
    }
}

fn sample_body(model: &Model, schema: &Schema) -> String {
    let value = sample_value(model, schema, 0);
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}

/// Synthesize a placeholder value matching a schema: empty strings, zeros,
/// the first enum value when one is declared.
fn sample_value(model: &Model, schema: &Schema, depth: usize) -> Value {
    if depth > SAMPLE_DEPTH_LIMIT {
        return Value::Null;
    }
    let schema = schema.resolve(model);
    if let Some(first) = schema.enum_values.first() {
        return first.clone();
    }
    match schema.schema_type {
        Some(SchemaType::String) => Value::String(String::new()),
        Some(SchemaType::Integer) => Value::from(0),
        Some(SchemaType::Number) => Value::from(0.0),
        Some(SchemaType::Boolean) => Value::Bool(false),
        Some(SchemaType::Array) => Value::Array(
            schema
                .items
                .as_deref()
                .map(|items| vec![sample_value(model, items, depth + 1)])
                .unwrap_or_default(),
        ),
        Some(SchemaType::Object) | None => {
            let mut map = serde_json::Map::new();
            for (name, property) in &schema.properties {
                map.insert(name.clone(), sample_value(model, property, depth + 1));
            }
            Value::Object(map)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_server_variables_stay_literal() {
        let model = Model::parse_json(
            r##"{
              "servers": [{ "url": "{scheme}://example.test" }],
              "paths": { "/ping": { "get": { "operationId": "ping", "responses": {} } } }
            }"##,
        )
        .unwrap();
        let script = generate(&model, &HeuristicConfig::default());
        assert!(script.contains("GET {scheme}://example.test/ping"));
    }

    #[test]
    fn sample_bodies_follow_the_schema() {
        let model = Model::parse_json(
            r##"{
              "paths": {
                "/pets": {
                  "post": {
                    "operationId": "createPet",
                    "requestBody": {
                      "content": {
                        "application/json": {
                          "schema": { "$ref": "#/components/schemas/Pet" }
                        }
                      }
                    },
                    "responses": {}
                  }
                }
              },
              "components": {
                "schemas": {
                  "Pet": {
                    "type": "object",
                    "properties": {
                      "name": { "type": "string" },
                      "age": { "type": "integer" },
                      "kind": { "type": "string", "enum": ["cat", "dog"] }
                    }
                  }
                }
              }
            }"##,
        )
        .unwrap();
        let script = generate(&model, &HeuristicConfig::default());
        assert!(script.contains("\"name\": \"\""));
        assert!(script.contains("\"age\": 0"));
        assert!(script.contains("\"kind\": \"cat\""));
    }

    #[test]
    fn path_parameter_defaults_are_substituted() {
        let model = Model::parse_json(
            r##"{
              "paths": {
                "/pets/{petId}": {
                  "get": {
                    "operationId": "getPet",
                    "parameters": [
                      { "name": "petId", "in": "path", "schema": { "type": "integer", "default": 1 } }
                    ],
                    "responses": {}
                  }
                }
              }
            }"##,
        )
        .unwrap();
        let script = generate(&model, &HeuristicConfig::default());
        assert!(script.contains("GET /pets/1\n"));
    }
}
