//! Two-phase spec decoding.
//!
//! JSON and YAML text are first decoded into the same generic document tree
//! (`serde_json::Value`, a tagged union of null/bool/number/string/sequence/
//! mapping), then one shared mapping pass builds the strongly-typed
//! [`Model`]. Equivalent JSON and YAML inputs therefore produce
//! field-for-field identical models, and format quirks never leak past this
//! module.
//!
//! Unknown fields are ignored at every level; missing optional fields are
//! defaulted. Structural problems (non-mapping top level, a document with
//! neither `paths` nor `servers`, parameters without names) fail with
//! [`Error::InvalidSpec`].

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::model::{
    scalar_text, HttpMethod, Info, Model, Operation, ParamLocation, Parameter, PathItem,
    ResponseSpec, Schema, SchemaType, Server, ServerVariable,
};

impl Model {
    /// Parse a JSON API description.
    pub fn parse_json(text: &str) -> Result<Model> {
        let doc: Value = serde_json::from_str(text)
            .map_err(|err| Error::InvalidSpec(format!("not well-formed JSON: {err}")))?;
        map_document(&doc)
    }

    /// Parse a YAML API description.
    pub fn parse_yaml(text: &str) -> Result<Model> {
        let doc: Value = serde_yaml::from_str(text)
            .map_err(|err| Error::InvalidSpec(format!("not well-formed YAML: {err}")))?;
        map_document(&doc)
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidSpec(message.into())
}

/// Map a generic document tree into a [`Model`].
fn map_document(doc: &Value) -> Result<Model> {
    let root = doc
        .as_object()
        .ok_or_else(|| invalid("top-level document is not a mapping"))?;
    // An empty object is rejected here, never treated as a zero-path API.
    if !root.contains_key("paths") && !root.contains_key("servers") {
        return Err(invalid("document declares neither paths nor servers"));
    }

    Ok(Model {
        info: map_info(root.get("info")),
        servers: map_servers(root.get("servers"))?,
        paths: map_paths(root.get("paths"))?,
        schemas: map_component_schemas(root),
    })
}

fn str_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key).and_then(Value::as_str).unwrap_or("").to_string()
}

fn map_info(value: Option<&Value>) -> Info {
    let Some(map) = value.and_then(Value::as_object) else {
        return Info::default();
    };
    Info {
        title: str_field(map, "title"),
        version: str_field(map, "version"),
        description: str_field(map, "description"),
    }
}

fn map_servers(value: Option<&Value>) -> Result<Vec<Server>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let entries = value
        .as_array()
        .ok_or_else(|| invalid("servers must be a sequence"))?;

    let mut servers = Vec::with_capacity(entries.len());
    for entry in entries {
        let map = entry
            .as_object()
            .ok_or_else(|| invalid("server entry must be a mapping"))?;
        let url = map
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("server entry missing url"))?
            .to_string();

        let mut variables = IndexMap::new();
        if let Some(vars) = map.get("variables") {
            let vars = vars
                .as_object()
                .ok_or_else(|| invalid("server variables must be a mapping"))?;
            for (name, variable) in vars {
                variables.insert(name.clone(), map_server_variable(name, variable)?);
            }
        }
        servers.push(Server { url, variables });
    }
    Ok(servers)
}

fn map_server_variable(name: &str, value: &Value) -> Result<ServerVariable> {
    let map = value
        .as_object()
        .ok_or_else(|| invalid(format!("server variable {name} must be a mapping")))?;
    let enum_values = match map.get("enum") {
        Some(list) => list
            .as_array()
            .ok_or_else(|| invalid(format!("enum of server variable {name} must be a sequence")))?
            .iter()
            .map(scalar_text)
            .collect(),
        None => Vec::new(),
    };
    Ok(ServerVariable {
        name: name.to_string(),
        default: map.get("default").map(scalar_text).unwrap_or_default(),
        description: str_field(map, "description"),
        enum_values,
    })
}

fn map_paths(value: Option<&Value>) -> Result<IndexMap<String, PathItem>> {
    let Some(value) = value else {
        return Ok(IndexMap::new());
    };
    let map = value
        .as_object()
        .ok_or_else(|| invalid("paths must be a mapping"))?;

    let mut paths = IndexMap::new();
    for (path, item) in map {
        let item_map = item
            .as_object()
            .ok_or_else(|| invalid(format!("path item {path} must be a mapping")))?;

        // Path-level parameters apply to every operation underneath.
        let (shared_params, _) = match item_map.get("parameters") {
            Some(list) => map_parameters(list)?,
            None => (Vec::new(), None),
        };

        let mut operations = IndexMap::new();
        for method in HttpMethod::ALL {
            if let Some(op) = item_map.get(method.key()) {
                operations.insert(method, map_operation(path, method, op, &shared_params)?);
            }
        }
        paths.insert(path.clone(), PathItem { operations });
    }
    Ok(paths)
}

fn map_operation(
    path: &str,
    method: HttpMethod,
    value: &Value,
    shared_params: &[Parameter],
) -> Result<Operation> {
    let map = value
        .as_object()
        .ok_or_else(|| invalid(format!("operation {} {path} must be a mapping", method.as_str())))?;

    let operation_id = map
        .get("operationId")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| synthesize_operation_id(method, path));

    let (own_params, body_from_params) = match map.get("parameters") {
        Some(list) => map_parameters(list)?,
        None => (Vec::new(), None),
    };

    // Merge path-level parameters first; an operation-level parameter with
    // the same name and location overrides its path-level twin.
    let mut parameters = shared_params.to_vec();
    for param in own_params {
        match parameters
            .iter_mut()
            .find(|p| p.name == param.name && p.location == param.location)
        {
            Some(slot) => *slot = param,
            None => parameters.push(param),
        }
    }

    let request_body = map
        .get("requestBody")
        .and_then(extract_body_schema)
        .or(body_from_params);

    Ok(Operation {
        operation_id,
        summary: str_field(map, "summary"),
        parameters,
        request_body,
        responses: map_responses(map.get("responses"))?,
    })
}

/// Pull the schema out of an OpenAPI 3 `requestBody` (first media type wins).
fn extract_body_schema(value: &Value) -> Option<Schema> {
    let content = value.get("content")?.as_object()?;
    let media = content.values().next()?;
    media.get("schema").map(map_schema)
}

/// Map a parameter sequence. A Swagger 2 `in: body` parameter is not a
/// [`Parameter`] at all; its schema is returned separately as the request
/// body.
fn map_parameters(value: &Value) -> Result<(Vec<Parameter>, Option<Schema>)> {
    let entries = value
        .as_array()
        .ok_or_else(|| invalid("parameters must be a sequence"))?;

    let mut parameters = Vec::new();
    let mut body = None;
    for entry in entries {
        let map = entry
            .as_object()
            .ok_or_else(|| invalid("parameter entry must be a mapping"))?;
        let name = map
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("parameter missing name"))?;
        let location_raw = map.get("in").and_then(Value::as_str).unwrap_or("query");

        if location_raw == "body" {
            body = map.get("schema").map(map_schema);
            continue;
        }
        let location = match location_raw {
            "query" => ParamLocation::Query,
            "path" => ParamLocation::Path,
            "header" => ParamLocation::Header,
            "cookie" => ParamLocation::Cookie,
            other => {
                return Err(invalid(format!(
                    "parameter {name} has unsupported location {other}"
                )))
            }
        };

        // Swagger 2 puts the type keywords directly on the parameter.
        let schema = match map.get("schema") {
            Some(schema) => map_schema(schema),
            None => map_schema(entry),
        };
        let default = map
            .get("default")
            .cloned()
            .or_else(|| map.get("schema").and_then(|s| s.get("default")).cloned());

        parameters.push(Parameter {
            name: name.to_string(),
            location,
            // Path parameters are implicitly required.
            required: location == ParamLocation::Path
                || map.get("required").and_then(Value::as_bool).unwrap_or(false),
            schema,
            default,
        });
    }
    Ok((parameters, body))
}

fn map_responses(value: Option<&Value>) -> Result<IndexMap<String, ResponseSpec>> {
    let Some(value) = value else {
        return Ok(IndexMap::new());
    };
    let map = value
        .as_object()
        .ok_or_else(|| invalid("responses must be a mapping"))?;

    let mut responses = IndexMap::new();
    for (status, response) in map {
        let response_map = response
            .as_object()
            .ok_or_else(|| invalid(format!("response {status} must be a mapping")))?;
        // OpenAPI 3 nests the schema under a media type; Swagger 2 declares
        // it directly.
        let schema = response_map
            .get("content")
            .and_then(Value::as_object)
            .and_then(|content| content.values().next())
            .and_then(|media| media.get("schema"))
            .map(map_schema)
            .or_else(|| response_map.get("schema").map(map_schema));

        responses.insert(
            status.clone(),
            ResponseSpec {
                description: str_field(response_map, "description"),
                schema,
            },
        );
    }
    Ok(responses)
}

/// Component schemas: OpenAPI 3 `components.schemas` or Swagger 2
/// `definitions`.
fn map_component_schemas(root: &Map<String, Value>) -> IndexMap<String, Schema> {
    let schemas = root
        .get("components")
        .and_then(|c| c.get("schemas"))
        .or_else(|| root.get("definitions"));
    let Some(map) = schemas.and_then(Value::as_object) else {
        return IndexMap::new();
    };
    map.iter()
        .map(|(name, schema)| (name.clone(), map_schema(schema)))
        .collect()
}

/// Map a schema subtree. Lenient by design: anything that is not a mapping
/// becomes the unconstrained empty schema.
fn map_schema(value: &Value) -> Schema {
    let Some(map) = value.as_object() else {
        return Schema::default();
    };

    Schema {
        schema_type: map
            .get("type")
            .and_then(Value::as_str)
            .and_then(SchemaType::parse),
        format: map.get("format").and_then(Value::as_str).map(str::to_string),
        minimum: map.get("minimum").and_then(Value::as_f64),
        maximum: map.get("maximum").and_then(Value::as_f64),
        enum_values: map
            .get("enum")
            .and_then(Value::as_array)
            .map(|list| list.to_vec())
            .unwrap_or_default(),
        items: map.get("items").map(|items| Box::new(map_schema(items))),
        properties: map
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(name, prop)| (name.clone(), map_schema(prop)))
                    .collect()
            })
            .unwrap_or_default(),
        required: map
            .get("required")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        reference: map
            .get("$ref")
            .and_then(Value::as_str)
            .map(component_name),
    }
}

/// Last segment of a `#/components/schemas/Name` or `#/definitions/Name`
/// reference.
fn component_name(reference: &str) -> String {
    reference.rsplit('/').next().unwrap_or(reference).to_string()
}

/// Fallback operation name for operations without an `operationId`:
/// method plus camel-cased path segments, `{braces}` stripped.
fn synthesize_operation_id(method: HttpMethod, path: &str) -> String {
    let mut id = method.key().to_string();
    for segment in path.split('/') {
        let cleaned: String = segment
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        let mut chars = cleaned.chars();
        if let Some(first) = chars.next() {
            id.push(first.to_ascii_uppercase());
            id.push_str(chars.as_str());
        }
    }
    id
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn path_parameters_are_implicitly_required() {
        let model = Model::parse_json(
            r##"{
              "paths": {
                "/pets/{petId}": {
                  "get": {
                    "parameters": [
                      { "name": "petId", "in": "path", "required": false, "schema": { "type": "string" } }
                    ],
                    "responses": {}
                  }
                }
              }
            }"##,
        )
        .unwrap();
        let op = &model.paths["/pets/{petId}"].operations[&HttpMethod::Get];
        assert!(op.parameters[0].required);
    }

    #[test]
    fn operation_ids_are_synthesized_when_absent() {
        assert_eq!(
            synthesize_operation_id(HttpMethod::Get, "/pets/{petId}"),
            "getPetsPetId"
        );
        assert_eq!(synthesize_operation_id(HttpMethod::Post, "/user/login"), "postUserLogin");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let model = Model::parse_json(
            r##"{
              "x-vendor": { "anything": true },
              "paths": {
                "/ping": { "get": { "operationId": "ping", "x-weird": 1, "responses": {} } }
              }
            }"##,
        )
        .unwrap();
        assert_eq!(model.paths["/ping"].operations[&HttpMethod::Get].operation_id, "ping");
    }

    #[test]
    fn swagger2_definitions_and_body_parameters_are_accepted() {
        let model = Model::parse_json(
            r##"{
              "swagger": "2.0",
              "paths": {
                "/pets": {
                  "post": {
                    "operationId": "createPet",
                    "parameters": [
                      { "name": "pet", "in": "body", "schema": { "$ref": "#/definitions/Pet" } }
                    ],
                    "responses": {}
                  }
                }
              },
              "definitions": {
                "Pet": { "type": "object", "properties": { "name": { "type": "string" } } }
              }
            }"##,
        )
        .unwrap();
        let op = &model.paths["/pets"].operations[&HttpMethod::Post];
        assert!(op.parameters.is_empty());
        assert_eq!(op.request_body.as_ref().unwrap().reference.as_deref(), Some("Pet"));
        assert!(model.schemas.contains_key("Pet"));
    }

    #[test]
    fn path_level_parameters_merge_into_operations() {
        let model = Model::parse_json(
            r##"{
              "paths": {
                "/pets/{petId}": {
                  "parameters": [
                    { "name": "petId", "in": "path", "schema": { "type": "string" } }
                  ],
                  "get": { "operationId": "getPet", "responses": {} },
                  "delete": {
                    "operationId": "deletePet",
                    "parameters": [
                      { "name": "petId", "in": "path", "schema": { "type": "integer" } }
                    ],
                    "responses": {}
                  }
                }
              }
            }"##,
        )
        .unwrap();
        let item = &model.paths["/pets/{petId}"];
        assert_eq!(item.operations[&HttpMethod::Get].parameters.len(), 1);
        // The operation-level declaration wins over the path-level one.
        assert_eq!(
            item.operations[&HttpMethod::Delete].parameters[0].schema.schema_type,
            Some(SchemaType::Integer)
        );
    }

    #[test]
    fn unsupported_parameter_location_is_invalid() {
        let err = Model::parse_json(
            r##"{
              "paths": {
                "/ping": {
                  "get": {
                    "parameters": [{ "name": "x", "in": "matrix" }],
                    "responses": {}
                  }
                }
              }
            }"##,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidSpec(_)));
    }
}
