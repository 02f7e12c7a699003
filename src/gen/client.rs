//! The "interface" dialect: a typed TypeScript client with inline
//! request-parameter validation.
//!
//! Emission is plain string building over the model; every constraint a
//! parameter declares (numeric bounds, enums) becomes a verbatim
//! `checkRequest` precondition whose message names the parameter and the
//! violated rule. The runtime prelude (`checkRequest`, `ApiError`) is a
//! static template fetched through the build context.

use tracing::warn;

use crate::context::BuildContext;
use crate::error::Result;
use crate::model::{
    HttpMethod, Model, Operation, ParamLocation, Parameter, ResponseSpec, Schema, SchemaType,
};

use super::utils::{escape_js, fmt_number, quote_prop, sanitize_ident, scalar_text, ts_literal};

pub(crate) const FILE_NAME: &str = "client.ts";

/// Template resource path for the runtime prelude.
pub(crate) const RUNTIME_TEMPLATE: &str = "templates/runtime.ts";

pub(crate) async fn generate(model: &Model, context: &BuildContext) -> Result<String> {
    let prelude = context.fetch_string(RUNTIME_TEMPLATE).await?;

    let mut out = String::new();
    out.push_str(&format!(
        "// {} {} - generated API client, do not edit by hand.\n\n",
        model.info.title, model.info.version
    ));
    out.push_str(prelude.trim_end());
    out.push('\n');

    for (name, schema) in &model.schemas {
        out.push('\n');
        emit_type_def(&mut out, model, name, schema);
    }

    out.push('\n');
    emit_client_interface(&mut out, model);

    for (path, item) in &model.paths {
        for (method, op) in &item.operations {
            out.push('\n');
            emit_operation(&mut out, model, path, *method, op);
        }
    }
    Ok(out)
}

/// One component schema becomes an interface, a literal-union alias, or a
/// plain type alias.
fn emit_type_def(out: &mut String, model: &Model, name: &str, schema: &Schema) {
    if !schema.enum_values.is_empty() {
        let variants = schema
            .enum_values
            .iter()
            .map(ts_literal)
            .collect::<Vec<_>>()
            .join(" | ");
        out.push_str(&format!("export type {name} = {variants};\n"));
        return;
    }
    if !schema.properties.is_empty() {
        out.push_str(&format!("export interface {name} {{\n"));
        for (prop, prop_schema) in &schema.properties {
            let optional = if schema.required.iter().any(|r| r == prop) { "" } else { "?" };
            out.push_str(&format!(
                "  {}{optional}: {};\n",
                quote_prop(prop),
                ts_type(model, prop_schema)
            ));
        }
        out.push_str("}\n");
        return;
    }
    out.push_str(&format!("export type {name} = {};\n", ts_type(model, schema)));
}

fn ts_type(model: &Model, schema: &Schema) -> String {
    if let Some(name) = &schema.reference {
        if model.schemas.contains_key(name) {
            return name.clone();
        }
    }
    if !schema.enum_values.is_empty() {
        return schema
            .enum_values
            .iter()
            .map(ts_literal)
            .collect::<Vec<_>>()
            .join(" | ");
    }
    match schema.schema_type {
        Some(SchemaType::String) => "string".to_string(),
        Some(SchemaType::Integer | SchemaType::Number) => "number".to_string(),
        Some(SchemaType::Boolean) => "boolean".to_string(),
        Some(SchemaType::Array) => {
            let inner = schema
                .items
                .as_deref()
                .map(|items| ts_type(model, items))
                .unwrap_or_else(|| "unknown".to_string());
            if inner.contains(' ') {
                format!("({inner})[]")
            } else {
                format!("{inner}[]")
            }
        }
        Some(SchemaType::Object) => {
            if schema.properties.is_empty() {
                "Record<string, unknown>".to_string()
            } else {
                let fields = schema
                    .properties
                    .iter()
                    .map(|(prop, prop_schema)| {
                        let optional =
                            if schema.required.iter().any(|r| r == prop) { "" } else { "?" };
                        format!("{}{optional}: {}", quote_prop(prop), ts_type(model, prop_schema))
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                format!("{{ {fields} }}")
            }
        }
        None => "unknown".to_string(),
    }
}

/// The typed client stub: one method signature per operation, in document
/// order.
fn emit_client_interface(out: &mut String, model: &Model) {
    out.push_str("export interface ApiClient {\n");
    for item in model.paths.values() {
        for op in item.operations.values() {
            out.push_str(&format!(
                "  {}({}): Promise<{}>;\n",
                op.operation_id,
                signature_args(model, op, false),
                response_type(model, op)
            ));
        }
    }
    out.push_str("}\n");
}

/// Argument list in declared parameter order; the request body, when
/// present, comes last.
fn signature_args(model: &Model, op: &Operation, with_defaults: bool) -> String {
    let mut args = Vec::new();
    for param in &op.parameters {
        let ident = sanitize_ident(&param.name);
        let ty = ts_type(model, &param.schema);
        match (&param.default, with_defaults) {
            (Some(default), true) => args.push(format!("{ident}: {ty} = {}", ts_literal(default))),
            (Some(_), false) => args.push(format!("{ident}?: {ty}")),
            (None, _) if param.required => args.push(format!("{ident}: {ty}")),
            (None, _) => args.push(format!("{ident}?: {ty}")),
        }
    }
    if let Some(body) = &op.request_body {
        args.push(format!("body: {}", ts_type(model, body)));
    }
    args.join(", ")
}

/// First 2xx response with a schema, falling back to "default"; `void` when
/// nothing declares a body.
fn response_type(model: &Model, op: &Operation) -> String {
    let mut chosen: Option<&ResponseSpec> = None;
    for (status, response) in &op.responses {
        if status.starts_with('2') && response.schema.is_some() {
            chosen = Some(response);
            break;
        }
    }
    let chosen = chosen.or_else(|| op.responses.get("default"));
    match chosen.and_then(|r| r.schema.as_ref()) {
        Some(schema) => ts_type(model, schema),
        None => "void".to_string(),
    }
}

fn emit_operation(out: &mut String, model: &Model, path: &str, method: HttpMethod, op: &Operation) {
    let ret = response_type(model, op);
    out.push_str(&format!(
        "export async function {}({}): Promise<{}> {{\n",
        op.operation_id,
        signature_args(model, op, true),
        ret
    ));
    emit_guards(out, model, op);
    emit_url(out, model, path, op);
    emit_fetch(out, method, op, &ret);
    out.push_str("}\n");
}

/// Runtime preconditions for every constrained parameter. Data-quality
/// problems degrade to a best-effort check plus a warning; one bad
/// parameter never blocks generation for the rest of the model.
fn emit_guards(out: &mut String, model: &Model, op: &Operation) {
    for param in &op.parameters {
        let schema = param.schema.resolve(model);
        if !schema.has_constraints() {
            continue;
        }
        let ident = sanitize_ident(&param.name);
        let optional = !param.required && param.default.is_none();

        match (schema.minimum, schema.maximum) {
            (Some(min), Some(max)) => {
                if min > max {
                    warn!(
                        parameter = %param.name,
                        minimum = min,
                        maximum = max,
                        "Declared minimum exceeds maximum; emitting best-effort range check."
                    );
                }
                push_guard(
                    out,
                    optional,
                    &ident,
                    &format!(
                        "{ident} >= {} && {ident} <= {}",
                        fmt_number(min),
                        fmt_number(max)
                    ),
                    &format!(
                        "Invalid {}: expected {} in [{}, {}]",
                        param.name,
                        param.name,
                        fmt_number(min),
                        fmt_number(max)
                    ),
                );
            }
            (Some(min), None) => push_guard(
                out,
                optional,
                &ident,
                &format!("{ident} >= {}", fmt_number(min)),
                &format!("Invalid {}: expected {} >= {}", param.name, param.name, fmt_number(min)),
            ),
            (None, Some(max)) => push_guard(
                out,
                optional,
                &ident,
                &format!("{ident} <= {}", fmt_number(max)),
                &format!("Invalid {}: expected {} <= {}", param.name, param.name, fmt_number(max)),
            ),
            (None, None) => {}
        }

        if !schema.enum_values.is_empty() {
            let literals = schema
                .enum_values
                .iter()
                .map(ts_literal)
                .collect::<Vec<_>>()
                .join(", ");
            let allowed = schema
                .enum_values
                .iter()
                .map(scalar_text)
                .collect::<Vec<_>>()
                .join(", ");
            push_guard(
                out,
                optional,
                &ident,
                &format!("[{literals}].includes({ident})"),
                &format!("Invalid {}: expected one of {allowed}", param.name),
            );
        }
    }
}

fn push_guard(out: &mut String, optional: bool, ident: &str, condition: &str, message: &str) {
    if optional {
        // An omitted optional parameter must not trip its own guard.
        out.push_str(&format!(
            "  checkRequest({ident} === undefined || ({condition}), \"{}\");\n",
            escape_js(message)
        ));
    } else {
        out.push_str(&format!(
            "  checkRequest({condition}, \"{}\");\n",
            escape_js(message)
        ));
    }
}

fn emit_url(out: &mut String, model: &Model, path: &str, op: &Operation) {
    let base = model.base_url();
    let mut template = format!("{base}{path}");
    for param in &op.parameters {
        if param.location == ParamLocation::Path {
            let ident = sanitize_ident(&param.name);
            template = template.replace(
                &format!("{{{}}}", param.name),
                &format!("${{encodeURIComponent(String({ident}))}}"),
            );
        }
    }

    let query: Vec<&Parameter> = op
        .parameters
        .iter()
        .filter(|p| p.location == ParamLocation::Query)
        .collect();
    if query.is_empty() {
        out.push_str(&format!("  const url = `{template}`;\n"));
        return;
    }
    out.push_str("  const query = new URLSearchParams();\n");
    for param in query {
        let ident = sanitize_ident(&param.name);
        if !param.required && param.default.is_none() {
            out.push_str(&format!(
                "  if ({ident} !== undefined) {{\n    query.set(\"{}\", String({ident}));\n  }}\n",
                escape_js(&param.name)
            ));
        } else {
            out.push_str(&format!(
                "  query.set(\"{}\", String({ident}));\n",
                escape_js(&param.name)
            ));
        }
    }
    out.push_str("  const qs = query.toString();\n");
    out.push_str(&format!(
        "  const url = `{template}${{qs ? `?${{qs}}` : \"\"}}`;\n"
    ));
}

fn emit_fetch(out: &mut String, method: HttpMethod, op: &Operation, ret: &str) {
    out.push_str("  const headers: Record<string, string> = { Accept: \"application/json\" };\n");
    for param in &op.parameters {
        if param.location != ParamLocation::Header {
            continue;
        }
        let ident = sanitize_ident(&param.name);
        if !param.required && param.default.is_none() {
            out.push_str(&format!(
                "  if ({ident} !== undefined) {{\n    headers[\"{}\"] = String({ident});\n  }}\n",
                escape_js(&param.name)
            ));
        } else {
            out.push_str(&format!(
                "  headers[\"{}\"] = String({ident});\n",
                escape_js(&param.name)
            ));
        }
    }

    let cookies: Vec<&Parameter> = op
        .parameters
        .iter()
        .filter(|p| p.location == ParamLocation::Cookie)
        .collect();
    if !cookies.is_empty() {
        out.push_str("  const cookies: string[] = [];\n");
        for param in cookies {
            let ident = sanitize_ident(&param.name);
            let push = format!(
                "cookies.push(`{}=${{encodeURIComponent(String({ident}))}}`);",
                escape_js(&param.name)
            );
            if !param.required && param.default.is_none() {
                out.push_str(&format!("  if ({ident} !== undefined) {{\n    {push}\n  }}\n"));
            } else {
                out.push_str(&format!("  {push}\n"));
            }
        }
        out.push_str("  if (cookies.length > 0) {\n    headers[\"Cookie\"] = cookies.join(\"; \");\n  }\n");
    }

    let mut init = format!("method: \"{}\", headers", method.as_str());
    if op.request_body.is_some() {
        out.push_str("  headers[\"Content-Type\"] = \"application/json\";\n");
        init.push_str(", body: JSON.stringify(body)");
    }
    out.push_str(&format!("  const res = await fetch(url, {{ {init} }});\n"));
    out.push_str("  if (!res.ok) {\n    throw new ApiError(res.status, res.statusText);\n  }\n");
    if ret != "void" {
        out.push_str(&format!("  return (await res.json()) as {ret};\n"));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use futures_util::future::BoxFuture;

    use crate::context::BuildContext;
    use crate::model::Model;

    const CONSTRAINED_PARAMS: &str = r##"{
  "openapi": "3.0.0",
  "info": { "title": "Guards", "version": "0.1" },
  "paths": {
    "/items": {
      "get": {
        "operationId": "listItems",
        "parameters": [
          { "name": "limit", "in": "query", "required": true, "schema": { "type": "integer", "minimum": 100, "maximum": 1 } },
          { "name": "sort", "in": "query", "required": true, "schema": { "type": "string", "enum": ["asc", "desc"] } }
        ],
        "responses": { "200": { "description": "OK" } }
      }
    }
  }
}"##;

    fn runtime_context() -> BuildContext {
        BuildContext::new(|path| -> BoxFuture<'static, Option<Vec<u8>>> {
            let bytes = (path == super::RUNTIME_TEMPLATE)
                .then(|| include_bytes!("../../templates/runtime.ts").to_vec());
            Box::pin(async move { bytes })
        })
    }

    #[tokio::test]
    async fn inconsistent_bounds_still_generate_a_declared_range_guard() {
        // minimum > maximum degrades to a warning, never a failed run.
        let model = Model::parse_json(CONSTRAINED_PARAMS).unwrap();
        let out = super::generate(&model, &runtime_context()).await.unwrap();
        assert!(
            out.contains(
                "checkRequest(limit >= 100 && limit <= 1, \"Invalid limit: expected limit in [100, 1]\");"
            ),
            "but was {out}"
        );
        assert!(out.contains("export async function listItems("), "but was {out}");
    }

    #[tokio::test]
    async fn enum_parameters_get_a_membership_guard() {
        let model = Model::parse_json(CONSTRAINED_PARAMS).unwrap();
        let out = super::generate(&model, &runtime_context()).await.unwrap();
        assert!(
            out.contains(
                "checkRequest([\"asc\", \"desc\"].includes(sort), \"Invalid sort: expected one of asc, desc\");"
            ),
            "but was {out}"
        );
    }
}
