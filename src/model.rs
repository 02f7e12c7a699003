//! Normalized in-memory representation of an OpenAPI/Swagger description.
//!
//! The model is built once by the parser and is read-only afterwards: the
//! generators take `&Model` and never mutate it, so one parsed model can back
//! any number of generation runs, including concurrent ones.

use indexmap::IndexMap;
use serde_json::Value;

/// Root of a parsed API description.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub info: Info,
    /// Declared servers, in document order. The first one supplies the
    /// default base URL for generated requests.
    pub servers: Vec<Server>,
    /// Path template to operations, in document order.
    pub paths: IndexMap<String, PathItem>,
    /// Reusable component schemas by name.
    pub schemas: IndexMap<String, Schema>,
}

impl Model {
    /// Default base URL: the first server's url with every `{variable}`
    /// placeholder substituted by its declared default. Empty when the
    /// document declares no servers.
    pub fn base_url(&self) -> String {
        self.servers.first().map(Server::base_url).unwrap_or_default()
    }
}

/// Document metadata. Absent fields normalize to empty strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Info {
    pub title: String,
    pub version: String,
    pub description: String,
}

/// One entry of the `servers` sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Server {
    /// May contain `{variable}` placeholders.
    pub url: String,
    pub variables: IndexMap<String, ServerVariable>,
}

impl Server {
    /// Substitute placeholders with their variable defaults. A placeholder
    /// without a matching variable stays literal.
    pub fn base_url(&self) -> String {
        let mut url = self.url.clone();
        for (name, variable) in &self.variables {
            url = url.replace(&format!("{{{name}}}"), &variable.default);
        }
        url
    }
}

/// A named placeholder in a server URL template.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerVariable {
    pub name: String,
    pub default: String,
    /// Absent descriptions normalize to `""`.
    pub description: String,
    /// Allowed values; empty means unconstrained.
    pub enum_values: Vec<String>,
}

/// HTTP methods an operation can be keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
    ];

    /// Lowercase document key ("get", "post", ...).
    pub fn key(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
        }
    }

    /// Wire form ("GET", "POST", ...).
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
        }
    }
}

/// Operations declared under one path template.
#[derive(Debug, Clone, PartialEq)]
pub struct PathItem {
    pub operations: IndexMap<HttpMethod, Operation>,
}

/// One HTTP method on one path.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub operation_id: String,
    pub summary: String,
    /// Declared order; it drives generated call-signature order.
    pub parameters: Vec<Parameter>,
    pub request_body: Option<Schema>,
    /// Keyed by status code or "default", in document order.
    pub responses: IndexMap<String, ResponseSpec>,
}

/// Where a parameter appears in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Query,
    Path,
    Header,
    Cookie,
}

/// A single operation parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub location: ParamLocation,
    /// Path parameters are always required, whatever the document says.
    pub required: bool,
    pub schema: Schema,
    /// Declared default value, if any.
    pub default: Option<Value>,
}

/// Primitive and composite schema kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl SchemaType {
    pub fn parse(raw: &str) -> Option<SchemaType> {
        match raw {
            "string" => Some(SchemaType::String),
            "integer" => Some(SchemaType::Integer),
            "number" => Some(SchemaType::Number),
            "boolean" => Some(SchemaType::Boolean),
            "array" => Some(SchemaType::Array),
            "object" => Some(SchemaType::Object),
            _ => None,
        }
    }
}

/// Recursive type descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub schema_type: Option<SchemaType>,
    pub format: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    /// Allowed values; empty means unconstrained.
    pub enum_values: Vec<Value>,
    /// Item schema for arrays.
    pub items: Option<Box<Schema>>,
    /// Field schemas for objects, in document order.
    pub properties: IndexMap<String, Schema>,
    /// Required property names for objects.
    pub required: Vec<String>,
    /// Name of a referenced component schema, resolved through
    /// [`Model::schemas`].
    pub reference: Option<String>,
}

impl Schema {
    /// Follow a component reference one level into the model's schema table.
    /// Unresolvable references fall back to the schema itself.
    pub fn resolve<'a>(&'a self, model: &'a Model) -> &'a Schema {
        match &self.reference {
            Some(name) => model.schemas.get(name).unwrap_or(self),
            None => self,
        }
    }

    /// Whether this schema declares anything worth a runtime precondition.
    pub fn has_constraints(&self) -> bool {
        self.minimum.is_some() || self.maximum.is_some() || !self.enum_values.is_empty()
    }
}

/// One response entry of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSpec {
    pub description: String,
    /// Shape of the response body, when declared.
    pub schema: Option<Schema>,
}

/// Render a scalar document value as plain text, without quoting. Used for
/// server-variable defaults, parameter defaults and query-string values.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
