//! OpenAPI/Swagger description to client-code generator.
//!
//! Two stages. [`Model::parse_json`] / [`Model::parse_yaml`] normalize a JSON
//! or YAML API description into an immutable [`Model`]; a [`SwaggerGenerator`]
//! then walks that model and emits an ordered file-name to content mapping:
//! typed client stubs (`client.ts`) and an executable request script
//! (`api.http`), with inline request-parameter validation synthesized from
//! declared constraints. Template fragments reach the generators only through
//! the injected [`BuildContext`] fetch capability, so the core performs no
//! file-system or network I/O of its own.

mod context;
mod error;
mod gen;
mod heuristics;
mod model;
mod parser;

pub use context::{generate, BuildContext, FetchFn};
pub use error::{Error, Result};
pub use gen::{Generator, Kind, SwaggerGenerator};
pub use heuristics::{analyze_operation, Finding, FindingMeaning, HeuristicConfig};
pub use model::{
    HttpMethod, Info, Model, Operation, ParamLocation, Parameter, PathItem, ResponseSpec, Schema,
    SchemaType, Server, ServerVariable,
};
