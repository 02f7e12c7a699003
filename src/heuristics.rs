//! Best-effort detection of semantically significant response shapes.
//!
//! The analyzer walks response schema property trees and reports patterns
//! the document does not declare explicitly, such as an auth-token field
//! nested under a `user` object. Findings only ever add assertions to
//! generated scripts, never alter control flow, so false negatives are
//! acceptable and false positives merely produce a redundant assertion.

use crate::model::{Model, Operation, Schema};

/// Tunable knobs for response-shape detection, kept out of the code
/// generator so detection stays independently testable.
#[derive(Debug, Clone)]
pub struct HeuristicConfig {
    /// Property names treated as auth-token carriers.
    pub token_vocabulary: Vec<String>,
    /// Maximum nesting depth walked below the response body root.
    pub max_depth: usize,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            token_vocabulary: ["token", "access_token", "auth_token", "id_token", "jwt"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            max_depth: 3,
        }
    }
}

/// What a detected pattern means to the generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingMeaning {
    AuthToken,
}

/// One detected pattern: a dotted path into the response body plus its
/// meaning, e.g. `body.user.token` / [`FindingMeaning::AuthToken`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub path: String,
    pub meaning: FindingMeaning,
}

/// Inspect one operation's success responses and collect findings.
pub fn analyze_operation(
    model: &Model,
    operation: &Operation,
    config: &HeuristicConfig,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (status, response) in &operation.responses {
        if !status.starts_with('2') && status != "default" {
            continue;
        }
        if let Some(schema) = &response.schema {
            walk(model, schema.resolve(model), "body", 0, false, config, &mut findings);
        }
    }
    findings
}

/// Recursive property walk. A match requires both the vocabulary name and
/// the structural position: the property must sit under a named parent
/// object, so a bare top-level `token` field is not reported.
fn walk(
    model: &Model,
    schema: &Schema,
    path: &str,
    depth: usize,
    under_named_parent: bool,
    config: &HeuristicConfig,
    findings: &mut Vec<Finding>,
) {
    if depth > config.max_depth {
        return;
    }
    for (name, property) in &schema.properties {
        let property_path = format!("{path}.{name}");
        if under_named_parent
            && config
                .token_vocabulary
                .iter()
                .any(|word| word.eq_ignore_ascii_case(name))
        {
            let finding = Finding {
                path: property_path.clone(),
                meaning: FindingMeaning::AuthToken,
            };
            if !findings.contains(&finding) {
                findings.push(finding);
            }
        }
        walk(
            model,
            property.resolve(model),
            &property_path,
            depth + 1,
            true,
            config,
            findings,
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::{Info, ResponseSpec, SchemaType};
    use indexmap::IndexMap;

    fn string_schema() -> Schema {
        Schema {
            schema_type: Some(SchemaType::String),
            ..Schema::default()
        }
    }

    fn object(properties: Vec<(&str, Schema)>) -> Schema {
        Schema {
            schema_type: Some(SchemaType::Object),
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect(),
            ..Schema::default()
        }
    }

    fn empty_model() -> Model {
        Model {
            info: Info::default(),
            servers: Vec::new(),
            paths: IndexMap::new(),
            schemas: IndexMap::new(),
        }
    }

    fn operation_returning(schema: Schema) -> Operation {
        let mut responses = IndexMap::new();
        responses.insert(
            "200".to_string(),
            ResponseSpec {
                description: "OK".to_string(),
                schema: Some(schema),
            },
        );
        Operation {
            operation_id: "op".to_string(),
            summary: String::new(),
            parameters: Vec::new(),
            request_body: None,
            responses,
        }
    }

    #[test]
    fn token_under_named_parent_is_found() {
        let body = object(vec![(
            "user",
            object(vec![("name", string_schema()), ("token", string_schema())]),
        )]);
        let findings = analyze_operation(
            &empty_model(),
            &operation_returning(body),
            &HeuristicConfig::default(),
        );
        assert_eq!(
            findings,
            vec![Finding {
                path: "body.user.token".to_string(),
                meaning: FindingMeaning::AuthToken,
            }]
        );
    }

    #[test]
    fn top_level_token_is_not_reported() {
        let body = object(vec![("token", string_schema())]);
        let findings = analyze_operation(
            &empty_model(),
            &operation_returning(body),
            &HeuristicConfig::default(),
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn depth_bound_stops_the_walk() {
        let deep = object(vec![(
            "a",
            object(vec![("b", object(vec![("c", object(vec![("user", object(vec![("token", string_schema())]))]))]))]),
        )]);
        let shallow = HeuristicConfig {
            max_depth: 2,
            ..HeuristicConfig::default()
        };
        let findings = analyze_operation(&empty_model(), &operation_returning(deep), &shallow);
        assert!(findings.is_empty());
    }

    #[test]
    fn vocabulary_is_configurable() {
        let body = object(vec![(
            "session",
            object(vec![("bearer", string_schema())]),
        )]);
        let config = HeuristicConfig {
            token_vocabulary: vec!["bearer".to_string()],
            ..HeuristicConfig::default()
        };
        let findings = analyze_operation(&empty_model(), &operation_returning(body), &config);
        assert_eq!(findings[0].path, "body.session.bearer");
    }

    #[test]
    fn failure_responses_are_skipped() {
        let body = object(vec![(
            "user",
            object(vec![("token", string_schema())]),
        )]);
        let mut op = operation_returning(body);
        let spec = op.responses.shift_remove("200").unwrap();
        op.responses.insert("401".to_string(), spec);
        let findings = analyze_operation(&empty_model(), &op, &HeuristicConfig::default());
        assert!(findings.is_empty());
    }
}
