//! Schema-driven configuration validation.
//!
//! Validates a `serde_json::Value` configuration against a [`Schema`] before
//! any network call is made: presence of required attributes, value types,
//! enum membership, and numeric ranges. Returns attribute-scoped diagnostics
//! pointing at the offending path.

use crate::schema::{
    Attribute, AttributeType, Block, BlockNestingMode, Diagnostic, NestedBlock, Schema,
};
use serde_json::Value;

/// Validate a configuration value against a schema.
///
/// An empty result means the configuration is valid. Computed-only
/// attributes are skipped; the provider owns those.
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_block(&schema.block, value, "", &mut diagnostics);
    diagnostics
}

/// Convenience wrapper returning `Err` with the diagnostics when invalid.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

fn validate_block(block: &Block, value: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let obj = match value {
        Value::Object(map) => map,
        // Null is fine for optional blocks; nothing further to check.
        Value::Null => return,
        other => {
            diagnostics.push(
                Diagnostic::error("Expected object")
                    .with_detail(format!("Got {}", value_type_name(other)))
                    .with_attribute(path),
            );
            return;
        }
    };

    for (name, attr) in &block.attributes {
        let attr_path = join_path(path, name);
        validate_attribute(attr, obj.get(name), &attr_path, diagnostics);
    }

    for (name, nested) in &block.blocks {
        let block_path = join_path(path, name);
        validate_nested_block(nested, obj.get(name), &block_path, diagnostics);
    }
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    // Computed-only attributes are server-owned.
    if attr.flags.computed && !attr.flags.optional && !attr.flags.required {
        return;
    }

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        }
        Some(v) => {
            validate_type(&attr.attr_type, v, path, diagnostics);
            validate_allowed_values(attr, v, path, diagnostics);
            validate_range(attr, v, path, diagnostics);
        }
    }
}

fn validate_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match attr_type {
        AttributeType::String => {
            if !value.is_string() {
                diagnostics.push(type_error(path, "string", value));
            }
        }
        AttributeType::Int64 => {
            if !value.is_i64() && !value.is_u64() {
                diagnostics.push(type_error(path, "int64", value));
            }
        }
        AttributeType::Bool => {
            if !value.is_boolean() {
                diagnostics.push(type_error(path, "bool", value));
            }
        }
        AttributeType::List(element) | AttributeType::Set(element) => {
            if let Some(items) = value.as_array() {
                for (i, item) in items.iter().enumerate() {
                    validate_type(element, item, &format!("{}.{}", path, i), diagnostics);
                }
            } else {
                diagnostics.push(type_error(path, "list", value));
            }
        }
        AttributeType::Map(value_type) => {
            if let Some(entries) = value.as_object() {
                for (key, item) in entries {
                    validate_type(value_type, item, &format!("{}.{}", path, key), diagnostics);
                }
            } else {
                diagnostics.push(type_error(path, "map", value));
            }
        }
    }
}

fn validate_allowed_values(
    attr: &Attribute,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if attr.allowed_values.is_empty() || attr.allowed_values.contains(value) {
        return;
    }
    let expected = attr
        .allowed_values
        .iter()
        .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
        .collect::<Vec<_>>()
        .join(", ");
    diagnostics.push(
        Diagnostic::error(format!("Invalid value for attribute '{}'", path))
            .with_detail(format!("Expected one of: {}", expected))
            .with_attribute(path),
    );
}

fn validate_range(attr: &Attribute, value: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let Some(n) = value.as_i64() else { return };
    if let Some(min) = attr.min {
        if n < min {
            diagnostics.push(
                Diagnostic::error(format!("Value for '{}' is below minimum", path))
                    .with_detail(format!("Must be >= {}, got {}", min, n))
                    .with_attribute(path),
            );
        }
    }
    if let Some(max) = attr.max {
        if n > max {
            diagnostics.push(
                Diagnostic::error(format!("Value for '{}' is above maximum", path))
                    .with_detail(format!("Must be <= {}, got {}", max, n))
                    .with_attribute(path),
            );
        }
    }
}

fn validate_nested_block(
    nested: &NestedBlock,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match nested.nesting_mode {
        BlockNestingMode::Single => match value {
            None | Some(Value::Null) => {
                if nested.min_items > 0 {
                    diagnostics.push(
                        Diagnostic::error(format!("Missing required block '{}'", path))
                            .with_attribute(path),
                    );
                }
            }
            Some(v) => validate_block(&nested.block, v, path, diagnostics),
        },
        BlockNestingMode::List | BlockNestingMode::Set => match value {
            None | Some(Value::Null) => {
                if nested.min_items > 0 {
                    diagnostics.push(
                        Diagnostic::error(format!(
                            "Block '{}' requires at least {} item(s)",
                            path, nested.min_items
                        ))
                        .with_attribute(path),
                    );
                }
            }
            Some(Value::Array(items)) => {
                let len = items.len() as u32;
                if len < nested.min_items {
                    diagnostics.push(
                        Diagnostic::error(format!(
                            "Block '{}' requires at least {} item(s), got {}",
                            path, nested.min_items, len
                        ))
                        .with_attribute(path),
                    );
                }
                if nested.max_items > 0 && len > nested.max_items {
                    diagnostics.push(
                        Diagnostic::error(format!(
                            "Block '{}' allows at most {} item(s), got {}",
                            path, nested.max_items, len
                        ))
                        .with_attribute(path),
                    );
                }
                for (i, item) in items.iter().enumerate() {
                    validate_block(&nested.block, item, &format!("{}.{}", path, i), diagnostics);
                }
            }
            Some(other) => {
                diagnostics.push(
                    Diagnostic::error(format!("Expected list for block '{}'", path))
                        .with_detail(format!("Got {}", value_type_name(other)))
                        .with_attribute(path),
                );
            }
        },
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for attribute '{}'", path))
        .with_detail(format!("Expected {}, got {}", expected, value_type_name(got)))
        .with_attribute(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, Block, NestedBlock, Schema};
    use serde_json::json;

    fn cluster_like_schema() -> Schema {
        Schema::v0()
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "cloud_provider",
                Attribute::required_string().with_allowed_values(["AWS", "GCP", "SCW", "AZURE"]),
            )
            .with_attribute(
                "cpu",
                Attribute::optional_int64().with_range(Some(10), None),
            )
            .with_attribute("id", Attribute::computed_string())
    }

    #[test]
    fn valid_config_passes() {
        let diagnostics = validate(
            &cluster_like_schema(),
            &json!({"name": "prod", "cloud_provider": "AWS", "cpu": 2000}),
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn missing_required_attribute_is_flagged() {
        let diagnostics = validate(
            &cluster_like_schema(),
            &json!({"cloud_provider": "AWS"}),
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("name"));
    }

    #[test]
    fn enum_validator_rejects_invalid_member() {
        let diagnostics = validate(
            &cluster_like_schema(),
            &json!({"name": "prod", "cloud_provider": "INVALID"}),
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("cloud_provider"));
        assert!(diagnostics[0]
            .detail
            .as_deref()
            .unwrap()
            .contains("AWS, GCP, SCW, AZURE"));
    }

    #[test]
    fn enum_validator_accepts_valid_member() {
        let diagnostics = validate(
            &cluster_like_schema(),
            &json!({"name": "prod", "cloud_provider": "SCW"}),
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn range_validator_enforces_minimum() {
        let diagnostics = validate(
            &cluster_like_schema(),
            &json!({"name": "prod", "cloud_provider": "AWS", "cpu": 5}),
        );
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("below minimum"));
    }

    #[test]
    fn computed_attributes_are_skipped() {
        // `id` is computed-only; a user cannot supply it but we never
        // validate what the server wrote there.
        let diagnostics = validate(
            &cluster_like_schema(),
            &json!({"name": "prod", "cloud_provider": "AWS", "id": 42}),
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn wrong_type_is_attribute_scoped() {
        let diagnostics = validate(
            &cluster_like_schema(),
            &json!({"name": 7, "cloud_provider": "AWS"}),
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("name"));
        assert!(diagnostics[0].summary.contains("Invalid type"));
    }

    #[test]
    fn nested_set_block_items_are_validated() {
        let schema = Schema::v0().with_block(
            "environment_variables",
            NestedBlock::set(
                Block::new()
                    .with_attribute("key", Attribute::required_string())
                    .with_attribute("value", Attribute::required_string()),
            ),
        );

        let diagnostics = validate(
            &schema,
            &json!({"environment_variables": [{"key": "PORT", "value": "8080"}, {"key": "HOST"}]}),
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("environment_variables.1.value")
        );
    }

    #[test]
    fn block_item_bounds_are_enforced() {
        let schema = Schema::v0().with_block(
            "ports",
            NestedBlock::list(
                Block::new().with_attribute("internal_port", Attribute::required_int64()),
            )
            .with_min_items(1)
            .with_max_items(2),
        );

        let diagnostics = validate(&schema, &json!({"ports": []}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("at least 1"));

        let diagnostics = validate(
            &schema,
            &json!({"ports": [{"internal_port": 80}, {"internal_port": 443}, {"internal_port": 8080}]}),
        );
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("at most 2"));
    }

    #[test]
    fn validate_result_wraps_diagnostics() {
        assert!(validate_result(
            &cluster_like_schema(),
            &json!({"name": "n", "cloud_provider": "GCP"})
        )
        .is_ok());
        assert!(validate_result(&cluster_like_schema(), &json!({})).is_err());
    }
}
