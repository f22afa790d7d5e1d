//! Plan engine: default application, value modifiers, and change detection.
//!
//! A plan resolves, per attribute, the value Terraform-style tooling should
//! expect after apply: explicit configuration wins, then declared defaults,
//! then prior state for server-computed attributes, then "unknown" (null,
//! deferring to the server). The engine also records attribute changes and
//! whether any `force_new` attribute forces replacement.

use crate::schema::{MergePolicy, Schema};
use serde_json::{Map, Value};

/// A change to a single attribute between prior state and the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    /// Path to the attribute.
    pub path: String,
    /// Value before the change (`None` when creating).
    pub before: Option<Value>,
    /// Value after the change (`None` when unset).
    pub after: Option<Value>,
}

impl AttributeChange {
    fn new(path: impl Into<String>, before: Option<Value>, after: Option<Value>) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }
}

/// The result of planning one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanResult {
    /// The planned state after modifiers.
    pub planned_state: Value,
    /// Attribute-level changes relative to prior state.
    pub changes: Vec<AttributeChange>,
    /// Whether a `force_new` attribute changed, requiring replacement.
    pub requires_replace: bool,
}

impl PlanResult {
    /// A plan with no changes.
    pub fn no_change(state: Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
        }
    }
}

/// Workaround policy for a server-side rule that silently forces certain
/// boolean fields to `true`, which would otherwise produce a plan/apply
/// consistency violation.
///
/// Resolution precedence, in order:
/// 1. the user explicitly set a value in configuration: use it, even `false`;
/// 2. prior state holds a value: reuse it, avoiding a spurious diff;
/// 3. neither: leave the value unknown and let the server's computed
///    default land on the next read.
///
/// Temporary until the API stops overriding the field; delete this struct
/// and its registration to retire the workaround. No schema code changes.
#[derive(Debug, Clone)]
pub struct SmartApiOverride {
    attributes: Vec<(&'static str, &'static str)>,
}

impl Default for SmartApiOverride {
    fn default() -> Self {
        Self {
            attributes: vec![("qovery_helm", "allow_cluster_wide_resources")],
        }
    }
}

impl SmartApiOverride {
    /// A policy that applies to nothing (for tests and for retirement).
    pub fn disabled() -> Self {
        Self {
            attributes: Vec::new(),
        }
    }

    /// Whether the policy governs the given attribute.
    pub fn applies_to(&self, resource_type: &str, attribute: &str) -> bool {
        self.attributes
            .iter()
            .any(|(r, a)| *r == resource_type && *a == attribute)
    }

    /// Three-way resolution. `None` means "unknown": defer to the server.
    pub fn resolve(config: Option<&Value>, state: Option<&Value>) -> Option<Value> {
        match config {
            Some(v) if !v.is_null() => Some(v.clone()),
            _ => match state {
                Some(v) if !v.is_null() => Some(v.clone()),
                _ => None,
            },
        }
    }
}

/// Plan a single resource: apply defaults and modifiers, then diff.
///
/// `prior` is `None` on create. The returned planned state carries every
/// schema attribute: resolved values, or null where the server will decide.
/// Nested blocks are taken from configuration verbatim; their membership is
/// the user's desired set and is reconciled at update time, not plan time.
pub fn plan_resource(
    resource_type: &str,
    schema: &Schema,
    prior: Option<&Value>,
    config: &Value,
    smart_override: &SmartApiOverride,
) -> PlanResult {
    let empty = Map::new();
    let config_obj = config.as_object().unwrap_or(&empty);
    let mut planned = Map::new();
    let mut changes = Vec::new();
    let mut requires_replace = false;

    for (name, attr) in &schema.block.attributes {
        let config_value = config_obj.get(name).filter(|v| !v.is_null());
        let prior_value = prior.and_then(|p| p.get(name)).filter(|v| !v.is_null());

        let resolved = if smart_override.applies_to(resource_type, name) {
            SmartApiOverride::resolve(config_value, prior_value)
        } else if let Some(v) = config_value {
            Some(v.clone())
        } else if let Some(default) = &attr.default {
            Some(default.clone())
        } else if attr.flags.computed {
            // Server-owned (or server-defaulted): keep what the server last
            // said, or leave unknown on create.
            prior_value.cloned()
        } else {
            None
        };

        if prior_value != resolved.as_ref() {
            changes.push(AttributeChange::new(
                name.clone(),
                prior_value.cloned(),
                resolved.clone(),
            ));
            if attr.force_new && prior.is_some() {
                requires_replace = true;
            }
        }

        planned.insert(name.clone(), resolved.unwrap_or(Value::Null));
    }

    for name in schema.block.blocks.keys() {
        let config_value = config_obj.get(name).filter(|v| !v.is_null());
        let prior_value = prior.and_then(|p| p.get(name)).filter(|v| !v.is_null());
        if prior_value != config_value {
            changes.push(AttributeChange::new(
                name.clone(),
                prior_value.cloned(),
                config_value.cloned(),
            ));
        }
        planned.insert(
            name.clone(),
            config_value.cloned().unwrap_or(Value::Null),
        );
    }

    PlanResult {
        planned_state: Value::Object(planned),
        changes,
        requires_replace,
    }
}

/// Overlay plan-owned values onto a server response, per attribute
/// [`MergePolicy`]. Applied centrally after Create/Read/Update so
/// individual converters never re-derive preservation rules.
pub fn apply_merge_policies(schema: &Schema, server_state: &mut Value, plan: &Value) {
    let Some(state_obj) = server_state.as_object_mut() else {
        return;
    };
    for (name, attr) in &schema.block.attributes {
        match attr.merge {
            MergePolicy::ServerAuthoritative => {}
            MergePolicy::PreferPlanIfPresent => {
                if let Some(planned) = plan.get(name).filter(|v| !v.is_null()) {
                    state_obj.insert(name.clone(), planned.clone());
                }
            }
            MergePolicy::PlanOnly => {
                state_obj.insert(
                    name.clone(),
                    plan.get(name).cloned().unwrap_or(Value::Null),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, AttributeType, Block, MergePolicy, NestedBlock, Schema};
    use serde_json::json;

    fn application_like_schema() -> Schema {
        Schema::v0()
            .with_attribute("name", Attribute::required_string())
            .with_attribute("cpu", Attribute::optional_int64().with_default(json!(500)))
            .with_attribute("memory", Attribute::optional_int64().with_default(json!(512)))
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "region",
                Attribute::required_string().with_force_new(),
            )
    }

    #[test]
    fn default_applied_when_config_omits_and_no_prior_state() {
        let plan = plan_resource(
            "qovery_application",
            &application_like_schema(),
            None,
            &json!({"name": "app", "region": "eu-west-3"}),
            &SmartApiOverride::disabled(),
        );
        assert_eq!(plan.planned_state["cpu"], json!(500));
        assert_eq!(plan.planned_state["memory"], json!(512));
        assert!(!plan.requires_replace);
    }

    #[test]
    fn explicit_config_beats_default() {
        let plan = plan_resource(
            "qovery_application",
            &application_like_schema(),
            None,
            &json!({"name": "app", "region": "eu-west-3", "cpu": 1000}),
            &SmartApiOverride::disabled(),
        );
        assert_eq!(plan.planned_state["cpu"], json!(1000));
    }

    #[test]
    fn computed_attribute_carries_prior_state() {
        let prior = json!({"name": "app", "region": "eu-west-3", "cpu": 500, "memory": 512, "id": "app-1"});
        let plan = plan_resource(
            "qovery_application",
            &application_like_schema(),
            Some(&prior),
            &json!({"name": "app", "region": "eu-west-3"}),
            &SmartApiOverride::disabled(),
        );
        assert_eq!(plan.planned_state["id"], json!("app-1"));
        assert!(plan.changes.is_empty());
    }

    #[test]
    fn force_new_change_requires_replacement() {
        let prior = json!({"name": "app", "region": "eu-west-3", "cpu": 500, "memory": 512, "id": "app-1"});
        let plan = plan_resource(
            "qovery_application",
            &application_like_schema(),
            Some(&prior),
            &json!({"name": "app", "region": "us-east-2"}),
            &SmartApiOverride::disabled(),
        );
        assert!(plan.requires_replace);
        assert!(plan.changes.iter().any(|c| c.path == "region"));
    }

    #[test]
    fn smart_override_uses_explicit_config_even_when_false() {
        let resolved = SmartApiOverride::resolve(Some(&json!(false)), Some(&json!(true)));
        assert_eq!(resolved, Some(json!(false)));
    }

    #[test]
    fn smart_override_falls_back_to_state() {
        let resolved = SmartApiOverride::resolve(None, Some(&json!(true)));
        assert_eq!(resolved, Some(json!(true)));

        let resolved = SmartApiOverride::resolve(Some(&Value::Null), Some(&json!(true)));
        assert_eq!(resolved, Some(json!(true)));
    }

    #[test]
    fn smart_override_unknown_when_both_absent() {
        assert_eq!(SmartApiOverride::resolve(None, None), None);
    }

    #[test]
    fn smart_override_registration_is_scoped() {
        let policy = SmartApiOverride::default();
        assert!(policy.applies_to("qovery_helm", "allow_cluster_wide_resources"));
        assert!(!policy.applies_to("qovery_helm", "auto_deploy"));
        assert!(!policy.applies_to("qovery_cluster", "allow_cluster_wide_resources"));
    }

    #[test]
    fn smart_override_in_plan_leaves_unknown_null() {
        let schema = Schema::v0()
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "allow_cluster_wide_resources",
                Attribute::optional_computed(AttributeType::Bool),
            );
        let plan = plan_resource(
            "qovery_helm",
            &schema,
            None,
            &json!({"name": "chart"}),
            &SmartApiOverride::default(),
        );
        assert_eq!(plan.planned_state["allow_cluster_wide_resources"], Value::Null);
    }

    #[test]
    fn blocks_reflect_configured_membership() {
        let schema = Schema::v0()
            .with_attribute("name", Attribute::required_string())
            .with_block(
                "environment_variables",
                NestedBlock::set(
                    Block::new()
                        .with_attribute("key", Attribute::required_string())
                        .with_attribute("value", Attribute::required_string()),
                ),
            );
        let prior = json!({
            "name": "app",
            "environment_variables": [{"key": "OLD", "value": "1"}]
        });
        let plan = plan_resource(
            "qovery_application",
            &schema,
            Some(&prior),
            &json!({"name": "app", "environment_variables": [{"key": "NEW", "value": "2"}]}),
            &SmartApiOverride::disabled(),
        );
        assert_eq!(
            plan.planned_state["environment_variables"],
            json!([{"key": "NEW", "value": "2"}])
        );
        assert!(plan.changes.iter().any(|c| c.path == "environment_variables"));
    }

    #[test]
    fn merge_policies_overlay_plan_values() {
        let schema = Schema::v0()
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "secret_access_key",
                Attribute::required_string()
                    .sensitive()
                    .with_merge(MergePolicy::PreferPlanIfPresent),
            )
            .with_attribute(
                "kubeconfig",
                Attribute::optional_string().with_merge(MergePolicy::PlanOnly),
            );

        let mut server = json!({"name": "from-server", "secret_access_key": null, "kubeconfig": "server-junk"});
        let plan = json!({"name": "local", "secret_access_key": "s3cr3t", "kubeconfig": null});
        apply_merge_policies(&schema, &mut server, &plan);

        // ServerAuthoritative: server wins.
        assert_eq!(server["name"], "from-server");
        // PreferPlanIfPresent: plan value survives the non-echoing server.
        assert_eq!(server["secret_access_key"], "s3cr3t");
        // PlanOnly: server value never leaks into state.
        assert_eq!(server["kubeconfig"], Value::Null);
    }
}
