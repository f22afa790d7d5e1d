//! Shared model pieces and value helpers used across resource handlers.

use crate::error::ProviderError;
use crate::reconcile::diff_by_key;
use crate::services::variables::{VariableKind, VariableRequest, VariablesApi};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A key/value entry: environment variables, secrets, terraform variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    /// The natural key of the collection.
    pub key: String,
    /// The value; sensitive for secrets.
    pub value: String,
}

/// Extract a required string field from a model value.
pub fn require_str(model: &Value, field: &str) -> Result<String, ProviderError> {
    match model.get(field).and_then(Value::as_str) {
        Some(s) => Ok(s.to_string()),
        None => Err(ProviderError::InvalidConfiguration {
            summary: format!("Missing required attribute '{}'", field),
            detail: format!("'{}' must be set in configuration", field),
        }),
    }
}

/// Extract an optional string field. Null and absent are both `None`.
pub fn optional_str(model: &Value, field: &str) -> Option<String> {
    model
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Extract an optional integer field.
pub fn optional_i64(model: &Value, field: &str) -> Option<i64> {
    model.get(field).and_then(Value::as_i64)
}

/// Extract an optional boolean field.
pub fn optional_bool(model: &Value, field: &str) -> Option<bool> {
    model.get(field).and_then(Value::as_bool)
}

/// Deserialize a collection field. Null and absent map to an empty vec.
pub fn collection<T: DeserializeOwned>(
    model: &Value,
    field: &str,
) -> Result<Vec<T>, ProviderError> {
    match model.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(v) => Ok(serde_json::from_value(v.clone())?),
    }
}

/// Reconcile a variable collection against the planned membership.
///
/// The diff is computed by key; server-assigned sub-ids are resolved from a
/// fresh listing, so positional stability is never assumed.
pub async fn sync_variables(
    api: &VariablesApi,
    service_id: &str,
    kind: VariableKind,
    state: &[KeyValue],
    plan: &[KeyValue],
) -> Result<(), ProviderError> {
    let diff = diff_by_key(state, plan, |v| v.key.clone());
    if diff.is_empty() {
        return Ok(());
    }

    let existing = api.list(service_id, kind).await?;
    let id_of = |key: &str| {
        existing
            .iter()
            .find(|v| v.key == key)
            .map(|v| v.id.clone())
    };

    for var in &diff.to_create {
        api.create(
            service_id,
            kind,
            &VariableRequest {
                key: var.key.clone(),
                value: var.value.clone(),
            },
        )
        .await?;
    }
    for var in &diff.to_update {
        let request = VariableRequest {
            key: var.key.clone(),
            value: var.value.clone(),
        };
        match id_of(&var.key) {
            Some(id) => {
                api.update(service_id, kind, &id, &request).await?;
            }
            // State said it existed but the server disagrees; recreate.
            None => {
                api.create(service_id, kind, &request).await?;
            }
        }
    }
    for var in &diff.to_delete {
        if let Some(id) = id_of(&var.key) {
            api.delete(service_id, kind, &id).await?;
        }
    }
    Ok(())
}

/// Create every planned variable of the given kind (resource creation path).
pub async fn create_variables(
    api: &VariablesApi,
    service_id: &str,
    kind: VariableKind,
    plan: &[KeyValue],
) -> Result<(), ProviderError> {
    for var in plan {
        api.create(
            service_id,
            kind,
            &VariableRequest {
                key: var.key.clone(),
                value: var.value.clone(),
            },
        )
        .await?;
    }
    Ok(())
}

/// Intersect state-held secret values with the keys the server still knows.
///
/// Secret listings return keys without values; the plaintext only exists in
/// state. A key the server no longer lists is dropped, everything else keeps
/// its state value.
pub fn retain_known_secrets(state: &[KeyValue], server_keys: &[String]) -> Vec<KeyValue> {
    state
        .iter()
        .filter(|v| server_keys.iter().any(|k| k == &v.key))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn require_str_rejects_missing_and_null() {
        let model = json!({"name": "app", "empty": null});
        assert_eq!(require_str(&model, "name").unwrap(), "app");
        assert!(require_str(&model, "empty").is_err());
        assert!(require_str(&model, "absent").is_err());
    }

    #[test]
    fn collection_treats_null_as_empty() {
        let model = json!({"vars": null, "set": [{"key": "A", "value": "1"}]});
        let empty: Vec<KeyValue> = collection(&model, "vars").unwrap();
        assert!(empty.is_empty());
        let set: Vec<KeyValue> = collection(&model, "set").unwrap();
        assert_eq!(set[0].key, "A");
    }

    #[test]
    fn secrets_drop_keys_the_server_forgot() {
        let state = vec![
            KeyValue {
                key: "DB_PASSWORD".into(),
                value: "hunter2".into(),
            },
            KeyValue {
                key: "STALE".into(),
                value: "gone".into(),
            },
        ];
        let kept = retain_known_secrets(&state, &["DB_PASSWORD".to_string()]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].value, "hunter2");
    }
}
