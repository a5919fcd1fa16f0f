use serde::Serialize;
use serde_json::{json, Map, Value};

use super::{require_non_empty, SdkController};
use crate::auth::Credentials;
use crate::client::ApiRequest;
use crate::error::SdkError;
use crate::platform::Platform;

#[derive(Debug, Clone, Default)]
pub struct EcosystemOptions {
    pub credentials: Option<Credentials>,
}

/// Optional lock guarding a data-object write
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockOptions {
    pub lock_id: String,
    pub release_lock: bool,
}

/// The ecosystem-wide data object shared by every world of an application
#[derive(Debug, Clone)]
pub struct Ecosystem {
    controller: SdkController,
    data_object: Map<String, Value>,
}

impl Ecosystem {
    pub fn new(platform: &Platform, options: EcosystemOptions) -> Self {
        Self {
            controller: SdkController::new(platform, options.credentials),
            data_object: Map::new(),
        }
    }

    /// Data object as of the last fetch or write
    pub fn data_object(&self) -> &Map<String, Value> {
        &self.data_object
    }

    pub async fn fetch_data_object(&mut self) -> Result<&Map<String, Value>, SdkError> {
        const METHOD: &str = "fetch_data_object";

        let body = self
            .controller
            .get(METHOD, ApiRequest::get("ecosystem/data-object"), Value::Null)
            .await?;

        self.data_object = match unwrap_data_object(body) {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(SdkError::Remote {
                    sdk_method: METHOD,
                    message: format!("Unexpected data object shape: {}", other),
                    status: None,
                    params: Value::Null,
                })
            }
        };

        Ok(&self.data_object)
    }

    /// Replace the whole data object
    pub async fn set_data_object(&mut self, data: Map<String, Value>, lock: Option<LockOptions>) -> Result<(), SdkError> {
        const METHOD: &str = "set_data_object";
        let body = write_body(&data, lock.as_ref());
        validate_lock(METHOD, lock.as_ref(), &body)?;

        self.controller
            .post(METHOD, "ecosystem/data-object".to_string(), body.clone(), body)
            .await?;

        self.data_object = data;
        Ok(())
    }

    /// Merge top-level keys into the data object
    pub async fn update_data_object(&mut self, data: Map<String, Value>, lock: Option<LockOptions>) -> Result<(), SdkError> {
        const METHOD: &str = "update_data_object";
        let body = write_body(&data, lock.as_ref());
        validate_lock(METHOD, lock.as_ref(), &body)?;
        if data.is_empty() {
            return Err(SdkError::validation(METHOD, "dataObject must not be empty", body));
        }

        self.controller
            .put(METHOD, "ecosystem/data-object".to_string(), body.clone(), body)
            .await?;

        self.data_object.extend(data);
        Ok(())
    }

    /// Add `amount` to the number at dotted `path`, creating it when absent
    pub async fn increment_data_object_value(
        &mut self,
        path: &str,
        amount: f64,
        lock: Option<LockOptions>,
    ) -> Result<(), SdkError> {
        const METHOD: &str = "increment_data_object_value";
        let mut body = json!({ "path": path, "amount": amount });
        if let Some(lock) = &lock {
            body["lock"] = json!(lock);
        }

        require_non_empty(METHOD, "path", Some(path), &body)?;
        validate_lock(METHOD, lock.as_ref(), &body)?;
        if !amount.is_finite() {
            return Err(SdkError::validation(METHOD, "amount must be a finite number", body));
        }

        self.controller
            .put(METHOD, "ecosystem/data-object/increment".to_string(), body.clone(), body)
            .await?;

        increment_at_path(&mut self.data_object, path, amount);
        Ok(())
    }
}

fn unwrap_data_object(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("dataObject") => map.remove("dataObject").unwrap_or(Value::Null),
        other => other,
    }
}

fn write_body(data: &Map<String, Value>, lock: Option<&LockOptions>) -> Value {
    let mut body = json!({ "dataObject": data });
    if let Some(lock) = lock {
        body["lock"] = json!(lock);
    }
    body
}

fn validate_lock(sdk_method: &'static str, lock: Option<&LockOptions>, params: &Value) -> Result<(), SdkError> {
    match lock {
        Some(lock) => require_non_empty(sdk_method, "lock.lockId", Some(&lock.lock_id), params),
        None => Ok(()),
    }
}

fn increment_at_path(root: &mut Map<String, Value>, path: &str, amount: f64) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return;
    };

    let mut current = root;
    for segment in segments {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = match entry {
            Value::Object(map) => map,
            _ => return,
        };
    }

    let existing = current.get(leaf).and_then(Value::as_f64).unwrap_or(0.0);
    current.insert(leaf.to_string(), json!(existing + amount));
}
