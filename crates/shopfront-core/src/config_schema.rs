//! Configuration schema assembled from module contributions
//!
//! Bootstraps contribute partial JSON-Schema documents which are deep-merged
//! into one schema. Before serving, the runtime settings object is completed
//! with schema defaults and validated against it.
//!
//! ## Merge rules
//!
//! - object + object: merged key by key, recursively
//! - `required` arrays: union, first-seen order
//! - anything else: the later contribution wins
//!
//! ## Supported keywords
//!
//! `type` (name or list of names), `properties`, `required`,
//! `additionalProperties` (boolean only), `enum`, `items`, `minimum`,
//! `maximum`, `minLength`, `maxLength`, `default`.

use serde_json::{Map, Value};

use crate::errors::{KernelError, Result};

const TYPE_NAMES: [&str; 7] = [
    "object", "array", "string", "number", "integer", "boolean", "null",
];

/// One validation failure, located by JSON pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{}: {}", path, self.message)
    }
}

/// The merged configuration schema
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSchema {
    document: Value,
}

impl Default for ConfigSchema {
    fn default() -> Self {
        Self {
            document: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }
}

impl ConfigSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// The merged document
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Deep-merge a partial schema into this one
    ///
    /// The merge is applied only if the result is well formed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfigSchema` if `partial` is not an object or the
    /// merged schema uses a keyword with the wrong shape.
    pub fn merge(&mut self, partial: Value) -> Result<()> {
        if !partial.is_object() {
            return Err(KernelError::InvalidConfigSchema {
                reason: "schema contribution must be a JSON object".into(),
            });
        }
        let mut merged = self.document.clone();
        deep_merge(&mut merged, partial);
        check_schema(&merged, "")?;
        self.document = merged;
        Ok(())
    }

    /// Fill missing settings from schema defaults
    ///
    /// A null settings value is treated as an empty object.
    pub fn apply_defaults(&self, settings: &mut Value) {
        if settings.is_null() {
            *settings = Value::Object(Map::new());
        }
        apply_defaults_at(&self.document, settings);
    }

    /// Validate `settings`, returning every violation found
    pub fn validate(&self, settings: &Value) -> Vec<SchemaViolation> {
        let mut violations = Vec::new();
        validate_at(&self.document, settings, "", &mut violations);
        violations
    }
}

/// Merge `patch` into `base` using the schema merge rules
pub fn deep_merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(Value::Array(existing)) if key == "required" => {
                        if let Value::Array(incoming) = patch_value {
                            for item in incoming {
                                if !existing.contains(&item) {
                                    existing.push(item);
                                }
                            }
                        } else {
                            base_map.insert(key, patch_value);
                        }
                    }
                    Some(existing) => deep_merge(existing, patch_value),
                    None => {
                        base_map.insert(key, patch_value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

fn schema_error(path: &str, reason: impl std::fmt::Display) -> KernelError {
    KernelError::InvalidConfigSchema {
        reason: format!("at '{}': {}", if path.is_empty() { "/" } else { path }, reason),
    }
}

fn check_schema(schema: &Value, path: &str) -> Result<()> {
    let Some(obj) = schema.as_object() else {
        return Err(schema_error(path, "schema node must be an object"));
    };

    if let Some(ty) = obj.get("type") {
        let names: Vec<&Value> = match ty {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        for name in names {
            match name.as_str() {
                Some(n) if TYPE_NAMES.contains(&n) => {}
                _ => return Err(schema_error(path, format!("unknown type {}", name))),
            }
        }
    }
    if let Some(required) = obj.get("required") {
        let ok = required
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string));
        if !ok {
            return Err(schema_error(path, "'required' must be a list of names"));
        }
    }
    if let Some(additional) = obj.get("additionalProperties") {
        if !additional.is_boolean() {
            return Err(schema_error(path, "'additionalProperties' must be a boolean"));
        }
    }
    if let Some(values) = obj.get("enum") {
        if !values.is_array() {
            return Err(schema_error(path, "'enum' must be a list"));
        }
    }
    for keyword in ["minimum", "maximum"] {
        if obj.get(keyword).is_some_and(|v| !v.is_number()) {
            return Err(schema_error(path, format!("'{}' must be a number", keyword)));
        }
    }
    for keyword in ["minLength", "maxLength"] {
        if obj.get(keyword).is_some_and(|v| !v.is_u64()) {
            return Err(schema_error(
                path,
                format!("'{}' must be a non-negative integer", keyword),
            ));
        }
    }
    if let Some(properties) = obj.get("properties") {
        let Some(properties) = properties.as_object() else {
            return Err(schema_error(path, "'properties' must be an object"));
        };
        for (name, sub) in properties {
            check_schema(sub, &format!("{}/{}", path, name))?;
        }
    }
    if let Some(items) = obj.get("items") {
        check_schema(items, &format!("{}/items", path))?;
    }
    Ok(())
}

fn apply_defaults_at(schema: &Value, value: &mut Value) {
    let (Some(properties), Some(map)) = (
        schema.get("properties").and_then(Value::as_object),
        value.as_object_mut(),
    ) else {
        return;
    };
    for (name, sub) in properties {
        if !map.contains_key(name) {
            if let Some(default) = sub.get("default") {
                map.insert(name.clone(), default.clone());
            } else if sub.get("type").and_then(Value::as_str) == Some("object")
                && has_nested_defaults(sub)
            {
                map.insert(name.clone(), Value::Object(Map::new()));
            }
        }
        if let Some(child) = map.get_mut(name) {
            apply_defaults_at(sub, child);
        }
    }
}

fn has_nested_defaults(schema: &Value) -> bool {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .is_some_and(|props| {
            props
                .values()
                .any(|p| p.get("default").is_some() || has_nested_defaults(p))
        })
}

fn type_matches(name: &str, value: &Value) -> bool {
    match name {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => {
            value.is_i64()
                || value.is_u64()
                || value.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => false,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn validate_at(schema: &Value, value: &Value, path: &str, out: &mut Vec<SchemaViolation>) {
    let violation = |message: String| SchemaViolation {
        path: path.to_string(),
        message,
    };

    if let Some(ty) = schema.get("type") {
        let names: Vec<&str> = match ty {
            Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
            other => other.as_str().into_iter().collect(),
        };
        if !names.iter().any(|n| type_matches(n, value)) {
            out.push(violation(format!(
                "expected {}, found {}",
                names.join(" or "),
                describe(value)
            )));
            return;
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            out.push(violation(format!("value {} is not one of {}", value, Value::Array(allowed.clone()))));
        }
    }

    if let Some(n) = value.as_f64() {
        if let Some(min) = schema.get("minimum").and_then(Value::as_f64) {
            if n < min {
                out.push(violation(format!("{} is less than minimum {}", n, min)));
            }
        }
        if let Some(max) = schema.get("maximum").and_then(Value::as_f64) {
            if n > max {
                out.push(violation(format!("{} is greater than maximum {}", n, max)));
            }
        }
    }

    if let Some(s) = value.as_str() {
        let len = s.chars().count() as u64;
        if let Some(min) = schema.get("minLength").and_then(Value::as_u64) {
            if len < min {
                out.push(violation(format!("shorter than {} characters", min)));
            }
        }
        if let Some(max) = schema.get("maxLength").and_then(Value::as_u64) {
            if len > max {
                out.push(violation(format!("longer than {} characters", max)));
            }
        }
    }

    if let Some(map) = value.as_object() {
        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for name in required.iter().filter_map(Value::as_str) {
                if !map.contains_key(name) {
                    out.push(SchemaViolation {
                        path: format!("{}/{}", path, name),
                        message: "required property is missing".into(),
                    });
                }
            }
        }
        let properties = schema.get("properties").and_then(Value::as_object);
        for (name, child) in map {
            let child_path = format!("{}/{}", path, name);
            match properties.and_then(|p| p.get(name)) {
                Some(sub) => validate_at(sub, child, &child_path, out),
                None if schema.get("additionalProperties") == Some(&Value::Bool(false)) => {
                    out.push(SchemaViolation {
                        path: child_path,
                        message: "property is not allowed".into(),
                    });
                }
                None => {}
            }
        }
    }

    if let (Some(items), Some(values)) = (schema.get("items"), value.as_array()) {
        for (index, item) in values.iter().enumerate() {
            validate_at(items, item, &format!("{}/{}", path, index), out);
        }
    }
}
