//! Applies decrypt policies to an inbound JSON payload before it is
//! deserialized into its DTO.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use keyward_core::error::AppError;
use keyward_core::result::AppResult;

use crate::key::KeyManager;

use super::policy::{EncryptedFields, FieldPolicy};

/// How decrypt failures are treated for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureMode {
    /// Each field's `required` flag decides; a missing key id is logged and
    /// the payload passed through unchanged.
    #[default]
    PerField,
    /// Every failure aborts, including a missing key id.
    FailFast,
    /// Nothing aborts; failures are logged and values left as received.
    Lenient,
}

impl FailureMode {
    fn is_fatal(self, policy: &FieldPolicy) -> bool {
        match self {
            Self::PerField => policy.required,
            Self::FailFast => true,
            Self::Lenient => false,
        }
    }
}

/// Outcome of a decrypt pass, by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecryptReport {
    /// Fields replaced with plaintext.
    pub decrypted: Vec<&'static str>,
    /// Fields left untouched because they were empty, null or not strings.
    pub skipped: Vec<&'static str>,
    /// Fields whose decrypt failed and which still hold ciphertext.
    pub failed: Vec<&'static str>,
    /// Fields that needed decrypting but had no resolvable key id.
    pub misconfigured: Vec<&'static str>,
}

/// Replaces ciphertext fields with plaintext using the [`KeyManager`].
#[derive(Debug, Clone)]
pub struct CryptoGateway {
    key_manager: Arc<KeyManager>,
}

impl CryptoGateway {
    /// Creates a gateway over the given key manager.
    pub fn new(key_manager: Arc<KeyManager>) -> Self {
        Self { key_manager }
    }

    /// Decrypts `payload` in place according to `policies`.
    pub async fn decrypt_fields(
        &self,
        payload: &mut Value,
        policies: &[FieldPolicy],
        mode: FailureMode,
    ) -> AppResult<DecryptReport> {
        let mut report = DecryptReport::default();
        if policies.is_empty() {
            return Ok(report);
        }

        let object = payload
            .as_object_mut()
            .ok_or_else(|| AppError::validation("Encrypted payload must be a JSON object"))?;

        let mut key_ids: HashMap<&'static str, Option<String>> = HashMap::new();

        for policy in policies {
            let ciphertext = match object.get(policy.field) {
                None | Some(Value::Null) => {
                    report.skipped.push(policy.field);
                    continue;
                }
                Some(Value::String(s)) if s.is_empty() => {
                    report.skipped.push(policy.field);
                    continue;
                }
                Some(Value::String(s)) => s.clone(),
                Some(other) => {
                    warn!(
                        field = policy.field,
                        kind = json_kind(other),
                        "Unsupported field type for decryption, skipping"
                    );
                    report.skipped.push(policy.field);
                    continue;
                }
            };

            let key_id = key_ids
                .entry(policy.key_id_field)
                .or_insert_with(|| key_id_value(object, policy.key_id_field))
                .clone();

            let Some(key_id) = key_id else {
                if mode == FailureMode::FailFast {
                    return Err(AppError::misconfigured_policy(format!(
                        "Field '{}' requires decryption but '{}' is missing",
                        policy.field, policy.key_id_field
                    )));
                }
                warn!(
                    field = policy.field,
                    key_id_field = policy.key_id_field,
                    "Misconfigured decrypt policy: key id field missing, leaving value unchanged"
                );
                report.misconfigured.push(policy.field);
                continue;
            };

            match self.key_manager.decrypt(&key_id, &ciphertext).await {
                Ok(plaintext) => {
                    object.insert(policy.field.to_string(), Value::String(plaintext));
                    report.decrypted.push(policy.field);
                }
                Err(e) if mode.is_fatal(policy) => {
                    error!(field = policy.field, key_id = %key_id, error = %e, "Required field decryption failed");
                    return Err(AppError::new(
                        e.kind,
                        format!("Failed to decrypt field '{}': {}", policy.field, e.message),
                    ));
                }
                Err(e) => {
                    warn!(
                        field = policy.field,
                        key_id = %key_id,
                        error = %e,
                        "Optional field decryption failed, keeping original value"
                    );
                    report.failed.push(policy.field);
                }
            }
        }

        debug!(
            decrypted = report.decrypted.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Decrypt pass finished"
        );

        Ok(report)
    }

    /// Decrypts `payload` with `T`'s policy table, then deserializes it.
    pub async fn decrypt_into<T>(&self, mut payload: Value, mode: FailureMode) -> AppResult<T>
    where
        T: DeserializeOwned + EncryptedFields,
    {
        self.decrypt_fields(&mut payload, T::field_policies(), mode)
            .await?;
        serde_json::from_value(payload).map_err(|e| {
            AppError::validation(format!("Request body does not match the expected shape: {e}"))
        })
    }
}

fn key_id_value(object: &Map<String, Value>, field: &str) -> Option<String> {
    match object.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
