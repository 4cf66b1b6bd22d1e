//! Static per-DTO decrypt policies.
//!
//! A DTO declares which of its string fields arrive as RSA ciphertext and
//! which sibling field names the key that decrypts them:
//!
//! ```
//! use keyward_crypto::field_policies;
//!
//! #[derive(serde::Deserialize)]
//! struct RegisterRequest {
//!     username: String,
//!     password: String,
//!     email: Option<String>,
//!     #[serde(rename = "keyId")]
//!     key_id: String,
//! }
//!
//! field_policies!(RegisterRequest {
//!     "password" => required,
//!     "email" => optional,
//! });
//! ```

/// Field holding the key id when a policy does not name one.
pub const DEFAULT_KEY_ID_FIELD: &str = "keyId";

/// Decrypt policy for a single inbound field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPolicy {
    /// Wire name of the ciphertext field.
    pub field: &'static str,
    /// Whether a decrypt failure aborts the request.
    pub required: bool,
    /// Wire name of the sibling field carrying the key id.
    pub key_id_field: &'static str,
}

impl FieldPolicy {
    /// A field whose decrypt failure aborts the request.
    pub const fn required(field: &'static str) -> Self {
        Self {
            field,
            required: true,
            key_id_field: DEFAULT_KEY_ID_FIELD,
        }
    }

    /// A field whose decrypt failure is logged and the value left as is.
    pub const fn optional(field: &'static str) -> Self {
        Self {
            field,
            required: false,
            key_id_field: DEFAULT_KEY_ID_FIELD,
        }
    }

    /// Reads the key id from another sibling field.
    pub const fn with_key_id_field(mut self, key_id_field: &'static str) -> Self {
        self.key_id_field = key_id_field;
        self
    }
}

/// Implemented by request DTOs that carry encrypted fields.
pub trait EncryptedFields {
    /// The DTO's decrypt policy table.
    fn field_policies() -> &'static [FieldPolicy];
}

/// Implements [`EncryptedFields`] for a DTO from a policy list.
///
/// Each entry is `"field" => required` or `"field" => optional`, optionally
/// followed by `via "otherKeyIdField"`.
#[macro_export]
macro_rules! field_policies {
    (@policy $field:literal, required) => {
        $crate::gateway::FieldPolicy::required($field)
    };
    (@policy $field:literal, optional) => {
        $crate::gateway::FieldPolicy::optional($field)
    };
    (@policy $field:literal, $kind:ident, $key:literal) => {
        $crate::field_policies!(@policy $field, $kind).with_key_id_field($key)
    };
    ($ty:ty { $($field:literal => $kind:ident $(via $key:literal)?),* $(,)? }) => {
        impl $crate::gateway::EncryptedFields for $ty {
            fn field_policies() -> &'static [$crate::gateway::FieldPolicy] {
                const POLICIES: &[$crate::gateway::FieldPolicy] = &[
                    $($crate::field_policies!(@policy $field, $kind $(, $key)?)),*
                ];
                POLICIES
            }
        }
    };
}
