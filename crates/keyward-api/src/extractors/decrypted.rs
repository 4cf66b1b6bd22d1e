//! `DecryptedJson<T>` extractor: JSON body with encrypted fields replaced
//! by plaintext before deserialization.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde_json::Value;

use keyward_core::error::AppError;
use keyward_crypto::{EncryptedFields, FailureMode};

use crate::error::ApiError;
use crate::state::AppState;

/// A request body of type `T` after its encrypted fields were decrypted.
///
/// Uses `T`'s policy table in [`FailureMode::PerField`].
#[derive(Debug, Clone)]
pub struct DecryptedJson<T>(pub T);

impl<T> FromRequest<AppState> for DecryptedJson<T>
where
    T: DeserializeOwned + EncryptedFields + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;

        let value = state
            .crypto_gateway
            .decrypt_into::<T>(payload, FailureMode::PerField)
            .await?;

        Ok(DecryptedJson(value))
    }
}
