//! RSA primitives over base64-encoded DER key material.

pub mod codec;

pub use codec::{
    KeyMaterial, PKCS1_PADDING_OVERHEAD, decrypt_with_private_key, encrypt_with_public_key,
};
