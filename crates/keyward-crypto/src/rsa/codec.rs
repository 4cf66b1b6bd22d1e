//! RSA PKCS#1 v1.5 encryption with transparent chunking.
//!
//! A single RSA block carries at most `key_bytes - 11` plaintext bytes.
//! Longer payloads are split into blocks of that size on encrypt, and the
//! ciphertext is split into `key_bytes` blocks on decrypt; results are
//! concatenated in order. A one-block payload is byte-for-byte identical
//! to plain single-block encryption.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

use keyward_core::error::{AppError, ErrorKind};
use keyward_core::result::AppResult;

/// Bytes of PKCS#1 v1.5 padding in every encrypted block.
pub const PKCS1_PADDING_OVERHEAD: usize = 11;

/// Plaintext used to prove a freshly generated pair works end to end.
const SELF_TEST_PLAINTEXT: &str = "keyward-key-self-test";

/// Freshly generated key material, base64 DER encoded.
pub struct KeyMaterial {
    /// SubjectPublicKeyInfo DER, base64.
    pub public_key: String,
    /// PKCS#8 DER, base64.
    pub private_key: Zeroizing<String>,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl KeyMaterial {
    /// Generates a new key pair of `bits` modulus size.
    ///
    /// CPU bound; call from a blocking context.
    pub fn generate(bits: usize) -> AppResult<Self> {
        let private_key = RsaPrivateKey::new(&mut OsRng, bits).map_err(|e| {
            AppError::with_source(
                ErrorKind::Internal,
                format!("Failed to generate {bits}-bit RSA key"),
                e,
            )
        })?;
        let public_key = RsaPublicKey::from(&private_key);

        let public_der = public_key
            .to_public_key_der()
            .map_err(|e| AppError::internal(format!("Failed to encode RSA public key: {e}")))?;
        let private_der = private_key
            .to_pkcs8_der()
            .map_err(|e| AppError::internal(format!("Failed to encode RSA private key: {e}")))?;

        Ok(Self {
            public_key: STANDARD.encode(public_der.as_bytes()),
            private_key: Zeroizing::new(STANDARD.encode(private_der.as_bytes())),
        })
    }

    /// Encrypts and decrypts a fixed string with this pair.
    pub fn verify_round_trip(&self) -> AppResult<()> {
        let ciphertext = encrypt_with_public_key(&self.public_key, SELF_TEST_PLAINTEXT)?;
        let plaintext = decrypt_with_private_key(&self.private_key, &ciphertext)?;
        if plaintext != SELF_TEST_PLAINTEXT {
            return Err(AppError::internal(
                "Generated RSA key pair failed the round-trip self test",
            ));
        }
        Ok(())
    }
}

/// Parses a base64 DER public key.
pub fn parse_public_key(public_key_b64: &str) -> AppResult<RsaPublicKey> {
    let der = STANDARD
        .decode(public_key_b64.trim())
        .map_err(|e| AppError::crypto(format!("Public key is not valid base64: {e}")))?;
    RsaPublicKey::from_public_key_der(&der)
        .map_err(|e| AppError::crypto(format!("Failed to parse RSA public key: {e}")))
}

/// Parses a base64 DER PKCS#8 private key.
pub fn parse_private_key(private_key_b64: &str) -> AppResult<RsaPrivateKey> {
    let der = Zeroizing::new(
        STANDARD
            .decode(private_key_b64.trim())
            .map_err(|e| AppError::crypto(format!("Private key is not valid base64: {e}")))?,
    );
    RsaPrivateKey::from_pkcs8_der(&der)
        .map_err(|e| AppError::crypto(format!("Failed to parse RSA private key: {e}")))
}

/// Encrypts `plaintext`, splitting it into `key_bytes - 11` byte blocks.
pub fn encrypt_chunked(public_key: &RsaPublicKey, plaintext: &[u8]) -> AppResult<Vec<u8>> {
    let key_bytes = public_key.size();
    let block = key_bytes - PKCS1_PADDING_OVERHEAD;

    // An empty message is still one (padding-only) block.
    if plaintext.is_empty() {
        return encrypt_block(public_key, plaintext);
    }

    let mut out = Vec::with_capacity(plaintext.len().div_ceil(block) * key_bytes);
    for chunk in plaintext.chunks(block) {
        out.extend_from_slice(&encrypt_block(public_key, chunk)?);
    }
    Ok(out)
}

/// Decrypts `ciphertext` made of one or more `key_bytes` blocks.
pub fn decrypt_chunked(private_key: &RsaPrivateKey, ciphertext: &[u8]) -> AppResult<Vec<u8>> {
    let key_bytes = private_key.size();
    if ciphertext.is_empty() || ciphertext.len() % key_bytes != 0 {
        return Err(AppError::crypto(format!(
            "Ciphertext length {} is not a multiple of the {key_bytes}-byte block size",
            ciphertext.len()
        )));
    }

    let mut out = Vec::with_capacity(ciphertext.len());
    for chunk in ciphertext.chunks(key_bytes) {
        let plain = private_key
            .decrypt(Pkcs1v15Encrypt, chunk)
            .map_err(|e| AppError::with_source(ErrorKind::CryptoFailure, "RSA decryption failed", e))?;
        out.extend_from_slice(&plain);
    }
    Ok(out)
}

/// Encrypts a UTF-8 string with a base64 public key; returns base64 ciphertext.
///
/// This is what a client does with the advertised public key.
pub fn encrypt_with_public_key(public_key_b64: &str, plaintext: &str) -> AppResult<String> {
    let public_key = parse_public_key(public_key_b64)?;
    let ciphertext = encrypt_chunked(&public_key, plaintext.as_bytes())?;
    Ok(STANDARD.encode(ciphertext))
}

/// Decrypts base64 ciphertext with a base64 private key into a UTF-8 string.
pub fn decrypt_with_private_key(private_key_b64: &str, ciphertext_b64: &str) -> AppResult<String> {
    let ciphertext = STANDARD
        .decode(ciphertext_b64.trim())
        .map_err(|e| AppError::crypto(format!("Ciphertext is not valid base64: {e}")))?;
    let private_key = parse_private_key(private_key_b64)?;
    let plaintext = Zeroizing::new(decrypt_chunked(&private_key, &ciphertext)?);
    String::from_utf8(plaintext.to_vec())
        .map_err(|_| AppError::crypto("Decrypted payload is not valid UTF-8"))
}

fn encrypt_block(public_key: &RsaPublicKey, block: &[u8]) -> AppResult<Vec<u8>> {
    public_key
        .encrypt(&mut OsRng, Pkcs1v15Encrypt, block)
        .map_err(|e| AppError::with_source(ErrorKind::CryptoFailure, "RSA encryption failed", e))
}
