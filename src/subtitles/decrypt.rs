//! Subtitle payload decryption.
//!
//! Ciphertexts arrive as base64-encoded OpenSSL envelopes: the literal
//! `Salted__` magic, an 8-byte salt, then AES-256-CBC blocks with PKCS#7
//! padding. Key and IV come from the site passphrase and the salt via the
//! OpenSSL `EVP_BytesToKey` schedule (MD5, one round per block of material).

use aes::Aes256;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};
use md5::{Digest, Md5};
use thiserror::Error;

type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Static passphrase the site derives subtitle keys from.
const PASSPHRASE: &[u8] = b"vExaQiFzjxTWbEJRYPGsSwCUdqMLuKm3";

/// Leading magic of a salted OpenSSL envelope.
const SALT_MAGIC: &[u8; 8] = b"Salted__";

/// Errors from decrypting one subtitle payload.
#[derive(Debug, Error)]
pub enum DecryptError {
    /// The payload is not valid base64.
    #[error("subtitle payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded payload is too short or missing the salt header.
    #[error("subtitle payload is not a salted envelope")]
    MalformedEnvelope,

    /// The cipher text did not decrypt to validly padded plaintext.
    #[error("subtitle payload failed to decrypt")]
    BadCipherText,
}

/// Decrypts one subtitle ciphertext into plaintext bytes.
///
/// # Errors
///
/// Returns a [`DecryptError`] when the payload is not base64, not a salted
/// envelope, or does not decrypt to validly padded plaintext.
pub fn decrypt(ciphertext: &str) -> Result<Vec<u8>, DecryptError> {
    let raw = BASE64.decode(ciphertext.trim())?;
    if raw.len() < 16 || &raw[..8] != SALT_MAGIC {
        return Err(DecryptError::MalformedEnvelope);
    }
    let (key, iv) = evp_bytes_to_key(PASSPHRASE, &raw[8..16]);
    Aes256CbcDec::new(&key.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(&raw[16..])
        .map_err(|_| DecryptError::BadCipherText)
}

/// OpenSSL `EVP_BytesToKey` with MD5: hash chains of `prev || pass || salt`
/// until 48 bytes of material exist, split 32/16 into key and IV.
fn evp_bytes_to_key(pass: &[u8], salt: &[u8]) -> ([u8; 32], [u8; 16]) {
    let mut material = Vec::with_capacity(48);
    let mut prev: Vec<u8> = Vec::new();
    while material.len() < 48 {
        let mut hasher = Md5::new();
        hasher.update(&prev);
        hasher.update(pass);
        hasher.update(salt);
        prev = hasher.finalize().to_vec();
        material.extend_from_slice(&prev);
    }
    let mut key = [0u8; 32];
    let mut iv = [0u8; 16];
    key.copy_from_slice(&material[..32]);
    iv.copy_from_slice(&material[32..48]);
    (key, iv)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Envelope built with `openssl enc -aes-256-cbc -md md5` and the site
    // passphrase; decrypts to a small ASS script.
    const ASS_FIXTURE: &str = "U2FsdGVkX18uPlevHcb/Awb/QSwkfUvZRbzw7S+R/rIwiZsAjVuriFPvFQUTa+603h0BOwwWRYWbUygn9yeuVj09VhYgGG4iD3GmOsrkGS9R6d5eByXA+nGMJGhsaVF4W+Q/Lb0uYyzffW5gsBe1klhyHsKFMSIrd0vKhZn51IM=";

    // Same envelope kind, decrypts to an SRT cue.
    const SRT_FIXTURE: &str =
        "U2FsdGVkX19ZCw5Wk59ezvW5IyUFkWKCwTbXcxwwrjU5QgyvhcUghCz+tBRS6b4Rgb+k+jCCcFE39GW66u1tOA==";

    #[test]
    fn test_decrypt_ass_fixture() {
        let plain = decrypt(ASS_FIXTURE).unwrap();
        let text = String::from_utf8(plain).unwrap();
        assert!(text.starts_with("[Script Info]"), "{text}");
        assert!(text.contains("Dialogue:"), "{text}");
    }

    #[test]
    fn test_decrypt_srt_fixture_starts_with_magic() {
        let plain = decrypt(SRT_FIXTURE).unwrap();
        assert_eq!(&plain[..4], b"1\n00");
    }

    #[test]
    fn test_decrypt_tolerates_surrounding_whitespace() {
        let padded = format!("  {SRT_FIXTURE}\n");
        assert!(decrypt(&padded).is_ok());
    }

    #[test]
    fn test_decrypt_rejects_non_base64() {
        assert!(matches!(
            decrypt("not base64!!!"),
            Err(DecryptError::Base64(_))
        ));
    }

    #[test]
    fn test_decrypt_rejects_missing_salt_header() {
        let bogus = BASE64.encode(b"NoSaltHere......and some more bytes");
        assert!(matches!(
            decrypt(&bogus),
            Err(DecryptError::MalformedEnvelope)
        ));
    }

    #[test]
    fn test_decrypt_rejects_truncated_envelope() {
        let bogus = BASE64.encode(b"Salted__1234");
        assert!(matches!(
            decrypt(&bogus),
            Err(DecryptError::MalformedEnvelope)
        ));
    }

    #[test]
    fn test_decrypt_rejects_corrupted_cipher_text() {
        // Drop half a block so the cipher text is no longer block-aligned.
        let mut raw = BASE64.decode(SRT_FIXTURE).unwrap();
        raw.truncate(raw.len() - 8);
        let corrupted = BASE64.encode(&raw);
        assert!(matches!(
            decrypt(&corrupted),
            Err(DecryptError::BadCipherText)
        ));
    }

    #[test]
    fn test_key_derivation_is_deterministic() {
        let (key_a, iv_a) = evp_bytes_to_key(b"pass", b"12345678");
        let (key_b, iv_b) = evp_bytes_to_key(b"pass", b"12345678");
        assert_eq!(key_a, key_b);
        assert_eq!(iv_a, iv_b);

        let (key_c, _) = evp_bytes_to_key(b"pass", b"87654321");
        assert_ne!(key_a, key_c);
    }
}
