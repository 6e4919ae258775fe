//! Session token formatting, parsing and hashing.
//!
//! A session token is `sf_{secret_hex}`. Only the SHA-256 of the secret is
//! stored, so a leaked sessions table cannot be replayed.

use std::fmt;

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroize;

/// Session token prefix.
pub const SESSION_TOKEN_PREFIX: &str = "sf";

/// Number of secret bytes encoded in a token.
pub const SESSION_SECRET_BYTES: usize = 32;

const SESSION_SECRET_HEX_CHARS: usize = SESSION_SECRET_BYTES * 2;

#[derive(Clone)]
pub struct SessionSecret {
    bytes: [u8; SESSION_SECRET_BYTES],
}

impl SessionSecret {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; SESSION_SECRET_BYTES]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SESSION_SECRET_BYTES] {
        &self.bytes
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionSecret(**redacted**)")?;
        Ok(())
    }
}

impl Drop for SessionSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

#[derive(Debug, Error)]
pub enum SessionTokenError {
    #[error("session token format is invalid")]
    InvalidFormat,

    #[error("session token secret encoding is invalid")]
    InvalidSecretEncoding,
}

#[must_use]
pub fn generate_session_secret() -> SessionSecret {
    let mut secret = [0_u8; SESSION_SECRET_BYTES];

    OsRng.fill_bytes(&mut secret);

    SessionSecret::from_bytes(secret)
}

#[must_use]
pub fn format_session_token(secret: &SessionSecret) -> String {
    format!(
        "{SESSION_TOKEN_PREFIX}_{}",
        encode_hex(secret.as_bytes())
    )
}

pub fn parse_session_token(token: &str) -> Result<SessionSecret, SessionTokenError> {
    let (prefix, secret_hex) = token
        .trim()
        .split_once('_')
        .ok_or(SessionTokenError::InvalidFormat)?;

    if prefix != SESSION_TOKEN_PREFIX {
        return Err(SessionTokenError::InvalidFormat);
    }

    let secret = decode_secret_hex(secret_hex).ok_or(SessionTokenError::InvalidSecretEncoding)?;

    Ok(SessionSecret::from_bytes(secret))
}

/// Storage key for a session: lowercase hex SHA-256 of the secret bytes.
#[must_use]
pub fn hash_session_secret(secret: &SessionSecret) -> String {
    encode_hex(&Sha256::digest(secret.as_bytes()))
}

fn encode_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    let mut encoded = String::with_capacity(bytes.len() * 2);

    for byte in bytes {
        encoded.push(char::from(HEX[usize::from(byte >> 4)]));
        encoded.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }

    encoded
}

fn decode_secret_hex(secret_hex: &str) -> Option<[u8; SESSION_SECRET_BYTES]> {
    if secret_hex.len() != SESSION_SECRET_HEX_CHARS {
        return None;
    }

    let mut secret = [0_u8; SESSION_SECRET_BYTES];

    for (byte, pair) in secret.iter_mut().zip(secret_hex.as_bytes().chunks_exact(2)) {
        let [hi, lo] = pair else {
            return None;
        };

        *byte = (decode_hex_nibble(*hi)? << 4) | decode_hex_nibble(*lo)?;
    }

    Some(secret)
}

fn decode_hex_nibble(value: u8) -> Option<u8> {
    match value {
        b'0'..=b'9' => Some(value - b'0'),
        b'a'..=b'f' => Some(value - b'a' + 10),
        b'A'..=b'F' => Some(value - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_format_round_trip() {
        let secret = SessionSecret::from_bytes([0xAB; SESSION_SECRET_BYTES]);
        let token = format_session_token(&secret);
        let parsed = parse_session_token(&token).expect("token should parse");

        assert!(token.starts_with("sf_abab"), "unexpected token {token}");
        assert_eq!(parsed.as_bytes(), secret.as_bytes());
    }

    #[test]
    fn parse_rejects_invalid_prefix() {
        let token = format!("nope_{}", "aa".repeat(SESSION_SECRET_BYTES));

        assert!(matches!(
            parse_session_token(&token),
            Err(SessionTokenError::InvalidFormat)
        ));
    }

    #[test]
    fn parse_rejects_short_secret() {
        assert!(matches!(
            parse_session_token("sf_abcd"),
            Err(SessionTokenError::InvalidSecretEncoding)
        ));
    }

    #[test]
    fn parse_rejects_non_hex_secret() {
        let token = format!("sf_{}", "zz".repeat(SESSION_SECRET_BYTES));

        assert!(matches!(
            parse_session_token(&token),
            Err(SessionTokenError::InvalidSecretEncoding)
        ));
    }

    #[test]
    fn hash_is_sha256_hex() {
        let secret = SessionSecret::from_bytes([0; SESSION_SECRET_BYTES]);

        // SHA-256 of 32 zero bytes
        assert_eq!(
            hash_session_secret(&secret),
            "66687aadf862bd776c8fc18b8e9f8e20089714856ee233b3902a591d0d5f2925"
        );
    }

    #[test]
    fn generated_secrets_differ() {
        let first = generate_session_secret();
        let second = generate_session_secret();

        assert_ne!(first.as_bytes(), second.as_bytes());
    }
}
