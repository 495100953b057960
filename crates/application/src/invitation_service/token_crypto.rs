use std::fmt::Write;

use sha2::{Digest, Sha256};

use warden_core::{AppError, AppResult};

/// Generates a random invitation token and its SHA-256 digest.
///
/// Returns `(raw_token_hex, sha256_hex)`.
pub(super) fn generate_token() -> AppResult<(String, String)> {
    let mut bytes = [0u8; 32];
    getrandom::fill(&mut bytes).map_err(|error| {
        AppError::Internal(format!("failed to generate invitation token: {error}"))
    })?;

    let raw_token = to_hex(&bytes);
    let token_hash = hash_token(&raw_token);
    Ok((raw_token, token_hash))
}

/// Computes the digest under which a token is stored.
pub(super) fn hash_token(raw_token: &str) -> String {
    to_hex(&Sha256::digest(raw_token.as_bytes()))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::{generate_token, hash_token};

    #[test]
    fn tokens_are_unique_hex_with_matching_digest() {
        let (first, first_hash) = generate_token().unwrap_or_else(|_| unreachable!());
        let (second, _) = generate_token().unwrap_or_else(|_| unreachable!());

        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|character| character.is_ascii_hexdigit()));
        assert_ne!(first, second);
        assert_eq!(hash_token(&first), first_hash);
        assert_ne!(first, first_hash);
    }

    #[test]
    fn digest_matches_known_vector() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
