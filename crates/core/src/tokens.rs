//! Session identifier and short-key generation.
//!
//! This module lives in `core` (zero internal deps) so it can be used by both
//! the API/repository layer and any future CLI tooling. All draws come from
//! the OS-seeded thread RNG; an exhausted entropy source panics rather than
//! degrading to a predictable value.

use rand::Rng;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of a generated session identifier in characters.
///
/// 24 characters over a 64-character alphabet is 144 bits of entropy, well
/// past the 64-bit floor required for unguessable session ids.
pub const SESSION_ID_LENGTH: usize = 24;

/// Default length of short keys (activation and password-reset codes).
pub const DEFAULT_KEY_LENGTH: usize = 10;

/// Cookie-safe 64-character alphabet for session identifiers.
///
/// `+` and `/` are legal cookie-octet characters, so the full set survives
/// round-tripping through `Set-Cookie` / `Cookie` headers unescaped.
const SESSION_ID_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate a new random session identifier.
pub fn generate_session_id() -> String {
    let mut rng = rand::rng();
    (0..SESSION_ID_LENGTH)
        .map(|_| SESSION_ID_ALPHABET[rng.random_range(0..SESSION_ID_ALPHABET.len())] as char)
        .collect()
}

/// Generate a short alphanumeric key (no symbols).
///
/// Used for registration/activation and password-reset codes that travel in
/// emailed links, so the alphabet stays URL-safe without encoding.
pub fn generate_key(length: usize) -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_session_id_length() {
        assert_eq!(generate_session_id().len(), SESSION_ID_LENGTH);
    }

    #[test]
    fn test_session_id_alphabet() {
        let id = generate_session_id();
        for c in id.bytes() {
            assert!(
                SESSION_ID_ALPHABET.contains(&c),
                "unexpected character {:?} in session id",
                c as char
            );
        }
    }

    #[test]
    fn test_session_ids_are_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_session_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_key_length() {
        assert_eq!(generate_key(DEFAULT_KEY_LENGTH).len(), DEFAULT_KEY_LENGTH);
        assert_eq!(generate_key(32).len(), 32);
    }

    #[test]
    fn test_key_is_alphanumeric_only() {
        let key = generate_key(200);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_keys_are_unique() {
        let keys: HashSet<String> = (0..1000).map(|_| generate_key(DEFAULT_KEY_LENGTH)).collect();
        assert_eq!(keys.len(), 1000);
    }
}
